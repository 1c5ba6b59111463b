//! src/output.rs
use crate::emitter::{partition_file_name, read_records};
use crate::reducers::RankedResult;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const TEMPORARY_DIR: &str = "_temporary";
pub const SUCCESS_MARKER: &str = "_SUCCESS";

pub fn part_file_name(partition: usize) -> String {
    format!("part-r-{:05}", partition)
}

/// Where a job keeps its scratch data and final output.
///
/// Everything a task writes lives under `<output>/_temporary` until the job
/// commits; only [`OutputLayout::commit`] moves files into `<output>`.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    output_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn temporary_dir(&self) -> PathBuf {
        self.output_dir.join(TEMPORARY_DIR)
    }

    pub fn map_task_dir(&self, task_id: &Uuid) -> PathBuf {
        self.temporary_dir().join("map").join(task_id.to_string())
    }

    pub fn map_attempt_dir(&self, task_id: &Uuid, attempt: u32) -> PathBuf {
        self.map_task_dir(task_id).join(format!("attempt-{attempt}"))
    }

    pub fn committed_map_dir(&self, task_id: &Uuid) -> PathBuf {
        self.map_task_dir(task_id).join("committed")
    }

    pub fn committed_map_file(&self, task_id: &Uuid, partition: usize) -> PathBuf {
        self.committed_map_dir(task_id)
            .join(partition_file_name(partition))
    }

    pub fn reduce_attempt_file(&self, partition: usize, attempt: u32) -> PathBuf {
        self.temporary_dir()
            .join("reduce")
            .join(format!("{}.attempt-{attempt}", part_file_name(partition)))
    }

    pub fn committed_reduce_file(&self, partition: usize) -> PathBuf {
        self.temporary_dir()
            .join("reduce")
            .join(part_file_name(partition))
    }

    /// Creates the output and scratch directories. Refuses to reuse an
    /// existing output directory.
    pub fn prepare(&self) -> anyhow::Result<()> {
        if self.output_dir.exists() {
            anyhow::bail!(
                "Output directory {} already exists",
                self.output_dir.display()
            );
        }
        std::fs::create_dir_all(self.temporary_dir().join("map"))
            .context("Failed to create map scratch directory")?;
        std::fs::create_dir_all(self.temporary_dir().join("reduce"))
            .context("Failed to create reduce scratch directory")?;
        Ok(())
    }

    /// Moves every committed reduce file into place, writes `_SUCCESS` and
    /// drops the scratch directory.
    #[tracing::instrument(name = "Commit job output", skip(self), fields(output = %self.output_dir.display()))]
    pub fn commit(&self, partitions: usize) -> anyhow::Result<Vec<PathBuf>> {
        let mut parts = Vec::with_capacity(partitions);
        for partition in 0..partitions {
            let committed = self.committed_reduce_file(partition);
            let part = self.output_dir.join(part_file_name(partition));
            std::fs::rename(&committed, &part).with_context(|| {
                format!("Failed to move {} into place", committed.display())
            })?;
            parts.push(part);
        }
        std::fs::File::create(self.output_dir.join(SUCCESS_MARKER))
            .context("Failed to write success marker")?;
        std::fs::remove_dir_all(self.temporary_dir())
            .context("Failed to remove scratch directory")?;
        Ok(parts)
    }

    /// Removes the output directory with everything under it. Only called
    /// for a job that never committed, so the directory holds nothing but
    /// scratch data.
    pub fn abort(&self) {
        if let Err(e) = std::fs::remove_dir_all(&self.output_dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    "Failed to remove aborted output {}: {e}",
                    self.output_dir.display()
                );
            }
        }
    }
}

/// Parses a committed job output into `term -> ranked documents`.
pub fn read_output(output_dir: &Path) -> anyhow::Result<BTreeMap<String, RankedResult>> {
    if !output_dir.join(SUCCESS_MARKER).is_file() {
        anyhow::bail!(
            "{} is not a committed job output (no {SUCCESS_MARKER})",
            output_dir.display()
        );
    }
    let mut parts = vec![];
    for entry in std::fs::read_dir(output_dir)
        .with_context(|| format!("Failed to list {}", output_dir.display()))?
    {
        let path = entry.context("Failed to read output entry")?.path();
        let is_part = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("part-r-"));
        if is_part {
            parts.push(path);
        }
    }
    parts.sort();

    let mut index = BTreeMap::new();
    for part in parts {
        for (term, ranked) in read_records(&part)? {
            let ranked = RankedResult::parse(&ranked)
                .with_context(|| format!("Invalid record for `{term}` in {}", part.display()))?;
            if index.insert(term.clone(), ranked).is_some() {
                anyhow::bail!("Term `{term}` appears in more than one output record");
            }
        }
    }
    Ok(index)
}
