//! src/mapreduce.rs
use crate::{
    error::JobError,
    file_splitter::{FileSplit, FileSplitter},
    spec::{MapReduceInput, MapReduceSpecification},
};
use anyhow::Context;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct InputSplit {
    id: Uuid,
    document: String,
    split: FileSplit,
    mapper: String,
}

impl InputSplit {
    pub fn new(document: &str, split: FileSplit, mapper: &str) -> Self {
        InputSplit {
            id: Uuid::new_v4(),
            document: document.into(),
            split,
            mapper: mapper.into(),
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    /// Identity of the document the split belongs to: its file name.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn split(&self) -> &FileSplit {
        &self.split
    }

    pub fn mapper(&self) -> &str {
        &self.mapper
    }
}

pub fn document_id(path: &Path) -> anyhow::Result<String> {
    let name = path
        .file_name()
        .with_context(|| format!("Input path {} has no file name", path.display()))?;
    Ok(name.to_string_lossy().into_owned())
}

/// Names starting with `.` or `_` are hidden from input listing.
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.') || name.starts_with('_'))
}

/// Expands an input path into the files it names. A directory contributes
/// its regular, non-hidden files (not recursively), sorted by name.
pub fn list_input_files(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("Input path doesn't exist: {}", path.display());
    }
    let mut files = vec![];
    for entry in std::fs::read_dir(path)
        .with_context(|| format!("Failed to list input directory {}", path.display()))?
    {
        let entry = entry.context("Failed to read input directory entry")?;
        let entry_path = entry.path();
        if entry_path.is_file() && !is_hidden(&entry_path) {
            files.push(entry_path);
        }
    }
    files.sort();
    Ok(files)
}

#[tracing::instrument(name = "Split inputs", skip(inputs))]
fn split_inputs(
    inputs: &[MapReduceInput],
    split_size_in_bytes: u64,
) -> Result<Vec<InputSplit>, anyhow::Error> {
    let mut results = vec![];
    for input in inputs {
        for file in list_input_files(input.path())? {
            tracing::debug!("processing input file: {}", file.display());
            let document = document_id(&file)?;
            let splits = FileSplitter::new(file.clone(), split_size_in_bytes)
                .split()
                .with_context(|| format!("Failed to split input file {}", file.display()))?;
            for split in splits {
                results.push(InputSplit::new(&document, split, input.mapper()));
            }
        }
    }
    Ok(results)
}

#[derive(Debug)]
pub struct MapReduce {
    job_id: Uuid,
    spec: MapReduceSpecification,
    input_splits: Vec<InputSplit>,
}

impl MapReduce {
    pub fn new(spec: MapReduceSpecification) -> Result<Self, JobError> {
        let job_id = Uuid::new_v4();
        let input_splits =
            split_inputs(spec.inputs(), spec.split_size_in_bytes()).map_err(JobError::Input)?;
        Ok(MapReduce {
            spec,
            job_id,
            input_splits,
        })
    }

    pub fn spec(&self) -> &MapReduceSpecification {
        &self.spec
    }

    pub fn input_splits(&self) -> &[InputSplit] {
        &self.input_splits
    }

    pub fn job_id(&self) -> &Uuid {
        &self.job_id
    }
}
