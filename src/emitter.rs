//! src/emitter.rs
use crate::functions::{Key, MapEmitter, ReduceEmitter, Value};
use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Reduce partition for `key`. Stable across runs and processes.
pub fn partition_for(key: &str, partition_count: usize) -> usize {
    let mut hash = 0usize;
    for byte in key.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(byte as usize);
    }
    hash % partition_count
}

pub fn partition_file_name(partition: usize) -> String {
    format!("R{:04}.txt", partition)
}

fn write_records<'a, I>(path: &Path, records: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = &'a (Key, Value)>,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::with_capacity(8192, file);
    for (key, value) in records {
        writeln!(writer, "{}\t{}", key, value).context("Failed to write record")?;
    }
    writer.flush().context("Failed to flush writer.")?;
    Ok(())
}

/// Reads `key<TAB>value` lines back. Lines without a tab are rejected.
pub fn read_records(path: &Path) -> anyhow::Result<Vec<(Key, Value)>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut records = vec![];
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        let (key, value) = line
            .split_once('\t')
            .with_context(|| format!("Malformed record `{line}` in {}", path.display()))?;
        records.push((key.to_string(), value.to_string()));
    }
    Ok(records)
}

/// Collects one map attempt's output, bucketed by reduce partition.
///
/// Nothing touches the file system until [`PartitionedMapEmitter::write_to`],
/// so a failed attempt leaves no trace.
#[derive(Debug)]
pub struct PartitionedMapEmitter {
    partitions: Vec<Vec<(Key, Value)>>,
}

impl PartitionedMapEmitter {
    pub fn new(partition_count: usize) -> Self {
        Self {
            partitions: vec![Vec::new(); partition_count.max(1)],
        }
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn emitted(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    pub fn partition(&self, partition: usize) -> &[(Key, Value)] {
        &self.partitions[partition]
    }

    /// Writes one `R{partition}.txt` file per partition into `dir`, empty
    /// partitions included, and returns their paths.
    pub fn write_to(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .context("Failed to create intermediate file directory")?;
        let mut paths = Vec::with_capacity(self.partitions.len());
        for (partition, records) in self.partitions.iter().enumerate() {
            let path = dir.join(partition_file_name(partition));
            write_records(&path, records)?;
            paths.push(path);
        }
        Ok(paths)
    }
}

impl MapEmitter for PartitionedMapEmitter {
    fn emit(&mut self, key: Key, value: Value) {
        let partition = partition_for(&key, self.partitions.len());
        self.partitions[partition].push((key, value));
    }
}

/// Collects the final records of one reduce attempt.
#[derive(Debug, Default)]
pub struct OutputEmitter {
    records: Vec<(Key, Value)>,
}

impl OutputEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[(Key, Value)] {
        &self.records
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        write_records(path, &self.records)
    }
}

impl ReduceEmitter for OutputEmitter {
    fn emit(&mut self, key: Key, value: Value) {
        self.records.push((key, value));
    }
}
