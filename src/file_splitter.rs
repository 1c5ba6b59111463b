//! src/file_splitter.rs
use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A line-aligned byte range of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSplit {
    path: PathBuf,
    start: u64,
    length: u64,
}

impl FileSplit {
    pub fn new(path: &Path, start: u64, length: u64) -> Self {
        FileSplit {
            path: path.to_path_buf(),
            start,
            length,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Reads the raw lines of this split with their line terminators
    /// (`\n` or `\r\n`) removed.
    pub fn read_lines(&self) -> Result<Vec<Vec<u8>>, anyhow::Error> {
        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open input split {}", self.path.display()))?;
        file.seek(SeekFrom::Start(self.start))
            .context("Failed to seek to the start of the input split")?;
        let mut reader = BufReader::new(file.take(self.length));

        let mut lines = vec![];
        loop {
            let mut line = Vec::new();
            let read = reader
                .read_until(b'\n', &mut line)
                .context("Failed to read line from input split")?;
            if read == 0 {
                break;
            }
            if line.last() == Some(&b'\n') {
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
            }
            lines.push(line);
        }
        Ok(lines)
    }
}

pub struct FileSplitter {
    split_size_in_bytes: u64,
    path: PathBuf,
}

impl FileSplitter {
    pub fn new(path: PathBuf, split_size_in_bytes: u64) -> Self {
        FileSplitter {
            split_size_in_bytes,
            path,
        }
    }

    /// Cuts the file into splits of at most `split_size_in_bytes`, never in
    /// the middle of a line. A line longer than the limit gets a split of its
    /// own. An empty file has no splits.
    pub fn split(&self) -> Result<Vec<FileSplit>, anyhow::Error> {
        if !self.path.is_file() {
            return Err(anyhow::anyhow!(
                "Input file doesn't exist: {}",
                self.path.display()
            ));
        }

        let in_file = File::open(&self.path)
            .with_context(|| format!("Failed to open input file {}", self.path.display()))?;
        let mut buf_reader = BufReader::new(in_file);

        let mut results = vec![];
        let mut line = Vec::new();
        let mut split_start = 0u64;
        let mut split_length = 0u64;
        loop {
            line.clear();
            let line_size = buf_reader
                .read_until(b'\n', &mut line)
                .context("Failed to read line from input file")? as u64;
            if line_size == 0 {
                break;
            }

            if split_length > 0 && split_length + line_size > self.split_size_in_bytes {
                results.push(FileSplit::new(&self.path, split_start, split_length));
                split_start += split_length;
                split_length = 0;
            }
            split_length += line_size;
        }
        if split_length > 0 {
            results.push(FileSplit::new(&self.path, split_start, split_length));
        }
        Ok(results)
    }
}
