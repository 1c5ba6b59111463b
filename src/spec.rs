//! src/spec.rs
use crate::configuration::Settings;
use crate::error::JobError;
use crate::job_conf::JobConf;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MapReduceInput {
    path: PathBuf,
    mapper: String,
}

impl MapReduceInput {
    pub fn new(path: impl Into<PathBuf>, mapper: &str) -> Self {
        MapReduceInput {
            path: path.into(),
            mapper: mapper.to_string(),
        }
    }

    pub fn mapper(&self) -> &str {
        &self.mapper
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone)]
pub struct MapReduceOutput {
    base_path: PathBuf,
    num_tasks: u32,
    reducer: String,
}

impl MapReduceOutput {
    pub fn new(base_path: impl Into<PathBuf>, num_tasks: u32, reducer: &str) -> Self {
        MapReduceOutput {
            base_path: base_path.into(),
            num_tasks,
            reducer: reducer.to_string(),
        }
    }

    pub fn reducer(&self) -> &str {
        &self.reducer
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn num_tasks(&self) -> u32 {
        self.num_tasks
    }
}

/// Everything needed to run one job: where to read, where to write, which
/// functions to use and the configuration shipped to them.
#[derive(Debug, Clone)]
pub struct MapReduceSpecification {
    name: String,
    input: Vec<MapReduceInput>,
    output: Option<MapReduceOutput>,
    machines: u32,
    split_size_in_bytes: u64,
    max_map_attempts: u32,
    max_reduce_attempts: u32,
    timeout: Option<Duration>,
    conf: JobConf,
}

impl MapReduceSpecification {
    pub fn new(name: &str, machines: u32, split_size_in_bytes: u64) -> Self {
        MapReduceSpecification {
            name: name.into(),
            input: vec![],
            output: None,
            machines,
            split_size_in_bytes,
            max_map_attempts: 1,
            max_reduce_attempts: 1,
            timeout: None,
            conf: JobConf::new(),
        }
    }

    pub fn from_settings(name: &str, settings: &Settings) -> Self {
        let mut spec = Self::new(
            name,
            settings.cluster.workers.into(),
            settings.job.split_size_in_bytes,
        );
        spec.set_max_attempts(settings.job.max_map_attempts, settings.job.max_reduce_attempts);
        spec.set_timeout(settings.job.timeout_seconds.map(Duration::from_secs));
        spec
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_input(&mut self, input: MapReduceInput) {
        self.input.push(input);
    }

    pub fn inputs(&self) -> &Vec<MapReduceInput> {
        &self.input
    }

    pub fn machines(&self) -> u32 {
        self.machines
    }

    pub fn split_size_in_bytes(&self) -> u64 {
        self.split_size_in_bytes
    }

    pub fn set_max_attempts(&mut self, map: u32, reduce: u32) {
        self.max_map_attempts = map;
        self.max_reduce_attempts = reduce;
    }

    pub fn max_map_attempts(&self) -> u32 {
        self.max_map_attempts
    }

    pub fn max_reduce_attempts(&self) -> u32 {
        self.max_reduce_attempts
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn set_output(&mut self, output: MapReduceOutput) {
        self.output = Some(output);
    }

    pub fn output(&self) -> Option<&MapReduceOutput> {
        self.output.as_ref()
    }

    pub fn conf(&self) -> &JobConf {
        &self.conf
    }

    pub fn conf_mut(&mut self) -> &mut JobConf {
        &mut self.conf
    }

    /// Checks the parts of the job that can be judged without touching the
    /// file system.
    pub fn validate(&self) -> Result<&MapReduceOutput, JobError> {
        if self.input.is_empty() {
            return Err(JobError::Configuration("no input was given".into()));
        }
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| JobError::Configuration("no output was given".into()))?;
        if output.base_path().as_os_str().is_empty() {
            return Err(JobError::Configuration("output path is empty".into()));
        }
        if output.num_tasks() == 0 {
            return Err(JobError::Configuration(
                "at least one reduce task is required".into(),
            ));
        }
        if self.machines == 0 {
            return Err(JobError::Configuration(
                "at least one worker is required".into(),
            ));
        }
        if self.split_size_in_bytes == 0 {
            return Err(JobError::Configuration(
                "split size must be positive".into(),
            ));
        }
        if self.max_map_attempts == 0 || self.max_reduce_attempts == 0 {
            return Err(JobError::Configuration(
                "tasks need at least one attempt".into(),
            ));
        }
        Ok(output)
    }
}
