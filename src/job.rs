//! src/job.rs
use crate::configuration::Settings;
use crate::error::JobError;
use crate::keywords::KeywordSet;
use crate::mappers::KEYWORD_FILTER;
use crate::mapreduce::MapReduce;
use crate::master::Master;
use crate::output::OutputLayout;
use crate::reducers::COUNT_AND_RANK;
use crate::registry::Registry;
use crate::spec::{MapReduceInput, MapReduceOutput, MapReduceSpecification};
use crate::worker::Worker;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const INVERTED_INDEX_JOB: &str = "invertIndex";

#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_id: Uuid,
    pub map_tasks: usize,
    pub reduce_tasks: usize,
    pub map_attempts: u32,
    pub reduce_attempts: u32,
    pub emitted_pairs: usize,
    pub skipped_records: usize,
    pub output_records: usize,
    pub parts: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// A validated job, ready to run. Construction does every check that can be
/// done up front, so a job that gets this far fails only at run time.
#[derive(Debug)]
pub struct MapReduceJob {
    mapreduce: MapReduce,
    registry: Arc<Registry>,
    layout: OutputLayout,
}

impl MapReduceJob {
    pub fn new(spec: MapReduceSpecification, registry: Registry) -> Result<Self, JobError> {
        let output = spec.validate()?;
        for input in spec.inputs() {
            if !input.path().exists() {
                return Err(JobError::Configuration(format!(
                    "input path {} doesn't exist",
                    input.path().display()
                )));
            }
            registry
                .mapper(input.mapper(), spec.conf())
                .map_err(|e| JobError::Configuration(format!("{e:#}")))?;
        }
        registry
            .reducer(output.reducer(), spec.conf())
            .map_err(|e| JobError::Configuration(format!("{e:#}")))?;

        let layout = OutputLayout::new(output.base_path());
        if layout.output_dir().exists() {
            return Err(JobError::Configuration(format!(
                "output directory {} already exists",
                layout.output_dir().display()
            )));
        }

        let mapreduce = MapReduce::new(spec)?;
        Ok(Self {
            mapreduce,
            registry: Arc::new(registry),
            layout,
        })
    }

    pub fn mapreduce(&self) -> &MapReduce {
        &self.mapreduce
    }

    /// Runs every task and commits the output. On failure or timeout all
    /// outstanding attempts are told to stop and the output directory is
    /// removed; nothing is ever partially committed.
    #[tracing::instrument(
        name = "Run MapReduceJob",
        skip_all,
        fields(job_id = %self.mapreduce.job_id(), name = %self.mapreduce.spec().name())
    )]
    pub async fn run(self) -> Result<JobReport, JobError> {
        let started = Instant::now();
        let spec = self.mapreduce.spec();
        let output = spec.validate()?;

        self.layout.prepare()?;
        let layout = Arc::new(self.layout.clone());
        let conf = Arc::new(spec.conf().clone());
        let cancelled = Arc::new(AtomicBool::new(false));
        let workers = (0..spec.machines())
            .map(|_| {
                Worker::new(
                    self.registry.clone(),
                    conf.clone(),
                    layout.clone(),
                    cancelled.clone(),
                )
            })
            .collect();
        let mut master = Master::new(&self.mapreduce, output, workers);
        tracing::info!(
            "Starting job with {} map and {} reduce tasks on {} workers",
            master.map_tasks().len(),
            master.reduce_tasks().len(),
            master.worker_count()
        );

        let result = match spec.timeout() {
            Some(timeout) => tokio::time::timeout(timeout, master.run())
                .await
                .unwrap_or_else(|_| Err(JobError::TimedOut(timeout))),
            None => master.run().await,
        };
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                cancelled.store(true, Ordering::SeqCst);
                layout.abort();
                tracing::error!("Job failed: {e}");
                return Err(e);
            }
        };

        let parts = layout
            .commit(output.num_tasks() as usize)
            .map_err(|e| {
                layout.abort();
                JobError::Commit(e)
            })?;

        Ok(JobReport {
            job_id: *self.mapreduce.job_id(),
            map_tasks: report.map_tasks,
            reduce_tasks: report.reduce_tasks,
            map_attempts: report.map_attempts,
            reduce_attempts: report.reduce_attempts,
            emitted_pairs: report.emitted_pairs,
            skipped_records: report.skipped_records,
            output_records: report.output_records,
            parts,
            elapsed: started.elapsed(),
        })
    }
}

/// Describes the keyword inverted index job: `input` is a file or a directory
/// of documents, `keywords` travel to every mapper through the job
/// configuration.
pub fn inverted_index_spec(
    settings: &Settings,
    input: &Path,
    output: &Path,
    keywords: &KeywordSet,
) -> Result<MapReduceSpecification, JobError> {
    if keywords.is_empty() {
        return Err(JobError::Configuration(
            "at least one keyword is required".into(),
        ));
    }
    let mut spec = MapReduceSpecification::from_settings(INVERTED_INDEX_JOB, settings);
    spec.add_input(MapReduceInput::new(input, KEYWORD_FILTER));
    spec.set_output(MapReduceOutput::new(
        output,
        settings.job.reduce_tasks,
        COUNT_AND_RANK,
    ));
    keywords.write_to(spec.conf_mut());
    Ok(spec)
}

pub async fn run_inverted_index(
    settings: &Settings,
    input: &Path,
    output: &Path,
    keywords: &KeywordSet,
) -> Result<JobReport, JobError> {
    let spec = inverted_index_spec(settings, input, output, keywords)?;
    MapReduceJob::new(spec, Registry::with_defaults())?
        .run()
        .await
}
