//! src/master.rs
use crate::{
    error::{JobError, TaskPhase},
    mapreduce::{InputSplit, MapReduce},
    spec::MapReduceOutput,
    worker::{Worker, WorkerId},
};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    InProgress,
    Completed,
    Failed,
}

#[derive(Clone, Debug)]
pub struct MapTask {
    pub task_id: Uuid,
    pub state: TaskState,
    pub attempts: u32,
    pub worker_id: Option<WorkerId>,
    pub input_split: InputSplit,
}

#[derive(Clone, Debug)]
pub struct ReduceTask {
    pub task_id: Uuid,
    pub state: TaskState,
    pub attempts: u32,
    pub worker_id: Option<WorkerId>,
    pub partition: usize,
    pub reducer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterReport {
    pub map_tasks: usize,
    pub reduce_tasks: usize,
    pub map_attempts: u32,
    pub reduce_attempts: u32,
    pub emitted_pairs: usize,
    pub skipped_records: usize,
    pub output_records: usize,
}

struct AttemptResult<T> {
    attempts: u32,
    worker_id: Option<WorkerId>,
    outcome: anyhow::Result<T>,
}

/// Runs `work` on a blocking thread until it succeeds or `max_attempts` is
/// reached. Attempt `n` goes to the worker after the one that ran attempt
/// `n - 1`. A panicking attempt counts as a failed one.
async fn run_attempts<T, F>(
    slots: Arc<Semaphore>,
    workers: Arc<Vec<Worker>>,
    first_worker: usize,
    max_attempts: u32,
    work: Arc<F>,
) -> AttemptResult<T>
where
    T: Send + 'static,
    F: Fn(&Worker, u32) -> anyhow::Result<T> + Send + Sync + 'static,
{
    let mut last_error = anyhow::anyhow!("Task was never attempted");
    let mut worker_id = None;
    for attempt in 1..=max_attempts {
        let worker = workers[(first_worker + attempt as usize - 1) % workers.len()].clone();
        worker_id = Some(worker.id().clone());
        let permit = match slots.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                return AttemptResult {
                    attempts: attempt - 1,
                    worker_id,
                    outcome: Err(anyhow::Error::new(e).context("Worker pool was closed")),
                }
            }
        };
        let work = Arc::clone(&work);
        let joined = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work(&worker, attempt)
        })
        .await;

        match joined {
            Ok(Ok(value)) => {
                return AttemptResult {
                    attempts: attempt,
                    worker_id,
                    outcome: Ok(value),
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(attempt, max_attempts, "Task attempt failed: {e:#}");
                last_error = e;
            }
            Err(e) => {
                tracing::warn!(attempt, max_attempts, "Task attempt panicked: {e}");
                last_error = anyhow::Error::new(e).context("Task attempt panicked");
            }
        }
    }
    AttemptResult {
        attempts: max_attempts,
        worker_id,
        outcome: Err(last_error),
    }
}

/// Schedules the map tasks, waits for all of them, then schedules the reduce
/// tasks. At most one task attempt per worker runs at any time.
pub struct Master {
    workers: Arc<Vec<Worker>>,
    map_tasks: Vec<MapTask>,
    reduce_tasks: Vec<ReduceTask>,
    max_map_attempts: u32,
    max_reduce_attempts: u32,
    slots: Arc<Semaphore>,
}

impl Master {
    pub fn new(mapreduce: &MapReduce, output: &MapReduceOutput, workers: Vec<Worker>) -> Self {
        let map_tasks = mapreduce
            .input_splits()
            .iter()
            .map(|input_split| MapTask {
                task_id: Uuid::new_v4(),
                state: TaskState::Idle,
                attempts: 0,
                worker_id: None,
                input_split: input_split.clone(),
            })
            .collect();

        let reduce_tasks = (0..output.num_tasks() as usize)
            .map(|partition| ReduceTask {
                task_id: Uuid::new_v4(),
                state: TaskState::Idle,
                attempts: 0,
                worker_id: None,
                partition,
                reducer: output.reducer().to_string(),
            })
            .collect();

        let slots = Arc::new(Semaphore::new(workers.len().max(1)));
        Master {
            workers: Arc::new(workers),
            map_tasks,
            reduce_tasks,
            max_map_attempts: mapreduce.spec().max_map_attempts(),
            max_reduce_attempts: mapreduce.spec().max_reduce_attempts(),
            slots,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn task_count(&self) -> usize {
        self.map_tasks.len() + self.reduce_tasks.len()
    }

    pub fn map_tasks(&self) -> &Vec<MapTask> {
        &self.map_tasks
    }

    pub fn reduce_tasks(&self) -> &Vec<ReduceTask> {
        &self.reduce_tasks
    }

    fn partitions(&self) -> usize {
        self.reduce_tasks.len()
    }

    #[tracing::instrument(name = "Run master", skip_all, fields(workers = self.workers.len()))]
    pub async fn run(&mut self) -> Result<MasterReport, JobError> {
        if self.workers.is_empty() {
            return Err(JobError::Configuration(
                "at least one worker is required".into(),
            ));
        }
        let mut report = MasterReport {
            map_tasks: self.map_tasks.len(),
            reduce_tasks: self.reduce_tasks.len(),
            ..MasterReport::default()
        };
        self.run_map_phase(&mut report).await?;
        tracing::info!(
            "Map phase complete: {} pairs from {} tasks",
            report.emitted_pairs,
            report.map_tasks
        );
        self.run_reduce_phase(&mut report).await?;
        tracing::info!(
            "Reduce phase complete: {} records from {} tasks",
            report.output_records,
            report.reduce_tasks
        );
        Ok(report)
    }

    async fn run_map_phase(&mut self, report: &mut MasterReport) -> Result<(), JobError> {
        let partitions = self.partitions();
        let mut set = JoinSet::new();
        for (index, task) in self.map_tasks.iter_mut().enumerate() {
            task.state = TaskState::InProgress;
            task.worker_id = Some(self.workers[index % self.workers.len()].id().clone());
            let snapshot = task.clone();
            let work = Arc::new(move |worker: &Worker, attempt: u32| {
                worker.run_map(&snapshot, attempt, partitions)
            });
            let attempts = run_attempts(
                self.slots.clone(),
                self.workers.clone(),
                index,
                self.max_map_attempts,
                work,
            );
            set.spawn(async move { (index, attempts.await) });
        }

        while let Some(joined) = set.join_next().await {
            let (index, result) = joined.context("Map task scheduler crashed")?;
            let task = &mut self.map_tasks[index];
            task.attempts = result.attempts;
            task.worker_id = result.worker_id;
            report.map_attempts += result.attempts;
            match result.outcome {
                Ok(outcome) => {
                    task.state = TaskState::Completed;
                    report.emitted_pairs += outcome.emitted;
                    report.skipped_records += outcome.skipped_records;
                }
                Err(source) => {
                    task.state = TaskState::Failed;
                    return Err(JobError::TaskFailed {
                        phase: TaskPhase::Map,
                        task_id: task.task_id,
                        attempts: result.attempts,
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    async fn run_reduce_phase(&mut self, report: &mut MasterReport) -> Result<(), JobError> {
        let map_task_ids: Arc<Vec<Uuid>> =
            Arc::new(self.map_tasks.iter().map(|task| task.task_id).collect());
        let mut set = JoinSet::new();
        for (index, task) in self.reduce_tasks.iter_mut().enumerate() {
            task.state = TaskState::InProgress;
            task.worker_id = Some(self.workers[index % self.workers.len()].id().clone());
            let snapshot = task.clone();
            let map_task_ids = map_task_ids.clone();
            let work = Arc::new(move |worker: &Worker, attempt: u32| {
                worker.run_reduce(&snapshot, attempt, &map_task_ids)
            });
            let attempts = run_attempts(
                self.slots.clone(),
                self.workers.clone(),
                index,
                self.max_reduce_attempts,
                work,
            );
            set.spawn(async move { (index, attempts.await) });
        }

        while let Some(joined) = set.join_next().await {
            let (index, result) = joined.context("Reduce task scheduler crashed")?;
            let task = &mut self.reduce_tasks[index];
            task.attempts = result.attempts;
            task.worker_id = result.worker_id;
            report.reduce_attempts += result.attempts;
            match result.outcome {
                Ok(outcome) => {
                    task.state = TaskState::Completed;
                    report.output_records += outcome.records;
                }
                Err(source) => {
                    task.state = TaskState::Failed;
                    return Err(JobError::TaskFailed {
                        phase: TaskPhase::Reduce,
                        task_id: task.task_id,
                        attempts: result.attempts,
                        source,
                    });
                }
            }
        }
        Ok(())
    }
}
