//! src/worker.rs
use crate::{
    emitter::{read_records, OutputEmitter, PartitionedMapEmitter},
    functions::{Key, Value},
    job_conf::JobConf,
    master::{MapTask, ReduceTask},
    output::OutputLayout,
    registry::Registry,
};
use anyhow::Context;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WorkerId(Uuid);

impl WorkerId {
    pub fn new() -> Self {
        WorkerId(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for WorkerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapAttemptOutcome {
    pub emitted: usize,
    pub skipped_records: usize,
    /// False when another attempt of the same task had already committed;
    /// this attempt's output was thrown away.
    pub committed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceAttemptOutcome {
    pub groups: usize,
    pub records: usize,
}

/// Runs single task attempts. Cheap to clone; all clones share the job's
/// registry, configuration and cancellation flag.
#[derive(Clone, Debug)]
pub struct Worker {
    id: WorkerId,
    registry: Arc<Registry>,
    conf: Arc<JobConf>,
    layout: Arc<OutputLayout>,
    cancelled: Arc<AtomicBool>,
}

impl Worker {
    pub fn new(
        registry: Arc<Registry>,
        conf: Arc<JobConf>,
        layout: Arc<OutputLayout>,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Worker {
            id: WorkerId::new(),
            registry,
            conf,
            layout,
            cancelled,
        }
    }

    pub fn id(&self) -> &WorkerId {
        &self.id
    }

    fn check_cancelled(&self) -> anyhow::Result<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            anyhow::bail!("Job was cancelled");
        }
        Ok(())
    }

    /// Maps every record of the task's split, then publishes the attempt's
    /// partition files in one rename. Either the whole attempt becomes the
    /// task's output or none of it does.
    #[tracing::instrument(
        name = "Map task attempt",
        skip(self, task),
        fields(worker = %self.id, task_id = %task.task_id, document = %task.input_split.document())
    )]
    pub fn run_map(
        &self,
        task: &MapTask,
        attempt: u32,
        partitions: usize,
    ) -> anyhow::Result<MapAttemptOutcome> {
        let input_split = &task.input_split;
        let mapper = self.registry.mapper(input_split.mapper(), &self.conf)?;
        let mut emitter = PartitionedMapEmitter::new(partitions);
        let mut skipped_records = 0;

        let lines = input_split.split().read_lines()?;
        for (i, line) in lines.into_iter().enumerate() {
            self.check_cancelled()?;
            match String::from_utf8(line) {
                Ok(record) => mapper
                    .map(input_split.document(), &record, &mut emitter)
                    .with_context(|| format!("Mapper failed on record {i} of the split"))?,
                Err(_) => {
                    skipped_records += 1;
                    tracing::warn!("Skipping record {i}: not valid UTF-8");
                }
            }
        }
        self.check_cancelled()?;

        let emitted = emitter.emitted();
        let committed_dir = self.layout.committed_map_dir(&task.task_id);
        if committed_dir.exists() {
            tracing::info!("Task already committed by another attempt, discarding output");
            return Ok(MapAttemptOutcome {
                emitted,
                skipped_records,
                committed: false,
            });
        }

        let attempt_dir = self.layout.map_attempt_dir(&task.task_id, attempt);
        if let Err(e) = emitter.write_to(&attempt_dir) {
            std::fs::remove_dir_all(&attempt_dir).ok();
            return Err(e);
        }
        std::fs::rename(&attempt_dir, &committed_dir)
            .context("Failed to commit map attempt output")?;
        tracing::debug!("Committed {emitted} intermediate pairs");

        Ok(MapAttemptOutcome {
            emitted,
            skipped_records,
            committed: true,
        })
    }

    /// Gathers the task's partition from every committed map task, groups it
    /// by key and reduces each complete group once, in ascending key order.
    #[tracing::instrument(
        name = "Reduce task attempt",
        skip(self, task, map_tasks),
        fields(worker = %self.id, task_id = %task.task_id, partition = task.partition)
    )]
    pub fn run_reduce(
        &self,
        task: &ReduceTask,
        attempt: u32,
        map_tasks: &[Uuid],
    ) -> anyhow::Result<ReduceAttemptOutcome> {
        let reducer = self.registry.reducer(&task.reducer, &self.conf)?;

        let mut groups: BTreeMap<Key, Vec<Value>> = BTreeMap::new();
        for map_task in map_tasks {
            let path = self.layout.committed_map_file(map_task, task.partition);
            for (key, value) in read_records(&path)? {
                groups.entry(key).or_default().push(value);
            }
        }

        let group_count = groups.len();
        let mut emitter = OutputEmitter::new();
        for (key, values) in groups {
            self.check_cancelled()?;
            let mut values = values.into_iter();
            reducer
                .reduce(&key, &mut values, &mut emitter)
                .with_context(|| format!("Reducer failed on key `{key}`"))?;
        }
        self.check_cancelled()?;

        let attempt_file = self.layout.reduce_attempt_file(task.partition, attempt);
        if let Err(e) = emitter.write_to(&attempt_file) {
            std::fs::remove_file(&attempt_file).ok();
            return Err(e);
        }
        std::fs::rename(&attempt_file, self.layout.committed_reduce_file(task.partition))
            .context("Failed to commit reduce attempt output")?;

        Ok(ReduceAttemptOutcome {
            groups: group_count,
            records: emitter.records().len(),
        })
    }
}
