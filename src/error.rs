//! src/error.rs
use std::time::Duration;
use uuid::Uuid;

pub fn error_chain_fmt(
    f: &mut std::fmt::Formatter<'_>,
    e: &impl std::error::Error,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Map,
    Reduce,
}

impl std::fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPhase::Map => write!(f, "Map"),
            TaskPhase::Reduce => write!(f, "Reduce"),
        }
    }
}

/// Failures surfaced at the job boundary.
///
/// Configuration problems are reported before any task runs. Everything
/// else means the job was aborted and nothing was committed to the output.
#[derive(thiserror::Error)]
pub enum JobError {
    #[error("Invalid job configuration: {0}")]
    Configuration(String),
    #[error("Failed to prepare job input")]
    Input(#[source] anyhow::Error),
    #[error("{phase} task {task_id} failed after {attempts} attempt(s)")]
    TaskFailed {
        phase: TaskPhase,
        task_id: Uuid,
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },
    #[error("Job timed out after {0:?}")]
    TimedOut(Duration),
    #[error("Failed to commit job output")]
    Commit(#[source] anyhow::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl std::fmt::Debug for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn debug_output_should_include_the_whole_cause_chain() {
        let error = JobError::TaskFailed {
            phase: TaskPhase::Map,
            task_id: Uuid::nil(),
            attempts: 3,
            source: anyhow!("disk on fire"),
        };

        let rendered = format!("{error:?}");

        assert!(rendered.starts_with("Map task 00000000-0000-0000-0000-000000000000 failed"));
        assert!(rendered.contains("after 3 attempt(s)"));
        assert!(rendered.contains("Caused by:\n\tdisk on fire"));
    }

    #[test]
    fn configuration_errors_should_render_their_message() {
        let error = JobError::Configuration("at least one keyword is required".into());
        assert_eq!(
            error.to_string(),
            "Invalid job configuration: at least one keyword is required"
        );
    }
}
