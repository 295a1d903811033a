use async_trait::async_trait;
use futures::future::join_all;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, Instrument};

pub mod metrics_server;
pub mod plan;
pub mod retire;
mod steps;
pub mod types;

// Re-export commonly used items
pub use metrics_server::MetricsServerTask;
pub use retire::RetiredComponent;
pub use types::{Action, Error, Result};

/// A reconciliation unit for one logical component.
///
/// `run` is invoked once per cycle. It either converges the component's
/// resources or returns the first failure; the next cycle retries everything.
#[async_trait]
pub trait Task: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, ctx: &CancellationToken) -> Result<()>;
}

/// Failures of a reconciliation cycle, one entry per failed task
#[derive(Error, Debug)]
#[error("{} of {total} task(s) failed: {}", .failures.len(), summarize(.failures))]
pub struct TaskGroupError {
    pub total: usize,
    pub failures: Vec<(String, Error)>,
}

fn summarize(failures: &[(String, Error)]) -> String {
    failures
        .iter()
        .map(|(name, err)| format!("{name}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Runs a set of sibling tasks once per cycle
#[derive(Default)]
pub struct TaskRunner {
    tasks: Vec<Box<dyn Task>>,
}

impl TaskRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_task(mut self, task: impl Task + 'static) -> Self {
        self.tasks.push(Box::new(task));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task concurrently and wait for all of them.
    ///
    /// A failing task does not stop its siblings.
    #[instrument(skip_all, fields(tasks = self.tasks.len()))]
    pub async fn run_cycle(&self, ctx: &CancellationToken) -> Result<(), TaskGroupError> {
        let runs = self.tasks.iter().map(|task| {
            let span = tracing::info_span!("task", name = %task.name());
            async move { (task.name().to_string(), task.run(ctx).await) }.instrument(span)
        });

        let failures: Vec<(String, Error)> = join_all(runs)
            .await
            .into_iter()
            .filter_map(|(name, result)| result.err().map(|err| (name, err)))
            .collect();

        if failures.is_empty() {
            debug!("All tasks reconciled");
            Ok(())
        } else {
            Err(TaskGroupError {
                total: self.tasks.len(),
                failures,
            })
        }
    }

    /// Run cycles every `interval` until `ctx` is cancelled.
    ///
    /// Failed cycles are logged; recovery is left to the next cycle.
    pub async fn run_until_cancelled(&self, interval: Duration, ctx: &CancellationToken) {
        info!(
            tasks = self.tasks.len(),
            interval_seconds = interval.as_secs(),
            "Starting reconciliation loop"
        );

        while !ctx.is_cancelled() {
            match self.run_cycle(ctx).await {
                Ok(()) => info!("Reconciliation cycle completed"),
                Err(err) => error!(error = %err, "Reconciliation cycle failed"),
            }

            tokio::select! {
                () = ctx.cancelled() => break,
                () = tokio::time::sleep(interval) => {}
            }
        }

        info!("Reconciliation loop stopped");
    }
}
