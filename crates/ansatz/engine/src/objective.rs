//! Objective plumbing
//!
//! An objective scores one numeric instance of a template. It is supplied by
//! the caller and may fail, hang or panic; [`GuardedObjective`] turns every
//! one of those into an [`ObjectiveError`] so a search can carry on.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Per-candidate evaluation failures. Never fatal to a search.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ObjectiveError {
    #[error("Objective failed: {0}")]
    Failed(String),

    #[error("Objective timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Objective returned a non-finite score")]
    NonFinite,

    #[error("Objective panicked")]
    Panicked,
}

/// Caller-supplied scorer of a fully numeric template string
pub trait Objective: Send + Sync {
    fn score(&self, numeric_ansatz: &str) -> Result<f64, ObjectiveError>;
}

/// Adapter turning a closure into an [`Objective`]
pub struct FnObjective<F>(F);

impl<F> Objective for FnObjective<F>
where
    F: Fn(&str) -> Result<f64, ObjectiveError> + Send + Sync,
{
    fn score(&self, numeric_ansatz: &str) -> Result<f64, ObjectiveError> {
        (self.0)(numeric_ansatz)
    }
}

/// Wrap a closure as an objective
pub fn from_fn<F>(f: F) -> FnObjective<F>
where
    F: Fn(&str) -> Result<f64, ObjectiveError> + Send + Sync,
{
    FnObjective(f)
}

/// Runs an objective with panic isolation and an optional wall-clock bound
#[derive(Clone)]
pub struct GuardedObjective {
    inner: Arc<dyn Objective>,
    timeout: Option<Duration>,
}

impl GuardedObjective {
    /// With a `timeout`, every call runs on a fresh worker thread. A call
    /// that overruns is reported as [`ObjectiveError::TimedOut`] while its
    /// thread keeps running until the objective returns, so an objective
    /// that hangs forever leaks one thread per timed-out call.
    pub fn new(inner: Arc<dyn Objective>, timeout: Option<Duration>) -> Self {
        Self { inner, timeout }
    }

    /// Score one candidate. NaN scores count as failures.
    pub fn score(&self, numeric_ansatz: &str) -> Result<f64, ObjectiveError> {
        let score = match self.timeout {
            None => call_isolated(self.inner.as_ref(), numeric_ansatz)?,
            Some(limit) => self.score_with_timeout(numeric_ansatz, limit)?,
        };

        if score.is_nan() {
            return Err(ObjectiveError::NonFinite);
        }
        Ok(score)
    }

    /// The objective runs on its own thread; on timeout that thread is
    /// abandoned and its eventual result dropped.
    fn score_with_timeout(
        &self,
        numeric_ansatz: &str,
        limit: Duration,
    ) -> Result<f64, ObjectiveError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let input = numeric_ansatz.to_string();

        thread::Builder::new()
            .name("ansatz-objective".into())
            .spawn(move || {
                // The receiver may be gone after a timeout.
                let _ = tx.send(call_isolated(inner.as_ref(), &input));
            })
            .map_err(|e| ObjectiveError::Failed(format!("failed to spawn worker: {}", e)))?;

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(timeout_ms = limit.as_millis() as u64, "Objective timed out");
                Err(ObjectiveError::TimedOut(limit))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ObjectiveError::Panicked),
        }
    }
}

fn call_isolated(objective: &dyn Objective, numeric_ansatz: &str) -> Result<f64, ObjectiveError> {
    panic::catch_unwind(AssertUnwindSafe(|| objective.score(numeric_ansatz)))
        .unwrap_or(Err(ObjectiveError::Panicked))
}
