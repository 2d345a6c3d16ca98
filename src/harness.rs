//! The host test runner seam and an in-memory reference runner.
//!
//! A host runner only knows flat, independently named units. [`Harness`] is
//! that one primitive; [`InMemoryHarness`] stores units and invokes each of
//! them exactly once, in registration order.

use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Outcome};
use crate::path::NodePath;

/// Get the current Unix timestamp in milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ============================================================================
// Unit and Harness Traits
// ============================================================================

/// One independently invokable test unit.
#[async_trait::async_trait]
pub trait Unit: Send + Sync {
    /// Run the unit. An `Err` is reported as the unit's failure.
    async fn invoke(&self) -> Outcome;

    /// Position of the test this unit runs, if it belongs to a suite tree.
    fn path(&self) -> Option<&NodePath> {
        None
    }
}

/// Unit backed by a closure returning a future.
pub struct FnUnit<F>(F);

impl<F> FnUnit<F> {
    /// Wrap a closure as a unit.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait::async_trait]
impl<F, Fut> Unit for FnUnit<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Outcome> + Send,
{
    async fn invoke(&self) -> Outcome {
        (self.0)().await
    }
}

/// A host runner that accepts flat, named units.
///
/// Implementations must be thread-safe (`Send + Sync`) and must invoke each
/// registered unit at most once.
pub trait Harness: Send + Sync {
    /// Register a unit under a display name.
    fn register(&self, name: String, unit: Box<dyn Unit>);

    /// Register a closure as a unit.
    fn register_fn<F, Fut>(&self, name: impl Into<String>, f: F)
    where
        Self: Sized,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        self.register(name.into(), Box::new(FnUnit::new(f)));
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Run-time options of the [`InMemoryHarness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Report a panicking unit as failed instead of unwinding.
    pub catch_panics: bool,
    /// Skip every remaining unit after the first failure.
    pub fail_fast: bool,
}

impl HarnessConfig {
    /// Default configuration: catch panics, run everything.
    pub const fn new() -> Self {
        Self {
            catch_panics: true,
            fail_fast: false,
        }
    }

    /// Set whether panics are caught.
    pub const fn catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }

    /// Set whether the run stops at the first failure.
    pub const fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Final status of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    /// The unit returned `Ok`.
    Passed,
    /// The unit returned an error or panicked.
    Failed(String),
    /// The unit was not invoked.
    Skipped,
}

/// Timing and outcome of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    /// Display name the unit was registered under.
    pub name: String,
    /// Path of the test in its suite tree, for units registered by a suite.
    #[serde(default)]
    pub path: Option<NodePath>,
    /// Final status.
    pub status: UnitStatus,
    /// When the unit started (Unix timestamp ms).
    pub started_at: u64,
    /// When the unit finished (Unix timestamp ms), if it ran.
    pub completed_at: Option<u64>,
}

impl UnitReport {
    /// Get the duration in milliseconds, if the unit ran.
    pub fn duration_ms(&self) -> Option<u64> {
        self.completed_at
            .map(|end| end.saturating_sub(self.started_at))
    }

    /// Returns `true` if the unit passed.
    pub fn is_passed(&self) -> bool {
        self.status == UnitStatus::Passed
    }
}

/// Reports of one [`InMemoryHarness::run_all`] call, in invocation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// One report per unit.
    pub reports: Vec<UnitReport>,
}

impl RunSummary {
    /// Number of passed units.
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.is_passed()).count()
    }

    /// Reports of failed units.
    pub fn failed(&self) -> Vec<&UnitReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, UnitStatus::Failed(_)))
            .collect()
    }

    /// Returns `true` if no unit failed.
    pub fn is_success(&self) -> bool {
        self.failed().is_empty()
    }

    /// Find the report of the first unit registered under `name`.
    pub fn report(&self, name: &str) -> Option<&UnitReport> {
        self.reports.iter().find(|r| r.name == name)
    }
}

// ============================================================================
// In-Memory Harness
// ============================================================================

struct Registered {
    name: String,
    unit: Box<dyn Unit>,
}

/// In-memory host runner for tests and single-process use.
///
/// Uses `parking_lot::Mutex` for thread-safe registration.
#[derive(Default)]
pub struct InMemoryHarness {
    config: HarnessConfig,
    queue: Mutex<VecDeque<Registered>>,
}

impl InMemoryHarness {
    /// Create an empty harness with the default configuration.
    pub fn new() -> Self {
        Self::with_config(HarnessConfig::default())
    }

    /// Create an empty harness with the given configuration.
    pub fn with_config(config: HarnessConfig) -> Self {
        Self {
            config,
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> HarnessConfig {
        self.config
    }

    /// Number of units waiting to run.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Check if no unit is waiting to run.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Names of the units waiting to run, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.queue.lock().iter().map(|r| r.name.clone()).collect()
    }

    /// Invoke every registered unit once, sequentially.
    ///
    /// Units registered while the run is in progress are picked up at the end
    /// of the queue. Each unit is removed from the harness before it runs.
    pub async fn run_all(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut failed = false;

        // The queue lock is never held across an await.
        while let Some(registered) = self.next_unit() {
            if failed && self.config.fail_fast {
                let path = registered.unit.path().cloned();
                summary.reports.push(UnitReport {
                    name: registered.name,
                    path,
                    status: UnitStatus::Skipped,
                    started_at: now_millis(),
                    completed_at: None,
                });
                continue;
            }

            let report = self.run_unit(registered).await;
            failed |= matches!(report.status, UnitStatus::Failed(_));
            summary.reports.push(report);
        }

        summary
    }

    fn next_unit(&self) -> Option<Registered> {
        self.queue.lock().pop_front()
    }

    async fn run_unit(&self, registered: Registered) -> UnitReport {
        let Registered { name, unit } = registered;
        let path = unit.path().cloned();
        let started_at = now_millis();

        #[cfg(feature = "tracing")]
        tracing::info!(unit = %name, "unit.start");

        let outcome = if self.config.catch_panics {
            AssertUnwindSafe(unit.invoke())
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(Error::Panicked(panic_message(payload.as_ref()))))
        } else {
            unit.invoke().await
        };

        let status = match outcome {
            Ok(()) => UnitStatus::Passed,
            Err(e) => UnitStatus::Failed(e.to_string()),
        };

        #[cfg(feature = "tracing")]
        match &status {
            UnitStatus::Failed(reason) => {
                tracing::error!(unit = %name, reason = %reason, outcome = "failed", "unit.end")
            }
            _ => tracing::info!(unit = %name, outcome = "passed", "unit.end"),
        }

        UnitReport {
            name,
            path,
            status,
            started_at,
            completed_at: Some(now_millis()),
        }
    }
}

impl Harness for InMemoryHarness {
    fn register(&self, name: String, unit: Box<dyn Unit>) {
        #[cfg(feature = "tracing")]
        tracing::debug!(unit = %name, "unit.register");

        self.queue.lock().push_back(Registered { name, unit });
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "(non-string panic)".to_string()
    }
}
