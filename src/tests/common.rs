//! Shared helpers for scenario tests.

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{Error, InMemoryHarness, Outcome};

/// A shared, monotonically increasing counter.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    /// Return the current value and increment it.
    pub fn next(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    /// Current value.
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Wait 100ms, then return the counter's value and increment it.
pub async fn delayed(counter: &Counter) -> usize {
    tokio::time::sleep(Duration::from_millis(100)).await;
    counter.next()
}

/// Fail the current test unless `actual == expected`.
pub fn check_eq<T: PartialEq + Debug>(actual: T, expected: T) -> Outcome {
    if actual == expected {
        Ok(())
    } else {
        Err(Error::failed(format!(
            "expected {:?}, got {:?}",
            expected, actual
        )))
    }
}

/// A fresh harness with the default configuration.
pub fn harness() -> Arc<InMemoryHarness> {
    Arc::new(InMemoryHarness::new())
}
