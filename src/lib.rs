#![deny(missing_docs)]

//! Grove: nested, replayed test suites for flat test runners.
//!
//! # Design Goals
//!
//! Many test runners only know a flat list of independent, named tests.
//! Grove layers a tree of suites on top of that:
//!
//! - **Record then replay**: the declaration function runs once to discover
//!   every test, then once more from the top for each test, descending only
//!   into the suites that lead to it
//! - **Fresh setup per test**: code in a suite body runs again for every test
//!   below it, so fixtures are never shared between tests
//! - **Deferred fixtures**: [`Suite::later`] skips expensive setup while tests
//!   are being discovered
//! - **Closed scopes stay closed**: a suite handle that outlives its
//!   declaration cannot register more children
//!
//! # Core Concepts
//!
//! - [`suite`]: Declare a top-level suite against a [`Harness`]
//! - [`Suite`]: Handle with `test`, `suite` and `later`
//! - [`NodePath`]: Address of a node, stable across passes
//! - [`InMemoryHarness`]: Reference runner that invokes every unit once
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use grove::{Error, InMemoryHarness};
//!
//! # async fn run() -> Result<(), Error> {
//! let harness = Arc::new(InMemoryHarness::new());
//!
//! grove::suite(&harness, "math", |t| async move {
//!     let two = t.later(|| async { Ok(1 + 1) }).await?;
//!
//!     t.test("adds", move || async move {
//!         if *two.get()? == 2 {
//!             Ok(())
//!         } else {
//!             Err(Error::failed("1 + 1 != 2"))
//!         }
//!     })
//!     .await
//! })
//! .await?;
//!
//! let summary = harness.run_all().await;
//! assert!(summary.is_success());
//! # Ok(())
//! # }
//! ```

// Modules
pub mod error;
pub mod harness;
pub mod later;
pub mod path;
pub mod scope;
pub mod suite;

// Re-exports for convenience
pub use error::{Error, Outcome};
pub use harness::{
    FnUnit, Harness, HarnessConfig, InMemoryHarness, RunSummary, Unit, UnitReport, UnitStatus,
};
pub use later::Later;
pub use path::{join_name, NodePath};
pub use suite::{suite, Suite};

#[cfg(test)]
mod tests;
