//! Scenario tests for suite registration and replay.
//!
//! ## Test Organization
//!
//! - `common`: Shared counters, assertions and harness setup
//! - `basic`: Tree discovery, replay order and pruning
//! - `deferred`: `later` values across registration and replay
//! - `lock`: Use of suite handles after their scope closed
//! - `determinism`: Suites whose shape changes between passes
//! - `failures`: Propagation of test and fixture failures
//!
//! ## Counters
//!
//! Most scenarios share a per-test [`common::Counter`] between the declaration
//! function and the test bodies. Every replay runs the suite bodies on the path
//! to its test again, so the counter values observed by each test show exactly
//! how often the setup code ran.

mod common;

mod basic;
