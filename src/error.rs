//! Error type shared by registration, replay and the harness.

/// Result of a test body, a suite body or a whole replay pass.
pub type Outcome = Result<(), Error>;

/// Errors raised while declaring or replaying a suite tree.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A suite handle was used after its scope closed, or while one of its
    /// sub-suites was still being declared.
    #[error("suite `{suite}` is locked, cannot declare `{child}`")]
    Locked {
        /// Display name of the locked suite.
        suite: String,
        /// Name of the child that was being declared.
        child: String,
    },

    /// The node found at the target path during replay is not the one
    /// recorded at registration.
    #[error("non-deterministic suite, should run `{expected}` but is running `{actual}`")]
    Nondeterministic {
        /// Display name recorded at registration.
        expected: String,
        /// Display name recomputed during replay.
        actual: String,
    },

    /// A replay pass finished without reaching its target.
    #[error("non-deterministic suite, `{0}` was never reached during replay")]
    Unreached(String),

    /// A deferred value was read before it was resolved.
    #[error("deferred value is only available while a test is running")]
    Unresolved,

    /// A test body reported a failure.
    #[error("{0}")]
    Failed(String),

    /// A unit panicked and the harness caught it.
    #[error("panicked: {0}")]
    Panicked(String),
}

impl Error {
    /// Build a test failure from any displayable message.
    pub fn failed(msg: impl std::fmt::Display) -> Self {
        Self::Failed(msg.to_string())
    }

    /// Returns `true` for a lock violation.
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    /// Returns `true` when the suite shape changed between passes.
    pub fn is_nondeterministic(&self) -> bool {
        matches!(self, Self::Nondeterministic { .. } | Self::Unreached(_))
    }
}
