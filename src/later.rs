//! Deferred values for per-test fixtures.

use crate::error::Error;

/// A value computed by [`Suite::later`](crate::Suite::later).
///
/// During registration the computation is skipped and the slot stays
/// [`Later::Pending`]. Every replay runs it afresh and yields
/// [`Later::Ready`], so each test sees a value computed for its own pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Later<T> {
    /// Placeholder handed out while tests are being discovered.
    #[default]
    Pending,
    /// Result of the deferred computation for the current replay.
    Ready(T),
}

impl<T> Later<T> {
    /// Returns `true` once the value has been computed.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Borrow the value, or fail with [`Error::Unresolved`].
    pub fn get(&self) -> Result<&T, Error> {
        match self {
            Self::Ready(value) => Ok(value),
            Self::Pending => Err(Error::Unresolved),
        }
    }

    /// Take the value, or fail with [`Error::Unresolved`].
    pub fn into_inner(self) -> Result<T, Error> {
        match self {
            Self::Ready(value) => Ok(value),
            Self::Pending => Err(Error::Unresolved),
        }
    }

    /// Convert `&Later<T>` into `Later<&T>`.
    pub fn as_ref(&self) -> Later<&T> {
        match self {
            Self::Ready(value) => Later::Ready(value),
            Self::Pending => Later::Pending,
        }
    }

    /// Map a ready value, leaving a pending one pending.
    pub fn map<U, F>(self, f: F) -> Later<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Ready(value) => Later::Ready(f(value)),
            Self::Pending => Later::Pending,
        }
    }
}

impl<T> From<Later<T>> for Option<T> {
    fn from(later: Later<T>) -> Self {
        match later {
            Later::Ready(value) => Some(value),
            Later::Pending => None,
        }
    }
}
