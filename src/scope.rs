//! Per-suite bookkeeping: the child counter and the scope lock.
//!
//! A [`Scope`] is owned by exactly one suite handle (and its clones) for one
//! pass. Registration locks a scope while one of its sub-suites is being
//! declared and forever once its own declaration returns, so a handle that
//! escapes its closure cannot add children the replay would never see.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Error;
use crate::path::{join_name, NodePath};

/// Child counter and lock state of one scope.
///
/// `busy` is set while a sub-suite is being declared and cleared when it
/// settles. `closed` is set once the scope's own declaration settled and is
/// never cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    next: usize,
    busy: bool,
    closed: bool,
}

impl Cursor {
    /// Allocate the path of the next child under `parent`.
    pub fn claim(&mut self, parent: &NodePath) -> NodePath {
        let path = parent.child(self.next);
        self.next += 1;
        path
    }

    /// Number of children allocated so far.
    pub fn allocated(&self) -> usize {
        self.next
    }

    /// Returns `true` if the scope rejects new children.
    pub fn is_locked(&self) -> bool {
        self.busy || self.closed
    }

    /// Returns `true` while a sub-suite is being declared.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Returns `true` once the scope's declaration has settled.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// A named node scope with its cursor.
#[derive(Debug)]
pub struct Scope {
    name: String,
    path: NodePath,
    cursor: Mutex<Cursor>,
}

impl Scope {
    /// Create an unlocked scope with no children.
    pub fn new(name: String, path: NodePath) -> Self {
        Self {
            name,
            path,
            cursor: Mutex::new(Cursor::default()),
        }
    }

    /// Display name of this scope.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of this scope.
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Snapshot of the cursor.
    pub fn cursor(&self) -> Cursor {
        *self.cursor.lock()
    }

    /// Fail with [`Error::Locked`] if `guarded` and the scope is locked.
    pub fn check(&self, child: &str, guarded: bool) -> Result<(), Error> {
        if guarded && self.cursor.lock().is_locked() {
            #[cfg(feature = "tracing")]
            tracing::warn!(suite = %self.name, child = %child, "scope.locked");

            return Err(Error::Locked {
                suite: self.name.clone(),
                child: child.to_string(),
            });
        }
        Ok(())
    }

    /// Allocate the next child, returning its path and display name.
    ///
    /// When `guarded`, a locked scope rejects the call without consuming an
    /// index.
    pub fn claim(&self, child: &str, guarded: bool) -> Result<(NodePath, String), Error> {
        self.check(child, guarded)?;
        let path = self.cursor.lock().claim(&self.path);
        Ok((path, join_name(&self.name, child)))
    }

    fn set_busy(&self, busy: bool) {
        self.cursor.lock().busy = busy;
    }

    fn close(&self) {
        self.cursor.lock().closed = true;
    }
}

/// Locks `outer` for as long as `inner` is being declared.
///
/// Dropping the guard clears the busy flag of `outer` and closes `inner` for
/// good. A closed `outer` stays closed. Drop runs on
/// every exit path of the sub-suite body: return, error, unwind, or the
/// declaring future being dropped.
#[must_use = "the outer scope is unlocked when the guard is dropped"]
pub struct ScopeGuard {
    outer: Arc<Scope>,
    inner: Arc<Scope>,
}

impl ScopeGuard {
    /// Lock `outer` until the guard is dropped.
    pub fn enter(outer: Arc<Scope>, inner: Arc<Scope>) -> Self {
        outer.set_busy(true);
        Self { outer, inner }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.inner.close();
        self.outer.set_busy(false);
    }
}
