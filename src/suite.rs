//! Suite handles: discovering a declaration tree and replaying it per test.
//!
//! A declaration function is run once to register one unit per test with a
//! [`Harness`]. Each unit, when invoked, runs the same function again from
//! the root, descending only into the suites on the path to its own test and
//! skipping the body of every other test.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;

use crate::error::{Error, Outcome};
use crate::harness::{Harness, Unit};
use crate::later::Later;
use crate::path::NodePath;
use crate::scope::{Scope, ScopeGuard};

type Body = dyn Fn(Suite) -> BoxFuture<'static, Outcome> + Send + Sync;

/// A named top-level declaration function.
struct Tree {
    name: String,
    body: Box<Body>,
}

impl Tree {
    /// Run the declaration function from the implicit root.
    async fn walk(&self, pass: Pass) -> Outcome {
        let root = Suite::new(Arc::new(Scope::new(String::new(), NodePath::root())), pass);
        root.suite(&self.name, |s| (self.body)(s)).await
    }
}

/// The test a replay pass is looking for.
///
/// `outcome` stays `None` until the target's body has run.
struct Target {
    path: NodePath,
    name: String,
    outcome: Mutex<Option<Outcome>>,
}

#[derive(Clone)]
enum Pass {
    Register {
        harness: Arc<dyn Harness>,
        tree: Arc<Tree>,
    },
    Replay(Arc<Target>),
}

// ============================================================================
// Suite Handle
// ============================================================================

/// Handle to the suite currently being declared.
///
/// The same operations are available whether tests are being discovered or
/// replayed, and a declaration function cannot tell the two apart. Clones
/// share the same scope.
#[derive(Clone)]
pub struct Suite {
    scope: Arc<Scope>,
    pass: Pass,
}

impl Suite {
    fn new(scope: Arc<Scope>, pass: Pass) -> Self {
        Self { scope, pass }
    }

    /// Display name of this suite, e.g. `basic::inner`.
    pub fn name(&self) -> &str {
        self.scope.name()
    }

    /// Path of this suite in the declaration tree.
    pub fn path(&self) -> &NodePath {
        self.scope.path()
    }

    /// Only registration handles are protected by the scope lock.
    fn guarded(&self) -> bool {
        matches!(self.pass, Pass::Register { .. })
    }

    /// Declare a test.
    ///
    /// During discovery this registers one unit with the harness and never
    /// calls `body`. During a replay `body` runs only if this is the test the
    /// replay was started for.
    ///
    /// # Errors
    ///
    /// - [`Error::Locked`] if this handle's scope is closed.
    /// - [`Error::Nondeterministic`] if the replay finds a different test at
    ///   the target path.
    /// - Whatever `body` returns.
    pub async fn test<F, Fut>(&self, name: &str, body: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        let (path, full_name) = self.scope.claim(name, self.guarded())?;

        match &self.pass {
            Pass::Register { harness, tree } => {
                #[cfg(feature = "tracing")]
                tracing::debug!(path = %path, name = %full_name, "test.register");

                let unit = ReplayUnit {
                    tree: tree.clone(),
                    path,
                    name: full_name.clone(),
                };
                harness.register(full_name, Box::new(unit));
                Ok(())
            }
            Pass::Replay(target) => {
                if path != target.path {
                    return Ok(());
                }
                if full_name != target.name {
                    let err = Error::Nondeterministic {
                        expected: target.name.clone(),
                        actual: full_name,
                    };
                    *target.outcome.lock() = Some(Err(err.clone()));
                    return Err(err);
                }

                #[cfg(feature = "tracing")]
                tracing::debug!(path = %path, name = %full_name, "test.run");

                let outcome = body().await;
                *target.outcome.lock() = Some(outcome.clone());
                outcome
            }
        }
    }

    /// Declare a nested suite.
    ///
    /// During discovery `body` always runs, and this handle is locked until
    /// it settles. During a replay `body` runs only if the target test lies
    /// inside the nested suite.
    ///
    /// # Errors
    ///
    /// [`Error::Locked`] if this handle's scope is closed, otherwise whatever
    /// `body` returns.
    pub async fn suite<F, Fut>(&self, name: &str, body: F) -> Outcome
    where
        F: FnOnce(Suite) -> Fut,
        Fut: Future<Output = Outcome>,
    {
        let (path, full_name) = self.scope.claim(name, self.guarded())?;
        let inner = Arc::new(Scope::new(full_name, path));

        match &self.pass {
            Pass::Register { .. } => {
                #[cfg(feature = "tracing")]
                tracing::debug!(path = %inner.path(), name = %inner.name(), "suite.register");

                let _guard = ScopeGuard::enter(self.scope.clone(), inner.clone());
                body(Suite::new(inner, self.pass.clone())).await
            }
            Pass::Replay(target) => {
                if !inner.path().is_ancestor_of(&target.path) {
                    return Ok(());
                }

                #[cfg(feature = "tracing")]
                tracing::trace!(path = %inner.path(), name = %inner.name(), "replay.enter");

                body(Suite::new(inner, self.pass.clone())).await
            }
        }
    }

    /// Compute a value only when a test is actually about to run.
    ///
    /// During discovery `f` is never called and [`Later::Pending`] is
    /// returned. Every replay calls `f` once and returns its fresh result,
    /// which is never shared with other replays.
    ///
    /// # Errors
    ///
    /// [`Error::Locked`] if this handle's scope is closed, otherwise whatever
    /// `f` returns.
    pub async fn later<T, F, Fut>(&self, f: F) -> Result<Later<T>, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        match &self.pass {
            Pass::Register { .. } => {
                self.scope.check("later", true)?;
                Ok(Later::Pending)
            }
            Pass::Replay(_) => Ok(Later::Ready(f().await?)),
        }
    }
}

impl fmt::Debug for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.scope.name())
            .field("path", self.scope.path())
            .field("cursor", &self.scope.cursor())
            .finish()
    }
}

// ============================================================================
// Replay Unit
// ============================================================================

/// The unit registered for one test: replays the tree down to that test.
pub(crate) struct ReplayUnit {
    tree: Arc<Tree>,
    path: NodePath,
    name: String,
}

#[async_trait::async_trait]
impl Unit for ReplayUnit {
    fn path(&self) -> Option<&NodePath> {
        Some(&self.path)
    }

    /// Fails with the test's own outcome even if the declaration function
    /// discarded it.
    async fn invoke(&self) -> Outcome {
        let target = Arc::new(Target {
            path: self.path.clone(),
            name: self.name.clone(),
            outcome: Mutex::new(None),
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(path = %self.path, name = %self.name, "replay.start");

        self.tree.walk(Pass::Replay(target.clone())).await?;

        let outcome = target.outcome.lock().take();
        outcome.unwrap_or_else(|| Err(Error::Unreached(self.name.clone())))
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// Declare a top-level suite and register one unit per test it contains.
///
/// `body` is run once now to discover the tests, then once more from the top
/// each time the harness invokes one of the registered units.
///
/// # Errors
///
/// Any error raised while discovering the tests, such as [`Error::Locked`].
/// Units registered before the error stay registered.
pub async fn suite<H, F, Fut>(harness: &Arc<H>, name: &str, body: F) -> Outcome
where
    H: Harness + 'static,
    F: Fn(Suite) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    let tree = Arc::new(Tree {
        name: name.to_string(),
        body: Box::new(move |s| body(s).boxed()),
    });
    let harness: Arc<dyn Harness> = harness.clone();

    tree.walk(Pass::Register {
        harness,
        tree: tree.clone(),
    })
    .await
}
