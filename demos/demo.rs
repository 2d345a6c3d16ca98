//! Nested suite demo: discovery, per-test replay and a deferred fixture.
//!
//! Run with: cargo run --example demo

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use grove::{Error, InMemoryHarness, Outcome, RunSummary, UnitStatus};
use parking_lot::Mutex;

static CONNECTIONS: AtomicU32 = AtomicU32::new(0);

// ============================================================================
// Fixture
// ============================================================================

/// A fake key-value store that takes a while to connect.
#[derive(Debug, Clone)]
struct Store {
    id: u32,
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl Store {
    async fn connect() -> Result<Self, Error> {
        let id = CONNECTIONS.fetch_add(1, Ordering::SeqCst) + 1;
        println!("  [Store] Opening connection #{}", id);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(Self {
            id,
            data: Arc::default(),
        })
    }

    fn put(&self, key: &str, value: &str) {
        self.data.lock().insert(key.into(), value.into());
    }

    fn get(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }
}

fn ensure(cond: bool, msg: &str) -> Outcome {
    if cond {
        Ok(())
    } else {
        Err(Error::failed(msg))
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Error> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║           Grove Nested Suite Demo                            ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let harness = Arc::new(InMemoryHarness::new());

    println!("┌──────────────────────────────────────────────────────────────┐");
    println!("│ Step 1: Discover tests (fixture is not connected)            │");
    println!("└──────────────────────────────────────────────────────────────┘\n");

    grove::suite(&harness, "store", |t| async move {
        let store = t.later(Store::connect).await?;

        t.test("starts empty", {
            let store = store.clone();
            move || async move { ensure(store.get()?.get("a").is_none(), "store is not empty") }
        })
        .await?;

        t.suite("after a write", move |t| async move {
            if let Ok(store) = store.get() {
                store.put("a", "1");
            }

            t.test("reads it back", {
                let store = store.clone();
                move || async move {
                    ensure(store.get()?.get("a").as_deref() == Some("1"), "value lost")
                }
            })
            .await?;

            t.test("uses its own connection", move || async move {
                let store = store.into_inner()?;
                println!("  [Test] Running on connection #{}", store.id);
                ensure(store.id > 1, "connection was shared")
            })
            .await
        })
        .await
    })
    .await?;

    for name in harness.names() {
        println!("  registered: {}", name);
    }
    println!(
        "  connections opened so far: {}\n",
        CONNECTIONS.load(Ordering::SeqCst)
    );

    println!("┌──────────────────────────────────────────────────────────────┐");
    println!("│ Step 2: Replay each test from the top                        │");
    println!("└──────────────────────────────────────────────────────────────┘\n");

    let summary = harness.run_all().await;
    print_summary(&summary);

    println!("\n✓ Demo completed!");
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    for report in &summary.reports {
        match &report.status {
            UnitStatus::Passed => println!(
                "  ✓ {} ({} ms)",
                report.name,
                report.duration_ms().unwrap_or_default()
            ),
            UnitStatus::Failed(reason) => println!("  ✗ {}: {}", report.name, reason),
            UnitStatus::Skipped => println!("  - {} (skipped)", report.name),
        }
    }
    println!(
        "\n  {} passed, {} failed",
        summary.passed(),
        summary.failed().len()
    );
}
