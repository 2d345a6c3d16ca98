//! Discovery and replay of nested suites.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{suite, Harness, NodePath, UnitStatus};

use super::common::{check_eq, harness, Counter};

/// Every test replays the root body once, so each sees the next counter value.
///
/// Verifies:
/// - One unit per test, in declaration order
/// - Setup in the root body runs once per pass, including registration
#[tokio::test]
async fn each_test_replays_ancestor_setup_once() {
    let harness = harness();
    let counter = Counter::default();

    let c = counter.clone();
    suite(&harness, "basic tree concept", move |t| {
        let x = c.next();
        async move {
            t.test("upper", move || async move { check_eq(x, 1) }).await?;

            t.suite("inner suite", move |t| async move {
                t.test("one", move || async move { check_eq(x, 2) }).await?;
                t.test("two", move || async move { check_eq(x, 3) }).await?;

                t.suite("more suite", move |t| async move {
                    t.test("last test", move || async move { check_eq(x, 4) })
                        .await
                })
                .await
            })
            .await
        }
    })
    .await
    .expect("registration should succeed");

    // Only the registration pass ran so far
    assert_eq!(counter.get(), 1);
    assert_eq!(
        harness.names(),
        vec![
            "basic tree concept::upper",
            "basic tree concept::inner suite::one",
            "basic tree concept::inner suite::two",
            "basic tree concept::inner suite::more suite::last test",
        ]
    );

    let summary = harness.run_all().await;
    assert!(summary.is_success(), "failures: {:?}", summary.failed());
    assert_eq!(summary.passed(), 4);
    assert_eq!(counter.get(), 5);

    let path_of = |name: &str| summary.report(name).and_then(|r| r.path.clone());
    assert_eq!(
        path_of("basic tree concept::upper"),
        Some(NodePath::from(vec![0, 0]))
    );
    assert_eq!(
        path_of("basic tree concept::inner suite::two"),
        Some(NodePath::from(vec![0, 1, 1]))
    );
    assert_eq!(
        path_of("basic tree concept::inner suite::more suite::last test"),
        Some(NodePath::from(vec![0, 1, 2, 0]))
    );
}

/// Tests nested under `basic::inner` see a strictly increasing shared counter.
#[tokio::test]
async fn nested_tests_see_monotonic_counter() {
    let harness = harness();
    let counter = Counter::default();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let c = counter.clone();
    let s = seen.clone();
    suite(&harness, "basic", move |t| {
        let c = c.clone();
        let s = s.clone();
        async move {
            t.suite("inner", move |t| async move {
                let x = c.next();
                for name in ["one", "two"] {
                    let s = s.clone();
                    t.test(name, move || async move {
                        let mut seen = s.lock();
                        let previous = seen.last().copied().unwrap_or(0);
                        seen.push(x);
                        check_eq(x, previous + 1)
                    })
                    .await?;
                }
                Ok(())
            })
            .await
        }
    })
    .await
    .expect("registration should succeed");

    let summary = harness.run_all().await;
    assert!(summary.is_success(), "failures: {:?}", summary.failed());
    assert_eq!(*seen.lock(), vec![1, 2]);
}

/// A replay only enters the suites on the path to its own test.
///
/// Verifies:
/// - Sibling subtrees are pruned
/// - Test bodies never run during registration
/// - Each test body runs exactly once over the whole run
#[tokio::test]
async fn replay_prunes_sibling_subtrees() {
    let harness = harness();
    let entered = Arc::new(Mutex::new(Vec::new()));
    let ran = Arc::new(Mutex::new(Vec::new()));

    let (e, r) = (entered.clone(), ran.clone());
    suite(&harness, "root", move |t| {
        let (e, r) = (e.clone(), r.clone());
        async move {
            e.lock().push("root");

            let (ea, ra) = (e.clone(), r.clone());
            t.suite("a", move |t| async move {
                ea.lock().push("a");
                let r1 = ra.clone();
                t.test("a1", move || async move {
                    r1.lock().push("a1");
                    Ok(())
                })
                .await?;
                t.test("a2", move || async move {
                    ra.lock().push("a2");
                    Ok(())
                })
                .await
            })
            .await?;

            t.suite("b", move |t| async move {
                e.lock().push("b");
                t.test("b1", move || async move {
                    r.lock().push("b1");
                    Ok(())
                })
                .await
            })
            .await
        }
    })
    .await
    .expect("registration should succeed");

    assert!(ran.lock().is_empty());
    assert_eq!(*entered.lock(), vec!["root", "a", "b"]);
    entered.lock().clear();

    let summary = harness.run_all().await;
    assert!(summary.is_success(), "failures: {:?}", summary.failed());
    assert_eq!(*ran.lock(), vec!["a1", "a2", "b1"]);
    assert_eq!(
        *entered.lock(),
        vec!["root", "a", "root", "a", "root", "b"]
    );
}

/// Several top-level suites share one harness and keep their order.
#[tokio::test]
async fn top_level_suites_register_in_order() {
    let harness = harness();

    for name in ["first", "second"] {
        suite(&harness, name, |t| async move {
            t.test("only", || async { Ok(()) }).await
        })
        .await
        .expect("registration should succeed");
    }

    let finally = Counter::default();
    let f = finally.clone();
    harness.register_fn("finally", move || {
        let f = f.clone();
        async move {
            f.next();
            Ok(())
        }
    });

    assert_eq!(harness.names(), vec!["first::only", "second::only", "finally"]);

    let summary = harness.run_all().await;
    let names: Vec<_> = summary.reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["first::only", "second::only", "finally"]);
    assert!(summary
        .reports
        .iter()
        .all(|r| r.status == UnitStatus::Passed));
    assert_eq!(finally.get(), 1);
    assert_eq!(summary.report("finally").and_then(|r| r.path.clone()), None);
}

/// A suite without tests registers nothing.
#[tokio::test]
async fn empty_suite_registers_nothing() {
    let harness = harness();

    suite(&harness, "empty", |t| async move {
        t.suite("still empty", |_| async { Ok(()) }).await
    })
    .await
    .expect("registration should succeed");

    assert!(harness.is_empty());
    assert!(harness.run_all().await.reports.is_empty());
}
