// Tests for concurrent commits against one namespace.
use droidutils::{Namespace, Preferences, TestContext};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_commits_lose_no_keys() {
    let ctx = Arc::new(TestContext::new());
    let thread_count = 10;
    let barrier = Arc::new(Barrier::new(thread_count));

    let mut handles = vec![];
    for i in 0..thread_count {
        let b = barrier.clone();
        let ctx = ctx.clone();
        handles.push(thread::spawn(move || {
            // Each thread resolves its own handle, like separate call sites
            let prefs = Preferences::default();
            b.wait();
            let res = prefs.set_int(&format!("key-{}", i), i as i32, ctx.as_ref());
            assert!(res.is_ok(), "commit failed in thread {}", i);
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    let ns = Namespace::open(ctx.as_ref(), "main").unwrap();
    assert_eq!(ns.len(), thread_count);
    for i in 0..thread_count {
        assert_eq!(ns.get_int(&format!("key-{}", i), -1), i as i32);
    }
}

#[test]
fn test_concurrent_overwrites_settle_on_one_value() {
    let ctx = Arc::new(TestContext::new());
    let thread_count = 8;
    let barrier = Arc::new(Barrier::new(thread_count));

    let handles: Vec<_> = (0..thread_count)
        .map(|i| {
            let b = barrier.clone();
            let ctx = ctx.clone();
            thread::spawn(move || {
                b.wait();
                Preferences::default()
                    .set_long("winner", i as i64, ctx.as_ref())
                    .unwrap();
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let winner = Preferences::default().get_long("winner", -1, ctx.as_ref());
    assert!((0..thread_count as i64).contains(&winner));
}
