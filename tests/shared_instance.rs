// Tests for the process-wide Preferences handle.
use droidutils::{Preferences, TestContext};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_first_access_yields_one_instance() {
    let thread_count = 16;
    let barrier = Arc::new(Barrier::new(thread_count));

    let mut handles = vec![];
    for _ in 0..thread_count {
        let b = barrier.clone();
        handles.push(thread::spawn(move || {
            let ctx = TestContext::new();
            b.wait();
            Preferences::get_instance(&ctx) as *const Preferences as usize
        }));
    }

    let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(
        addrs.iter().all(|a| *a == addrs[0]),
        "get_instance returned different instances: {:?}",
        addrs
    );
}

#[test]
fn test_repeated_access_returns_same_instance() {
    let ctx_a = TestContext::new();
    let ctx_b = TestContext::new();
    let first = Preferences::get_instance(&ctx_a);
    for _ in 0..10 {
        assert!(std::ptr::eq(first, Preferences::get_instance(&ctx_b)));
    }
}

#[test]
fn test_shared_instance_resolves_per_call_context() {
    let prefs = Preferences::get_instance(&TestContext::new());
    let ctx_a = TestContext::new();
    let ctx_b = TestContext::new();

    prefs.set_string("who", "a", &ctx_a).unwrap();
    prefs.set_string("who", "b", &ctx_b).unwrap();

    assert_eq!(prefs.get_string("who", "", &ctx_a), "a");
    assert_eq!(prefs.get_string("who", "", &ctx_b), "b");
}
