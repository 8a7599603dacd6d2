/*!
 * Cleanup Tests
 * Unused entries are swept, entries in use survive
 */

use keyed_guard::{LockManager, TimeoutPolicy};
use pretty_assertions::assert_eq;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[test]
fn test_list_keys_is_a_snapshot() {
    let manager = LockManager::new();
    manager.lock("a");
    manager.lock("b");

    let mut snapshot = manager.list_keys();
    manager.lock("c");
    snapshot.sort();

    assert_eq!(snapshot, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(manager.len(), 3);
}

#[test]
fn test_cleanup_removes_only_unused() {
    let manager = LockManager::new();
    for i in 0..100 {
        manager.run_with_lock(&format!("job-{i}"), TimeoutPolicy::None, || ()).unwrap();
    }
    let keep = manager.lock("job-7");

    assert_eq!(manager.cleanup_unused(), 99);
    assert_eq!(manager.list_keys(), vec!["job-7".to_string()]);

    drop(keep);
    assert_eq!(manager.cleanup_unused(), 1);
    assert!(manager.is_empty());
}

#[test]
fn test_cleanup_keeps_entry_with_pending_waiter() {
    let manager = LockManager::new();
    let held = manager.lock("contested");
    let (started_tx, started_rx) = mpsc::channel();

    let waiter = {
        let manager = manager.clone();
        thread::spawn(move || {
            started_tx.send(()).unwrap();
            let guard = manager.lock("contested");
            std::sync::Arc::as_ptr(guard.entry()) as usize
        })
    };
    started_rx.recv().unwrap();
    thread::sleep(Duration::from_millis(20));

    let before = std::sync::Arc::as_ptr(&manager.get_lock("contested")) as usize;
    assert_eq!(manager.cleanup_unused(), 0);
    drop(held);

    // The waiter got the very entry that existed before the sweep
    assert_eq!(waiter.join().unwrap(), before);
}

#[test]
fn test_new_manager_starts_empty() {
    let first = LockManager::new();
    first.lock("x");
    let second = LockManager::new();

    assert!(second.is_empty());
    assert!(!second.contains_key("x"));
}
