/*!
 * Reentrancy Tests
 */

use keyed_guard::{Guard, LockManager, TimeoutPolicy};
use std::thread;

#[test]
fn test_nested_acquire_three_levels() {
    let manager = LockManager::new();

    let first = manager.acquire("nest", TimeoutPolicy::after_millis(100)).unwrap();
    let second = manager.acquire("nest", TimeoutPolicy::after_millis(100)).unwrap();
    let third = manager.acquire("nest", TimeoutPolicy::after_millis(100)).unwrap();

    assert!(first.is_active() && second.is_active() && third.is_active());

    drop(third);
    drop(second);
    assert!(manager.get_lock("nest").is_locked());
    drop(first);
    assert!(!manager.get_lock("nest").is_locked());
}

#[test]
fn test_nested_run_with_lock() {
    let manager = LockManager::new();

    let depth = manager
        .run_with_lock("nest", TimeoutPolicy::None, || {
            manager
                .run_with_lock("nest", TimeoutPolicy::None, || {
                    manager
                        .run_with_lock("nest", TimeoutPolicy::None, || 3)
                        .unwrap()
                })
                .unwrap()
        })
        .unwrap();

    assert_eq!(depth, 3);
}

#[test]
fn test_reentrant_hold_still_excludes_other_threads() {
    let manager = LockManager::new();
    let outer = manager.lock("nest");
    let inner = manager.lock("nest");
    drop(inner);

    // Still held once
    let other = manager.clone();
    let acquired = thread::spawn(move || other.try_acquire("nest").is_some())
        .join()
        .unwrap();
    assert!(!acquired);

    drop(outer);
    let other = manager.clone();
    let acquired = thread::spawn(move || other.try_acquire("nest").is_some())
        .join()
        .unwrap();
    assert!(acquired);
}

#[test]
fn test_panic_inside_region_releases_lock() {
    let manager = LockManager::new();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        manager.run_with_lock("fragile", TimeoutPolicy::None, || panic!("boom"))
    }));
    assert!(result.is_err());

    let other = manager.clone();
    let acquired = thread::spawn(move || other.try_acquire("fragile").is_some())
        .join()
        .unwrap();
    assert!(acquired);
}
