/*!
 * Contention Tests
 * Same-key callers are serialized with no lost or torn updates
 */

use keyed_guard::{LockManager, TimeoutPolicy};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const THREADS: u64 = 16;
const ROUNDS: u64 = 250;

#[test]
fn test_concurrent_increments_are_not_lost() {
    let manager = LockManager::new();
    // Two halves of a logical value; any torn update shows up as a mismatch
    let low = Arc::new(AtomicU64::new(0));
    let high = Arc::new(AtomicU64::new(0));
    let torn = Arc::new(AtomicBool::new(false));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let manager = manager.clone();
            let low = low.clone();
            let high = high.clone();
            let torn = torn.clone();
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    manager
                        .run_with_lock("counter", TimeoutPolicy::None, || {
                            let l = low.load(Ordering::Relaxed);
                            let h = high.load(Ordering::Relaxed);
                            if l != h {
                                torn.store(true, Ordering::Relaxed);
                            }
                            low.store(l + 1, Ordering::Relaxed);
                            thread::yield_now();
                            high.store(h + 1, Ordering::Relaxed);
                        })
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(low.load(Ordering::SeqCst), THREADS * ROUNDS);
    assert_eq!(high.load(Ordering::SeqCst), THREADS * ROUNDS);
    assert!(!torn.load(Ordering::SeqCst), "observed a torn update");
}

#[test]
fn test_waiters_all_get_the_lock_once() {
    let manager = LockManager::new();
    let ids = Arc::new(Mutex::new(Vec::new()));

    let held = manager.lock("A");

    let handles: Vec<_> = (0..5u32)
        .map(|id| {
            let manager = manager.clone();
            let ids = ids.clone();
            thread::spawn(move || {
                let _guard = manager.lock("A");
                ids.lock().push(id);
            })
        })
        .collect();

    // Nobody gets in while the original holder is active
    thread::sleep(Duration::from_millis(50));
    assert!(ids.lock().is_empty());

    drop(held);
    for handle in handles {
        handle.join().unwrap();
    }

    let ids = ids.lock();
    assert_eq!(ids.len(), 5);
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique, (0..5).collect::<HashSet<u32>>());
}

#[test]
fn test_empty_string_key_is_a_real_lock() {
    let manager = LockManager::new();
    let _guard = manager.lock("");

    let other = manager.clone();
    let (empty_free, named_free) = thread::spawn(move || {
        (
            other.try_acquire("").is_some(),
            other.try_acquire("named").is_some(),
        )
    })
    .join()
    .unwrap();

    assert!(!empty_free);
    assert!(named_free);
}
