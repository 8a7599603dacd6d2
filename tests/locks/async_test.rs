/*!
 * Async Lock Tests
 */

use futures::future::join_all;
use keyed_guard::{LockManager, TimeoutPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_pending, assert_ready, task};

#[tokio::test]
async fn test_async_lock_created_on_first_use() {
    let manager = LockManager::new();
    let _blocking = manager.lock("lazy");
    assert!(!manager.get_lock("lazy").has_async_lock());

    let guard = manager
        .acquire_async("lazy", TimeoutPolicy::None)
        .await
        .unwrap();
    assert_eq!(guard.key(), "lazy");
    assert!(manager.get_lock("lazy").has_async_lock());
}

#[test]
fn test_waiting_task_is_pending_until_release() {
    let manager = LockManager::new();
    let held = tokio_test::block_on(manager.acquire_async("q", TimeoutPolicy::None)).unwrap();

    let mut waiter = task::spawn(manager.acquire_async("q", TimeoutPolicy::None));
    assert_pending!(waiter.poll());

    drop(held);
    assert!(waiter.is_woken());
    let guard = assert_ready!(waiter.poll()).unwrap();
    assert_eq!(guard.key(), "q");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_tasks_are_serialized_per_key() {
    let manager = LockManager::new();
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));

    let tasks = (0..20).map(|_| {
        let manager = manager.clone();
        let inside = inside.clone();
        let max_inside = max_inside.clone();
        tokio::spawn(async move {
            manager
                .run_with_lock_async("shared", TimeoutPolicy::after_secs(5), move || async move {
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
                .await
        })
    });

    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }
    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_async_distinct_keys_do_not_block() {
    let manager = LockManager::new();
    let _a = manager
        .acquire_async("a", TimeoutPolicy::None)
        .await
        .unwrap();

    let b = manager
        .acquire_async("b", TimeoutPolicy::after_millis(50))
        .await;
    assert!(b.is_ok());
}

#[tokio::test]
async fn test_async_timeout_then_success() {
    let manager = LockManager::new();
    let held = manager
        .acquire_async("t", TimeoutPolicy::None)
        .await
        .unwrap();

    let err = manager
        .acquire_async("t", TimeoutPolicy::after_millis(20))
        .await
        .unwrap_err();
    assert_eq!(err.key(), "t");
    assert!(err.to_string().contains("20ms"));

    drop(held);
    assert!(manager
        .acquire_async("t", TimeoutPolicy::after_millis(20))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_decorated_async_forwards_arguments() {
    let manager = LockManager::new();
    let wrapped = manager.decorate_async(
        "fetch",
        TimeoutPolicy::None,
        |(key, timeout): (String, u32)| async move { format!("{key}/{timeout}") },
    );

    let out = wrapped.call(("inner".to_string(), 9)).await.unwrap();
    assert_eq!(out, "inner/9");
    assert_eq!(wrapped.key(), "fetch");
}

#[tokio::test]
async fn test_error_inside_async_region_propagates_after_release() {
    let manager = LockManager::new();

    let result: Result<(), String> = manager
        .run_with_lock_async("fail", TimeoutPolicy::None, || async {
            Err("inner failure".to_string())
        })
        .await
        .unwrap();

    assert_eq!(result, Err("inner failure".to_string()));
    assert!(!manager.get_lock("fail").is_async_locked());
}
