/*!
 * keyed-guard demo
 *
 * Exercises key-scoped locking from threads and tasks, then silences a
 * chatty section of stdout.
 */

use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::info;

use keyed_guard::{init_tracing, LockConfig, LockManager, TimeoutPolicy};
#[cfg(unix)]
use keyed_guard::{StreamSuppressor, SuppressFlags};

const WORKERS: u64 = 8;
const ROUNDS: u64 = 1_000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = LockConfig::from_env();
    info!(
        default_timeout_ms = config.default_timeout.map(|d| d.as_millis() as u64),
        "Starting keyed-guard demo"
    );
    let manager = LockManager::with_config(config);

    // Blocking workers hammering one key
    let counter = Arc::new(AtomicU64::new(0));
    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let manager = manager.clone();
            let counter = counter.clone();
            thread::spawn(move || -> keyed_guard::LockResult<()> {
                for _ in 0..ROUNDS {
                    manager.run_with_lock("counter", TimeoutPolicy::Default, || {
                        let current = counter.load(Ordering::Relaxed);
                        counter.store(current + 1, Ordering::Relaxed);
                    })?;
                }
                Ok(())
            })
        })
        .collect();
    for handle in handles {
        handle.join().map_err(|_| "worker thread panicked")??;
    }
    info!(total = counter.load(Ordering::Relaxed), "Blocking workers finished");

    // Async tasks through a decorated callable
    let append = Arc::new(manager.decorate_async(
        "journal",
        TimeoutPolicy::Default,
        |line: String| async move {
            tokio::task::yield_now().await;
            line.len()
        },
    ));
    let mut tasks = Vec::new();
    for i in 0..WORKERS {
        let append = append.clone();
        tasks.push(tokio::spawn(async move { append.call(format!("entry {i}")).await }));
    }
    let mut bytes = 0;
    for task in tasks {
        bytes += task.await??;
    }
    info!(bytes, "Async tasks finished");

    // Quiet section: stdout goes to the null device
    #[cfg(unix)]
    {
        let suppressor = StreamSuppressor::new();
        suppressor.run(SuppressFlags::stdout_only(), || {
            println!("this line is discarded");
        });
        println!("stdout restored");
    }

    let removed = manager.cleanup_unused();
    info!(removed, remaining = manager.len(), "Demo complete");
    Ok(())
}
