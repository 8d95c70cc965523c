//! Expiry Sweep Task
//!
//! Background task that periodically removes expired keys from the in-memory store.
//! Reads already ignore expired keys; the sweep reclaims keys nobody reads again.

use std::time::Duration;

use tracing::{debug, info};

use crate::store::MemoryStore;
use crate::tasks::WorkerHandle;

/// Spawns a background task that purges expired keys every `cleanup_interval_secs`.
///
/// Raising the quit signal cuts the current sleep short.
///
/// # Example
/// ```ignore
/// let store = MemoryStore::new();
/// let sweeper = spawn_expiry_task(store.clone(), 1);
/// // Later, during shutdown:
/// sweeper.shutdown(Duration::from_secs(2)).await?;
/// ```
pub fn spawn_expiry_task(store: MemoryStore, cleanup_interval_secs: u64) -> WorkerHandle {
    let interval = Duration::from_secs(cleanup_interval_secs);

    WorkerHandle::spawn("expiry-sweep", move |quit| async move {
        info!(
            "Starting expiry sweep with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            if quit.sleep(interval).await {
                break;
            }

            let removed = store.purge_expired().await;
            if removed > 0 {
                info!("Expiry sweep: removed {} expired keys", removed);
            } else {
                debug!("Expiry sweep: no expired keys found");
            }
        }
    })
}
