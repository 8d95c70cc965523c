//! Worker Lifecycle
//!
//! Background loops stop cooperatively: the owner raises a [`QuitSignal`], the loop notices
//! it at the top of its next iteration (or is woken from its idle sleep), and the owner awaits
//! the task for a bounded time.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::{CacheError, Result};

// == Quit Signal ==
/// Stop flag shared between a worker loop and its owner.
#[derive(Debug, Clone, Default)]
pub struct QuitSignal(Arc<QuitState>);

#[derive(Debug, Default)]
struct QuitState {
    raised: AtomicBool,
    wake: Notify,
}

impl QuitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and wakes every loop parked in [`QuitSignal::sleep`].
    pub fn raise(&self) {
        self.0.raised.store(true, Ordering::SeqCst);
        self.0.wake.notify_waiters();
    }

    pub fn is_raised(&self) -> bool {
        self.0.raised.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration`, returning early once the signal is raised.
    ///
    /// Returns whether the signal is raised.
    pub async fn sleep(&self, duration: Duration) -> bool {
        let woken = self.0.wake.notified();
        tokio::pin!(woken);
        // Register before reading the flag so a concurrent raise is not missed.
        woken.as_mut().enable();
        if self.is_raised() {
            return true;
        }

        tokio::select! {
            _ = &mut woken => true,
            _ = tokio::time::sleep(duration) => self.is_raised(),
        }
    }
}

// == Worker Handle ==
/// Owner's side of a spawned worker loop.
#[derive(Debug)]
pub struct WorkerHandle {
    name: String,
    quit: QuitSignal,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawns `body` on the runtime, handing it the worker's quit signal.
    pub fn spawn<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: FnOnce(QuitSignal) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let quit = QuitSignal::new();
        let task = tokio::spawn(body(quit.clone()));
        info!(worker = %name, "Worker started");
        Self { name, quit, task }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Asks the loop to stop without waiting for it.
    pub fn quit(&self) {
        self.quit.raise();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    // == Shutdown ==
    /// Raises the quit signal and waits up to `grace` for the loop to end.
    ///
    /// A loop still running after `grace` is aborted and reported as
    /// [`CacheError::ShutdownTimeout`].
    pub async fn shutdown(self, grace: Duration) -> Result<()> {
        let WorkerHandle {
            name,
            quit,
            mut task,
        } = self;
        quit.raise();

        match tokio::time::timeout(grace, &mut task).await {
            Ok(Ok(())) => {
                info!(worker = %name, "Worker stopped");
                Ok(())
            }
            Ok(Err(join_error)) => Err(CacheError::Internal(format!(
                "Worker '{name}' failed: {join_error}"
            ))),
            Err(_) => {
                error!(worker = %name, ?grace, "Worker ignored quit signal");
                task.abort();
                Err(CacheError::ShutdownTimeout { name, grace })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn polite_loop(quit: QuitSignal) {
        while !quit.is_raised() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[tokio::test]
    async fn test_shutdown_within_grace() {
        let handle = WorkerHandle::spawn("polite", polite_loop);
        assert_eq!(handle.name(), "polite");
        assert!(!handle.is_finished());

        handle.shutdown(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_quit_without_waiting() {
        let handle = WorkerHandle::spawn("polite", polite_loop);
        handle.quit();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_shutdown_timeout_is_reported() {
        let handle = WorkerHandle::spawn("stubborn", |_quit| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let result = handle.shutdown(Duration::from_millis(100)).await;
        match result {
            Err(CacheError::ShutdownTimeout { name, grace }) => {
                assert_eq!(name, "stubborn");
                assert_eq!(grace, Duration::from_millis(100));
            }
            other => panic!("expected shutdown timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_raise_wakes_sleeper() {
        let signal = QuitSignal::new();
        let sleeper = tokio::spawn({
            let signal = signal.clone();
            async move { signal.sleep(Duration::from_secs(60)).await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        signal.raise();

        let raised = tokio::time::timeout(Duration::from_secs(1), sleeper)
            .await
            .expect("sleeper should wake on raise")
            .unwrap();
        assert!(raised);
    }

    #[tokio::test]
    async fn test_sleep_after_raise_returns_immediately() {
        let signal = QuitSignal::new();
        signal.raise();

        let raised = tokio::time::timeout(
            Duration::from_millis(100),
            signal.sleep(Duration::from_secs(60)),
        )
        .await
        .unwrap();
        assert!(raised);
    }

    #[tokio::test]
    async fn test_sleep_runs_full_duration_when_quiet() {
        let signal = QuitSignal::new();
        assert!(!signal.sleep(Duration::from_millis(20)).await);
    }

    #[test]
    fn test_quit_signal_shared() {
        let signal = QuitSignal::new();
        let observer = signal.clone();
        assert!(!observer.is_raised());
        signal.raise();
        assert!(observer.is_raised());
    }
}
