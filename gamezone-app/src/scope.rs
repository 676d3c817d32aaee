//! Lifetime guard for mounted views.
//!
//! A view owns a [`ViewScope`]; its async work holds a [`ScopeHandle`].
//! Once the scope is dropped (the view unmounted), results routed through
//! the handle are discarded instead of applied.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct ViewScope {
    alive: Arc<AtomicBool>,
    name: &'static str,
}

#[derive(Debug, Clone)]
pub struct ScopeHandle {
    alive: Arc<AtomicBool>,
    name: &'static str,
}

impl ViewScope {
    pub fn new(name: &'static str) -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
            name,
        }
    }

    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            alive: self.alive.clone(),
            name: self.name,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

impl ScopeHandle {
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Await `work`; `None` if the scope was dropped before it finished.
    pub async fn run<F: Future>(&self, work: F) -> Option<F::Output> {
        let output = work.await;
        if self.is_alive() {
            Some(output)
        } else {
            debug!(view = self.name, "discarding result for unmounted view");
            None
        }
    }

    /// Apply `update` only while the scope is alive.
    pub fn apply<T>(&self, update: impl FnOnce() -> T) -> Option<T> {
        self.is_alive().then(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_result_kept_while_mounted() {
        let scope = ViewScope::new("games");
        let handle = scope.handle();
        assert_eq!(handle.run(async { 7 }).await, Some(7));
        assert_eq!(handle.apply(|| "x"), Some("x"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_discarded_after_teardown() {
        let scope = ViewScope::new("dashboard");
        let handle = scope.handle();
        let task = tokio::spawn(async move {
            handle
                .run(async {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    "loaded"
                })
                .await
        });

        drop(scope);
        assert_eq!(task.await.unwrap(), None);
    }
}
