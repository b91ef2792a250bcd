use crate::config::ProgressConfig;
use tokio::task::JoinHandle;

/// Cosmetic progress animation for a running session.
///
/// Bumps a percentage by `step` every `tick` until `cap`, calling `on_tick`
/// with each new value. It knows nothing about the real request. The task is
/// aborted by `stop()` or when the ticker is dropped.
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    pub fn spawn<F>(config: &ProgressConfig, on_tick: F) -> Self
    where
        F: Fn(u8) + Send + 'static,
    {
        let tick = config.tick();
        let step = config.step;
        let cap = config.cap.min(100);

        let handle = tokio::spawn(async move {
            if step == 0 {
                return;
            }
            let mut interval = tokio::time::interval(tick);
            // First tick completes immediately.
            interval.tick().await;

            let mut pct: u8 = 0;
            while pct < cap {
                interval.tick().await;
                pct = pct.saturating_add(step).min(cap);
                on_tick(pct);
            }
        });

        Self { handle }
    }

    /// Idempotent.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
