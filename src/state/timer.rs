use std::{future::Future, ops::ControlFlow, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};

/// Cancellable periodic task driving the round countdown.
///
/// At most one task is active: starting a new one aborts the previous, and
/// dropping the timer aborts whatever is running.
#[derive(Debug, Default)]
pub struct CountdownTimer {
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    /// Timer with no task running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `on_tick` every `period` until it breaks or the timer is cancelled.
    ///
    /// The first call happens one full period after starting. Must be called
    /// from within a tokio runtime.
    pub fn start<F, Fut>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if on_tick().await.is_break() {
                    break;
                }
            }
        }));
    }

    /// Stop the running task, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether a task is still scheduled.
    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
