//! # Heartbeat: periodic ticks routed through the worker queue.
//!
//! The scheduler never calls the engine from its own task. Each firing
//! posts a tick **action** onto the worker queue, so a tick handler slower
//! than the interval never overlaps the next one — the next tick simply
//! queues and runs when the worker reaches it.
//!
//! ## Rules
//! - `arm(interval)` fires immediately, then every `interval` of wall-clock
//!   time (missed ticks are delayed, not bursted).
//! - `cancel()` is async and consumes the handle: it cancels the token and
//!   awaits the task join, so **no tick is posted after it returns**. A tick
//!   already queued before cancellation may still execute.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};

use super::worker::WorkerHandle;

/// Armed periodic tick poster.
pub(crate) struct Heartbeat {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl Heartbeat {
    /// Arms the heartbeat: the first tick posts immediately, then every
    /// `interval`.
    ///
    /// The task also ends on its own if the worker queue closes.
    pub(crate) fn arm(interval: Duration, worker: WorkerHandle, bus: Bus) -> Self {
        let token = CancellationToken::new();
        let child = token.clone();

        let join = tokio::spawn(async move {
            let mut ticker = time::interval(interval.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        if worker.post_heartbeat().is_err() {
                            break;
                        }
                    }
                }
            }
        });

        bus.publish(Event::new(EventKind::HeartbeatArmed));
        Self { token, join }
    }

    /// Cancels the heartbeat and waits for the posting task to end.
    pub(crate) async fn cancel(self, bus: &Bus) {
        self.token.cancel();
        let _ = self.join.await;
        bus.publish(Event::new(EventKind::HeartbeatCancelled));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::worker::WorkerAction;
    use tokio::sync::mpsc;
    use tokio::sync::mpsc::error::TryRecvError;

    fn probe() -> (WorkerHandle, mpsc::UnboundedReceiver<WorkerAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (WorkerHandle::new(tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_are_spaced_by_the_interval() {
        let (worker, mut rx) = probe();
        let bus = Bus::new(8);
        let hb = Heartbeat::arm(Duration::from_secs(5), worker, bus.clone());

        let t0 = time::Instant::now();
        for _ in 0..3 {
            let action = rx.recv().await.unwrap();
            assert!(matches!(action, WorkerAction::Heartbeat));
        }
        // First tick at t=0, then auto-advanced to t=5 and t=10.
        assert_eq!(t0.elapsed(), Duration::from_secs(10));

        hb.cancel(&bus).await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_is_posted_after_cancel_returns() {
        let (worker, mut rx) = probe();
        let bus = Bus::new(8);
        // Keep a sender alive so an empty queue reads as Empty rather than
        // the heartbeat task's dropped handle closing the channel.
        let _keeper = worker.clone();
        let hb = Heartbeat::arm(Duration::from_secs(5), worker, bus.clone());

        // Consume the immediate tick, then cancel.
        rx.recv().await.unwrap();
        hb.cancel(&bus).await;

        time::advance(Duration::from_secs(30)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_task_ends_when_worker_queue_closes() {
        let (worker, rx) = probe();
        let bus = Bus::new(8);
        let hb = Heartbeat::arm(Duration::from_secs(1), worker, bus.clone());

        drop(rx);
        // The next post fails and the task exits; cancel then returns
        // promptly instead of hanging on the join.
        hb.cancel(&bus).await;
    }
}
