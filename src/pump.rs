use std::collections::HashMap;
use std::time::Duration;

use stopwatch_core::{TickSource, TICK_MS};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::AppOp;

/// Identifies one registration on the pump. Never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TickId(u64);

/// Tick source backed by tokio timers. Each registration runs its own task
/// that posts `AppOp::Pump` into the event loop until it is cancelled.
pub struct PumpTicks {
    main_conn: UnboundedSender<AppOp>,
    next_id: u64,
    pumps: HashMap<TickId, JoinHandle<()>>,
}

impl PumpTicks {
    pub fn new(main_conn: UnboundedSender<AppOp>) -> Self {
        Self {
            main_conn,
            next_id: 0,
            pumps: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn active(&self) -> usize {
        self.pumps.len()
    }
}

impl TickSource for PumpTicks {
    type Handle = TickId;

    fn register(&mut self, period_ms: u64) -> TickId {
        let period_ms = if period_ms == 0 { TICK_MS } else { period_ms };
        self.next_id += 1;
        let id = TickId(self.next_id);
        let task = spawn_pump(id, Duration::from_millis(period_ms), self.main_conn.clone());
        self.pumps.insert(id, task);
        log::debug!("pump {:?} started, period {} ms", id, period_ms);
        id
    }

    fn cancel(&mut self, handle: TickId) {
        match self.pumps.remove(&handle) {
            Some(task) => {
                task.abort();
                log::debug!("pump {:?} cancelled", handle);
            }
            None => log::warn!("cancel for unknown pump {:?}", handle),
        }
    }
}

impl Drop for PumpTicks {
    fn drop(&mut self) {
        for (id, task) in self.pumps.drain() {
            task.abort();
            log::debug!("pump {:?} released on teardown", id);
        }
    }
}

fn spawn_pump(id: TickId, period: Duration, main_conn: UnboundedSender<AppOp>) -> JoinHandle<()> {
    // first firing one full period after registration, not immediately
    let first = Instant::now() + period;
    tokio::spawn(async move {
        let mut interval = interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        loop {
            interval.tick().await;
            if main_conn.send(AppOp::Pump(id)).is_err() {
                log::debug!("pump {:?} lost its event loop", id);
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[tokio::test(start_paused = true)]
    async fn test_pump_posts_ticks_each_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut pump = PumpTicks::new(tx);
        let start = Instant::now();
        let id = pump.register(10);

        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(AppOp::Pump(id)));
        }
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(pump.active(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut pump = PumpTicks::new(tx);
        let id = pump.register(10);
        assert_eq!(rx.recv().await, Some(AppOp::Pump(id)));

        pump.cancel(id);
        assert_eq!(pump.active(), 0);
        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_registrations_get_fresh_ids() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut pump = PumpTicks::new(tx);
        let a = pump.register(10);
        pump.cancel(a);
        let b = pump.register(10);
        assert_ne!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_every_pump() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut pump = PumpTicks::new(tx);
        let id = pump.register(10);
        assert_eq!(rx.recv().await, Some(AppOp::Pump(id)));

        drop(pump);
        // every sender is gone once the aborted task is torn down
        assert_eq!(rx.recv().await, None);
    }
}
