//! Pure stopwatch logic with no platform dependencies.
//! Testable on host; the periodic callback comes from whatever `TickSource`
//! the host provides.

use std::fmt;

/// Period of the tick source, and the amount each tick adds.
pub const TICK_MS: u64 = 10;

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1000;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerState {
    Stopped,
    Running,
}

/// A host-provided periodic callback mechanism.
///
/// `register` arms a repeating tick and returns the handle the host will
/// report with every firing. After `cancel` returns, the host must not
/// report that handle again.
pub trait TickSource {
    type Handle: Copy + Eq + fmt::Debug;

    fn register(&mut self, period_ms: u64) -> Self::Handle;
    fn cancel(&mut self, handle: Self::Handle);
}

/// Start/stop/reset state machine accumulating elapsed time one tick at a time.
///
/// The engine owns its tick handle. It is running exactly when it holds one,
/// and the handle is cancelled when the engine is dropped.
pub struct StopwatchEngine<S: TickSource> {
    source: S,
    elapsed_ms: u64,
    tick_handle: Option<S::Handle>,
}

impl<S: TickSource> StopwatchEngine<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            elapsed_ms: 0,
            tick_handle: None,
        }
    }

    /// Returns `false` if the engine was already running.
    pub fn start(&mut self) -> bool {
        if self.tick_handle.is_some() {
            return false;
        }
        self.tick_handle = Some(self.source.register(TICK_MS));
        true
    }

    /// Returns `false` if the engine was already stopped.
    pub fn stop(&mut self) -> bool {
        match self.tick_handle.take() {
            Some(handle) => {
                self.source.cancel(handle);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.stop();
        self.elapsed_ms = 0;
    }

    /// Feed one firing of the tick source. Only the active handle counts;
    /// anything else was cancelled or belongs to someone else.
    pub fn tick(&mut self, handle: S::Handle) -> bool {
        if self.tick_handle != Some(handle) {
            return false;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(TICK_MS);
        true
    }

    /// Release the tick source now rather than at end of scope.
    pub fn dispose(self) {}

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn is_running(&self) -> bool {
        self.tick_handle.is_some()
    }

    pub fn state(&self) -> TimerState {
        if self.is_running() {
            TimerState::Running
        } else {
            TimerState::Stopped
        }
    }

    pub fn formatted(&self) -> String {
        format_elapsed(self.elapsed_ms)
    }

    pub fn tick_handle(&self) -> Option<S::Handle> {
        self.tick_handle
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: TickSource> Drop for StopwatchEngine<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Format milliseconds as "HH:MM:SS:CC" (CC = hundredths)
pub fn format_elapsed(ms: u64) -> String {
    let h = ms / MS_PER_HOUR;
    let m = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let s = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let cs = (ms % MS_PER_SECOND) / 10;
    format!("{:02}:{:02}:{:02}:{:02}", h, m, s, cs)
}
