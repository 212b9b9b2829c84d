use stopwatch_core::{StopwatchEngine, TimerState};

use crate::pump::{PumpTicks, TickId};
use crate::ui::{Render, Theme};

/// The engine plus whoever displays it. Every state change is rendered.
pub struct StopwatchState {
    engine: StopwatchEngine<PumpTicks>,
    view: Box<dyn Render>,
}

impl StopwatchState {
    pub fn new(pump: PumpTicks, view: Box<dyn Render>) -> Self {
        Self {
            engine: StopwatchEngine::new(pump),
            view,
        }
    }

    pub fn start(&mut self) {
        if self.engine.start() {
            log::info!("stopwatch started at {}", self.engine.formatted());
        }
        self.redraw();
    }

    pub fn stop(&mut self) {
        if self.engine.stop() {
            log::info!("stopwatch stopped at {}", self.engine.formatted());
        }
        self.redraw();
    }

    pub fn toggle(&mut self) {
        match self.engine.state() {
            TimerState::Running => self.stop(),
            TimerState::Stopped => self.start(),
        }
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        log::info!("stopwatch reset");
        self.redraw();
    }

    pub fn handle_pump(&mut self, id: TickId) {
        if self.engine.tick(id) {
            self.redraw();
        } else {
            log::debug!("dropped stale tick from {:?}", id);
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.view.set_theme(theme);
        self.redraw();
    }

    pub fn redraw(&mut self) {
        let elapsed = self.engine.formatted();
        self.view.render(self.engine.is_running(), &elapsed);
    }

    #[cfg(test)]
    pub fn engine(&self) -> &StopwatchEngine<PumpTicks> {
        &self.engine
    }
}
