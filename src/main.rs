mod input;
mod logging;
mod pump;
mod stopwatch;
mod storage;
mod ui;

use std::io::stdout;

use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::input::{KeyReader, KEY_ENTER, KEY_ESC};
use crate::pump::{PumpTicks, TickId};
use crate::stopwatch::StopwatchState;
use crate::storage::TimerStorage;
use crate::ui::{Render, TerminalSession, TerminalView, Theme};

const APP_NAME: &str = "Stopwatch";

/// Everything the event loop reacts to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppOp {
    Redraw,
    Rawkeys(char),
    Pump(TickId),
    Quit,
}

struct StopwatchApp {
    stopwatch: StopwatchState,
    storage: TimerStorage,
    theme: Theme,
}

impl StopwatchApp {
    fn new(pump: PumpTicks, view: Box<dyn Render>, storage: TimerStorage, theme: Theme) -> Self {
        Self {
            stopwatch: StopwatchState::new(pump, view),
            storage,
            theme,
        }
    }

    /// Returns `false` when the key asks the app to quit.
    fn handle_key(&mut self, key: char) -> bool {
        match key {
            's' => self.stopwatch.start(),
            'x' => self.stopwatch.stop(),
            KEY_ENTER | '\n' => self.stopwatch.toggle(),
            'r' => self.stopwatch.reset(),
            't' => {
                self.theme = self.theme.toggle();
                self.storage.save_theme(self.theme);
                self.stopwatch.set_theme(self.theme);
            }
            'f' => {
                self.storage.forget_theme();
                self.theme = Theme::default();
                self.stopwatch.set_theme(self.theme);
            }
            'q' | KEY_ESC => return false,
            _ => {}
        }
        true
    }

    fn handle_pump(&mut self, id: TickId) {
        self.stopwatch.handle_pump(id);
    }

    fn redraw(&mut self) {
        self.stopwatch.redraw();
    }
}

/// Drain the inbox until a quit request or until every sender is gone.
async fn run(app: &mut StopwatchApp, inbox: &mut UnboundedReceiver<AppOp>) {
    while let Some(op) = inbox.recv().await {
        match op {
            AppOp::Redraw => app.redraw(),
            AppOp::Rawkeys(key) => {
                if !app.handle_key(key) {
                    break;
                }
            }
            AppOp::Pump(id) => app.handle_pump(id),
            AppOp::Quit => break,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let data_dir = storage::data_dir();
    logging::init(&data_dir);
    log::info!("{} PID is {}", APP_NAME, std::process::id());

    let storage = TimerStorage::new(&data_dir);
    let theme = storage.load_theme();

    let session = TerminalSession::new()?;
    let (main_conn, mut inbox) = mpsc::unbounded_channel();
    let mut keys = KeyReader::spawn(main_conn.clone());

    let view = TerminalView::new(stdout(), theme);
    let mut app = StopwatchApp::new(PumpTicks::new(main_conn), Box::new(view), storage, theme);
    app.redraw();

    run(&mut app, &mut inbox).await;

    // Clean up: the engine releases its pump before the terminal is restored
    drop(app);
    keys.shutdown().await;
    drop(session);
    log::info!("{} exiting", APP_NAME);
    Ok(())
}
