use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::AppOp;

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness

pub const KEY_ENTER: char = '\r';
pub const KEY_ESC: char = '\u{1b}';

/// Reads terminal events on a blocking thread and posts them to the event loop.
pub struct KeyReader {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl KeyReader {
    pub fn spawn(main_conn: UnboundedSender<AppOp>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();
        let join = tokio::task::spawn_blocking(move || input_loop(stop2, main_conn));
        Self {
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                log::warn!("key reader ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for KeyReader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, main_conn: UnboundedSender<AppOp>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    let Some(op) = event_to_op(&ev) else { continue };
                    if main_conn.send(op).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("terminal read failed: {}", e);
                    let _ = main_conn.send(AppOp::Quit);
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                log::error!("terminal poll failed: {}", e);
                let _ = main_conn.send(AppOp::Quit);
                break;
            }
        }
    }
}

pub fn event_to_op(ev: &Event) -> Option<AppOp> {
    match ev {
        Event::Key(key) => key_to_op(key),
        Event::Resize(..) => Some(AppOp::Redraw),
        _ => None,
    }
}

fn key_to_op(key: &KeyEvent) -> Option<AppOp> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(AppOp::Quit),
        KeyCode::Char(c) => Some(AppOp::Rawkeys(c)),
        KeyCode::Enter => Some(AppOp::Rawkeys(KEY_ENTER)),
        KeyCode::Esc => Some(AppOp::Rawkeys(KEY_ESC)),
        _ => None,
    }
}
