use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use serde::{Deserialize, Serialize};

const LEFT: u16 = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }

    /// (foreground, background, dimmed)
    fn colors(self) -> (Color, Color, Color) {
        match self {
            Theme::Light => (Color::Black, Color::White, Color::Grey),
            Theme::Dark => (Color::White, Color::Black, Color::DarkGrey),
        }
    }
}

/// Display collaborator. Receives the running flag and the formatted elapsed
/// time whenever either may have changed.
pub trait Render {
    fn render(&mut self, running: bool, elapsed: &str);

    fn set_theme(&mut self, _theme: Theme) {}
}

pub struct TerminalView<W: Write> {
    out: W,
    theme: Theme,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, theme: Theme) -> Self {
        Self { out, theme }
    }

    fn draw(&mut self, running: bool, elapsed: &str) -> io::Result<()> {
        let (fg, bg, dim) = self.theme.colors();
        queue!(
            self.out,
            SetForegroundColor(fg),
            SetBackgroundColor(bg),
            Clear(ClearType::All),
            MoveTo(LEFT, 1),
            Print("STOPWATCH"),
            MoveTo(LEFT + 2, 3),
            Print(elapsed),
            MoveTo(LEFT, 5),
        )?;

        let buttons = [("s", "Start", !running), ("x", "Stop", running), ("r", "Reset", true)];
        for (key, label, enabled) in buttons {
            queue!(
                self.out,
                SetForegroundColor(if enabled { fg } else { dim }),
                Print(format!("[{}] {}   ", key, label)),
            )?;
        }

        let next = self.theme.toggle();
        queue!(
            self.out,
            SetForegroundColor(dim),
            MoveTo(LEFT, 7),
            Print(format!("t: switch to {} theme   f: forget theme   q: quit", next.label())),
            ResetColor,
        )?;
        self.out.flush()
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Render for TerminalView<W> {
    fn render(&mut self, running: bool, elapsed: &str) {
        if let Err(e) = self.draw(running, elapsed) {
            log::error!("failed to draw stopwatch: {}", e);
        }
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

/// Raw mode plus alternate screen for as long as the session lives.
pub struct TerminalSession {
    out: Stdout,
}

impl TerminalSession {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self { out })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::Command;

    fn rendered(running: bool, elapsed: &str, theme: Theme) -> String {
        let mut view = TerminalView::new(Vec::new(), theme);
        view.render(running, elapsed);
        String::from_utf8_lossy(view.output()).into_owned()
    }

    fn ansi(cmd: impl Command) -> String {
        let mut buf = Vec::new();
        queue!(buf, cmd).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
    }

    #[test]
    fn test_theme_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        let theme: Theme = serde_json::from_str("\"light\"").unwrap();
        assert_eq!(theme, Theme::Light);
    }

    #[test]
    fn test_render_shows_elapsed_and_commands() {
        let text = rendered(false, "00:01:02:03", Theme::Light);
        assert!(text.contains("STOPWATCH"));
        assert!(text.contains("00:01:02:03"));
        assert!(text.contains("[s] Start"));
        assert!(text.contains("[x] Stop"));
        assert!(text.contains("[r] Reset"));
        assert!(text.contains("switch to Dark theme"));
        assert!(text.contains("f: forget theme"));
    }

    #[test]
    fn test_render_follows_theme() {
        let mut view = TerminalView::new(Vec::new(), Theme::Light);
        view.set_theme(Theme::Dark);
        view.render(true, "00:00:00:10");
        let text = String::from_utf8_lossy(view.output()).into_owned();
        assert!(text.contains("switch to Light theme"));
    }

    #[test]
    fn test_disabled_buttons_are_dimmed() {
        // Start is dimmed while running, Stop while stopped
        let running = rendered(true, "00:00:00:00", Theme::Light);
        let stopped = rendered(false, "00:00:00:00", Theme::Light);
        let dim = ansi(SetForegroundColor(Color::Grey));
        assert!(running.contains(&format!("{}[s] Start", dim)));
        assert!(stopped.contains(&format!("{}[x] Stop", dim)));
        assert!(!running.contains(&format!("{}[x] Stop", dim)));
    }
}
