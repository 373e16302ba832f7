//! Terminal host for [`App`].
//!
//! Owns the screen, turns key presses into [`Msg`]s, runs the [`Cmd`]s the
//! app returns and redraws after every message. Ticks are deadlines checked
//! with `event::poll`, so keys stay responsive while the counter runs.

use core::time::Duration;
use std::io::{self, Stdout, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use tracing::{error, info};

use crate::app::{App, Cmd, Line, Msg, Style};

/// Poll timeout when no tick is pending.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Longest delay a tick can be scheduled out.
const MAX_TICK_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Raw mode and alternate screen for as long as it lives.
struct TerminalGuard {
    out: Stdout,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        let mut guard = Self { out: io::stdout() };
        execute!(guard.out, EnterAlternateScreen, Hide)
            .context("Failed to enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Runs the form until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up, read or drawn to.
pub fn run(mut app: App, export_dir: &Path) -> Result<()> {
    let mut terminal = TerminalGuard::enter()?;
    let mut deadline: Option<Instant> = None;

    info!(export_dir = %export_dir.display(), "Interactive session started");

    loop {
        let (width, _) = terminal::size().context("Failed to read terminal size")?;
        draw(&mut terminal.out, &app.view(), width).context("Failed to draw")?;

        let timeout = deadline.map_or(IDLE_POLL, |at| {
            at.saturating_duration_since(Instant::now())
        });

        let msg = if deadline.is_some_and(|at| Instant::now() >= at) {
            deadline = None;
            Some(Msg::Tick)
        } else if event::poll(timeout).context("Failed to poll terminal events")? {
            translate(&event::read().context("Failed to read terminal event")?)
        } else {
            None
        };

        let Some(msg) = msg else {
            continue;
        };

        let cmd = app.update(msg);
        if let Flow::Quit = dispatch(&mut app, cmd, export_dir, &mut deadline) {
            break;
        }
    }

    info!("Interactive session ended");
    Ok(())
}

/// Runs a command, feeding any resulting message back into the app.
fn dispatch(
    app: &mut App,
    cmd: Cmd,
    export_dir: &Path,
    deadline: &mut Option<Instant>,
) -> Flow {
    match cmd {
        Cmd::None => Flow::Continue,
        Cmd::Quit => Flow::Quit,
        Cmd::Tick(after) => {
            *deadline = Some(Instant::now() + after.min(MAX_TICK_DELAY));
            Flow::Continue
        }
        Cmd::Download(download) => {
            let msg = match download.save_into(export_dir) {
                Ok(path) => Msg::Saved(path),
                Err(err) => {
                    error!("Failed to save download: {err:#}");
                    Msg::SaveFailed(format!("{err:#}"))
                }
            };
            let follow_up = app.update(msg);
            dispatch(app, follow_up, export_dir, deadline)
        }
    }
}

/// Maps a terminal event to a message. Only key presses are meaningful.
fn translate(event: &Event) -> Option<Msg> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Msg::Quit);
    }

    Some(match key.code {
        KeyCode::Tab | KeyCode::Down => Msg::FocusNext,
        KeyCode::BackTab | KeyCode::Up => Msg::FocusPrev,
        KeyCode::Right => Msg::Increase,
        KeyCode::Left => Msg::Decrease,
        KeyCode::Enter => Msg::Submit,
        KeyCode::Esc => Msg::Cancel,
        KeyCode::Backspace => Msg::Backspace,
        KeyCode::Char(c) => Msg::Char(c),
        _ => return None,
    })
}

/// Draws the lines from the top, wrapping each to `width` columns.
fn draw(out: &mut impl Write, lines: &[Line], width: u16) -> io::Result<()> {
    let mut row: u16 = 0;
    for line in lines {
        for text in wrap(&line.text, usize::from(width)) {
            queue!(out, MoveTo(0, row), Clear(ClearType::CurrentLine))?;
            apply_style(out, line.style)?;
            queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)?;
            row = row.saturating_add(1);
        }
    }
    queue!(out, Clear(ClearType::FromCursorDown))?;
    out.flush()
}

/// Splits `text` into rows of at most `width` characters, breaking at spaces
/// where possible. A width of zero disables wrapping.
fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.chars().count() <= width {
        return vec![text.to_string()];
    }

    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_len = 0;
    for word in text.split(' ') {
        let word_len = word.chars().count();
        if row_len > 0 && row_len + 1 + word_len > width {
            rows.push(core::mem::take(&mut row));
            row_len = 0;
        }
        if row_len > 0 {
            row.push(' ');
            row_len += 1;
        }
        row.push_str(word);
        row_len += word_len;

        // A single word longer than the row is cut hard.
        while row_len > width {
            let tail: String = row.chars().skip(width).collect();
            row = row.chars().take(width).collect();
            rows.push(core::mem::replace(&mut row, tail));
            row_len -= width;
        }
    }
    if row_len > 0 {
        rows.push(row);
    }
    rows
}

fn apply_style(out: &mut impl Write, style: Style) -> io::Result<()> {
    match style {
        Style::Title => queue!(out, SetAttribute(Attribute::Bold), SetForegroundColor(Color::Cyan)),
        Style::Plain => Ok(()),
        Style::Muted => queue!(out, SetForegroundColor(Color::DarkGrey)),
        Style::Focused => queue!(out, SetAttribute(Attribute::Bold), SetForegroundColor(Color::Yellow)),
        Style::Metric => queue!(out, SetAttribute(Attribute::Bold), SetForegroundColor(Color::Green)),
        Style::Info => queue!(out, SetForegroundColor(Color::Blue)),
        Style::Success => queue!(out, SetForegroundColor(Color::Green)),
        Style::Error => queue!(out, SetForegroundColor(Color::Red)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{KeyEvent, KeyEventState};
    use price_model::{LinearRegressor, PriceModel};

    use super::*;
    use crate::app::{INSIGHT, Phase, Status, Timing};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> App {
        let model = PriceModel::from(LinearRegressor::new(250_000.0, [0.0; 4]));
        App::new(Arc::new(model), Timing::default())
    }

    #[test]
    fn test_translate_keys() {
        assert_eq!(translate(&key(KeyCode::Tab)), Some(Msg::FocusNext));
        assert_eq!(translate(&key(KeyCode::BackTab)), Some(Msg::FocusPrev));
        assert_eq!(translate(&key(KeyCode::Right)), Some(Msg::Increase));
        assert_eq!(translate(&key(KeyCode::Enter)), Some(Msg::Submit));
        assert_eq!(translate(&key(KeyCode::Char('7'))), Some(Msg::Char('7')));
        assert_eq!(translate(&key(KeyCode::F(1))), None);
        assert_eq!(translate(&Event::FocusGained), None);
    }

    #[test]
    fn test_translate_ctrl_c_and_releases() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(translate(&ctrl_c), Some(Msg::Quit));

        let ctrl_x = Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL));
        assert_eq!(translate(&ctrl_x), None);

        let release = Event::Key(KeyEvent::new_with_kind_and_state(
            KeyCode::Tab,
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        ));
        assert_eq!(translate(&release), None);
    }

    #[test]
    fn test_draw_writes_every_line() {
        let mut buffer = Vec::new();
        draw(&mut buffer, &app().view(), 120).unwrap();
        let screen = String::from_utf8_lossy(&buffer);
        assert!(screen.contains("Car Price Prediction App"));
        assert!(screen.contains("[ Predict ]"));
    }

    #[test]
    fn test_wrap_breaks_at_spaces() {
        let rows = wrap(INSIGHT[0], 40);
        assert!(rows.len() > 1);
        assert!(rows.iter().all(|row| row.chars().count() <= 40));
        assert_eq!(rows.join(" "), INSIGHT[0]);
    }

    #[test]
    fn test_wrap_cuts_long_words_and_keeps_short_lines() {
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("  [ Predict ]", 80), vec!["  [ Predict ]"]);
        assert_eq!(wrap("anything", 0), vec!["anything"]);
    }

    #[test]
    fn test_draw_wraps_result_on_narrow_terminal() {
        let mut app = app();
        let mut cmd = app.update(Msg::Predict);
        while let Cmd::Tick(_) = cmd {
            cmd = app.update(Msg::Tick);
        }

        let mut buffer = Vec::new();
        draw(&mut buffer, &app.view(), 60).unwrap();
        let screen = String::from_utf8_lossy(&buffer);
        assert!(screen.contains("can compensate."));
        assert!(screen.contains("Insight: While higher vehicle age"));
    }

    #[test]
    fn test_huge_tick_delay_does_not_overflow() {
        let mut app = app();
        let mut deadline = None;
        dispatch(&mut app, Cmd::Tick(Duration::MAX), Path::new("."), &mut deadline);
        assert!(deadline.is_some_and(|at| at > Instant::now()));
    }

    #[test]
    fn test_tick_sets_deadline() {
        let mut app = app();
        let mut deadline = None;
        let cmd = app.update(Msg::Predict);
        assert!(matches!(
            dispatch(&mut app, cmd, Path::new("."), &mut deadline),
            Flow::Continue
        ));
        assert!(deadline.is_some());
    }

    #[test]
    fn test_download_is_saved_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        let mut deadline = None;

        let mut cmd = app.update(Msg::Predict);
        while let Cmd::Tick(_) = cmd {
            cmd = app.update(Msg::Tick);
        }
        assert_eq!(*app.phase(), Phase::ResultDisplayed);

        let cmd = app.update(Msg::Download);
        dispatch(&mut app, cmd, dir.path(), &mut deadline);

        let path = dir.path().join(report::FILE_NAME);
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF-"));
        assert!(matches!(app.status(), Some(Status::Info(_))));
    }

    #[test]
    fn test_failed_save_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();

        let mut app = app();
        let mut cmd = app.update(Msg::Predict);
        while let Cmd::Tick(_) = cmd {
            cmd = app.update(Msg::Tick);
        }
        let cmd = app.update(Msg::Download);
        dispatch(&mut app, cmd, &blocker, &mut None);

        assert!(matches!(app.status(), Some(Status::Error(_))));
        assert_eq!(*app.phase(), Phase::ResultDisplayed);
    }
}
