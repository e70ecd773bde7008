//! Key handling for live sessions.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::error::TimerError;

/// Action requested by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Pause a running session or resume a paused one.
    TogglePause,
    /// Skip the current phase, or the rest timer of an open-ended session.
    Skip,
    /// Start the rest timer.
    StartRest,
    /// Drop the rest timer.
    CancelRest,
    /// End an open-ended session normally.
    Finish,
    /// End the session early.
    FinishEarly,
    /// Discard the session and start over.
    Reset,
    /// End the session early and leave.
    Quit,
}

/// Map a key press to an action.
#[must_use]
pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    // Handle Ctrl+C
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('s') => Some(Action::Skip),
        KeyCode::Char('b') => Some(Action::StartRest),
        KeyCode::Char('c') => Some(Action::CancelRest),
        KeyCode::Char('f') => Some(Action::Finish),
        KeyCode::Char('x') => Some(Action::FinishEarly),
        KeyCode::Char('R') => Some(Action::Reset),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Wait up to `timeout` for a key press.
///
/// Returns `None` when the timeout passes without a mapped key.
///
/// # Errors
///
/// Returns an error if event polling fails.
pub fn next_action(timeout: Duration) -> Result<Option<Action>, TimerError> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            return Ok(map_key(key));
        }
    }
    Ok(None)
}
