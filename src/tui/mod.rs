//! Live terminal loop for running sessions.
//!
//! Draws a single status line in raw mode, waits for keys until the next
//! refresh tick, and hands each tick to the controller with the token it
//! issued. Built with crossterm.

mod event;

pub use event::{map_key, next_action, Action};

use std::io::{self, Write};
use std::time::Instant;

use chrono::Duration;
use crossterm::{
    cursor::{Hide, MoveToColumn, Show},
    execute, queue,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use tracing::debug;

use crate::core::Clock;
use crate::error::TimerError;
use crate::output::format_status_line;
use crate::timing::{CompletionHandler, RunState, SessionController};

/// Presentation options for a live session.
#[derive(Debug, Clone, Default)]
pub struct LiveOptions {
    /// Shown next to the clock when there is no step to show
    pub label: Option<String>,
    /// Rest timer length for the 'b' key
    pub rest: Option<Duration>,
    /// Ring the terminal bell on phase changes and rest expiry
    pub bell: bool,
}

/// Run a session until it completes or the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or drawn to.
pub fn run<C: Clock, H: CompletionHandler>(
    controller: &mut SessionController<C, H>,
    options: &LiveOptions,
) -> Result<(), TimerError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, Hide)?;

    let result = run_session(&mut stdout, controller, options);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(stdout, Show, Print("\n")).ok();

    result
}

fn run_session<C: Clock, H: CompletionHandler>(
    out: &mut impl Write,
    controller: &mut SessionController<C, H>,
    options: &LiveOptions,
) -> Result<(), TimerError> {
    let mut token = controller.start();
    let mut next_tick = Instant::now() + controller.refresh_interval();

    loop {
        draw(out, controller, options)?;
        if controller.last_summary().is_some() {
            break;
        }

        let timeout = next_tick.saturating_duration_since(Instant::now());
        if let Some(action) = next_action(timeout)? {
            debug!(?action, "key");
            match action {
                Action::TogglePause => {
                    if controller.snapshot().state == RunState::Paused {
                        controller.resume();
                    } else {
                        controller.pause();
                    }
                }
                Action::Skip => {
                    if controller.plan().is_some() {
                        controller.skip();
                    } else {
                        controller.skip_rest();
                    }
                }
                Action::StartRest => {
                    if let Some(rest) = options.rest {
                        controller.start_rest(rest);
                    }
                }
                Action::CancelRest => {
                    controller.cancel_rest();
                }
                Action::Finish => {
                    controller.finish();
                }
                Action::FinishEarly => {
                    controller.finish_early();
                }
                Action::Reset => {
                    controller.reset();
                    token = controller.start();
                    next_tick = Instant::now() + controller.refresh_interval();
                }
                Action::Quit => {
                    if controller.finish_early().is_none() {
                        break;
                    }
                }
            }
            continue;
        }

        next_tick = Instant::now() + controller.refresh_interval();
        let Some(current) = token else {
            continue;
        };
        if let Some(report) = controller.on_refresh(current) {
            if options.bell && report.is_eventful() {
                queue!(out, Print("\x07"))?;
            }
        }
    }

    Ok(())
}

fn draw<C: Clock, H: CompletionHandler>(
    out: &mut impl Write,
    controller: &SessionController<C, H>,
    options: &LiveOptions,
) -> Result<(), TimerError> {
    let line = format_status_line(&controller.snapshot(), options.label.as_deref());
    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(line))?;
    out.flush()?;
    Ok(())
}
