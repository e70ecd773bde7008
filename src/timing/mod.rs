//! Session timing engine.
//!
//! Every value here is derived from absolute timestamps read from a
//! [`Clock`](crate::core::Clock); nothing is decremented per tick, so a
//! late or missed refresh never loses time.

mod cadence;
mod controller;
mod countdown;
mod plan;
mod sequencer;
mod stopwatch;
mod summary;

pub use cadence::{RefreshCadence, RefreshToken, DEFAULT_REFRESH_INTERVAL};
pub use controller::SessionController;
pub use countdown::{CountdownState, CountdownTimer, Expiry, ExpiryCause};
pub use plan::{
    IntervalPlan, LongRest, PlanError, ScheduledPhase, Step, DEFAULT_COUNTDOWN_SECONDS,
};
pub use sequencer::{Phase, PhaseChange, PhaseSequencer, Progress};
pub use stopwatch::{RunState, Stopwatch};
pub use summary::{CompletionHandler, RefreshReport, SessionKind, SessionSummary, Snapshot};
