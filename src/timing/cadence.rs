//! Display-refresh cadence with stale-callback protection.
//!
//! A refresh only recomputes values from the clock; it never advances time
//! by itself. Each start or cancel bumps a generation counter, and a token
//! handed out by an earlier generation no longer matches, so a callback
//! that fires after its session was discarded is recognised and dropped.

use std::time::Duration;

/// Default refresh interval.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Ticket identifying the cadence generation a refresh belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefreshToken {
    generation: u64,
}

/// Periodic refresh schedule owned by one controller.
#[derive(Debug, Clone)]
pub struct RefreshCadence {
    interval: Duration,
    generation: u64,
    active: bool,
}

impl RefreshCadence {
    /// Create an inactive cadence.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            active: false,
        }
    }

    /// Start a new generation and return its token.
    pub fn start(&mut self) -> RefreshToken {
        self.generation = self.generation.wrapping_add(1);
        self.active = true;
        RefreshToken {
            generation: self.generation,
        }
    }

    /// Stop refreshing; every outstanding token becomes stale.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.active = false;
    }

    /// Whether `token` belongs to the running generation.
    #[must_use]
    pub const fn is_current(&self, token: RefreshToken) -> bool {
        self.active && token.generation == self.generation
    }

    /// Token of the running generation, if any.
    #[must_use]
    pub const fn token(&self) -> Option<RefreshToken> {
        if self.active {
            Some(RefreshToken {
                generation: self.generation,
            })
        } else {
            None
        }
    }

    /// Whether a generation is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Time between refreshes.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for RefreshCadence {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}
