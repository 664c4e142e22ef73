//! Debounce state machine.
//!
//! Collapses a burst of events into one callback. A trailing debounce fires
//! `wait` after the last event; a leading one fires on the first event of a
//! burst and stays quiet until the burst has been idle for `wait`.

use std::time::{Duration, Instant};

/// Where the debouncer is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Scheduled { deadline: Instant },
    Fired,
}

#[derive(Debug, Clone)]
pub struct Debounce {
    wait: Duration,
    leading: bool,
    state: DebounceState,
}

impl Debounce {
    pub fn new(wait: Duration, leading: bool) -> Self {
        Self {
            wait,
            leading,
            state: DebounceState::Idle,
        }
    }

    pub fn trailing(wait: Duration) -> Self {
        Self::new(wait, false)
    }

    pub fn leading(wait: Duration) -> Self {
        Self::new(wait, true)
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Scheduled { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Record an event. Returns `true` when the callback runs now.
    pub fn trigger(&mut self, now: Instant) -> bool {
        let call_now = self.leading && !matches!(self.state, DebounceState::Scheduled { .. });
        self.state = DebounceState::Scheduled {
            deadline: now + self.wait,
        };
        call_now
    }

    /// Advance the clock. Returns `true` when the trailing callback runs.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            DebounceState::Scheduled { deadline } if now >= deadline => {
                self.state = DebounceState::Fired;
                !self.leading
            }
            _ => false,
        }
    }

    /// Drop a pending callback.
    pub fn cancel(&mut self) {
        if matches!(self.state, DebounceState::Scheduled { .. }) {
            self.state = DebounceState::Idle;
        }
    }
}
