// src/session/countdown.rs

/// Exam length when nothing else is configured: 30 minutes.
pub const DEFAULT_DURATION_SECS: u32 = 30 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Running,
    /// Reached zero; the auto-submit is due.
    Expired,
    /// The session was submitted; ticks have no effect.
    Stopped,
}

/// What a single one-second tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still running with this many seconds left.
    Running(u32),
    /// This tick reached zero. Returned exactly once.
    Expired,
    /// Nothing happened.
    Idle,
}

/// The exam clock. Remaining time only decreases and never goes below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    state: CountdownState,
}

impl Countdown {
    /// A zero duration expires on the first tick.
    pub fn new(duration_secs: u32) -> Self {
        Self {
            remaining: duration_secs,
            state: CountdownState::Running,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn tick(&mut self) -> Tick {
        if self.state != CountdownState::Running {
            return Tick::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = CountdownState::Expired;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }

    pub fn stop(&mut self) {
        self.state = CountdownState::Stopped;
    }
}

/// Renders seconds as `mm:ss`.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
