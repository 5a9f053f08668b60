//! Stretch clock.
//!
//! The clock only ever stores instants, never a countdown that must be ticked.
//! Remaining time is a pure function of `now`, which is what makes resuming
//! after a restart correct without an elapsed-time accumulator.
//!
//! ```text
//! Idle --begin--> Running --pause--> Paused --begin--> Running
//!   ^                                                     |
//!   +------------------------ reset_to -------------------+
//! ```

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StretchClock {
    /// Never started; remaining time is the full duration of the mode.
    #[default]
    Idle,
    /// Stopped with `remaining_ms` left.
    Paused { remaining_ms: u64 },
    /// Counting down toward `ends_at`. `ends_at` may already be in the past.
    Running {
        started_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
}

impl StretchClock {
    /// A freshly reset clock holding the full stretch as its paused remainder.
    pub fn reset_to(full_ms: u64) -> Self {
        StretchClock::Paused {
            remaining_ms: full_ms,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, StretchClock::Running { .. })
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            StretchClock::Running { started_at, .. } => Some(*started_at),
            _ => None,
        }
    }

    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        match self {
            StretchClock::Running { ends_at, .. } => Some(*ends_at),
            _ => None,
        }
    }

    /// Start counting down. Returns `false` if already running.
    ///
    /// A paused remainder is consumed; an idle clock runs for `full_ms`.
    pub fn begin(&mut self, now: DateTime<Utc>, full_ms: u64) -> bool {
        let remaining_ms = match *self {
            StretchClock::Running { .. } => return false,
            StretchClock::Paused { remaining_ms } => remaining_ms,
            StretchClock::Idle => full_ms,
        };
        *self = StretchClock::Running {
            started_at: now,
            ends_at: add_ms(now, remaining_ms),
        };
        true
    }

    /// Stop counting down, keeping what is left. Returns `false` if not running.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        let StretchClock::Running { ends_at, .. } = *self else {
            return false;
        };
        *self = StretchClock::Paused {
            remaining_ms: ms_between(now, ends_at),
        };
        true
    }

    /// Milliseconds left at `now`; never negative.
    pub fn remaining(&self, now: DateTime<Utc>, full_ms: u64) -> u64 {
        match *self {
            StretchClock::Running { ends_at, .. } => ms_between(now, ends_at),
            StretchClock::Paused { remaining_ms } => remaining_ms,
            StretchClock::Idle => full_ms,
        }
    }

    /// True once a running stretch has reached its scheduled end.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match *self {
            StretchClock::Running { ends_at, .. } => ends_at <= now,
            _ => false,
        }
    }
}

fn add_ms(at: DateTime<Utc>, ms: u64) -> DateTime<Utc> {
    let ms = i64::try_from(ms).unwrap_or(i64::MAX);
    Duration::try_milliseconds(ms)
        .and_then(|d| at.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// `max(0, to - from)` in milliseconds.
fn ms_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_milliseconds()).unwrap_or(0)
}
