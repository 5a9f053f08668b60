use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Mode;

/// Every state change in the timer produces an Event.
/// Front ends print or render them; nothing in the core reacts to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        at: DateTime<Utc>,
    },
    /// User picked a mode directly (tab switch). Never credits history.
    ModeSwitched {
        from: Mode,
        to: Mode,
        at: DateTime<Utc>,
    },
    /// A stretch ended, by expiry or by skip, and the next mode was entered.
    StretchCompleted {
        mode: Mode,
        next_mode: Mode,
        skipped: bool,
        /// Whether this completion was added to the history ledger.
        credited: bool,
        cycle_index: u32,
        at: DateTime<Utc>,
    },
    /// A stretch was found expired while nothing was observing it.
    Reconciled {
        mode: Mode,
        next_mode: Mode,
        overdue_ms: u64,
        at: DateTime<Utc>,
    },
    HistoryCleared {
        at: DateTime<Utc>,
    },
    /// Everything a renderer needs for one frame.
    StateSnapshot {
        mode: Mode,
        running: bool,
        remaining_ms: u64,
        total_ms: u64,
        cycle_index: u32,
        long_break_every: u32,
        today_completions: u32,
        ends_at: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
}

/// Chime categories understood by the audio sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chime {
    /// Entering a work stretch.
    Work,
    /// Entering a break.
    Break,
    /// A running stretch just ran out.
    End,
}

impl Chime {
    /// Chime announcing entry into `mode`.
    pub fn entering(mode: Mode) -> Self {
        if mode.is_break() {
            Chime::Break
        } else {
            Chime::Work
        }
    }
}

/// A side effect the core wants performed. Adapters in [`crate::effects`]
/// carry them out; the core never calls a sink directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    Notify { title: String, body: String },
    Chime { chime: Chime },
}
