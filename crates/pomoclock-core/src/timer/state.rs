//! Persisted timer record.
//!
//! This is the flat on-disk shape of [`TimerEngine`]. Only one of
//! `ends_at` (when `running`) or `paused_remaining_ms` (when not) is read
//! back; the other is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::StretchClock;
use super::engine::TimerEngine;
use super::mode::Mode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: Mode,
    pub running: bool,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paused_remaining_ms: Option<u64>,
    #[serde(default = "default_cycle_index")]
    pub cycle_index: u32,
    #[serde(default)]
    pub today_completions: u32,
}

fn default_cycle_index() -> u32 {
    1
}

impl From<TimerEngine> for TimerState {
    fn from(engine: TimerEngine) -> Self {
        let (running, started_at, ends_at, paused_remaining_ms) = match engine.clock {
            StretchClock::Idle => (false, None, None, None),
            StretchClock::Paused { remaining_ms } => (false, None, None, Some(remaining_ms)),
            StretchClock::Running {
                started_at,
                ends_at,
            } => (true, Some(started_at), Some(ends_at), None),
        };
        Self {
            mode: engine.mode,
            running,
            started_at,
            ends_at,
            paused_remaining_ms,
            cycle_index: engine.cycle_index,
            today_completions: engine.today_completions,
        }
    }
}

impl From<TimerState> for TimerEngine {
    fn from(state: TimerState) -> Self {
        let clock = match (state.running, state.ends_at, state.paused_remaining_ms) {
            // The end alone decides expiry; a missing start is informational.
            (true, Some(ends_at), _) => StretchClock::Running {
                started_at: state.started_at.unwrap_or(ends_at),
                ends_at,
            },
            (true, None, remainder) => {
                tracing::warn!("running timer record without an end time, treating as stopped");
                remainder.map_or(StretchClock::Idle, |remaining_ms| StretchClock::Paused {
                    remaining_ms,
                })
            }
            (false, _, Some(remaining_ms)) => StretchClock::Paused { remaining_ms },
            (false, _, None) => StretchClock::Idle,
        };
        TimerEngine {
            mode: state.mode,
            clock,
            cycle_index: state.cycle_index.max(1),
            today_completions: state.today_completions,
        }
    }
}
