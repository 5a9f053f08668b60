//! Timer engine implementation.
//!
//! The engine is a wall-clock-based state machine over one stretch at a time.
//! It does not use internal threads or read the system clock: every command
//! takes the current instant, and the caller is responsible for calling
//! `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle/Paused -> Running -> (expired) -> complete() -> Paused (next mode)
//!                   \--pause--> Paused
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(&prefs);
//! engine.start(&prefs, now);
//! // In a loop:
//! if let Some(done) = engine.tick(&prefs, &mut ledger, now) {
//!     effects::dispatch(&done.intents, &prefs, &mut notifier, &mut audio);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::StretchClock;
use super::cycle::{advance_cycle, next_mode, normalize_cycle};
use super::mode::{duration_ms, Mode};
use super::state::TimerState;
use crate::events::{Chime, Event, Intent};
use crate::history::{local_day, HistoryLedger};
use crate::storage::Preferences;

/// Outcome of finishing a stretch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub event: Event,
    /// Completions added to the history ledger (0 or 1).
    pub history_delta: u32,
    pub next_mode: Mode,
    /// Side effects for the adapters, in firing order.
    pub intents: Vec<Intent>,
}

/// Core timer engine: the single mutable record of the current stretch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TimerState", into = "TimerState")]
pub struct TimerEngine {
    pub(super) mode: Mode,
    pub(super) clock: StretchClock,
    pub(super) cycle_index: u32,
    /// Cached from the ledger; the ledger is authoritative.
    pub(super) today_completions: u32,
}

impl TimerEngine {
    /// A fresh work stretch at the start of a cycle.
    pub fn new(prefs: &Preferences) -> Self {
        Self {
            mode: Mode::Work,
            clock: StretchClock::reset_to(duration_ms(Mode::Work, prefs)),
            cycle_index: 1,
            today_completions: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn clock(&self) -> StretchClock {
        self.clock
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn cycle_index(&self) -> u32 {
        self.cycle_index
    }

    pub fn today_completions(&self) -> u32 {
        self.today_completions
    }

    pub fn total_ms(&self, prefs: &Preferences) -> u64 {
        duration_ms(self.mode, prefs)
    }

    pub fn remaining_ms(&self, prefs: &Preferences, now: DateTime<Utc>) -> u64 {
        self.clock.remaining(now, self.total_ms(prefs))
    }

    /// Build a full state snapshot event. Today's count is read from the
    /// ledger, not from the cache.
    pub fn snapshot(&self, prefs: &Preferences, ledger: &HistoryLedger, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            running: self.is_running(),
            remaining_ms: self.remaining_ms(prefs, now),
            total_ms: self.total_ms(prefs),
            cycle_index: self.cycle_index,
            long_break_every: prefs.long_break_every(),
            today_completions: ledger.count_for(local_day(now)),
            ends_at: self.clock.ends_at(),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, prefs: &Preferences, now: DateTime<Utc>) -> Option<Event> {
        if !self.clock.begin(now, self.total_ms(prefs)) {
            return None;
        }
        let ends_at = self.clock.ends_at()?;
        tracing::debug!(mode = %self.mode, %ends_at, "stretch started");
        Some(Event::TimerStarted {
            mode: self.mode,
            ends_at,
            at: now,
        })
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.clock.pause(now) {
            return None;
        }
        let remaining_ms = self.clock.remaining(now, 0);
        tracing::debug!(mode = %self.mode, remaining_ms, "stretch paused");
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_ms,
            at: now,
        })
    }

    /// Restart the current mode from its full duration, stopped.
    pub fn reset(&mut self, prefs: &Preferences, now: DateTime<Utc>) -> Event {
        self.reset_to(self.mode, prefs);
        tracing::debug!(mode = %self.mode, "stretch reset");
        Event::TimerReset {
            mode: self.mode,
            at: now,
        }
    }

    /// Jump straight to `mode` without crediting anything.
    pub fn switch_mode(&mut self, mode: Mode, prefs: &Preferences, now: DateTime<Utc>) -> Event {
        let from = self.mode;
        self.reset_to(mode, prefs);
        tracing::debug!(%from, to = %mode, "mode switched");
        Event::ModeSwitched {
            from,
            to: mode,
            at: now,
        }
    }

    /// Abandon the current stretch and move on. Never credits history.
    pub fn skip(
        &mut self,
        prefs: &Preferences,
        ledger: &mut HistoryLedger,
        now: DateTime<Utc>,
    ) -> Completion {
        self.complete(prefs, ledger, true, now)
    }

    /// Call periodically. Returns the completion when the running stretch has
    /// run out, preceded by an end-of-stretch chime.
    pub fn tick(
        &mut self,
        prefs: &Preferences,
        ledger: &mut HistoryLedger,
        now: DateTime<Utc>,
    ) -> Option<Completion> {
        if !self.clock.is_expired(now) {
            return None;
        }
        let mut completion = self.complete(prefs, ledger, false, now);
        completion.intents.insert(0, Intent::Chime { chime: Chime::End });
        Some(completion)
    }

    /// Finish the current stretch and enter the next one.
    ///
    /// Every path that ends a stretch (expiry, skip, reconciliation) goes
    /// through here. Only an unskipped work stretch is credited to the ledger
    /// and advances the cycle; the next mode is chosen from the advanced index.
    pub fn complete(
        &mut self,
        prefs: &Preferences,
        ledger: &mut HistoryLedger,
        was_skipped: bool,
        now: DateTime<Utc>,
    ) -> Completion {
        let finished = self.mode;
        let credited = finished == Mode::Work && !was_skipped;
        let today = local_day(now);

        if credited {
            ledger.increment(today, 1);
            self.cycle_index = advance_cycle(self.cycle_index, prefs.long_break_every());
        }
        self.today_completions = ledger.count_for(today);

        let next = next_mode(finished, self.cycle_index);
        self.reset_to(next, prefs);

        if credited {
            tracing::info!(
                cycle_index = self.cycle_index,
                today = self.today_completions,
                next = %next,
                "work stretch credited"
            );
        } else {
            tracing::debug!(finished = %finished, next = %next, was_skipped, "stretch ended");
        }

        Completion {
            event: Event::StretchCompleted {
                mode: finished,
                next_mode: next,
                skipped: was_skipped,
                credited,
                cycle_index: self.cycle_index,
                at: now,
            },
            history_delta: u32::from(credited),
            next_mode: next,
            intents: entry_intents(next, prefs),
        }
    }

    /// Re-read the cached day count from the ledger.
    pub fn refresh_today(&mut self, ledger: &HistoryLedger, now: DateTime<Utc>) {
        self.today_completions = ledger.count_for(local_day(now));
    }

    /// Re-fit the engine after preferences changed from `old` to `new`.
    ///
    /// Keeps the cycle index inside `[1, long_break_every]`. A stretch that
    /// was never begun (its remainder is still the old full duration) is
    /// resized when its mode's duration changed. A running stretch keeps its
    /// scheduled end and a mid-stretch pause keeps its remainder.
    pub fn apply_preferences(&mut self, old: &Preferences, new: &Preferences) {
        self.clamp_cycle(new);
        let old_full = duration_ms(self.mode, old);
        let new_full = duration_ms(self.mode, new);
        if let StretchClock::Paused { remaining_ms } = self.clock {
            if remaining_ms == old_full && old_full != new_full {
                tracing::debug!(mode = %self.mode, old_full, new_full, "unstarted stretch resized");
                self.reset_to(self.mode, new);
            }
        }
    }

    /// Keep the cycle index inside `[1, long_break_every]`.
    pub fn clamp_cycle(&mut self, prefs: &Preferences) {
        self.cycle_index = normalize_cycle(self.cycle_index, prefs.long_break_every());
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reset_to(&mut self, mode: Mode, prefs: &Preferences) {
        self.mode = mode;
        self.clock = StretchClock::reset_to(duration_ms(mode, prefs));
    }
}

/// Notification and chime announcing entry into `mode`.
fn entry_intents(mode: Mode, prefs: &Preferences) -> Vec<Intent> {
    let mut intents = Vec::with_capacity(2);
    if prefs.notifications.enabled {
        let minutes = mode.minutes(prefs);
        let (title, body) = match mode {
            Mode::Work => ("Back to work", format!("Focus for {minutes} minutes.")),
            Mode::Short => ("Short break", format!("Step away for {minutes} minutes.")),
            Mode::Long => ("Long break", format!("You earned {minutes} minutes off.")),
        };
        intents.push(Intent::Notify {
            title: title.to_string(),
            body,
        });
    }
    intents.push(Intent::Chime {
        chime: Chime::entering(mode),
    });
    intents
}
