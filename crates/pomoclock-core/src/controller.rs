//! The single owner of timer state.
//!
//! A [`Controller`] holds preferences, the timer engine, the history ledger,
//! the store they persist to, and the source of "now". Each user action maps
//! to one method, and every method that changes state writes the affected
//! records back before returning.

use chrono::{DateTime, NaiveDate, Utc};

use crate::effects::Frame;
use crate::error::Result;
use crate::events::Event;
use crate::history::{local_day, DayCount, HistoryLedger, HistorySummary};
use crate::storage::{load_json, save_json, KvStore, Preferences, HISTORY_KEY, TIMER_STATE_KEY};
use crate::time_source::TimeSource;
use crate::timer::{Completion, Mode, Reconciliation, TimerEngine};

pub struct Controller<S: KvStore, T: TimeSource> {
    prefs: Preferences,
    engine: TimerEngine,
    ledger: HistoryLedger,
    store: S,
    time: T,
    reconciliation: Option<Reconciliation>,
}

impl<S: KvStore, T: TimeSource> Controller<S, T> {
    /// Load persisted records and settle them against the current instant.
    ///
    /// Missing or malformed records start fresh. An expired running stretch is
    /// completed once; see [`Controller::take_reconciliation`].
    ///
    /// # Errors
    /// Only store failures propagate.
    pub fn load(store: S, prefs: Preferences, time: T) -> Result<Self> {
        let prefs = prefs.normalized();
        let now = time.now();

        let stored_engine = load_json::<TimerEngine>(&store, TIMER_STATE_KEY)?;
        let needs_write = stored_engine.is_none();
        let mut engine = stored_engine.unwrap_or_else(|| TimerEngine::new(&prefs));
        let mut ledger = load_json::<HistoryLedger>(&store, HISTORY_KEY)?.unwrap_or_default();

        engine.clamp_cycle(&prefs);
        let reconciliation = engine.reconcile(&prefs, &mut ledger, now);

        let controller = Self {
            prefs,
            engine,
            ledger,
            store,
            time,
            reconciliation,
        };
        if controller.reconciliation.is_some() {
            controller.persist_all()?;
        } else if needs_write {
            controller.persist_timer()?;
        }
        Ok(controller)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now(&self) -> DateTime<Utc> {
        self.time.now()
    }

    pub fn today(&self) -> NaiveDate {
        local_day(self.now())
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn remaining_ms(&self) -> u64 {
        self.engine.remaining_ms(&self.prefs, self.now())
    }

    pub fn today_completions(&self) -> u32 {
        self.ledger.count_for(self.today())
    }

    /// What happened during [`Controller::load`], handed out once.
    pub fn take_reconciliation(&mut self) -> Option<Reconciliation> {
        self.reconciliation.take()
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot(&self.prefs, &self.ledger, self.now())
    }

    pub fn frame(&self) -> Frame {
        Frame {
            remaining_ms: self.remaining_ms(),
            mode: self.engine.mode(),
            running: self.engine.is_running(),
            cycle_index: self.engine.cycle_index(),
            long_break_every: self.prefs.long_break_every(),
            today_completions: self.today_completions(),
        }
    }

    pub fn history_window(&self, days: u32) -> Vec<DayCount> {
        self.ledger.trailing_window(days, self.today())
    }

    pub fn history_summary(&self, days: u32) -> HistorySummary {
        self.ledger.summary(self.today(), days)
    }

    /// Every ledger row ascending; `(today, 0)` when empty.
    pub fn export_history(&self) -> Vec<DayCount> {
        self.ledger.export_rows(self.today())
    }

    // ── Actions ──────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<Option<Event>> {
        let event = self.engine.start(&self.prefs, self.now());
        if event.is_some() {
            self.persist_timer()?;
        }
        Ok(event)
    }

    pub fn pause(&mut self) -> Result<Option<Event>> {
        let event = self.engine.pause(self.now());
        if event.is_some() {
            self.persist_timer()?;
        }
        Ok(event)
    }

    pub fn reset(&mut self) -> Result<Event> {
        let event = self.engine.reset(&self.prefs, self.now());
        self.persist_timer()?;
        Ok(event)
    }

    pub fn skip(&mut self) -> Result<Completion> {
        let now = self.now();
        let completion = self.engine.skip(&self.prefs, &mut self.ledger, now);
        self.persist_all()?;
        Ok(completion)
    }

    pub fn switch_mode(&mut self, mode: Mode) -> Result<Event> {
        let event = self.engine.switch_mode(mode, &self.prefs, self.now());
        self.persist_timer()?;
        Ok(event)
    }

    /// Re-read the timer and history records from the store.
    ///
    /// Picks up transitions written by another process since this controller
    /// last loaded or wrote them. A missing or malformed record leaves the
    /// in-memory copy as it is.
    pub fn refresh(&mut self) -> Result<()> {
        if let Some(engine) = load_json::<TimerEngine>(&self.store, TIMER_STATE_KEY)? {
            self.engine = engine;
            self.engine.clamp_cycle(&self.prefs);
        }
        if let Some(ledger) = load_json::<HistoryLedger>(&self.store, HISTORY_KEY)? {
            self.ledger = ledger;
        }
        let now = self.now();
        self.engine.refresh_today(&self.ledger, now);
        Ok(())
    }

    /// Poll for expiry. Cheap when nothing is due.
    pub fn tick(&mut self) -> Result<Option<Completion>> {
        let now = self.now();
        let Some(completion) = self.engine.tick(&self.prefs, &mut self.ledger, now) else {
            return Ok(None);
        };
        self.persist_all()?;
        Ok(Some(completion))
    }

    /// Adopt new preferences (already persisted by the caller).
    pub fn apply_preferences(&mut self, prefs: Preferences) -> Result<()> {
        let old = std::mem::replace(&mut self.prefs, prefs.normalized());
        self.engine.apply_preferences(&old, &self.prefs);
        self.persist_timer()
    }

    /// Irreversibly empty the history ledger.
    pub fn clear_history(&mut self) -> Result<Event> {
        let now = self.now();
        self.ledger.clear_all();
        self.engine.refresh_today(&self.ledger, now);
        self.persist_all()?;
        tracing::info!("history cleared");
        Ok(Event::HistoryCleared { at: now })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn persist_timer(&self) -> Result<()> {
        save_json(&self.store, TIMER_STATE_KEY, &self.engine)
    }

    /// Ledger and timer record are written as one unit.
    fn persist_all(&self) -> Result<()> {
        let history = serde_json::to_string(&self.ledger)?;
        let timer = serde_json::to_string(&self.engine)?;
        self.store
            .kv_set_many(&[(HISTORY_KEY, history.as_str()), (TIMER_STATE_KEY, timer.as_str())])
    }
}
