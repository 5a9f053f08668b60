//! Reconciliation of a loaded timer against the current instant.
//!
//! A running stretch whose end passed while nothing was observing it is
//! completed exactly once, no matter how long ago it ended. Stretches that
//! would have followed it are not replayed.

use chrono::{DateTime, Utc};

use super::clock::StretchClock;
use super::engine::{Completion, TimerEngine};
use crate::events::Event;
use crate::history::HistoryLedger;
use crate::storage::Preferences;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub event: Event,
    /// How long the stretch had been over when it was discovered.
    pub overdue_ms: u64,
    pub completion: Completion,
}

impl TimerEngine {
    /// Settle a freshly loaded engine at `now`.
    ///
    /// Stopped stretches and stretches still in flight are left as they are
    /// (a running one keeps running). An expired one is credited as a natural
    /// completion and the engine ends up stopped in the next mode.
    pub fn reconcile(
        &mut self,
        prefs: &Preferences,
        ledger: &mut HistoryLedger,
        now: DateTime<Utc>,
    ) -> Option<Reconciliation> {
        self.refresh_today(ledger, now);

        let StretchClock::Running { ends_at, .. } = self.clock else {
            return None;
        };
        if ends_at > now {
            tracing::debug!(%ends_at, "stretch still in flight");
            return None;
        }

        let overdue_ms = u64::try_from((now - ends_at).num_milliseconds()).unwrap_or(0);
        let finished = self.mode;
        let completion = self.complete(prefs, ledger, false, now);
        // complete() leaves the next stretch stopped; make sure nothing resumes.
        if self.clock.is_running() {
            self.clock.pause(now);
        }

        tracing::info!(
            mode = %finished,
            next = %completion.next_mode,
            overdue_ms,
            "expired stretch reconciled"
        );

        Some(Reconciliation {
            event: Event::Reconciled {
                mode: finished,
                next_mode: completion.next_mode,
                overdue_ms,
                at: now,
            },
            overdue_ms,
            completion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::local_day;
    use crate::timer::Mode;
    use chrono::{Duration, TimeZone};

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn stopped_engine_is_untouched() {
        let prefs = Preferences::default();
        let mut ledger = HistoryLedger::new();
        let mut engine = TimerEngine::new(&prefs);
        let before = engine.clone();
        assert!(engine.reconcile(&prefs, &mut ledger, t(10_000_000)).is_none());
        assert_eq!(engine, before);
    }

    #[test]
    fn in_flight_stretch_keeps_running() {
        let prefs = Preferences::default();
        let mut ledger = HistoryLedger::new();
        let mut engine = TimerEngine::new(&prefs);
        engine.start(&prefs, t(0));
        assert!(engine.reconcile(&prefs, &mut ledger, t(60_000)).is_none());
        assert!(engine.is_running());
        assert_eq!(engine.remaining_ms(&prefs, t(60_000)), 1_440_000);
    }

    #[test]
    fn expired_stretch_is_credited_once() {
        let prefs = Preferences::default();
        for absence in [Duration::minutes(1), Duration::days(10)] {
            let mut ledger = HistoryLedger::new();
            let mut engine = TimerEngine::new(&prefs);
            engine.start(&prefs, t(0));
            let now = t(1_500_000) + absence;

            let rec = engine.reconcile(&prefs, &mut ledger, now).unwrap();
            assert_eq!(rec.completion.history_delta, 1);
            assert_eq!(rec.overdue_ms, absence.num_milliseconds() as u64);
            assert_eq!(ledger.total(), 1);
            assert_eq!(ledger.count_for(local_day(now)), 1);
            assert_eq!(engine.cycle_index(), 2);
            assert_eq!(engine.mode(), Mode::Short);
            assert!(!engine.is_running());
        }
    }

    #[test]
    fn expiry_exactly_at_now_counts() {
        let prefs = Preferences::default();
        let mut ledger = HistoryLedger::new();
        let mut engine = TimerEngine::new(&prefs);
        engine.start(&prefs, t(0));
        let rec = engine.reconcile(&prefs, &mut ledger, t(1_500_000)).unwrap();
        assert_eq!(rec.overdue_ms, 0);
        assert_eq!(ledger.total(), 1);
    }

    #[test]
    fn record_without_start_is_settled_by_its_end() {
        let prefs = Preferences::default();
        let mut ledger = HistoryLedger::new();
        let mut engine: TimerEngine = serde_json::from_value(serde_json::json!({
            "mode": "work",
            "running": true,
            "ends_at": t(1_500_000),
            "cycle_index": 1,
        }))
        .unwrap();
        assert_eq!(engine.clock().started_at(), Some(t(1_500_000)));

        let rec = engine.reconcile(&prefs, &mut ledger, t(2_000_000)).unwrap();
        assert_eq!(rec.overdue_ms, 500_000);
        assert_eq!(ledger.total(), 1);
        assert!(engine.reconcile(&prefs, &mut ledger, t(2_000_001)).is_none());
    }

    #[test]
    fn second_reconcile_is_a_noop() {
        let prefs = Preferences::default();
        let mut ledger = HistoryLedger::new();
        let mut engine = TimerEngine::new(&prefs);
        engine.start(&prefs, t(0));
        engine.reconcile(&prefs, &mut ledger, t(9_000_000));
        assert!(engine.reconcile(&prefs, &mut ledger, t(9_000_001)).is_none());
        assert_eq!(ledger.total(), 1);
    }
}
