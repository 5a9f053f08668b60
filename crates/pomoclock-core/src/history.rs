//! Per-day completion ledger.
//!
//! Keys are local calendar days, serialized as zero-padded `YYYY-MM-DD`.
//! Entries are created on first increment and only ever removed all at once
//! by [`HistoryLedger::clear_all`].

use std::collections::BTreeMap;

use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Local calendar day containing `at`.
pub fn local_day(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub completions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total: u64,
    pub today: u32,
    pub window_days: u32,
    pub window_total: u64,
    pub best_day: Option<DayCount>,
    /// Consecutive days with at least one completion, ending today (or
    /// yesterday while today is still empty).
    pub streak_days: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLedger {
    days: BTreeMap<NaiveDate, u32>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn increment(&mut self, day: NaiveDate, n: u32) {
        let count = self.days.entry(day).or_insert(0);
        *count = count.saturating_add(n);
    }

    pub fn count_for(&self, day: NaiveDate) -> u32 {
        self.days.get(&day).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.days.values().map(|&c| u64::from(c)).sum()
    }

    /// The `n` days ending at `today` inclusive, oldest first. Missing days
    /// are reported as zero.
    pub fn trailing_window(&self, n: u32, today: NaiveDate) -> Vec<DayCount> {
        (0..n)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
            .map(|date| DayCount {
                date,
                completions: self.count_for(date),
            })
            .collect()
    }

    /// Every recorded day, ascending.
    pub fn entries(&self) -> impl Iterator<Item = DayCount> + '_ {
        self.days.iter().map(|(&date, &completions)| DayCount { date, completions })
    }

    /// Rows for export. Never empty: an empty ledger yields `(today, 0)`.
    pub fn export_rows(&self, today: NaiveDate) -> Vec<DayCount> {
        if self.days.is_empty() {
            return vec![DayCount {
                date: today,
                completions: 0,
            }];
        }
        self.entries().collect()
    }

    /// Irreversibly drop every entry.
    pub fn clear_all(&mut self) {
        self.days.clear();
    }

    pub fn summary(&self, today: NaiveDate, window_days: u32) -> HistorySummary {
        let window_total = self
            .trailing_window(window_days, today)
            .iter()
            .map(|d| u64::from(d.completions))
            .sum();

        let best_day = self
            .entries()
            .filter(|d| d.completions > 0)
            // Earliest day wins ties.
            .fold(None::<DayCount>, |best, d| match best {
                Some(b) if b.completions >= d.completions => Some(b),
                _ => Some(d),
            });

        HistorySummary {
            total: self.total(),
            today: self.count_for(today),
            window_days,
            window_total,
            best_day,
            streak_days: self.streak_ending(today),
        }
    }

    fn streak_ending(&self, today: NaiveDate) -> u32 {
        let mut day = if self.count_for(today) > 0 {
            Some(today)
        } else {
            today.pred_opt()
        };
        let mut streak = 0;
        while let Some(d) = day {
            if self.count_for(d) == 0 {
                break;
            }
            streak += 1;
            day = d.pred_opt();
        }
        streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn increment_creates_and_accumulates() {
        let mut ledger = HistoryLedger::new();
        assert_eq!(ledger.count_for(d("2025-03-01")), 0);
        ledger.increment(d("2025-03-01"), 1);
        ledger.increment(d("2025-03-01"), 2);
        assert_eq!(ledger.count_for(d("2025-03-01")), 3);
        assert_eq!(ledger.total(), 3);
    }

    #[test]
    fn trailing_window_fills_gaps_oldest_first() {
        let mut ledger = HistoryLedger::new();
        ledger.increment(d("2025-02-27"), 4);
        ledger.increment(d("2025-03-01"), 1);
        ledger.increment(d("2025-01-01"), 9);

        let window = ledger.trailing_window(4, d("2025-03-01"));
        let dates: Vec<String> = window.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, ["2025-02-26", "2025-02-27", "2025-02-28", "2025-03-01"]);
        let counts: Vec<u32> = window.iter().map(|r| r.completions).collect();
        assert_eq!(counts, [0, 4, 0, 1]);

        assert!(ledger.trailing_window(0, d("2025-03-01")).is_empty());
    }

    #[test]
    fn export_of_empty_ledger_is_single_zero_row() {
        let ledger = HistoryLedger::new();
        let rows = ledger.export_rows(d("2025-06-10"));
        assert_eq!(
            rows,
            vec![DayCount {
                date: d("2025-06-10"),
                completions: 0
            }]
        );
    }

    #[test]
    fn export_is_sorted_ascending() {
        let mut ledger = HistoryLedger::new();
        ledger.increment(d("2025-06-10"), 1);
        ledger.increment(d("2024-12-31"), 2);
        ledger.increment(d("2025-01-02"), 3);
        let rows = ledger.export_rows(d("2025-06-10"));
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, [d("2024-12-31"), d("2025-01-02"), d("2025-06-10")]);
    }

    #[test]
    fn clear_all_removes_everything() {
        let mut ledger = HistoryLedger::new();
        ledger.increment(d("2025-06-10"), 1);
        ledger.clear_all();
        assert!(ledger.is_empty());
        assert_eq!(ledger.total(), 0);
    }

    #[test]
    fn serializes_as_zero_padded_day_map() {
        let mut ledger = HistoryLedger::new();
        ledger.increment(d("2025-01-05"), 2);
        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(json, r#"{"2025-01-05":2}"#);
        let back: HistoryLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }

    #[test]
    fn summary_reports_streak_and_best_day() {
        let mut ledger = HistoryLedger::new();
        ledger.increment(d("2025-03-01"), 2);
        ledger.increment(d("2025-03-02"), 5);
        ledger.increment(d("2025-03-03"), 5);
        ledger.increment(d("2025-02-20"), 1);

        let summary = ledger.summary(d("2025-03-04"), 7);
        assert_eq!(summary.total, 13);
        assert_eq!(summary.today, 0);
        assert_eq!(summary.window_total, 12);
        assert_eq!(summary.streak_days, 3);
        assert_eq!(
            summary.best_day,
            Some(DayCount {
                date: d("2025-03-02"),
                completions: 5
            })
        );

        ledger.increment(d("2025-03-04"), 1);
        assert_eq!(ledger.summary(d("2025-03-04"), 7).streak_days, 4);
        assert_eq!(ledger.summary(d("2025-03-06"), 7).streak_days, 0);
    }
}
