use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::storage::Preferences;

/// The kind of stretch being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Work,
    Short,
    Long,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Work => "Focus",
            Mode::Short => "Short break",
            Mode::Long => "Long break",
        }
    }

    pub fn is_break(self) -> bool {
        self != Mode::Work
    }

    /// Configured length of this mode in minutes.
    pub fn minutes(self, prefs: &Preferences) -> i64 {
        match self {
            Mode::Work => prefs.schedule.work_minutes,
            Mode::Short => prefs.schedule.short_minutes,
            Mode::Long => prefs.schedule.long_minutes,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" | "focus" => Ok(Mode::Work),
            "short" | "short_break" => Ok(Mode::Short),
            "long" | "long_break" => Ok(Mode::Long),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

/// Length of a `mode` stretch in milliseconds.
///
/// Negative minute values (only reachable by bypassing preference clamping)
/// resolve to zero.
pub fn duration_ms(mode: Mode, prefs: &Preferences) -> u64 {
    let minutes = u64::try_from(mode.minutes(prefs)).unwrap_or(0);
    minutes.saturating_mul(60).saturating_mul(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_each_mode() {
        let prefs = Preferences::default();
        assert_eq!(duration_ms(Mode::Work, &prefs), 25 * 60_000);
        assert_eq!(duration_ms(Mode::Short, &prefs), 5 * 60_000);
        assert_eq!(duration_ms(Mode::Long, &prefs), 15 * 60_000);
    }

    #[test]
    fn negative_minutes_resolve_to_zero() {
        let mut prefs = Preferences::default();
        prefs.schedule.short_minutes = -5;
        assert_eq!(duration_ms(Mode::Short, &prefs), 0);
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("work".parse::<Mode>().unwrap(), Mode::Work);
        assert_eq!(" Short ".parse::<Mode>().unwrap(), Mode::Short);
        assert_eq!("long_break".parse::<Mode>().unwrap(), Mode::Long);
        assert!("nap".parse::<Mode>().is_err());
    }
}
