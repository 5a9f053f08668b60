//! TOML-based user preferences.
//!
//! Stores:
//! - Stretch durations and the long-break cadence
//! - Sound level for chimes
//! - Notification toggle
//! - Branding (theme color, logo URL)
//!
//! Preferences are stored at `<data_dir>/preferences.toml`. Every value is
//! clamped into its valid range on load and on save, so a hand-edited file can
//! never hand the cycle sequencer a zero divisor.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};

pub const WORK_MINUTES_RANGE: RangeInclusive<i64> = 1..=120;
pub const BREAK_MINUTES_RANGE: RangeInclusive<i64> = 1..=60;
pub const LONG_BREAK_EVERY_RANGE: RangeInclusive<i64> = 2..=12;

const FILE_NAME: &str = "preferences.toml";

/// Stretch durations and cycle length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: i64,
    #[serde(default = "default_short_minutes")]
    pub short_minutes: i64,
    #[serde(default = "default_long_minutes")]
    pub long_minutes: i64,
    /// Number of counted work stretches between long breaks.
    #[serde(default = "default_long_break_every")]
    pub long_break_every: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundLevel {
    Off,
    Quiet,
    #[default]
    Normal,
    Loud,
}

impl SoundLevel {
    pub fn is_off(self) -> bool {
        self == SoundLevel::Off
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default)]
    pub level: SoundLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Cosmetic settings. Applying them is up to whatever renders the timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingConfig {
    #[serde(default = "default_theme_color")]
    pub theme_color: String,
    #[serde(default)]
    pub logo_url: String,
}

/// User preferences.
///
/// Serialized to/from TOML at `<data_dir>/preferences.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub branding: BrandingConfig,
}

fn default_work_minutes() -> i64 {
    25
}
fn default_short_minutes() -> i64 {
    5
}
fn default_long_minutes() -> i64 {
    15
}
fn default_long_break_every() -> i64 {
    4
}
fn default_true() -> bool {
    true
}
fn default_theme_color() -> String {
    "#e74c3c".into()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_minutes: default_short_minutes(),
            long_minutes: default_long_minutes(),
            long_break_every: default_long_break_every(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            theme_color: default_theme_color(),
            logo_url: String::new(),
        }
    }
}

fn clamp_logged(field: &str, value: i64, range: &RangeInclusive<i64>) -> i64 {
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        tracing::warn!(field, value, clamped, "preference out of range, clamped");
    }
    clamped
}

impl Preferences {
    /// Clamp every numeric field into its valid range.
    pub fn normalized(mut self) -> Self {
        let s = &mut self.schedule;
        s.work_minutes = clamp_logged("schedule.work_minutes", s.work_minutes, &WORK_MINUTES_RANGE);
        s.short_minutes =
            clamp_logged("schedule.short_minutes", s.short_minutes, &BREAK_MINUTES_RANGE);
        s.long_minutes = clamp_logged("schedule.long_minutes", s.long_minutes, &BREAK_MINUTES_RANGE);
        s.long_break_every = clamp_logged(
            "schedule.long_break_every",
            s.long_break_every,
            &LONG_BREAK_EVERY_RANGE,
        );
        self.branding.theme_color = self.branding.theme_color.trim().to_string();
        self.branding.logo_url = self.branding.logo_url.trim().to_string();
        self
    }

    /// Cycle length as the sequencer consumes it. Never zero.
    pub fn long_break_every(&self) -> u32 {
        u32::try_from(self.schedule.long_break_every.max(1)).unwrap_or(u32::MAX)
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join(FILE_NAME))
    }

    /// Load from `<data_dir>/preferences.toml`.
    ///
    /// # Errors
    /// Only fails when the data directory cannot be resolved; an unreadable or
    /// malformed file yields the defaults.
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(&Self::path()?))
    }

    /// Load from an explicit path, falling back to defaults on any problem.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read preferences, using defaults");
                return Self::default();
            }
        };
        match toml::from_str::<Preferences>(&content) {
            Ok(prefs) => prefs.normalized(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "malformed preferences, using defaults");
                Self::default()
            }
        }
    }

    /// Persist to `<data_dir>/preferences.toml`.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path. Values are clamped before writing.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let normalized = self.clone().normalized();
        let content = toml::to_string_pretty(&normalized).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown().into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => {
                    let parsed = value.trim().parse::<bool>().map_err(|e| {
                        ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: e.to_string(),
                        }
                    })?;
                    serde_json::Value::Bool(parsed)
                }
                serde_json::Value::Number(_) => match coerce_integer(value) {
                    Some(n) => serde_json::Value::Number(n.into()),
                    None => {
                        tracing::warn!(key, value, "non-numeric input ignored, keeping current value");
                        existing.clone()
                    }
                },
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: "not a leaf value".into(),
                    }
                    .into());
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown().into())
    }

    /// Get a preference value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a preference by dot-separated key, clamping the result.
    ///
    /// Does not persist; call [`Preferences::save`] afterwards.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, a boolean cannot be parsed, or
    /// a string does not name a valid variant (e.g. `sound.level`).
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Preferences =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        *self = updated.normalized();
        Ok(())
    }
}

/// Lenient integer parse: accepts decimals (rounded) and signed input.
fn coerce_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
    Some(f.round().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}
