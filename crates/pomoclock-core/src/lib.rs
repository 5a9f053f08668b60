//! # pomoclock Core Library
//!
//! Business logic for the pomoclock interval timer: work / short-break /
//! long-break stretches, persisted across restarts as wall-clock instants,
//! feeding a per-day completion history. The `pomoclock` CLI is a thin shell
//! over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a wall-clock-based state machine. Every operation takes
//!   "now" explicitly; the caller polls `tick()` for expiry.
//! - **Reconciliation**: on load, a stretch that expired unobserved is
//!   completed exactly once.
//! - **History**: per-day completion counts with trailing-window queries.
//! - **Storage**: SQLite key-value records for timer state and history, TOML
//!   for preferences.
//! - **Effects**: notifications and chimes are returned as [`Intent`]s and
//!   carried out by sinks in [`effects`].
//!
//! ## Key Components
//!
//! - [`Controller`]: owns all state and persists after every transition
//! - [`TimerEngine`]: core timer state machine
//! - [`HistoryLedger`]: completion history
//! - [`Preferences`]: user configuration

pub mod controller;
pub mod effects;
pub mod error;
pub mod events;
pub mod history;
pub mod storage;
pub mod time_source;
pub mod timer;

pub use controller::Controller;
pub use effects::{dispatch, AudioSink, Frame, NotificationSink, RenderSink};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{Chime, Event, Intent};
pub use history::{local_day, DayCount, HistoryLedger, HistorySummary};
pub use storage::{Database, KvStore, MemoryStore, Preferences, SoundLevel};
pub use time_source::{ManualTimeSource, SystemTimeSource, TimeSource};
pub use timer::{Completion, Mode, Reconciliation, StretchClock, TimerEngine, TimerState};
