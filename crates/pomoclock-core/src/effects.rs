//! Side-effect adapters.
//!
//! The timer core returns [`Intent`]s as data. This module is the thin shell
//! that hands them to whatever notification and audio capability exists.
//! A sink that cannot deliver is skipped silently: effects are never fatal
//! and never retried.

use serde::Serialize;
use thiserror::Error;

use crate::events::{Chime, Intent};
use crate::storage::{Preferences, SoundLevel};
use crate::timer::Mode;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

pub trait NotificationSink {
    fn notify(&mut self, title: &str, body: &str) -> Result<(), SinkError>;
}

/// Plays chimes. Volume and pattern are chosen from `level`; `Off` never
/// reaches a sink.
pub trait AudioSink {
    fn chime(&mut self, chime: Chime, level: SoundLevel) -> Result<(), SinkError>;
}

/// What a renderer receives on every tick or state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub remaining_ms: u64,
    pub mode: Mode,
    pub running: bool,
    pub cycle_index: u32,
    pub long_break_every: u32,
    pub today_completions: u32,
}

pub trait RenderSink {
    fn render(&mut self, frame: &Frame);
}

/// Sink that drops everything, for front ends without a capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _title: &str, _body: &str) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("notifications".into()))
    }
}

impl AudioSink for NullSink {
    fn chime(&mut self, _chime: Chime, _level: SoundLevel) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("audio".into()))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub delivered: usize,
    pub suppressed: usize,
}

/// Perform `intents` in order.
pub fn dispatch(
    intents: &[Intent],
    prefs: &Preferences,
    notifier: &mut dyn NotificationSink,
    audio: &mut dyn AudioSink,
) -> DispatchReport {
    let mut report = DispatchReport::default();
    for intent in intents {
        let outcome = match intent {
            Intent::Notify { .. } if !prefs.notifications.enabled => None,
            Intent::Notify { title, body } => Some(notifier.notify(title, body)),
            Intent::Chime { .. } if prefs.sound.level.is_off() => None,
            Intent::Chime { chime } => Some(audio.chime(*chime, prefs.sound.level)),
        };
        match outcome {
            Some(Ok(())) => report.delivered += 1,
            Some(Err(e)) => {
                tracing::debug!(error = %e, ?intent, "side effect suppressed");
                report.suppressed += 1;
            }
            None => report.suppressed += 1,
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        notes: Vec<(String, String)>,
        chimes: Vec<(Chime, SoundLevel)>,
    }

    impl NotificationSink for Recorder {
        fn notify(&mut self, title: &str, body: &str) -> Result<(), SinkError> {
            self.notes.push((title.into(), body.into()));
            Ok(())
        }
    }

    impl AudioSink for Recorder {
        fn chime(&mut self, chime: Chime, level: SoundLevel) -> Result<(), SinkError> {
            self.chimes.push((chime, level));
            Ok(())
        }
    }

    fn intents() -> Vec<Intent> {
        vec![
            Intent::Chime { chime: Chime::End },
            Intent::Notify {
                title: "Short break".into(),
                body: "Step away for 5 minutes.".into(),
            },
            Intent::Chime { chime: Chime::Break },
        ]
    }

    #[test]
    fn delivers_in_order_at_configured_level() {
        let mut prefs = Preferences::default();
        prefs.sound.level = SoundLevel::Loud;
        let mut notes = Recorder::default();
        let mut audio = Recorder::default();
        let report = dispatch(&intents(), &prefs, &mut notes, &mut audio);
        assert_eq!(report.delivered, 3);
        assert_eq!(notes.notes.len(), 1);
        assert_eq!(
            audio.chimes,
            vec![(Chime::End, SoundLevel::Loud), (Chime::Break, SoundLevel::Loud)]
        );
    }

    #[test]
    fn sound_off_suppresses_chimes() {
        let mut prefs = Preferences::default();
        prefs.sound.level = SoundLevel::Off;
        let mut notes = Recorder::default();
        let mut audio = Recorder::default();
        let report = dispatch(&intents(), &prefs, &mut notes, &mut audio);
        assert!(audio.chimes.is_empty());
        assert_eq!(report.delivered, 1);
        assert_eq!(report.suppressed, 2);
    }

    #[test]
    fn unavailable_sinks_are_not_fatal() {
        let prefs = Preferences::default();
        let report = dispatch(&intents(), &prefs, &mut NullSink, &mut NullSink);
        assert_eq!(report.delivered, 0);
        assert_eq!(report.suppressed, 3);
    }
}
