//! Terminal implementations of the effect sinks.

use std::io::{IsTerminal, Write};

use pomoclock_core::effects::SinkError;
use pomoclock_core::{AudioSink, Chime, Frame, NotificationSink, RenderSink, SoundLevel};

/// Prints notifications to stderr.
pub struct TerminalNotifier;

impl NotificationSink for TerminalNotifier {
    fn notify(&mut self, title: &str, body: &str) -> Result<(), SinkError> {
        eprintln!("[{title}] {body}");
        Ok(())
    }
}

/// Rings the terminal bell: once for quiet, twice for normal, three times
/// for loud.
pub struct TerminalBell;

impl AudioSink for TerminalBell {
    fn chime(&mut self, chime: Chime, level: SoundLevel) -> Result<(), SinkError> {
        let mut stderr = std::io::stderr();
        if !stderr.is_terminal() {
            return Err(SinkError::Unavailable("stderr is not a terminal".into()));
        }
        let rings = match level {
            SoundLevel::Off => 0,
            SoundLevel::Quiet => 1,
            SoundLevel::Normal => 2,
            SoundLevel::Loud => 3,
        };
        // The end-of-stretch chime is one ring longer than the others.
        let rings = if chime == Chime::End && rings > 0 {
            rings + 1
        } else {
            rings
        };
        stderr
            .write_all("\x07".repeat(rings).as_bytes())
            .and_then(|()| stderr.flush())
            .map_err(|e| SinkError::Unavailable(e.to_string()))
    }
}

/// Redraws one status line in place.
pub struct TerminalRenderer;

impl RenderSink for TerminalRenderer {
    fn render(&mut self, frame: &Frame) {
        let mut stdout = std::io::stdout();
        let state = if frame.running { "" } else { " (paused)" };
        let _ = write!(
            stdout,
            "\r{:<12} {}  cycle {}/{}  today {}{state}\x1b[K",
            frame.mode.label(),
            format_mm_ss(frame.remaining_ms),
            frame.cycle_index,
            frame.long_break_every,
            frame.today_completions,
        );
        let _ = stdout.flush();
    }
}

/// `mm:ss`, rounding partial seconds up so `00:00` only shows at expiry.
pub fn format_mm_ss(remaining_ms: u64) -> String {
    let secs = remaining_ms.div_ceil(1000);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
