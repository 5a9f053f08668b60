//! Cycle sequencing: which mode follows which, and where in the cycle we are.

use super::mode::Mode;

/// Mode that follows `current`.
///
/// `cycle_index` must already reflect any advance for the stretch that just
/// finished: after a work stretch the cycle wraps back to 1 exactly when the
/// long break is due.
pub fn next_mode(current: Mode, cycle_index: u32) -> Mode {
    match current {
        Mode::Work if cycle_index == 1 => Mode::Long,
        Mode::Work => Mode::Short,
        Mode::Short | Mode::Long => Mode::Work,
    }
}

/// Position after one more counted work stretch: `(cycle_index mod n) + 1`.
///
/// A zero `long_break_every` is rejected by preference clamping upstream and
/// is treated as 1 here.
pub fn advance_cycle(cycle_index: u32, long_break_every: u32) -> u32 {
    cycle_index % long_break_every.max(1) + 1
}

/// Pull a persisted index back into `[1, long_break_every]`.
pub fn normalize_cycle(cycle_index: u32, long_break_every: u32) -> u32 {
    cycle_index.clamp(1, long_break_every.max(1))
}
