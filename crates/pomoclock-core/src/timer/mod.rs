mod clock;
mod cycle;
mod engine;
mod mode;
mod reconcile;
mod state;

pub use clock::StretchClock;
pub use cycle::{advance_cycle, next_mode, normalize_cycle};
pub use engine::{Completion, TimerEngine};
pub use mode::{duration_ms, Mode};
pub use reconcile::Reconciliation;
pub use state::TimerState;
