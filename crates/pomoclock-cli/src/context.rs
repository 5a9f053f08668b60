//! Opening the controller for one CLI invocation.

use pomoclock_core::{dispatch, Controller, Database, Event, Preferences, SystemTimeSource};

use crate::sinks::{TerminalBell, TerminalNotifier};

pub type CliController = Controller<Database, SystemTimeSource>;

/// Load preferences and persisted state, reconciling anything that expired
/// since the last invocation. Returns the reconciliation event, if any.
pub fn open_controller() -> Result<(CliController, Option<Event>), Box<dyn std::error::Error>> {
    let prefs = Preferences::load()?;
    let db = Database::open()?;
    let mut ctl = Controller::load(db, prefs, SystemTimeSource)?;

    let reconciled = ctl.take_reconciliation().map(|rec| {
        dispatch(
            &rec.completion.intents,
            ctl.prefs(),
            &mut TerminalNotifier,
            &mut TerminalBell,
        );
        rec.event
    });
    Ok((ctl, reconciled))
}
