use clap::Subcommand;
use pomoclock_core::Preferences;

use crate::context::open_controller;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a preference value
    Get {
        /// Dot-separated key (e.g. "schedule.work_minutes", "sound.level")
        key: String,
    },
    /// Set a preference value (numbers are clamped into range)
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// List all preferences
    List,
    /// Reset preferences to defaults
    Reset,
    /// Print the preferences file location
    Path,
}

/// Persist `prefs` and let the timer adopt them.
///
/// The controller is opened before saving so it still holds the previous
/// preferences to compare against.
fn save_and_apply(prefs: Preferences) -> Result<(), Box<dyn std::error::Error>> {
    let (mut ctl, _) = open_controller()?;
    prefs.save()?;
    ctl.apply_preferences(prefs)?;
    Ok(())
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let prefs = Preferences::load()?;
            match prefs.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut prefs = Preferences::load()?;
            prefs.set(&key, &value)?;
            let stored = prefs.get(&key).unwrap_or_default();
            save_and_apply(prefs)?;
            println!("{key} = {stored}");
        }
        ConfigAction::List => {
            let prefs = Preferences::load()?;
            println!("{}", serde_json::to_string_pretty(&prefs)?);
        }
        ConfigAction::Reset => {
            save_and_apply(Preferences::default())?;
            println!("preferences reset to defaults");
        }
        ConfigAction::Path => {
            println!("{}", Preferences::path()?.display());
        }
    }
    Ok(())
}
