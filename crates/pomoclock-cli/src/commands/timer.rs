use std::time::Duration;

use clap::Subcommand;
use pomoclock_core::{dispatch, Completion, Event, Intent, Mode, RenderSink};
use serde::Serialize;

use crate::context::{open_controller, CliController};
use crate::sinks::{TerminalBell, TerminalNotifier, TerminalRenderer};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the current stretch
    Start,
    /// Pause the current stretch
    Pause,
    /// Restart the current mode from its full duration
    Reset,
    /// Abandon the current stretch and move to the next mode
    Skip,
    /// Switch directly to a mode (work, short, long)
    Mode {
        mode: Mode,
    },
    /// Check for expiry and print the current state as JSON
    Status,
    /// Run a live countdown until interrupted
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, default_value = "250")]
        interval_ms: u64,
        /// Exit after the first stretch completes
        #[arg(long)]
        exit_on_complete: bool,
    },
}

#[derive(Serialize)]
struct TimerOutput {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    events: Vec<Event>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    intents: Vec<Intent>,
    snapshot: Event,
}

fn perform(ctl: &CliController, completion: &Completion) {
    dispatch(
        &completion.intents,
        ctl.prefs(),
        &mut TerminalNotifier,
        &mut TerminalBell,
    );
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut ctl, reconciled) = open_controller()?;
    let mut events: Vec<Event> = reconciled.into_iter().collect();
    let mut intents = Vec::new();

    match action {
        TimerAction::Start => events.extend(ctl.start()?),
        TimerAction::Pause => events.extend(ctl.pause()?),
        TimerAction::Reset => events.push(ctl.reset()?),
        TimerAction::Skip => {
            let completion = ctl.skip()?;
            perform(&ctl, &completion);
            events.push(completion.event);
            intents = completion.intents;
        }
        TimerAction::Mode { mode } => events.push(ctl.switch_mode(mode)?),
        TimerAction::Status => {
            if let Some(completion) = ctl.tick()? {
                perform(&ctl, &completion);
                events.push(completion.event);
                intents = completion.intents;
            }
        }
        TimerAction::Watch {
            interval_ms,
            exit_on_complete,
        } => return watch(ctl, interval_ms, exit_on_complete),
    }

    let output = TimerOutput {
        events,
        intents,
        snapshot: ctl.snapshot(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Poll the controller on a fixed interval, rendering every tick.
///
/// Runs on a single-threaded runtime; Ctrl-C drops the interval and returns.
fn watch(
    mut ctl: CliController,
    interval_ms: u64,
    exit_on_complete: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms.max(10)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut renderer = TerminalRenderer;
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                _ = interval.tick() => {
                    // Other invocations may have paused, reset or skipped meanwhile.
                    ctl.refresh()?;
                    if let Some(completion) = ctl.tick()? {
                        println!();
                        perform(&ctl, &completion);
                        tracing::info!(next = %completion.next_mode, "stretch completed");
                        if exit_on_complete {
                            renderer.render(&ctl.frame());
                            break;
                        }
                    }
                    renderer.render(&ctl.frame());
                }
            }
        }
        println!();
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
