use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use pomoclock_core::DayCount;
use serde_json::json;

use crate::context::open_controller;

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Completions recorded today
    Today,
    /// Per-day completions for the trailing window, oldest first
    Window {
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Totals, best day and current streak
    Stats {
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Export every recorded day
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Delete all history (irreversible)
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

fn to_csv(rows: &[DayCount]) -> String {
    let mut csv = String::from("date,completions\n");
    for row in rows {
        csv.push_str(&format!("{},{}\n", row.date, row.completions));
    }
    csv
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut ctl, _) = open_controller()?;

    match action {
        HistoryAction::Today => {
            let out = json!({
                "date": ctl.today(),
                "completions": ctl.today_completions(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        HistoryAction::Window { days } => {
            println!("{}", serde_json::to_string_pretty(&ctl.history_window(days))?);
        }
        HistoryAction::Stats { days } => {
            println!("{}", serde_json::to_string_pretty(&ctl.history_summary(days))?);
        }
        HistoryAction::Export { format, output } => {
            let rows = ctl.export_history();
            let content = match format {
                ExportFormat::Csv => to_csv(&rows),
                ExportFormat::Json => serde_json::to_string_pretty(&rows)? + "\n",
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    eprintln!("exported {} row(s) to {}", rows.len(), path.display());
                }
                None => print!("{content}"),
            }
        }
        HistoryAction::Clear { yes } => {
            if !yes {
                return Err("refusing to clear history without --yes".into());
            }
            let event = ctl.clear_history()?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_has_header_and_one_line_per_day() {
        let rows = vec![
            DayCount {
                date: "2025-01-02".parse().unwrap(),
                completions: 3,
            },
            DayCount {
                date: "2025-01-05".parse().unwrap(),
                completions: 0,
            },
        ];
        assert_eq!(
            to_csv(&rows),
            "date,completions\n2025-01-02,3\n2025-01-05,0\n"
        );
    }
}
