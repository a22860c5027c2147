//! Service log subcommands.

use std::io::Write;

use chrono::NaiveDate;
use clap::Subcommand;

use mechcare_core::{NewLog, Repository};

#[derive(Subcommand, Debug)]
pub enum LogAction {
    /// Record a service event. A newer date also moves the machine's last maintenance date.
    Add {
        /// Machine ID
        machine_id: String,
        /// What was done
        #[arg(short, long, default_value = "")]
        notes: String,
        /// Service date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// List a machine's logs, newest first.
    List {
        /// Machine ID
        machine_id: String,
    },
}

pub async fn run(repo: &Repository, action: LogAction, out: &mut impl Write) -> anyhow::Result<()> {
    match action {
        LogAction::Add {
            machine_id,
            notes,
            date,
        } => {
            let log = repo
                .create_log(NewLog {
                    machine_id,
                    notes,
                    date,
                })
                .await?;
            writeln!(out, "Logged {} for machine {} on {}", log.id, log.machine_id, log.date)?;
        }
        LogAction::List { machine_id } => {
            let logs = repo.list_logs_for_machine(&machine_id).await?;
            if logs.is_empty() {
                writeln!(out, "No logs for machine {machine_id}")?;
                return Ok(());
            }
            writeln!(out, "{:<10}  NOTES", "DATE")?;
            for log in &logs {
                writeln!(out, "{:<10}  {}", log.date.to_string(), log.notes)?;
            }
        }
    }
    Ok(())
}
