//! Machine subcommands: list, show, add, update, delete, runtime, status.
//!
//! User-facing output uses writeln! to the given writer (this is a CLI binary, not debug output).

use std::io::Write;

use chrono::NaiveDate;
use clap::Subcommand;

use mechcare_core::maintenance::{compute_quality, derive_status};
use mechcare_core::repository::today;
use mechcare_core::{Machine, MachineHealth, MachinePatch, NewMachine, NumericInput, Repository};

/// Machine subcommand actions.
#[derive(Subcommand, Debug)]
pub enum MachineAction {
    /// List all machines with their maintenance status.
    List,
    /// Show one machine in detail.
    Show {
        /// Machine ID
        id: String,
    },
    /// Register a new machine.
    Add {
        /// Machine name
        name: String,
        /// Machine type (e.g. "Generator")
        #[arg(short = 't', long = "type", default_value = "")]
        machine_type: String,
        /// Days between required services
        #[arg(short, long)]
        interval: u32,
        /// Owner or operator name
        #[arg(long)]
        user: Option<String>,
        /// Contact number
        #[arg(long)]
        mobile: Option<String>,
        /// Runtime already accumulated, in hours
        #[arg(long)]
        runtime_hours: Option<f64>,
        /// Last service date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        last_maintenance: Option<NaiveDate>,
    },
    /// Change fields of an existing machine.
    Update {
        /// Machine ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short = 't', long = "type")]
        machine_type: Option<String>,
        #[arg(short, long)]
        interval: Option<u32>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        mobile: Option<String>,
        #[arg(long)]
        runtime_hours: Option<f64>,
        #[arg(long)]
        last_maintenance: Option<NaiveDate>,
    },
    /// Delete a machine and all of its logs.
    Delete {
        /// Machine ID
        id: String,
    },
    /// Add operating hours to a machine.
    Runtime {
        /// Machine ID
        id: String,
        /// Hours to add
        hours: f64,
    },
    /// Show maintenance status and runtime quality.
    Status {
        /// Machine ID
        id: String,
        /// Evaluate as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

/// Execute a machine subcommand.
pub async fn run(
    repo: &Repository,
    action: MachineAction,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match action {
        MachineAction::List => list(repo, out).await,
        MachineAction::Show { id } => {
            let machine = repo.get_machine(&id).await?;
            write_detail(out, &machine)
        }
        MachineAction::Add {
            name,
            machine_type,
            interval,
            user,
            mobile,
            runtime_hours,
            last_maintenance,
        } => {
            let machine = repo
                .create_machine(NewMachine {
                    name,
                    user_name: user,
                    mobile_number: mobile,
                    machine_type,
                    interval: Some(interval.into()),
                    runtime_hours: runtime_hours.map(NumericInput::from),
                    last_maintenance,
                })
                .await?;
            writeln!(out, "Created machine {}", machine.id)?;
            write_detail(out, &machine)
        }
        MachineAction::Update {
            id,
            name,
            machine_type,
            interval,
            user,
            mobile,
            runtime_hours,
            last_maintenance,
        } => {
            let machine = repo
                .update_machine(
                    &id,
                    MachinePatch {
                        name,
                        user_name: user,
                        mobile_number: mobile,
                        machine_type,
                        interval: interval.map(NumericInput::from),
                        runtime_hours: runtime_hours.map(NumericInput::from),
                        last_maintenance,
                    },
                )
                .await?;
            writeln!(out, "Updated machine {}", machine.id)?;
            write_detail(out, &machine)
        }
        MachineAction::Delete { id } => {
            let removed_logs = repo.delete_machine(&id).await?;
            writeln!(out, "Deleted machine {id} ({removed_logs} logs removed)")?;
            Ok(())
        }
        MachineAction::Runtime { id, hours } => {
            let machine = repo
                .accumulate_runtime(&id, &NumericInput::from(hours))
                .await?;
            writeln!(
                out,
                "{}: runtime now {:.1} h",
                machine.name, machine.runtime_hours
            )?;
            Ok(())
        }
        MachineAction::Status { id, today: on } => {
            let health = repo.machine_health(&id, on.unwrap_or_else(today)).await?;
            write_health(out, &health)
        }
    }
}

async fn list(repo: &Repository, out: &mut impl Write) -> anyhow::Result<()> {
    let machines = repo.list_machines().await?;
    if machines.is_empty() {
        writeln!(out, "No machines registered")?;
        return Ok(());
    }
    let now = today();
    writeln!(
        out,
        "{:<36} {:<20} {:<12} {:<9} {:>7}",
        "ID", "NAME", "TYPE", "STATUS", "QUALITY"
    )?;
    for m in &machines {
        let status = derive_status(m, now);
        let quality = compute_quality(m);
        writeln!(
            out,
            "{:<36} {:<20} {:<12} {:<9} {:>6}%",
            m.id,
            m.name,
            m.machine_type,
            status.status.to_string(),
            quality.quality_percent
        )?;
    }
    Ok(())
}

fn write_detail(out: &mut impl Write, m: &Machine) -> anyhow::Result<()> {
    writeln!(out, "  ID:               {}", m.id)?;
    writeln!(out, "  Name:             {}", m.name)?;
    writeln!(out, "  Type:             {}", m.machine_type)?;
    if !m.user_name.is_empty() {
        writeln!(out, "  User:             {}", m.user_name)?;
    }
    if !m.mobile_number.is_empty() {
        writeln!(out, "  Mobile:           {}", m.mobile_number)?;
    }
    writeln!(out, "  Interval:         {} days", m.interval)?;
    writeln!(out, "  Runtime:          {:.1} h", m.runtime_hours)?;
    writeln!(out, "  Last maintenance: {}", m.last_maintenance)?;
    writeln!(
        out,
        "  Created:          {}",
        m.created_date.format("%Y-%m-%d %H:%M")
    )?;
    Ok(())
}

fn write_health(out: &mut impl Write, h: &MachineHealth) -> anyhow::Result<()> {
    let s = &h.status;
    let q = &h.quality;
    writeln!(out, "{} ({})", h.machine.name, h.machine.id)?;
    let when = match s.status {
        mechcare_core::Status::Overdue => format!("{} days overdue", s.days_offset),
        _ => format!("due in {} days", s.days_offset),
    };
    writeln!(out, "  Status:           {} ({when})", s.status)?;
    writeln!(out, "  Next maintenance: {}", s.next_maintenance)?;
    writeln!(
        out,
        "  Quality:          {}% ({:.2} runtime days of {})",
        q.quality_percent, q.runtime_days, h.machine.interval
    )?;
    if q.needs_maintenance {
        writeln!(out, "  Runtime limit reached: maintenance required")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mechcare_core::JsonStore;

    fn repo(dir: &tempfile::TempDir) -> Repository {
        Repository::new(JsonStore::new(dir.path().join("mechcare-data.json")))
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn add(repo: &Repository, name: &str) -> Machine {
        let mut out = Vec::new();
        run(
            repo,
            MachineAction::Add {
                name: name.into(),
                machine_type: "Tractor".into(),
                interval: 30,
                user: None,
                mobile: None,
                runtime_hours: None,
                last_maintenance: Some(date("2024-01-01")),
            },
            &mut out,
        )
        .await
        .unwrap();
        repo.list_machines().await.unwrap().pop().unwrap()
    }

    #[tokio::test]
    async fn list_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        run(&repo(&dir), MachineAction::List, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No machines registered\n");
    }

    #[tokio::test]
    async fn add_then_list_shows_row() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        let m = add(&repo, "Tractor 1").await;

        let mut out = Vec::new();
        run(&repo, MachineAction::List, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&m.id));
        assert!(text.contains("Tractor 1"));
    }

    #[tokio::test]
    async fn status_reports_due_soon_on_due_date() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        let m = add(&repo, "T").await;

        let mut out = Vec::new();
        run(
            &repo,
            MachineAction::Status {
                id: m.id,
                today: Some(date("2024-01-31")),
            },
            &mut out,
        )
        .await
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Due Soon (due in 0 days)"), "{text}");
        assert!(text.contains("Quality:          100%"), "{text}");
    }

    #[tokio::test]
    async fn runtime_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        let m = add(&repo, "T").await;

        let mut out = Vec::new();
        run(
            &repo,
            MachineAction::Runtime {
                id: m.id.clone(),
                hours: 12.0,
            },
            &mut out,
        )
        .await
        .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("runtime now 12.0 h"));

        let mut out = Vec::new();
        run(&repo, MachineAction::Delete { id: m.id.clone() }, &mut out)
            .await
            .unwrap();
        let err = run(&repo, MachineAction::Delete { id: m.id }, &mut Vec::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
