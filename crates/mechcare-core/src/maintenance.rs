//! Derived maintenance views: calendar status and runtime quality.
//!
//! Everything here is a pure function of a [`Machine`] and, for status,
//! the current date. Nothing is persisted.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::model::Machine;

/// Days before the due date at which a machine counts as due soon.
pub const DUE_SOON_WINDOW_DAYS: i64 = 7;

const HOURS_PER_DAY: f64 = 24.0;

/// Urgency classification derived from time since last service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Healthy,
    DueSoon,
    Overdue,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::DueSoon => write!(f, "Due Soon"),
            Self::Overdue => write!(f, "Overdue"),
        }
    }
}

/// Presentation hint paired with a [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub status: Status,
    /// Days until due, or days past due when overdue.
    pub days_offset: i64,
    pub severity: Severity,
    pub next_maintenance: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub quality_percent: u8,
    pub runtime_hours: f64,
    /// Rounded to two decimals.
    pub runtime_days: f64,
    pub needs_maintenance: bool,
}

/// Combined status and quality view of one machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineHealth {
    pub machine: Machine,
    pub status: StatusReport,
    pub quality: QualityReport,
}

impl MachineHealth {
    pub fn new(machine: Machine, today: NaiveDate) -> Self {
        let status = derive_status(&machine, today);
        let quality = compute_quality(&machine);
        Self {
            machine,
            status,
            quality,
        }
    }
}

/// Convert operating hours to 24-hour days.
pub fn hours_to_days(hours: f64) -> f64 {
    hours / HOURS_PER_DAY
}

/// Classify a machine by how far `today` is from its next service date.
///
/// The due date itself is `DueSoon` with offset 0; the day after is
/// `Overdue` with offset 1.
pub fn derive_status(machine: &Machine, today: NaiveDate) -> StatusReport {
    let next_maintenance = machine
        .last_maintenance
        .checked_add_days(Days::new(u64::from(machine.interval)))
        .unwrap_or(NaiveDate::MAX);
    let diff_days = (next_maintenance - today).num_days();

    let (status, days_offset, severity) = if diff_days < 0 {
        (Status::Overdue, diff_days.abs(), Severity::Danger)
    } else if diff_days <= DUE_SOON_WINDOW_DAYS {
        (Status::DueSoon, diff_days, Severity::Warning)
    } else {
        (Status::Healthy, diff_days, Severity::Success)
    };

    StatusReport {
        status,
        days_offset,
        severity,
        next_maintenance,
    }
}

/// Score a machine by accumulated runtime relative to its interval.
///
/// A zero interval (only reachable through imported data) scores 0 and
/// always needs maintenance.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn compute_quality(machine: &Machine) -> QualityReport {
    let runtime_days = hours_to_days(machine.runtime_hours);
    let interval = f64::from(machine.interval);

    let (quality, needs_maintenance) = if machine.interval == 0 {
        (0.0, true)
    } else if runtime_days == 0.0 {
        (100.0, false)
    } else {
        (
            (100.0 - runtime_days / interval * 100.0).max(0.0),
            runtime_days >= interval,
        )
    };

    QualityReport {
        quality_percent: quality.round().clamp(0.0, 100.0) as u8,
        runtime_hours: machine.runtime_hours,
        runtime_days: (runtime_days * 100.0).round() / 100.0,
        needs_maintenance,
    }
}
