//! Machine and service log entities, plus the inputs that create and patch them.
//!
//! Field names serialize in camelCase so the persisted document keeps the
//! layout the web frontend already reads and writes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// A tracked piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(rename = "type", default)]
    pub machine_type: String,
    /// Days between required services.
    pub interval: u32,
    #[serde(default)]
    pub runtime_hours: f64,
    pub last_maintenance: NaiveDate,
    pub created_date: DateTime<Utc>,
}

/// A maintenance record tied to one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub id: String,
    pub machine_id: String,
    #[serde(default)]
    pub notes: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

/// The whole persisted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub machines: Vec<Machine>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl Dataset {
    pub fn machine(&self, id: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == id)
    }

    pub fn machine_mut(&mut self, id: &str) -> Option<&mut Machine> {
        self.machines.iter_mut().find(|m| m.id == id)
    }
}

/// A numeric form field. HTML forms post numbers as strings, so both
/// `30` and `"30"` are accepted; anything else fails validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Parse to a float. Blank text yields `None`.
    fn value(&self, field: &str) -> Result<Option<f64>> {
        match self {
            Self::Number(n) => Ok(Some(*n)),
            Self::Text(s) if s.trim().is_empty() => Ok(None),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| Error::Validation(format!("{field} must be a number, got {s:?}"))),
        }
    }
}

impl From<f64> for NumericInput {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for NumericInput {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

/// Validate a service interval: a whole number of days, at least one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_interval(input: Option<&NumericInput>) -> Result<u32> {
    let value = match input {
        Some(v) => v.value("interval")?,
        None => None,
    }
    .ok_or_else(|| Error::Validation("interval is required".into()))?;

    if !value.is_finite() || value.fract() != 0.0 {
        return Err(Error::Validation(format!(
            "interval must be a whole number of days, got {value}"
        )));
    }
    if value < 1.0 {
        return Err(Error::Validation(format!(
            "interval must be at least 1 day, got {value}"
        )));
    }
    if value > f64::from(u32::MAX) {
        return Err(Error::Validation(format!("interval is too large: {value}")));
    }
    Ok(value as u32)
}

/// Validate an hour count. Absent or blank input yields `None`.
pub fn parse_hours(field: &str, input: Option<&NumericInput>) -> Result<Option<f64>> {
    let Some(input) = input else {
        return Ok(None);
    };
    let Some(value) = input.value(field)? else {
        return Ok(None);
    };
    if !value.is_finite() {
        return Err(Error::Validation(format!("{field} must be finite")));
    }
    if value < 0.0 {
        return Err(Error::Validation(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(Some(value))
}

/// Accepts a `YYYY-MM-DD` string, treating null or an empty string as absent.
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Input for creating a machine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMachine {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(rename = "type", default)]
    pub machine_type: String,
    #[serde(default)]
    pub interval: Option<NumericInput>,
    #[serde(default)]
    pub runtime_hours: Option<NumericInput>,
    #[serde(alias = "lastServiceDate", default, deserialize_with = "lenient_date")]
    pub last_maintenance: Option<NaiveDate>,
}

/// Shallow patch for a machine. `None` leaves the field unchanged; `id`
/// and `createdDate` cannot be patched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachinePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(rename = "type", default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub interval: Option<NumericInput>,
    #[serde(default)]
    pub runtime_hours: Option<NumericInput>,
    #[serde(alias = "lastServiceDate", default, deserialize_with = "lenient_date")]
    pub last_maintenance: Option<NaiveDate>,
}

/// Input for recording a service event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLog {
    pub machine_id: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
}

impl Machine {
    /// Build a machine from validated input.
    pub fn from_input(
        id: String,
        input: NewMachine,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let interval = parse_interval(input.interval.as_ref())?;
        let runtime_hours = parse_hours("runtimeHours", input.runtime_hours.as_ref())?;
        Ok(Self {
            id,
            name: input.name,
            user_name: input.user_name.unwrap_or_default(),
            mobile_number: input.mobile_number.unwrap_or_default(),
            machine_type: input.machine_type,
            interval,
            runtime_hours: runtime_hours.unwrap_or(0.0),
            last_maintenance: input.last_maintenance.unwrap_or(today),
            created_date: now,
        })
    }

    /// Merge a patch. Every field is validated before any is written, so a
    /// rejected patch leaves the machine untouched.
    pub fn apply_patch(&mut self, patch: MachinePatch) -> Result<()> {
        let interval = match patch.interval.as_ref() {
            Some(v) => Some(parse_interval(Some(v))?),
            None => None,
        };
        let runtime_hours = parse_hours("runtimeHours", patch.runtime_hours.as_ref())?;

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(user_name) = patch.user_name {
            self.user_name = user_name;
        }
        if let Some(mobile_number) = patch.mobile_number {
            self.mobile_number = mobile_number;
        }
        if let Some(machine_type) = patch.machine_type {
            self.machine_type = machine_type;
        }
        if let Some(interval) = interval {
            self.interval = interval;
        }
        if let Some(hours) = runtime_hours {
            self.runtime_hours = hours;
        }
        if let Some(date) = patch.last_maintenance {
            self.last_maintenance = date;
        }
        Ok(())
    }
}

impl Log {
    pub fn from_input(id: String, input: NewLog, today: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            machine_id: input.machine_id,
            notes: input.notes,
            date: input.date.unwrap_or(today),
            timestamp: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_input() -> NewMachine {
        NewMachine {
            name: "Lathe".into(),
            machine_type: "CNC".into(),
            interval: Some(30u32.into()),
            ..NewMachine::default()
        }
    }

    #[test]
    fn interval_accepts_numeric_string() {
        let v = NumericInput::Text(" 45 ".into());
        assert_eq!(parse_interval(Some(&v)).unwrap(), 45);
    }

    #[test]
    fn interval_rejects_garbage_zero_and_fractions() {
        for bad in [
            NumericInput::Text("abc".into()),
            NumericInput::Number(0.0),
            NumericInput::Number(-3.0),
            NumericInput::Number(2.5),
            NumericInput::Text(String::new()),
        ] {
            assert!(
                matches!(parse_interval(Some(&bad)), Err(Error::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(parse_interval(None).is_err());
    }

    #[test]
    fn hours_blank_is_absent_and_negative_rejected() {
        assert_eq!(
            parse_hours("h", Some(&NumericInput::Text("  ".into()))).unwrap(),
            None
        );
        assert_eq!(
            parse_hours("h", Some(&NumericInput::Text("12.5".into()))).unwrap(),
            Some(12.5)
        );
        assert!(parse_hours("h", Some(&NumericInput::Number(-1.0))).is_err());
    }

    #[test]
    fn from_input_applies_defaults() {
        let today = date("2024-03-10");
        let now = Utc::now();
        let m = Machine::from_input("m1".into(), sample_input(), today, now).unwrap();
        assert_eq!(m.last_maintenance, today);
        assert_eq!(m.runtime_hours, 0.0);
        assert_eq!(m.user_name, "");
        assert_eq!(m.created_date, now);
    }

    #[test]
    fn new_machine_deserializes_form_payload() {
        let input: NewMachine = serde_json::from_str(
            r#"{"name":"Press","type":"Hydraulic","interval":"14","runtimeHours":"",
                "lastServiceDate":"2024-02-01"}"#,
        )
        .unwrap();
        let m = Machine::from_input("m1".into(), input, date("2024-03-01"), Utc::now()).unwrap();
        assert_eq!(m.interval, 14);
        assert_eq!(m.runtime_hours, 0.0);
        assert_eq!(m.last_maintenance, date("2024-02-01"));
    }

    #[test]
    fn rejected_patch_leaves_machine_untouched() {
        let mut m =
            Machine::from_input("m1".into(), sample_input(), date("2024-01-01"), Utc::now())
                .unwrap();
        let before = m.clone();
        let patch = MachinePatch {
            name: Some("Renamed".into()),
            interval: Some(NumericInput::Text("soon".into())),
            ..MachinePatch::default()
        };
        assert!(m.apply_patch(patch).is_err());
        assert_eq!(m, before);
    }

    #[test]
    fn patch_preserves_unspecified_fields() {
        let mut m =
            Machine::from_input("m1".into(), sample_input(), date("2024-01-01"), Utc::now())
                .unwrap();
        m.apply_patch(MachinePatch {
            mobile_number: Some("555-0100".into()),
            ..MachinePatch::default()
        })
        .unwrap();
        assert_eq!(m.mobile_number, "555-0100");
        assert_eq!(m.name, "Lathe");
        assert_eq!(m.interval, 30);
    }

    #[test]
    fn patch_rejects_overflowing_runtime() {
        let mut m =
            Machine::from_input("m1".into(), sample_input(), date("2024-01-01"), Utc::now())
                .unwrap();
        let before = m.clone();
        let err = m
            .apply_patch(MachinePatch {
                name: Some("Renamed".into()),
                runtime_hours: Some(NumericInput::Text("1e309".into())),
                ..MachinePatch::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(m, before);
    }

    #[test]
    fn machine_serializes_camel_case() {
        let m = Machine::from_input("m1".into(), sample_input(), date("2024-01-01"), Utc::now())
            .unwrap();
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["type"], "CNC");
        assert_eq!(v["lastMaintenance"], "2024-01-01");
        assert!(v.get("runtimeHours").is_some());
        assert!(v.get("createdDate").is_some());
    }

    #[test]
    fn dataset_missing_arrays_default_to_empty() {
        let ds: Dataset = serde_json::from_str("{}").unwrap();
        assert!(ds.machines.is_empty());
        assert!(ds.logs.is_empty());
    }
}
