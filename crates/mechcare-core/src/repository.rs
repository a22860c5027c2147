//! CRUD over machines and logs, with the cross-entity rules.
//!
//! Every operation reloads the dataset, applies its change in memory and
//! writes the whole document back, all while holding the store lock. That
//! lock is the only path to the [`JsonStore`], so concurrent callers can
//! never interleave two load/save pairs and drop an update.

use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::maintenance::MachineHealth;
use crate::model::{
    Dataset, Log, Machine, MachinePatch, NewLog, NewMachine, NumericInput, parse_hours,
};
use crate::store::JsonStore;

pub struct Repository {
    store: Mutex<JsonStore>,
}

impl Repository {
    pub fn new(store: JsonStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Open the repository, creating the data directory if needed.
    pub async fn open(store: JsonStore) -> Result<Self> {
        store.ensure_dir().await?;
        info!(path = %store.path().display(), "Dataset store ready");
        Ok(Self::new(store))
    }

    async fn read<T>(&self, f: impl FnOnce(&Dataset) -> Result<T>) -> Result<T> {
        let store = self.store.lock().await;
        let data = store.load().await?;
        f(&data)
    }

    /// Load, mutate and persist under the lock. Nothing is written when
    /// `f` fails.
    async fn mutate<T>(&self, f: impl FnOnce(&mut Dataset) -> Result<T>) -> Result<T> {
        let store = self.store.lock().await;
        let mut data = store.load().await?;
        let out = f(&mut data)?;
        store.save(&data).await?;
        Ok(out)
    }

    pub async fn list_machines(&self) -> Result<Vec<Machine>> {
        self.read(|data| Ok(data.machines.clone())).await
    }

    pub async fn get_machine(&self, id: &str) -> Result<Machine> {
        self.read(|data| {
            data.machine(id)
                .cloned()
                .ok_or_else(|| Error::machine_not_found(id))
        })
        .await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_machine(&self, input: NewMachine) -> Result<Machine> {
        let machine = Machine::from_input(new_id(), input, today(), Utc::now())?;
        let created = machine.clone();
        self.mutate(move |data| {
            data.machines.push(machine);
            Ok(())
        })
        .await?;
        info!(machine_id = %created.id, interval = created.interval, "Machine created");
        Ok(created)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_machine(&self, id: &str, patch: MachinePatch) -> Result<Machine> {
        let updated = self
            .mutate(|data| {
                let machine = data
                    .machine_mut(id)
                    .ok_or_else(|| Error::machine_not_found(id))?;
                machine.apply_patch(patch)?;
                Ok(machine.clone())
            })
            .await?;
        info!(machine_id = %id, "Machine updated");
        Ok(updated)
    }

    /// Delete a machine and every log that references it. Returns the
    /// number of logs removed with it.
    #[instrument(skip(self))]
    pub async fn delete_machine(&self, id: &str) -> Result<usize> {
        let removed_logs = self
            .mutate(|data| {
                let index = data
                    .machines
                    .iter()
                    .position(|m| m.id == id)
                    .ok_or_else(|| Error::machine_not_found(id))?;
                data.machines.remove(index);
                let before = data.logs.len();
                data.logs.retain(|l| l.machine_id != id);
                Ok(before - data.logs.len())
            })
            .await?;
        info!(machine_id = %id, removed_logs, "Machine deleted");
        Ok(removed_logs)
    }

    /// Logs for one machine, newest service date first. Logs sharing a
    /// date keep their insertion order. An unknown machine has no logs.
    pub async fn list_logs_for_machine(&self, machine_id: &str) -> Result<Vec<Log>> {
        self.read(|data| {
            let mut logs: Vec<Log> = data
                .logs
                .iter()
                .filter(|l| l.machine_id == machine_id)
                .cloned()
                .collect();
            logs.sort_by(|a, b| b.date.cmp(&a.date));
            Ok(logs)
        })
        .await
    }

    pub async fn list_logs(&self) -> Result<Vec<Log>> {
        self.read(|data| Ok(data.logs.clone())).await
    }

    /// Record a service event. A log dated after the machine's last
    /// maintenance moves that date forward; older logs never move it back.
    /// Logs for unknown machines are stored as-is.
    #[instrument(skip(self, input), fields(machine_id = %input.machine_id))]
    pub async fn create_log(&self, input: NewLog) -> Result<Log> {
        let log = Log::from_input(new_id(), input, today(), Utc::now());
        let created = log.clone();
        let advanced = self
            .mutate(move |data| {
                let advanced = match data.machine_mut(&log.machine_id) {
                    Some(machine) if log.date > machine.last_maintenance => {
                        machine.last_maintenance = log.date;
                        true
                    }
                    Some(_) => false,
                    None => {
                        debug!(machine_id = %log.machine_id, "Log references unknown machine");
                        false
                    }
                };
                data.logs.push(log);
                Ok(advanced)
            })
            .await?;
        info!(log_id = %created.id, date = %created.date, advanced, "Log recorded");
        Ok(created)
    }

    /// Add operating hours to a machine's runtime.
    #[instrument(skip(self, hours))]
    pub async fn accumulate_runtime(&self, id: &str, hours: &NumericInput) -> Result<Machine> {
        let hours = parse_hours("hours", Some(hours))?
            .ok_or_else(|| Error::Validation("hours is required".into()))?;
        self.mutate(|data| {
            let machine = data
                .machine_mut(id)
                .ok_or_else(|| Error::machine_not_found(id))?;
            let total = machine.runtime_hours + hours;
            if !total.is_finite() {
                return Err(Error::Validation(format!(
                    "runtime of machine {id} would overflow"
                )));
            }
            machine.runtime_hours = total;
            Ok(machine.clone())
        })
        .await
    }

    pub async fn machine_health(&self, id: &str, today: NaiveDate) -> Result<MachineHealth> {
        let machine = self.get_machine(id).await?;
        Ok(MachineHealth::new(machine, today))
    }

    pub async fn export(&self) -> Result<Dataset> {
        self.read(|data| Ok(data.clone())).await
    }

    /// Replace the whole dataset. The document is taken verbatim.
    #[instrument(skip(self, dataset), fields(machines = dataset.machines.len(), logs = dataset.logs.len()))]
    pub async fn import(&self, dataset: Dataset) -> Result<()> {
        let store = self.store.lock().await;
        store.save(&dataset).await?;
        info!("Dataset imported");
        Ok(())
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The current calendar date (UTC).
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
