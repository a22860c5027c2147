//! Dataset export/import subcommands.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;

use mechcare_core::{Dataset, Repository};

#[derive(Subcommand, Debug)]
pub enum DataAction {
    /// Write the full dataset as JSON (to stdout when no file is given).
    Export {
        /// Destination file
        file: Option<PathBuf>,
    },
    /// Replace the full dataset with the contents of a JSON file.
    Import {
        /// Source file
        file: PathBuf,
    },
}

pub async fn run(repo: &Repository, action: DataAction, out: &mut impl Write) -> anyhow::Result<()> {
    match action {
        DataAction::Export { file } => {
            let json = serde_json::to_string_pretty(&repo.export().await?)?;
            match file {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    writeln!(out, "Exported dataset to {}", path.display())?;
                }
                None => writeln!(out, "{json}")?,
            }
        }
        DataAction::Import { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let dataset: Dataset = serde_json::from_str(&text)
                .with_context(|| format!("{} is not a MechCare dataset", file.display()))?;
            let (machines, logs) = (dataset.machines.len(), dataset.logs.len());
            repo.import(dataset).await?;
            writeln!(out, "Imported {machines} machines and {logs} logs")?;
        }
    }
    Ok(())
}
