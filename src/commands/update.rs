//! `update`: set one field on the service records that carry a given LAN IP.

use std::path::PathBuf;

use tracing::info;

use super::CommandResult;
use crate::services::{ServiceField, ServiceRecord};
use crate::storage::{JsonStore, StorageError};

#[derive(Debug, Clone)]
pub struct UpdateConfig {
    pub file: PathBuf,
    pub lan_ip: String,
    pub key: String,
    pub value: String,
}

/// Apply the update and return how many records changed.
fn apply(config: &UpdateConfig) -> CommandResult<usize> {
    let field: ServiceField = config.key.parse()?;
    if !config.file.exists() {
        return Err(format!("Service file {} not found", config.file.display()).into());
    }

    let store = JsonStore::<ServiceRecord>::new(&config.file);
    match store.update(
        |r| r.has_lan_ip(&config.lan_ip),
        |r| r.set(field, &config.value),
    ) {
        Ok(updated) => {
            info!(lan_ip = %config.lan_ip, ?field, updated, "service records updated");
            Ok(updated)
        }
        Err(StorageError::NoMatch) => {
            Err(format!("No record found with LAN IP '{}'", config.lan_ip).into())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn run(config: UpdateConfig) -> CommandResult {
    let updated = apply(&config)?;
    println!(
        "✅ {} record(s) with LAN IP {} updated successfully.",
        updated, config.lan_ip
    );
    Ok(())
}
