//! `delete`: drop the service records that carry a given LAN IP.

use std::path::PathBuf;

use tracing::info;

use super::CommandResult;
use crate::services::ServiceRecord;
use crate::storage::JsonStore;

#[derive(Debug, Clone)]
pub struct DeleteConfig {
    pub file: PathBuf,
    pub lan_ip: String,
}

/// Delete the matching records and return how many were removed.
fn apply(config: &DeleteConfig) -> CommandResult<usize> {
    if !config.file.exists() {
        return Err(format!("Service file {} not found", config.file.display()).into());
    }

    let store = JsonStore::<ServiceRecord>::new(&config.file);
    let removed = store.delete(|r| r.has_lan_ip(&config.lan_ip))?;
    if removed == 0 {
        return Err(format!("No record found with LAN IP '{}'", config.lan_ip).into());
    }

    info!(lan_ip = %config.lan_ip, removed, "service records deleted");
    Ok(removed)
}

pub fn run(config: DeleteConfig) -> CommandResult {
    let removed = apply(&config)?;
    println!(
        "🗑️ {} record(s) with LAN IP {} deleted.",
        removed, config.lan_ip
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_services;

    fn setup(lan_ip: &str) -> (tempfile::TempDir, DeleteConfig) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("services.json");
        JsonStore::<ServiceRecord>::new(&file).save(&sample_services()).unwrap();
        (
            dir,
            DeleteConfig {
                file,
                lan_ip: lan_ip.to_string(),
            },
        )
    }

    fn load(config: &DeleteConfig) -> Vec<ServiceRecord> {
        JsonStore::<ServiceRecord>::new(&config.file).load().unwrap()
    }

    #[test]
    fn test_delete_by_lan_ip() {
        let (_dir, config) = setup("10.20.1.1");

        assert_eq!(apply(&config).unwrap(), 1);
        assert_eq!(load(&config), vec![sample_services().remove(1)]);
    }

    #[test]
    fn test_no_matching_record() {
        let (_dir, config) = setup("10.99.0.1");

        let err = apply(&config).unwrap_err();
        assert!(err.to_string().contains("No record found"));
        assert_eq!(load(&config), sample_services());
    }

    #[test]
    fn test_missing_file() {
        let (dir, mut config) = setup("10.20.1.1");
        config.file = dir.path().join("other.json");

        assert!(apply(&config).is_err());
        assert!(!config.file.exists());
    }
}
