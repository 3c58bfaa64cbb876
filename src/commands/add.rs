//! `add`: append a branch line to the service directory.

use std::path::PathBuf;

use tracing::info;

use super::CommandResult;
use crate::services::ServiceRecord;
use crate::storage::JsonStore;

#[derive(Debug, Clone)]
pub struct AddConfig {
    pub file: PathBuf,
    pub record: ServiceRecord,
}

fn apply(config: &AddConfig) -> CommandResult {
    let record = &config.record;
    if record.location.trim().is_empty() {
        return Err("Location cannot be empty".into());
    }
    if record.lan_ip.trim().is_empty() {
        return Err("LAN IP cannot be empty".into());
    }

    let store = JsonStore::<ServiceRecord>::new(&config.file);
    if store.load()?.iter().any(|r| r.has_lan_ip(&record.lan_ip)) {
        return Err(format!("A record with LAN IP '{}' already exists", record.lan_ip).into());
    }

    store.add(record.clone())?;
    info!(lan_ip = %record.lan_ip, file = %config.file.display(), "service record added");
    Ok(())
}

pub fn run(config: AddConfig) -> CommandResult {
    apply(&config)?;
    println!(
        "✅ Added {} (LAN IP {}).",
        config.record.location, config.record.lan_ip
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::FieldValue;
    use crate::test_utils::sample_services;

    fn record(location: &str, lan_ip: &str) -> ServiceRecord {
        ServiceRecord {
            location: location.to_string(),
            lan_ip: lan_ip.to_string(),
            bandwidth: FieldValue::from("10 Mbps"),
            ..ServiceRecord::default()
        }
    }

    fn setup(record: ServiceRecord) -> (tempfile::TempDir, AddConfig) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("services.json");
        JsonStore::<ServiceRecord>::new(&file).save(&sample_services()).unwrap();
        (dir, AddConfig { file, record })
    }

    fn load(config: &AddConfig) -> Vec<ServiceRecord> {
        JsonStore::<ServiceRecord>::new(&config.file).load().unwrap()
    }

    #[test]
    fn test_add_appends_record() {
        let (_dir, config) = setup(record("Merkato Branch", "10.20.9.1"));

        apply(&config).unwrap();

        let records = load(&config);
        assert_eq!(records.len(), 3);
        assert_eq!(records[2], config.record);
        assert_eq!(records[..2], sample_services()[..]);
    }

    #[test]
    fn test_add_to_missing_file_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let config = AddConfig {
            file: dir.path().join("services.json"),
            record: record("Merkato Branch", "10.20.9.1"),
        };

        apply(&config).unwrap();
        assert_eq!(load(&config), vec![config.record.clone()]);
    }

    #[test]
    fn test_duplicate_lan_ip_is_rejected() {
        let (_dir, config) = setup(record("Bole Annex", " 10.20.1.1 "));

        let err = apply(&config).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(load(&config), sample_services());
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let (_dir, config) = setup(record("  ", "10.20.9.1"));
        assert!(apply(&config).is_err());

        let (_dir, config) = setup(record("Merkato Branch", ""));
        assert!(apply(&config).is_err());
        assert_eq!(load(&config), sample_services());
    }
}
