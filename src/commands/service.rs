//! `service`: look up branch lines in the service directory by any field.

use std::path::PathBuf;

use colored::Colorize;

use super::CommandResult;
use crate::services::{SearchMode, ServiceRecord, search};
use crate::storage::JsonStore;

#[derive(Debug, Clone)]
pub struct ServiceSearchConfig {
    pub file: PathBuf,
    pub term: String,
    pub mode: SearchMode,
}

fn render_record(record: &ServiceRecord) -> String {
    let header = format!(
        "{} {}",
        format!("- {}", record.location).green().bold(),
        format!("({})", record.wan_ip).green().bold()
    );
    let line = format!(
        "  {} {} | {} {} | {} {} | {} {}",
        "LAN:".cyan().bold(),
        record.lan_ip.yellow(),
        "Conn:".cyan().bold(),
        record.connection_type.yellow(),
        "BW:".cyan().bold(),
        record.bandwidth.display().yellow(),
        "Line:".cyan().bold(),
        record.line_type.yellow(),
    );
    let numbers = format!(
        "  {} {} | {} {}",
        "Service #:".cyan().bold(),
        record.service_number.display().yellow(),
        "Account #:".cyan().bold(),
        record.account_number.display().yellow(),
    );
    format!("{}\n{}\n{}\n", header, line, numbers)
}

/// Load the directory and return the matching records.
fn find(config: &ServiceSearchConfig) -> CommandResult<Vec<ServiceRecord>> {
    if config.term.trim().is_empty() {
        return Err("Please provide a search term using -s".into());
    }
    if !config.file.exists() {
        return Err(format!("Service file {} not found", config.file.display()).into());
    }

    let records = JsonStore::<ServiceRecord>::new(&config.file).load()?;
    Ok(search(&records, &config.term, config.mode)
        .into_iter()
        .cloned()
        .collect())
}

pub fn run(config: ServiceSearchConfig) -> CommandResult {
    let matches = find(&config)?;
    if matches.is_empty() {
        println!("❌ No matches found.");
        return Ok(());
    }

    println!("🔍 Found {} matching service(s):\n", matches.len());
    for record in &matches {
        println!("{}", render_record(record));
    }
    Ok(())
}
