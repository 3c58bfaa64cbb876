//! `report`: classify every ATM in the list, print a colored status per ATM and a
//! summary, then write the report file.

use std::path::PathBuf;
use std::sync::Arc;

use colored::{ColoredString, Colorize};
use tracing::info;

use super::CommandResult;
use crate::config::ProbeConfig;
use crate::connectivity::{
    ClassificationResult, ConnectivityStatus, classify_all, classify_concurrent,
};
use crate::machines::load_machines;
use crate::prober::{Prober, build_prober};
use crate::writer::{ReportFormat, write_report};

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub machines_path: PathBuf,
    pub output: PathBuf,
    pub exclude_offline: bool,
    pub exclude_online: bool,
    /// Overrides the format implied by the output extension
    pub format: Option<ReportFormat>,
    pub probe: ProbeConfig,
}

/// Per-status counts printed after the run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub online: usize,
    pub only_fallback: usize,
    pub offline: usize,
}

impl Summary {
    fn record(&mut self, status: ConnectivityStatus) {
        match status {
            ConnectivityStatus::Online => self.online += 1,
            ConnectivityStatus::OnlyFallback => self.only_fallback += 1,
            ConnectivityStatus::Offline => self.offline += 1,
        }
    }
}

/// Drop Online results when asked to and count what is left.
fn tally(
    results: Vec<ClassificationResult>,
    exclude_online: bool,
) -> (Vec<ClassificationResult>, Summary) {
    let mut summary = Summary::default();
    let kept: Vec<ClassificationResult> = results
        .into_iter()
        .filter(|r| !(exclude_online && r.status == ConnectivityStatus::Online))
        .collect();
    for r in &kept {
        summary.record(r.status);
    }
    (kept, summary)
}

fn colored_status(status: ConnectivityStatus) -> ColoredString {
    match status {
        ConnectivityStatus::Online => status.as_str().green(),
        ConnectivityStatus::OnlyFallback => status.as_str().yellow(),
        ConnectivityStatus::Offline => status.as_str().red(),
    }
}

pub async fn run(config: ReportConfig) -> CommandResult {
    let prober = build_prober(&config.probe);
    execute(&config, prober).await
}

async fn execute(config: &ReportConfig, prober: Arc<dyn Prober + Send + Sync>) -> CommandResult {
    let machines = load_machines(&config.machines_path)?;
    info!(
        count = machines.len(),
        method = %config.probe.method,
        concurrency = config.probe.concurrency,
        "classifying ATMs"
    );

    let results = if config.probe.concurrency <= 1 {
        tokio::task::spawn_blocking(move || classify_all(&machines, prober.as_ref())).await?
    } else {
        classify_concurrent(machines, prober, config.probe.concurrency).await
    };

    let (results, summary) = tally(results, config.exclude_online);
    for r in &results {
        println!("- {} ({}) → {}", r.name, r.address, colored_status(r.status));
    }

    println!("\nSummary:");
    println!("🟢 Online: {}", summary.online.to_string().green());
    println!("🟡 OnlyADSL: {}", summary.only_fallback.to_string().yellow());
    println!("🔴 Offline: {}\n", summary.offline.to_string().red());

    let format = config
        .format
        .unwrap_or_else(|| ReportFormat::from_path(&config.output));
    write_report(&results, &config.output, format, config.exclude_offline)?;
    info!(output = %config.output.display(), %format, "report written");
    println!("✅ Results written to {}", config.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::Endpoint;
    use crate::machines::save_machines;
    use crate::test_utils::{RecordingProber, sample_fleet};

    fn config(dir: &std::path::Path, output: &str, concurrency: usize) -> ReportConfig {
        ReportConfig {
            machines_path: dir.join("atms.json"),
            output: dir.join(output),
            exclude_offline: false,
            exclude_online: false,
            format: None,
            probe: ProbeConfig {
                concurrency,
                ..ProbeConfig::default()
            },
        }
    }

    fn fleet_prober() -> Arc<dyn Prober + Send + Sync> {
        Arc::new(RecordingProber::reachable(&["10.1.0.10", "10.1.0.19", "10.1.2.0"]))
    }

    #[test]
    fn test_tally_counts() {
        let results = vec![
            ClassificationResult::new(&Endpoint::new("A", "1"), ConnectivityStatus::Online),
            ClassificationResult::new(&Endpoint::new("B", "2"), ConnectivityStatus::Offline),
            ClassificationResult::new(&Endpoint::new("C", "3"), ConnectivityStatus::OnlyFallback),
        ];

        let (kept, summary) = tally(results.clone(), false);
        assert_eq!(kept.len(), 3);
        assert_eq!(
            summary,
            Summary {
                online: 1,
                only_fallback: 1,
                offline: 1,
            }
        );

        let (kept, summary) = tally(results, true);
        assert_eq!(kept.len(), 2);
        assert_eq!(summary.online, 0);
    }

    #[tokio::test]
    async fn test_report_end_to_end_json() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), "results.json", 1);
        save_machines(&sample_fleet(), &config.machines_path).unwrap();

        execute(&config, fleet_prober()).await.unwrap();

        let written: Vec<ClassificationResult> =
            serde_json::from_str(&std::fs::read_to_string(&config.output).unwrap()).unwrap();
        let statuses: Vec<_> = written.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                ConnectivityStatus::Online,
                ConnectivityStatus::OnlyFallback,
                ConnectivityStatus::Offline,
                ConnectivityStatus::OnlyFallback,
            ]
        );
    }

    #[tokio::test]
    async fn test_report_concurrent_txt_without_online() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), "ping_results.txt", 4);
        config.exclude_online = true;
        config.exclude_offline = true;
        save_machines(&sample_fleet(), &config.machines_path).unwrap();

        execute(&config, fleet_prober()).await.unwrap();

        let written = std::fs::read_to_string(&config.output).unwrap();
        assert_eq!(written, "OnlyADSL:\nATM-B, ATM-D\n\nOnlyADSL:\nATM-B\nATM-D\n\n");
    }

    #[tokio::test]
    async fn test_explicit_format_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), "results.out", 1);
        config.format = Some(ReportFormat::Csv);
        save_machines(&sample_fleet(), &config.machines_path).unwrap();

        execute(&config, fleet_prober()).await.unwrap();

        let written = std::fs::read_to_string(&config.output).unwrap();
        assert!(written.starts_with("Name,IP,Status\nATM-A,10.1.0.10,Online\n"));
    }

    #[tokio::test]
    async fn test_report_missing_list_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), "results.json", 1);

        assert!(execute(&config, fleet_prober()).await.is_err());
        assert!(!config.output.exists());
    }
}
