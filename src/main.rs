//! atmer: ping an ATM fleet, classify each machine as Online, OnlyADSL or Offline and
//! write a connectivity report. Also manages the ATM list and the service directory.

mod commands;
mod config;
mod connectivity;
mod logging;
mod machines;
mod prober;
mod services;
mod storage;
#[cfg(test)]
mod test_utils;
mod writer;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::CommandResult;
use commands::add::AddConfig;
use commands::delete::DeleteConfig;
use commands::manage::ManageConfig;
use commands::report::ReportConfig;
use commands::service::ServiceSearchConfig;
use commands::update::UpdateConfig;
use config::ProbeConfig;
use prober::ProbeMethod;
use services::{FieldValue, SearchMode, ServiceRecord};
use writer::ReportFormat;

#[derive(Parser)]
#[command(name = "atmer", version)]
#[command(about = "Ping ATMs and generate connectivity reports from Excel data")]
#[command(long_about = "Checks every ATM's primary IP; when it does not answer, the modem \
just below it is pinged to tell DSL-only sites (OnlyADSL) from dead ones (Offline). \
Results are printed and written to a txt, json, csv or xlsx report.")]
struct Cli {
    /// Log probe-level detail to stderr (RUST_LOG overrides)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate ATM connectivity report from the ATM list
    Report {
        /// Path to the ATM list (.xlsx, .csv or .json)
        #[arg(short, long, default_value = "atms.xlsx")]
        path: PathBuf,

        /// Output file; its extension selects the format
        #[arg(short, long, default_value = "ping_results.txt")]
        output: PathBuf,

        /// Output format, overriding the extension
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,

        /// Exclude offline ATMs from the report
        #[arg(long)]
        no_offline: bool,

        /// Exclude online ATMs from the report
        #[arg(long)]
        no_online: bool,

        /// How probes are sent
        #[arg(long, value_enum, default_value_t = ProbeMethod::Ping)]
        method: ProbeMethod,

        /// Per-probe reply timeout [env: ATMER_PROBE_TIMEOUT_MS]
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// ATMs probed at once [env: ATMER_CONCURRENCY]
        #[arg(short, long)]
        concurrency: Option<usize>,
    },

    /// Interactive menu to view, search, add, edit, or delete ATMs
    Manage {
        /// Path to the ATM list (.xlsx, .csv or .json)
        #[arg(short, long, default_value = "atms.xlsx")]
        path: PathBuf,
    },

    /// Search service details by partial match on any field
    Service {
        /// Search term
        #[arg(short, long, default_value = "")]
        search: String,

        /// Path to the service directory JSON file
        #[arg(short, long, default_value = "services.json")]
        file: PathBuf,

        /// How the term is matched against each field
        #[arg(short, long, value_enum, default_value_t = SearchMode::Substring)]
        mode: SearchMode,
    },

    /// Update a service record field, selecting records by LAN IP
    Update {
        /// Path to the service directory JSON file
        #[arg(short, long, default_value = "services.json")]
        file: PathBuf,

        /// LAN IP of the record(s) to update
        #[arg(short = 'm', long = "match")]
        lan_ip: String,

        /// Field to update (location, wanip, lanip, connectiontype, bandwidth,
        /// linetype, servicenumber, accountnumber)
        #[arg(short, long)]
        key: String,

        /// New value for the field
        #[arg(short, long)]
        value: String,
    },

    /// Add a service record to the service directory
    Add {
        /// Path to the service directory JSON file
        #[arg(short, long, default_value = "services.json")]
        file: PathBuf,

        /// Branch or site name
        #[arg(short, long)]
        location: String,

        #[arg(short, long, default_value = "")]
        wan_ip: String,

        /// LAN IP; must not already be in the directory
        #[arg(short = 'i', long)]
        lan_ip: String,

        /// Connection type, e.g. Fiber or ADSL
        #[arg(short, long, default_value = "")]
        connection_type: String,

        #[arg(short, long)]
        bandwidth: Option<String>,

        #[arg(short = 't', long, default_value = "")]
        line_type: String,

        #[arg(short, long)]
        service_number: Option<String>,

        #[arg(short, long)]
        account_number: Option<String>,
    },

    /// Delete the service records that carry a LAN IP
    Delete {
        /// Path to the service directory JSON file
        #[arg(short, long, default_value = "services.json")]
        file: PathBuf,

        /// LAN IP of the record(s) to delete
        #[arg(short = 'm', long = "match")]
        lan_ip: String,
    },
}

/// Optional column given on the command line; absent means null.
fn field_value(value: Option<String>) -> FieldValue {
    value
        .as_deref()
        .map(FieldValue::from)
        .unwrap_or_default()
}

async fn dispatch(command: Command) -> CommandResult {
    match command {
        Command::Report {
            path,
            output,
            format,
            no_offline,
            no_online,
            method,
            timeout_ms,
            concurrency,
        } => {
            commands::report::run(ReportConfig {
                machines_path: path,
                output,
                exclude_offline: no_offline,
                exclude_online: no_online,
                format,
                probe: ProbeConfig::resolve(method, timeout_ms, concurrency),
            })
            .await
        }
        Command::Manage { path } => commands::manage::run(ManageConfig {
            machines_path: path,
        }),
        Command::Service { search, file, mode } => commands::service::run(ServiceSearchConfig {
            file,
            term: search,
            mode,
        }),
        Command::Update {
            file,
            lan_ip,
            key,
            value,
        } => commands::update::run(UpdateConfig {
            file,
            lan_ip,
            key,
            value,
        }),
        Command::Add {
            file,
            location,
            wan_ip,
            lan_ip,
            connection_type,
            bandwidth,
            line_type,
            service_number,
            account_number,
        } => commands::add::run(AddConfig {
            file,
            record: ServiceRecord {
                location,
                wan_ip,
                lan_ip,
                connection_type,
                bandwidth: field_value(bandwidth),
                line_type,
                service_number: field_value(service_number),
                account_number: field_value(account_number),
            },
        }),
        Command::Delete { file, lan_ip } => commands::delete::run(DeleteConfig { file, lan_ip }),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = dispatch(cli.command).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
