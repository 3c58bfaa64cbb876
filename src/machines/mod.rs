//! ATM list files. The list is a two-column sheet of name and IP and can live in an
//! Excel workbook, a CSV file or a JSON array; the extension picks the format.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use calamine::{Reader, open_workbook_auto};
use rust_xlsxwriter::{Format, Workbook};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::connectivity::Endpoint;

const SHEET_NAME: &str = "ATMs";

#[derive(Debug, Error)]
pub enum MachineListError {
    #[error("failed to open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("unsupported ATM list format '{0}' (use .xlsx, .csv or .json)")]
    UnsupportedFormat(String),

    #[error("workbook has no sheets")]
    EmptyWorkbook,

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("failed to write workbook: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineListFormat {
    Xlsx,
    Csv,
    Json,
}

impl MachineListFormat {
    pub fn from_path(path: &Path) -> Result<Self, MachineListError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xls" => Ok(MachineListFormat::Xlsx),
            "csv" => Ok(MachineListFormat::Csv),
            "json" => Ok(MachineListFormat::Json),
            _ => Err(MachineListError::UnsupportedFormat(ext)),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Row {
    Atm(Endpoint),
    /// Blank line or the `Name | IP` header
    Ignored,
    /// Has content but no usable name and IP
    Malformed,
}

/// Classify a raw row. An ATM needs a non-empty name and IP in the first two cells.
fn parse_row(cells: &[String]) -> Row {
    if cells.iter().all(|c| c.trim().is_empty()) {
        return Row::Ignored;
    }
    let [name, ip, ..] = cells else {
        return Row::Malformed;
    };
    let (name, ip) = (name.trim(), ip.trim());
    if name.is_empty() || ip.is_empty() {
        return Row::Malformed;
    }
    if name.eq_ignore_ascii_case("name") && ip.eq_ignore_ascii_case("ip") {
        return Row::Ignored;
    }
    Row::Atm(Endpoint::new(name, ip))
}

/// The ATM on row `line` (1-based), logging rows that had to be skipped.
fn endpoint_from_row(line: usize, cells: &[String]) -> Option<Endpoint> {
    match parse_row(cells) {
        Row::Atm(endpoint) => Some(endpoint),
        Row::Ignored => None,
        Row::Malformed => {
            warn!(line, ?cells, "skipping ATM row without a name and IP");
            None
        }
    }
}

/// Load the ATM list at `path`.
pub fn load_machines(path: &Path) -> Result<Vec<Endpoint>, MachineListError> {
    let format = MachineListFormat::from_path(path)?;
    if !path.exists() {
        return Err(MachineListError::Open {
            path: path.to_path_buf(),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
    }

    let machines = match format {
        MachineListFormat::Xlsx => load_xlsx(path)?,
        MachineListFormat::Csv => load_csv(path)?,
        MachineListFormat::Json => load_json(path)?,
    };

    debug!(path = %path.display(), count = machines.len(), "loaded ATM list");
    Ok(machines)
}

fn load_xlsx(path: &Path) -> Result<Vec<Endpoint>, MachineListError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(MachineListError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&sheet)?;

    Ok(range
        .rows()
        .enumerate()
        .filter_map(|(idx, row)| {
            let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            endpoint_from_row(idx + 1, &cells)
        })
        .collect())
}

fn load_csv(path: &Path) -> Result<Vec<Endpoint>, MachineListError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut machines = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        if let Some(endpoint) = endpoint_from_row(idx + 1, &cells) {
            machines.push(endpoint);
        }
    }
    Ok(machines)
}

fn load_json(path: &Path) -> Result<Vec<Endpoint>, MachineListError> {
    let data = fs::read(path)?;
    let listed: Vec<Endpoint> = serde_json::from_slice(&data)?;
    Ok(listed
        .into_iter()
        .enumerate()
        .filter_map(|(idx, e)| endpoint_from_row(idx + 1, &[e.name, e.address]))
        .collect())
}

/// Write the ATM list back to `path`, in the format its extension names.
pub fn save_machines(machines: &[Endpoint], path: &Path) -> Result<(), MachineListError> {
    match MachineListFormat::from_path(path)? {
        MachineListFormat::Xlsx => save_xlsx(machines, path)?,
        MachineListFormat::Csv => save_csv(machines, path)?,
        MachineListFormat::Json => fs::write(path, serde_json::to_vec_pretty(machines)?)?,
    }

    info!(path = %path.display(), count = machines.len(), "saved ATM list");
    Ok(())
}

fn save_xlsx(machines: &[Endpoint], path: &Path) -> Result<(), MachineListError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    worksheet.write_string_with_format(0, 0, "Name", &header_format)?;
    worksheet.write_string_with_format(0, 1, "IP", &header_format)?;

    for (idx, machine) in machines.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_string(row, 0, &machine.name)?;
        worksheet.write_string(row, 1, &machine.address)?;
    }

    worksheet.set_column_width(0, 30)?;
    worksheet.set_column_width(1, 15)?;

    workbook.save(path)?;
    Ok(())
}

fn save_csv(machines: &[Endpoint], path: &Path) -> Result<(), MachineListError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Name", "IP"])?;
    for machine in machines {
        writer.write_record([machine.name.as_str(), machine.address.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Dotted-quad check used when an operator types an address: four decimal groups of
/// one to three digits, each at most 255.
pub fn is_valid_ipv4(ip: &str) -> bool {
    let parts: Vec<&str> = ip.split('.').collect();
    parts.len() == 4
        && parts.iter().all(|part| {
            !part.is_empty()
                && part.len() <= 3
                && part.chars().all(|c| c.is_ascii_digit())
                && part.parse::<u16>().is_ok_and(|n| n <= 255)
        })
}
