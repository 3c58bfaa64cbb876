//! Report output. Writes classification results as plain text, JSON, CSV or an Excel
//! sheet depending on the output file's extension.

use std::fs;
use std::io;
use std::path::Path;

use clap::ValueEnum;
use rust_xlsxwriter::{Format, Workbook};
use thiserror::Error;

use crate::connectivity::{ClassificationResult, ConnectivityStatus};

const HEADERS: [&str; 3] = ["Name", "IP", "Status"];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Txt,
    Json,
    Csv,
    Xlsx,
}

impl ReportFormat {
    /// Pick the format from the output extension; anything unrecognized is text.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("json") => ReportFormat::Json,
            Some("csv") => ReportFormat::Csv,
            Some("xlsx") | Some("xls") => ReportFormat::Xlsx,
            _ => ReportFormat::Txt,
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Txt => write!(f, "txt"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Xlsx => write!(f, "xlsx"),
        }
    }
}

fn filter_results(
    results: &[ClassificationResult],
    exclude_offline: bool,
) -> Vec<&ClassificationResult> {
    results
        .iter()
        .filter(|r| !(exclude_offline && r.status == ConnectivityStatus::Offline))
        .collect()
}

pub fn write_report(
    results: &[ClassificationResult],
    output: &Path,
    format: ReportFormat,
    exclude_offline: bool,
) -> Result<(), ReportError> {
    match format {
        ReportFormat::Txt => fs::write(output, render_txt(results, exclude_offline))?,
        ReportFormat::Json => {
            let filtered = filter_results(results, exclude_offline);
            fs::write(output, serde_json::to_vec_pretty(&filtered)?)?;
        }
        ReportFormat::Csv => write_csv(results, output, exclude_offline)?,
        ReportFormat::Xlsx => write_xlsx(results, output, exclude_offline)?,
    }
    Ok(())
}

/// Text report: the names of every Offline and OnlyADSL ATM, each section once
/// comma-separated and once one name per line. Online ATMs are not listed.
pub fn render_txt(results: &[ClassificationResult], exclude_offline: bool) -> String {
    let mut sections = vec![ConnectivityStatus::Offline, ConnectivityStatus::OnlyFallback];
    if exclude_offline {
        sections.retain(|s| *s != ConnectivityStatus::Offline);
    }

    let mut out = String::new();
    for status in sections {
        let names: Vec<&str> = results
            .iter()
            .filter(|r| r.status == status)
            .map(|r| r.name.as_str())
            .collect();
        if names.is_empty() {
            continue;
        }

        out.push_str(&format!("{}:\n", status));
        out.push_str(&names.join(", "));
        out.push_str("\n\n");

        out.push_str(&format!("{}:\n", status));
        for name in &names {
            out.push_str(name);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn write_csv(
    results: &[ClassificationResult],
    output: &Path,
    exclude_offline: bool,
) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(HEADERS)?;
    for r in filter_results(results, exclude_offline) {
        writer.write_record([r.name.as_str(), r.address.as_str(), r.status.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_xlsx(
    results: &[ClassificationResult],
    output: &Path,
    exclude_offline: bool,
) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Results")?;

    let header_format = Format::new().set_bold();
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (row_idx, r) in filter_results(results, exclude_offline).iter().enumerate() {
        let row = (row_idx + 1) as u32;
        worksheet.write_string(row, 0, &r.name)?;
        worksheet.write_string(row, 1, &r.address)?;
        worksheet.write_string(row, 2, r.status.as_str())?;
    }

    worksheet.set_column_width(0, 30)?; // Name
    worksheet.set_column_width(1, 15)?; // IP
    worksheet.set_column_width(2, 12)?; // Status

    workbook.save(output)?;
    Ok(())
}
