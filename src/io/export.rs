//! CSV and JSON export for BOS scenario reports and LCOE tables.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::bos::projector::BosCostReport;
use crate::bos::runner::ScenarioReport;
use crate::error::PipelineError;
use crate::lcoe::types::{AepRecord, CostLineItem, LcoeRow, TccRecord};

/// Writes one row per scenario: identity, every cost field, then errors.
///
/// Failed scenarios leave the cost columns blank and list their errors
/// joined with `; `.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_report_csv(reports: &[ScenarioReport], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = vec!["project_id"];
    header.extend(BosCostReport::FIELDS);
    header.push("errors");
    wtr.write_record(&header)?;

    for r in reports {
        let mut record = vec![r.project_id.clone()];
        match r.outcome.report() {
            Some(costs) => record.extend(costs.values().iter().map(|v| format!("{v:.2}"))),
            None => record.extend(BosCostReport::FIELDS.iter().map(|_| String::new())),
        }
        record.push(r.outcome.errors().join("; "));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes all scenario outcomes as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns `PipelineError::Json` if serialisation or writing fails.
pub fn write_report_json(
    reports: &[ScenarioReport],
    writer: impl Write,
) -> Result<(), PipelineError> {
    serde_json::to_writer_pretty(writer, reports)?;
    Ok(())
}

/// Writes per-module cost line items of every costed scenario.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_line_items(items: &[CostLineItem], writer: impl Write) -> io::Result<()> {
    write_records(items, writer)
}

/// Writes the LCOE table.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_lcoe_csv(rows: &[LcoeRow], writer: impl Write) -> io::Result<()> {
    write_records(rows, writer)
}

fn write_records<T: Serialize>(records: &[T], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Creates `path` and hands a buffered writer to `write`.
///
/// # Errors
///
/// Returns `PipelineError::Io` naming the path if creation or writing fails.
pub fn export_to<F>(path: &Path, write: F) -> Result<(), PipelineError>
where
    F: FnOnce(BufWriter<File>) -> io::Result<()>,
{
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    write(BufWriter::new(file)).map_err(|e| PipelineError::io(path, e))
}

/// Exports scenario reports as JSON to `path`.
///
/// # Errors
///
/// Returns `PipelineError::Io` or `PipelineError::Json`.
pub fn export_report_json(reports: &[ScenarioReport], path: &Path) -> Result<(), PipelineError> {
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    write_report_json(reports, BufWriter::new(file))
}

/// Reads BOS cost line items.
///
/// # Errors
///
/// Returns `PipelineError::Csv` if the file cannot be read or a row does not parse.
pub fn read_line_items(path: &Path) -> Result<Vec<CostLineItem>, PipelineError> {
    read_records(path)
}

/// Reads the AEP table.
///
/// # Errors
///
/// Returns `PipelineError::Csv` if the file cannot be read or a row does not parse.
pub fn read_aep(path: &Path) -> Result<Vec<AepRecord>, PipelineError> {
    read_records(path)
}

/// Reads the TCC table.
///
/// # Errors
///
/// Returns `PipelineError::Csv` if the file cannot be read or a row does not parse.
pub fn read_tcc(path: &Path) -> Result<Vec<TccRecord>, PipelineError> {
    read_records(path)
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PipelineError::csv(path, e))?;
    rdr.deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| PipelineError::csv(path, e))
}
