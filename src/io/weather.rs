//! Weather CSV reader.

use std::path::Path;

use crate::bos::weather::RawWeather;
use crate::error::PipelineError;

/// Header rows preceding the hourly data in a weather file.
pub const HEADER_ROWS: usize = 5;

/// Reads the data rows of a weather file as raw strings.
///
/// The first [`HEADER_ROWS`] lines are skipped; rows may have any width.
///
/// # Errors
///
/// Returns `PipelineError::Csv` if the file cannot be opened or parsed.
pub fn read_raw_weather(path: &Path) -> Result<RawWeather, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| PipelineError::csv(path, e))?;

    let mut rows = Vec::new();
    for record in rdr.records().skip(HEADER_ROWS) {
        let record = record.map_err(|e| PipelineError::csv(path, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(RawWeather::new(rows))
}
