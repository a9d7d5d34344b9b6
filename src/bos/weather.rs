//! Hourly weather window normalisation.
//!
//! The packaged weather files carry no usable timestamps, so every window is
//! stamped with a fixed hourly sequence and reduced to five named columns.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

use crate::io::weather::read_raw_weather;
use crate::table::{Cell, Table};

/// Hours in the reference year.
pub const HOURS_PER_YEAR: usize = 8760;

/// Output schema, in order.
pub const COLUMNS: [&str; 5] = [
    "Date UTC",
    "Temp C",
    "Pressure atm",
    "Direction deg",
    "Speed m per s",
];

const VALUE_COLUMNS: usize = 4;

/// Why a weather source could not be normalised.
///
/// The `Display` text is what lands under `Weather_Data` in the error map.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("cannot read weather file `{path}`: {message}")]
    Io { path: PathBuf, message: String },

    #[error("weather row {row} has {found} columns, expected at least 4")]
    TooFewColumns { row: usize, found: usize },

    #[error("weather row {row}, column `{column}`: `{value}` is not a number")]
    BadValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("weather source has {found} rows, expected at least {required}")]
    TooFewRows { found: usize, required: usize },

    #[error("no weather source configured")]
    NoSource,

    #[error("timestamp sequence overflowed at hour {0}")]
    Timestamp(usize),
}

/// Unparsed data rows of a weather file, header rows already skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWeather {
    pub rows: Vec<Vec<String>>,
}

impl RawWeather {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Where a scenario's weather comes from.
#[derive(Debug, Clone)]
pub enum WeatherSource {
    File(PathBuf),
    Table(RawWeather),
}

impl WeatherSource {
    /// Loads and normalises the source.
    ///
    /// # Errors
    ///
    /// Returns a `WeatherError` if the file cannot be read or the rows do not conform.
    pub fn load(&self) -> Result<WeatherWindow, WeatherError> {
        match self {
            WeatherSource::File(path) => load_file(path),
            WeatherSource::Table(raw) => normalize(raw),
        }
    }
}

/// One normalised hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherRecord {
    #[serde(rename = "Date UTC")]
    pub date_utc: NaiveDateTime,
    #[serde(rename = "Temp C")]
    pub temp_c: f64,
    #[serde(rename = "Pressure atm")]
    pub pressure_atm: f64,
    #[serde(rename = "Direction deg")]
    pub direction_deg: f64,
    #[serde(rename = "Speed m per s")]
    pub speed_m_per_s: f64,
}

/// Exactly [`HOURS_PER_YEAR`] hourly records.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherWindow {
    records: Vec<WeatherRecord>,
}

impl WeatherWindow {
    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hours in which the wind at `height_m` exceeds `limit_m_per_s`.
    ///
    /// Speeds are measured at `reference_height_m` and extrapolated with the
    /// power-law shear exponent.
    pub fn hours_above(
        &self,
        limit_m_per_s: f64,
        height_m: f64,
        reference_height_m: f64,
        shear_exponent: f64,
    ) -> usize {
        let factor = (height_m / reference_height_m).powf(shear_exponent);
        self.records
            .iter()
            .filter(|r| r.speed_m_per_s * factor > limit_m_per_s)
            .count()
    }

    /// Window rendered as a five-column table.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(COLUMNS.iter().map(|c| (*c).to_string()).collect());
        for r in &self.records {
            table.push_row(vec![
                Cell::Text(r.date_utc.format("%Y-%m-%d %H:%M:%S").to_string()),
                Cell::Number(r.temp_c),
                Cell::Number(r.pressure_atm),
                Cell::Number(r.direction_deg),
                Cell::Number(r.speed_m_per_s),
            ]);
        }
        table
    }
}

/// First synthesised timestamp.
pub fn series_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2011, 12, 31)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Reads a weather CSV (five header rows) and normalises it.
///
/// # Errors
///
/// Returns `WeatherError::Io` if the file cannot be read, or any error from [`normalize`].
pub fn load_file(path: &Path) -> Result<WeatherWindow, WeatherError> {
    let raw = read_raw_weather(path).map_err(|e| WeatherError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    normalize(&raw)
}

/// Validates and stamps the first [`HOURS_PER_YEAR`] rows of `raw`.
///
/// Columns are taken positionally: temperature, pressure, direction, speed.
/// Extra columns and rows past the first year are ignored.
///
/// # Errors
///
/// Returns a `WeatherError` naming the offending row and column when a row is
/// short or holds a non-numeric value, or when fewer than a year of rows is present.
pub fn normalize(raw: &RawWeather) -> Result<WeatherWindow, WeatherError> {
    if raw.len() < HOURS_PER_YEAR {
        return Err(WeatherError::TooFewRows {
            found: raw.len(),
            required: HOURS_PER_YEAR,
        });
    }

    let start = series_start();
    let mut records = Vec::with_capacity(HOURS_PER_YEAR);
    for (idx, row) in raw.rows.iter().take(HOURS_PER_YEAR).enumerate() {
        if row.len() < VALUE_COLUMNS {
            return Err(WeatherError::TooFewColumns {
                row: idx,
                found: row.len(),
            });
        }
        let mut values = [0.0; VALUE_COLUMNS];
        for (col, value) in values.iter_mut().enumerate() {
            let cell = row[col].trim();
            *value = cell.parse().map_err(|_| WeatherError::BadValue {
                row: idx,
                column: COLUMNS[col + 1],
                value: cell.to_string(),
            })?;
        }
        let hours = i64::try_from(idx).map_err(|_| WeatherError::Timestamp(idx))?;
        let date_utc = start
            .checked_add_signed(Duration::hours(hours))
            .ok_or(WeatherError::Timestamp(idx))?;
        let [temp_c, pressure_atm, direction_deg, speed_m_per_s] = values;
        records.push(WeatherRecord {
            date_utc,
            temp_c,
            pressure_atm,
            direction_deg,
            speed_m_per_s,
        });
    }
    Ok(WeatherWindow { records })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rows: usize, speed: &str) -> RawWeather {
        RawWeather::new(
            (0..rows)
                .map(|_| vec!["10".into(), "1".into(), "180".into(), speed.into()])
                .collect(),
        )
    }

    #[test]
    fn conformant_source_yields_a_year_of_hours() {
        let window = normalize(&raw(HOURS_PER_YEAR, "6.5")).expect("normalizes");
        assert_eq!(window.len(), HOURS_PER_YEAR);
        let first = window.records()[0].date_utc;
        let last = window.records()[HOURS_PER_YEAR - 1].date_utc;
        assert_eq!(first.to_string(), "2011-12-31 00:00:00");
        assert_eq!(last.to_string(), "2012-12-29 23:00:00");
    }

    #[test]
    fn table_has_five_columns_in_order() {
        let table = normalize(&raw(HOURS_PER_YEAR, "6.5"))
            .expect("normalizes")
            .to_table();
        assert_eq!(table.columns(), COLUMNS.map(String::from).as_slice());
        assert_eq!(table.len(), HOURS_PER_YEAR);
    }

    #[test]
    fn extra_rows_are_ignored() {
        let window = normalize(&raw(HOURS_PER_YEAR + 24, "6.5")).expect("normalizes");
        assert_eq!(window.len(), HOURS_PER_YEAR);
    }

    #[test]
    fn short_source_is_rejected() {
        let err = normalize(&raw(100, "6.5")).expect_err("too short");
        assert!(matches!(err, WeatherError::TooFewRows { found: 100, .. }));
    }

    #[test]
    fn non_numeric_cell_names_row_and_column() {
        let mut source = raw(HOURS_PER_YEAR, "6.5");
        source.rows[42][3] = "calm".into();
        let err = normalize(&source).expect_err("bad value");
        let msg = err.to_string();
        assert!(msg.contains("row 42"), "{msg}");
        assert!(msg.contains("Speed m per s"), "{msg}");
    }

    #[test]
    fn narrow_row_is_rejected() {
        let mut source = raw(HOURS_PER_YEAR, "6.5");
        source.rows[0].truncate(2);
        assert!(matches!(
            normalize(&source),
            Err(WeatherError::TooFewColumns { row: 0, found: 2 })
        ));
    }

    #[test]
    fn shear_extrapolation_counts_windy_hours() {
        let window = normalize(&raw(HOURS_PER_YEAR, "9.0")).expect("normalizes");
        // 9 m/s at 10 m is under the limit, but not at 80 m with alpha 0.2
        assert_eq!(window.hours_above(9.8, 10.0, 10.0, 0.2), 0);
        assert_eq!(window.hours_above(9.8, 80.0, 10.0, 0.2), HOURS_PER_YEAR);
    }
}
