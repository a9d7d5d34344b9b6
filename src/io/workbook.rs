//! Sheet loading from CSV workbooks on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::PipelineError;
use crate::table::{Cell, Table, Workbook};

/// Anything that can hand out named workbooks.
pub trait DataSource {
    /// Reads every sheet of the workbook called `name`.
    ///
    /// # Errors
    ///
    /// Returns a `PipelineError` if the workbook is missing or unreadable.
    fn read_workbook(&self, name: &str) -> Result<Workbook, PipelineError>;
}

/// Workbooks stored as CSV files below a root directory.
///
/// `<root>/<name>.csv` is a workbook with one unlabeled sheet. A directory
/// `<root>/<name>/` is a workbook whose sheets are its `*.csv` files, named
/// by file stem and ordered by name.
#[derive(Debug, Clone)]
pub struct CsvWorkbookSource {
    root: PathBuf,
}

impl CsvWorkbookSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DataSource for CsvWorkbookSource {
    fn read_workbook(&self, name: &str) -> Result<Workbook, PipelineError> {
        // `ge15_public.xlsx` resolves like `ge15_public`
        let name = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name);
        let dir = self.root.join(name);
        let single = self.root.join(format!("{name}.csv"));
        let mut workbook = Workbook::new(name);

        if dir.is_dir() {
            let entries = fs::read_dir(&dir).map_err(|e| PipelineError::io(&dir, e))?;
            let mut paths = Vec::new();
            for entry in entries {
                let path = entry.map_err(|e| PipelineError::io(&dir, e))?.path();
                if path.extension().is_some_and(|ext| ext == "csv") {
                    paths.push(path);
                }
            }
            paths.sort();
            for path in paths {
                let sheet = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                workbook.insert(sheet, read_csv_table(&path)?);
            }
        } else if single.is_file() {
            workbook.insert(name, read_csv_table(&single)?);
        } else {
            return Err(PipelineError::io(
                dir,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no workbook directory or `{name}.csv` found"),
                ),
            ));
        }

        debug!(workbook = name, sheets = workbook.len(), "loaded workbook");
        Ok(workbook)
    }
}

/// Reads a headed CSV file into a [`Table`].
///
/// # Errors
///
/// Returns `PipelineError::Csv` if the file cannot be opened or parsed.
pub fn read_csv_table(path: &Path) -> Result<Table, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| PipelineError::csv(path, e))?;
    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::csv(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut table = Table::new(headers);
    for record in rdr.records() {
        let record = record.map_err(|e| PipelineError::csv(path, e))?;
        table.push_row(record.iter().map(Cell::parse).collect());
    }
    Ok(table)
}
