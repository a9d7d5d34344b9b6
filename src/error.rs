//! Fatal pipeline errors.
//!
//! Anything in here halts the whole run. Per-scenario validation problems are
//! not errors in this sense; they are collected in
//! [`ErrorMap`](crate::bos::inputs::ErrorMap) and reported alongside the
//! other scenarios.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bos::modules::ModuleError;

/// Unrecoverable failure of the BOS or LCOE pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The project list workbook has neither a single sheet nor the two named sheets.
    #[error(
        "project list `{workbook}` needs a single sheet or sheets named 'Project list' and 'Parametric list' (found: {found})"
    )]
    SheetLayout { workbook: String, found: String },

    #[error("workbook `{workbook}` has no sheet named `{sheet}`")]
    MissingSheet { workbook: String, sheet: String },

    #[error("{stage}: missing column `{column}`")]
    MissingColumn { stage: &'static str, column: String },

    #[error("{stage}: row {row}, column `{column}`: {message}")]
    BadCell {
        stage: &'static str,
        row: usize,
        column: String,
        message: String,
    },

    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error in `{path}`: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cost module `{module}` failed for project `{project}`: {source}")]
    Module {
        module: &'static str,
        project: String,
        #[source]
        source: ModuleError,
    },

    /// A required key was absent from the module output map after a successful run.
    #[error("result projection: output key `{key}` missing for project `{project}`")]
    MissingOutput { key: String, project: String },

    #[error("join `{join}` produced no rows")]
    EmptyJoin { join: &'static str },

    #[error("`{0}` is empty")]
    EmptyInput(&'static str),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
