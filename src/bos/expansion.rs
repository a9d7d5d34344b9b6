//! Parametric expansion of the project list.
//!
//! Each base project yields its own unmodified row followed by one row per
//! parametric variation that applies to it. Variation rows carry a serial ID
//! of the form `<Project ID>_<nnn>`.

use tracing::debug;

use crate::error::PipelineError;
use crate::table::{Cell, Row, Table, Workbook};

pub const PROJECT_LIST_SHEET: &str = "Project list";
pub const PARAMETRIC_LIST_SHEET: &str = "Parametric list";

pub const PROJECT_ID: &str = "Project ID";
pub const PROJECT_DATA_FILE: &str = "Project data file";
pub const PROJECT_ID_WITH_SERIAL: &str = "Project ID with serial";

pub const PARAMETER: &str = "Parameter";
pub const VALUE: &str = "Value";

/// One named override from the parametric list.
#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    /// Project-list column the value replaces.
    pub parameter: String,
    pub value: Cell,
    /// Restricts the variation to one project; `None` applies it to all.
    pub project_id: Option<String>,
}

impl Variation {
    pub fn applies_to(&self, project_id: &str) -> bool {
        self.project_id.as_deref().is_none_or(|id| id == project_id)
    }
}

/// Splits a project list workbook into its base project and variation tables.
///
/// # Errors
///
/// Returns `PipelineError::SheetLayout` unless the workbook has exactly one
/// sheet or both the `Project list` and `Parametric list` sheets.
pub fn split_project_sources(workbook: Workbook) -> Result<(Table, Table), PipelineError> {
    let name = workbook.name.clone();
    let has_named = workbook.sheet(PROJECT_LIST_SHEET).is_some()
        && workbook.sheet(PARAMETRIC_LIST_SHEET).is_some();
    let found = workbook.sheet_names().collect::<Vec<_>>().join(", ");

    let mut sheets = workbook.into_sheets();
    if sheets.len() == 1 {
        let (_, projects) = sheets.remove(0);
        return Ok((projects, Table::default()));
    }
    if has_named {
        let mut take = |sheet: &str| {
            sheets
                .iter()
                .position(|(n, _)| n == sheet)
                .map(|idx| sheets.remove(idx).1)
                .unwrap_or_default()
        };
        let projects = take(PROJECT_LIST_SHEET);
        let variations = take(PARAMETRIC_LIST_SHEET);
        return Ok((projects, variations));
    }
    Err(PipelineError::SheetLayout {
        workbook: name,
        found,
    })
}

/// Reads the parametric list. An empty table yields no variations.
///
/// # Errors
///
/// Returns `PipelineError::MissingColumn` if a non-empty table lacks the
/// `Parameter` or `Value` column, or `PipelineError::BadCell` for a blank parameter name.
pub fn variations(table: &Table) -> Result<Vec<Variation>, PipelineError> {
    if table.is_empty() {
        return Ok(Vec::new());
    }
    for column in [PARAMETER, VALUE] {
        if table.column_index(column).is_none() {
            return Err(PipelineError::MissingColumn {
                stage: "parametric list",
                column: column.to_string(),
            });
        }
    }

    table
        .rows()
        .enumerate()
        .map(|(idx, row)| {
            let parameter = row.text(PARAMETER).ok_or_else(|| PipelineError::BadCell {
                stage: "parametric list",
                row: idx,
                column: PARAMETER.to_string(),
                message: "parameter name is blank".to_string(),
            })?;
            Ok(Variation {
                parameter,
                value: row.get(VALUE).cloned().unwrap_or(Cell::Null),
                project_id: row.text(PROJECT_ID),
            })
        })
        .collect()
}

/// Cross-joins base projects with their applicable variations.
///
/// # Arguments
///
/// * `projects` - Base project list, one row per project
/// * `variations` - Parsed parametric list, possibly empty
///
/// # Errors
///
/// Returns `PipelineError::MissingColumn` without a `Project ID` column, or
/// `PipelineError::BadCell` for a row whose project ID is blank.
pub fn expand(projects: &Table, variations: &[Variation]) -> Result<Table, PipelineError> {
    if projects.column_index(PROJECT_ID).is_none() {
        return Err(PipelineError::MissingColumn {
            stage: "project list",
            column: PROJECT_ID.to_string(),
        });
    }

    let mut expanded = projects.clone();
    let serial_col = expanded.ensure_column(PROJECT_ID_WITH_SERIAL);
    let targets: Vec<usize> = variations
        .iter()
        .map(|v| expanded.ensure_column(&v.parameter))
        .collect();

    let mut out = Table::new(expanded.columns().to_vec());
    for (idx, row) in expanded.rows().enumerate() {
        let project_id = row.text(PROJECT_ID).ok_or_else(|| PipelineError::BadCell {
            stage: "project list",
            row: idx,
            column: PROJECT_ID.to_string(),
            message: "project ID is blank".to_string(),
        })?;

        let mut base = row.cells().to_vec();
        base[serial_col] = Cell::Null;
        out.push_row(base);

        let applicable = variations
            .iter()
            .zip(&targets)
            .filter(|(v, _)| v.applies_to(&project_id));
        for (serial, (variation, &col)) in applicable.enumerate() {
            let mut cells = row.cells().to_vec();
            cells[col] = variation.value.clone();
            cells[serial_col] = Cell::Text(format!("{project_id}_{:03}", serial + 1));
            out.push_row(cells);
        }
    }

    debug!(
        projects = projects.len(),
        variations = variations.len(),
        scenarios = out.len(),
        "expanded project list"
    );
    Ok(out)
}

/// Scenario identity: the serial ID when present, else the project ID.
pub fn resolved_project_id(row: &Row<'_>) -> Option<String> {
    row.text(PROJECT_ID_WITH_SERIAL)
        .or_else(|| row.text(PROJECT_ID))
}
