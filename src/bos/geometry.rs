//! Turbine component scaling.
//!
//! The component table drives crane selection and lift planning in the
//! erection stage. It ships with generic rows; this module rewrites the
//! nacelle, hub, blade and tower rows from the turbine rating, hub height
//! and rotor diameter of the scenario.

use std::collections::BTreeMap;

use crate::error::PipelineError;
use crate::table::{Cell, Table};

pub const COMPONENT_COLUMN: &str = "Component";
pub const MASS_COLUMN: &str = "Mass tonne";
pub const SECTION_HEIGHT_COLUMN: &str = "Section height m";
pub const LIFT_HEIGHT_COLUMN: &str = "Lift height m";

/// Longest tower section that can be trucked.
pub const MAX_TOWER_SECTION_HEIGHT_M: f64 = 30.0;
/// Heaviest tower section that can be trucked.
pub const MAX_TOWER_SECTION_MASS_T: f64 = 80.0;

/// Upper bound on tower rows written by [`edit_tower`].
pub const MAX_TOWER_SECTIONS: usize = 64;
/// Tallest hub accepted for component scaling.
pub const MAX_HUB_HEIGHT_M: f64 = 400.0;
/// Largest rotor accepted for component scaling.
pub const MAX_ROTOR_DIAMETER_M: f64 = 400.0;

const BLADE_COUNT: usize = 3;

/// One row of the component table.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    pub mass_t: f64,
    pub section_height_m: f64,
    /// Height the component is lifted to.
    pub lift_height_m: f64,
    /// Any further numeric columns (drag coefficients, cycle times, ...).
    pub extra: BTreeMap<String, f64>,
}

impl Component {
    fn named(name: String, template: Option<&Component>) -> Self {
        Self {
            name,
            mass_t: 0.0,
            section_height_m: 0.0,
            lift_height_m: 0.0,
            extra: template.map(|c| c.extra.clone()).unwrap_or_default(),
        }
    }
}

/// Ordered component rows; positions are always dense and zero-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentTable {
    rows: Vec<Component>,
}

impl ComponentTable {
    pub fn new(rows: Vec<Component>) -> Self {
        Self { rows }
    }

    /// Parses the `components` sheet of a project data workbook.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingColumn` if the component name column is absent,
    /// or `PipelineError::BadCell` for a row without a name.
    pub fn from_table(table: &Table) -> Result<Self, PipelineError> {
        if table.column_index(COMPONENT_COLUMN).is_none() {
            return Err(PipelineError::MissingColumn {
                stage: "component table",
                column: COMPONENT_COLUMN.to_string(),
            });
        }

        let mut rows = Vec::with_capacity(table.len());
        for (idx, row) in table.rows().enumerate() {
            let name = row.text(COMPONENT_COLUMN).ok_or_else(|| PipelineError::BadCell {
                stage: "component table",
                row: idx,
                column: COMPONENT_COLUMN.to_string(),
                message: "component name is blank".to_string(),
            })?;
            let extra = row
                .iter()
                .filter(|(col, _)| {
                    ![
                        COMPONENT_COLUMN,
                        MASS_COLUMN,
                        SECTION_HEIGHT_COLUMN,
                        LIFT_HEIGHT_COLUMN,
                    ]
                    .contains(col)
                })
                .filter_map(|(col, cell)| cell.as_f64().map(|v| (col.to_string(), v)))
                .collect();
            rows.push(Component {
                name,
                mass_t: row.number(MASS_COLUMN).unwrap_or(0.0),
                section_height_m: row.number(SECTION_HEIGHT_COLUMN).unwrap_or(0.0),
                lift_height_m: row.number(LIFT_HEIGHT_COLUMN).unwrap_or(0.0),
                extra,
            });
        }
        Ok(Self { rows })
    }

    /// Renders the table back into sheet form.
    pub fn to_table(&self) -> Table {
        let mut extra_cols: Vec<&str> = Vec::new();
        for row in &self.rows {
            for key in row.extra.keys() {
                if !extra_cols.contains(&key.as_str()) {
                    extra_cols.push(key);
                }
            }
        }
        let mut columns = vec![
            COMPONENT_COLUMN.to_string(),
            MASS_COLUMN.to_string(),
            SECTION_HEIGHT_COLUMN.to_string(),
            LIFT_HEIGHT_COLUMN.to_string(),
        ];
        columns.extend(extra_cols.iter().map(|c| (*c).to_string()));

        let mut table = Table::new(columns);
        for row in &self.rows {
            let mut cells = vec![
                Cell::Text(row.name.clone()),
                Cell::Number(row.mass_t),
                Cell::Number(row.section_height_m),
                Cell::Number(row.lift_height_m),
            ];
            cells.extend(
                extra_cols
                    .iter()
                    .map(|c| row.extra.get(*c).map_or(Cell::Null, |v| Cell::Number(*v))),
            );
            table.push_row(cells);
        }
        table
    }

    pub fn rows(&self) -> &[Component] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn group(&self, prefix: &str) -> impl Iterator<Item = &Component> {
        self.rows.iter().filter(move |c| is_member(c, prefix))
    }

    pub fn total_mass_t(&self) -> f64 {
        self.rows.iter().map(|c| c.mass_t).sum()
    }

    /// Replaces every row of a component group with `replacement`.
    ///
    /// New rows take the place of the first old row (or go to the end when the
    /// group was absent) and inherit its extra columns.
    fn replace_group(
        &self,
        prefix: &str,
        replacement: impl FnOnce(Option<&Component>) -> Vec<Component>,
    ) -> Self {
        let first = self.rows.iter().position(|c| is_member(c, prefix));
        let new_rows = replacement(first.map(|i| &self.rows[i]));

        let mut rows = Vec::with_capacity(self.rows.len() + new_rows.len());
        let mut new_rows = Some(new_rows);
        for (idx, row) in self.rows.iter().enumerate() {
            if Some(idx) == first {
                rows.extend(new_rows.take().unwrap_or_default());
            }
            if !is_member(row, prefix) {
                rows.push(row.clone());
            }
        }
        if let Some(remaining) = new_rows {
            rows.extend(remaining);
        }
        Self { rows }
    }
}

fn is_member(component: &Component, prefix: &str) -> bool {
    component
        .name
        .to_ascii_lowercase()
        .starts_with(&prefix.to_ascii_lowercase())
}

/// Scalar turbine description the scaling relations work from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbineGeometry {
    pub rating_mw: f64,
    pub hub_height_m: f64,
    pub rotor_diameter_m: f64,
}

impl TurbineGeometry {
    /// Checks the geometry is finite, positive and within the scaling limits.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending value.
    pub fn validate(&self) -> Result<(), String> {
        let checks = [
            ("turbine rating", self.rating_mw, f64::INFINITY),
            ("hub height", self.hub_height_m, MAX_HUB_HEIGHT_M),
            ("rotor diameter", self.rotor_diameter_m, MAX_ROTOR_DIAMETER_M),
        ];
        for (name, value, max) in checks {
            if !value.is_finite() || value <= 0.0 || value > max {
                return Err(format!("{name} {value} is outside (0, {max}]"));
            }
        }
        Ok(())
    }
}

/// Tower subdivision derived from hub height and tower mass together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TowerSpecs {
    pub sections: usize,
    pub section_height_m: f64,
}

/// Nacelle mass in tonnes.
pub fn nacelle_mass_t(rating_mw: f64) -> f64 {
    3.0 * rating_mw.powi(2) + 28.0 * rating_mw + 8.0
}

/// Hub mass in tonnes.
pub fn hub_mass_t(rating_mw: f64) -> f64 {
    10.0 * rating_mw + 2.0
}

/// Combined mass of all three blades in tonnes.
///
/// Per-blade mass follows `0.1452 * R^2.9158` kg with `R` the rotor radius.
pub fn blade_mass_t(rotor_diameter_m: f64) -> f64 {
    let radius = rotor_diameter_m / 2.0;
    BLADE_COUNT as f64 * 0.1452 * radius.powf(2.9158) / 1000.0
}

/// Tower mass in tonnes.
pub fn tower_mass_t(rating_mw: f64, hub_height_m: f64) -> f64 {
    (1.2 + 0.4 * rating_mw) * hub_height_m
}

/// Number of sections is the smallest count that respects both the length
/// and the mass transport limits; sections share one height.
///
/// The count saturates at [`MAX_TOWER_SECTIONS`]; geometry accepted by
/// [`TurbineGeometry::validate`] stays below it.
pub fn tower_specs(hub_height_m: f64, tower_mass_t: f64) -> TowerSpecs {
    let by_height = (hub_height_m / MAX_TOWER_SECTION_HEIGHT_M).ceil();
    let by_mass = (tower_mass_t / MAX_TOWER_SECTION_MASS_T).ceil();
    let sections = by_height
        .max(by_mass)
        .max(1.0)
        .min(MAX_TOWER_SECTIONS as f64) as usize;
    TowerSpecs {
        sections,
        section_height_m: hub_height_m / sections as f64,
    }
}

pub fn edit_nacelle(table: &ComponentTable, mass_t: f64, hub_height_m: f64) -> ComponentTable {
    table.replace_group("nacelle", |template| {
        let mut row = Component::named("Nacelle".into(), template);
        row.mass_t = mass_t;
        row.lift_height_m = hub_height_m;
        row.section_height_m = template.map_or(0.0, |t| t.section_height_m);
        vec![row]
    })
}

pub fn edit_hub(table: &ComponentTable, mass_t: f64, hub_height_m: f64) -> ComponentTable {
    table.replace_group("hub", |template| {
        let mut row = Component::named("Hub".into(), template);
        row.mass_t = mass_t;
        row.lift_height_m = hub_height_m;
        row.section_height_m = template.map_or(0.0, |t| t.section_height_m);
        vec![row]
    })
}

/// Writes three blade rows that together carry `combined_mass_t`.
pub fn edit_blades(
    table: &ComponentTable,
    combined_mass_t: f64,
    hub_height_m: f64,
    rotor_diameter_m: f64,
) -> ComponentTable {
    table.replace_group("blade", |template| {
        (1..=BLADE_COUNT)
            .map(|i| {
                let mut row = Component::named(format!("Blade {i}"), template);
                row.mass_t = combined_mass_t / BLADE_COUNT as f64;
                row.section_height_m = rotor_diameter_m / 2.0;
                row.lift_height_m = hub_height_m;
                row
            })
            .collect()
    })
}

/// Rewrites the tower as `specs.sections` equal rows stacked from the ground.
pub fn edit_tower(table: &ComponentTable, specs: TowerSpecs, tower_mass_t: f64) -> ComponentTable {
    table.replace_group("tower", |template| {
        (1..=specs.sections)
            .map(|i| {
                let mut row = Component::named(format!("Tower section {i}"), template);
                row.mass_t = tower_mass_t / specs.sections as f64;
                row.section_height_m = specs.section_height_m;
                row.lift_height_m = specs.section_height_m * i as f64;
                row
            })
            .collect()
    })
}

/// Applies all four scaling edits. Pure: same inputs, same table.
pub fn scale_components(table: &ComponentTable, geometry: TurbineGeometry) -> ComponentTable {
    let TurbineGeometry {
        rating_mw,
        hub_height_m,
        rotor_diameter_m,
    } = geometry;

    let table = edit_nacelle(table, nacelle_mass_t(rating_mw), hub_height_m);
    let table = edit_hub(&table, hub_mass_t(rating_mw), hub_height_m);
    let table = edit_blades(
        &table,
        blade_mass_t(rotor_diameter_m),
        hub_height_m,
        rotor_diameter_m,
    );
    let tower_mass = tower_mass_t(rating_mw, hub_height_m);
    let specs = tower_specs(hub_height_m, tower_mass);
    edit_tower(&table, specs, tower_mass)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generic_table() -> ComponentTable {
        let table = Table::from_rows(
            &[
                COMPONENT_COLUMN,
                MASS_COLUMN,
                SECTION_HEIGHT_COLUMN,
                LIFT_HEIGHT_COLUMN,
                "Coeff drag",
            ],
            &[
                &["Tower - Section 1", "50", "25", "25", "0.7"],
                &["Tower - Section 2", "50", "25", "50", "0.7"],
                &["Nacelle", "60", "4", "80", "1.2"],
                &["Hub", "20", "3", "80", "1.0"],
                &["Blade", "20", "38", "80", "0.9"],
                &["Met tower", "5", "80", "0", ""],
            ],
        );
        ComponentTable::from_table(&table).expect("fixture parses")
    }

    fn reference() -> TurbineGeometry {
        TurbineGeometry {
            rating_mw: 1.5,
            hub_height_m: 80.0,
            rotor_diameter_m: 77.0,
        }
    }

    #[test]
    fn reference_turbine_masses() {
        assert!((nacelle_mass_t(1.5) - 56.75).abs() < 1e-9);
        assert!((hub_mass_t(1.5) - 17.0).abs() < 1e-9);
        // ~6.1 t per blade for a 77 m rotor
        let blades = blade_mass_t(77.0);
        assert!(blades > 17.0 && blades < 19.5, "blades = {blades}");
        assert!((tower_mass_t(1.5, 80.0) - 144.0).abs() < 1e-9);
    }

    #[test]
    fn tower_specs_respect_both_limits() {
        // height-bound: 80 m needs 3 sections of <= 30 m
        let specs = tower_specs(80.0, 100.0);
        assert_eq!(specs.sections, 3);
        // mass-bound: 400 t needs 5 sections of <= 80 t
        let specs = tower_specs(80.0, 400.0);
        assert_eq!(specs.sections, 5);
        assert!((specs.section_height_m - 16.0).abs() < 1e-9);
    }

    #[test]
    fn tower_sections_saturate_for_huge_towers() {
        let specs = tower_specs(1e12, tower_mass_t(1.5, 1e12));
        assert_eq!(specs.sections, MAX_TOWER_SECTIONS);
        assert_eq!(tower_specs(f64::NAN, f64::NAN).sections, 1);
    }

    #[test]
    fn validate_rejects_absurd_geometry() {
        assert_eq!(reference().validate(), Ok(()));
        let tall = TurbineGeometry {
            hub_height_m: 1e12,
            ..reference()
        };
        let err = tall.validate().expect_err("hub too tall");
        assert!(err.starts_with("hub height"), "{err}");
        let nan = TurbineGeometry {
            rotor_diameter_m: f64::NAN,
            ..reference()
        };
        assert!(nan.validate().is_err());
        let flat = TurbineGeometry {
            rating_mw: 0.0,
            ..reference()
        };
        assert!(flat.validate().is_err());
    }

    #[test]
    fn scaling_keeps_one_nacelle_and_hub() {
        let scaled = scale_components(&generic_table(), reference());
        assert_eq!(scaled.group("nacelle").count(), 1);
        assert_eq!(scaled.group("hub").count(), 1);
        assert_eq!(scaled.group("blade").count(), 3);
        assert!(scaled.group("met tower").count() == 1);
    }

    #[test]
    fn tower_rows_share_height_and_sum_to_tower_mass() {
        let g = reference();
        let scaled = scale_components(&generic_table(), g);
        let tower: Vec<&Component> = scaled.group("tower").collect();
        let specs = tower_specs(g.hub_height_m, tower_mass_t(g.rating_mw, g.hub_height_m));
        assert_eq!(tower.len(), specs.sections);
        let mass: f64 = tower.iter().map(|c| c.mass_t).sum();
        assert!((mass - tower_mass_t(g.rating_mw, g.hub_height_m)).abs() < 1e-9);
        assert!(tower.iter().all(|c| c.section_height_m == specs.section_height_m));
        let top = tower.last().map_or(0.0, |c| c.lift_height_m);
        assert!((top - g.hub_height_m).abs() < 1e-9);
    }

    #[test]
    fn new_rows_inherit_extra_columns_and_position() {
        let scaled = scale_components(&generic_table(), reference());
        let first = &scaled.rows()[0];
        assert!(first.name.starts_with("Tower section"));
        assert_eq!(first.extra.get("Coeff drag"), Some(&0.7));
        let nacelle = scaled.group("nacelle").next().expect("nacelle row");
        assert_eq!(nacelle.lift_height_m, 80.0);
        assert_eq!(nacelle.extra.get("Coeff drag"), Some(&1.2));
    }

    #[test]
    fn missing_groups_are_appended() {
        let scaled = scale_components(&ComponentTable::default(), reference());
        assert_eq!(scaled.group("nacelle").count(), 1);
        assert_eq!(scaled.group("hub").count(), 1);
        assert_eq!(scaled.group("blade").count(), 3);
        assert!(scaled.group("tower").count() >= 1);
    }

    #[test]
    fn table_round_trips_through_sheet_form() {
        let original = generic_table();
        let back = ComponentTable::from_table(&original.to_table()).expect("parses");
        assert_eq!(back, original);
    }

    #[test]
    fn blank_component_name_is_rejected() {
        let table = Table::from_rows(&[COMPONENT_COLUMN, MASS_COLUMN], &[&["", "5"]]);
        assert!(matches!(
            ComponentTable::from_table(&table),
            Err(PipelineError::BadCell { .. })
        ));
    }
}
