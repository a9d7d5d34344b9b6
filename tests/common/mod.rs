//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use windbos::bos::inputs::{InputValue, Overrides, keys};
use windbos::lcoe::{AepRecord, TccRecord};

pub const PROJECT_LIST_HEADER: &str = "Project ID,Project data file,Interconnect voltage kV,\
Distance to interconnect mi,Number of turbines,Turbine spacing (times rotor diameter),\
Row spacing (times rotor diameter),Turbine rating MW,Rotor diameter m,Hub height m,\
Wind shear exponent,Foundation depth m,Rated thrust N,Labor cost multiplier,\
Gust velocity m per s,Crane breakdown fraction";

/// Reference plant row (100 x 1.5 MW, 77 m rotor, 80 m hub).
pub fn project_row(id: &str, data_file: &str) -> String {
    format!("{id},{data_file},137,10,100,4,10,1.5,77,80,0.2,2.36,589000,1,59.5,0.1")
}

/// Generic component sheet with a two-section tower.
pub const COMPONENTS_CSV: &str = "Component,Mass tonne,Section height m,Lift height m,Coeff drag\n\
Tower - Section 1,50,25,25,0.7\n\
Tower - Section 2,50,25,50,0.7\n\
Nacelle,60,4,80,1.2\n\
Hub,20,3,80,1.0\n\
Blade,20,38,80,0.9\n";

/// Weather file body: 5 header lines then `rows` hourly rows at `speed` m/s.
pub fn weather_csv(rows: usize, speed: f64) -> String {
    let mut body = String::from("Site,Test\nSource,Synthetic\nLat,Lon\nUnits,C\nColumns,4\n");
    for _ in 0..rows {
        body.push_str(&format!("10,1,180,{speed}\n"));
    }
    body
}

/// On-disk inputs of a batch run.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub project_list_dir: PathBuf,
    pub project_data_dir: PathBuf,
    pub weather: PathBuf,
}

impl Fixture {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn write(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(path, body).expect("write fixture");
}

/// Writes a `project_list` workbook with projects `ids`, one shared
/// `plant_a` project data workbook and a full year of weather.
///
/// With `parametric`, the workbook gets both the `Project list` and
/// `Parametric list` sheets; otherwise it is a single `project_list.csv`.
pub fn write_inputs(ids: &[&str], parametric: Option<&str>) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let project_list_dir = dir.path().join("inputs");
    let project_data_dir = dir.path().join("inputs/project_data");

    let mut list = format!("{PROJECT_LIST_HEADER}\n");
    for id in ids {
        list.push_str(&project_row(id, "plant_a.xlsx"));
        list.push('\n');
    }
    match parametric {
        Some(params) => {
            write(&project_list_dir.join("project_list/Project list.csv"), &list);
            write(&project_list_dir.join("project_list/Parametric list.csv"), params);
        }
        None => write(&project_list_dir.join("project_list.csv"), &list),
    }

    write(&project_data_dir.join("plant_a/components.csv"), COMPONENTS_CSV);
    let weather = dir.path().join("weather.srw");
    write(&weather, &weather_csv(8760, 6.0));

    Fixture {
        dir,
        project_list_dir,
        project_data_dir,
        weather,
    }
}

pub fn overrides(pairs: &[(&str, f64)]) -> Overrides {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), InputValue::Number(*v)))
        .collect()
}

/// The 13 reference plant inputs.
pub fn reference_overrides() -> Overrides {
    overrides(&[
        (keys::INTERCONNECT_VOLTAGE_KV, 137.0),
        (keys::DISTANCE_TO_INTERCONNECT_MI, 10.0),
        (keys::NUM_TURBINES, 100.0),
        (keys::TURBINE_SPACING_ROTOR_DIAMETERS, 4.0),
        (keys::ROW_SPACING_ROTOR_DIAMETERS, 10.0),
        (keys::TURBINE_RATING_MW, 1.5),
        (keys::ROTOR_DIAMETER_M, 77.0),
        (keys::HUB_HEIGHT_METERS, 80.0),
        (keys::WIND_SHEAR_EXPONENT, 0.20),
        (keys::DEPTH, 2.36),
        (keys::RATED_THRUST_N, 589_000.0),
        (keys::LABOR_COST_MULTIPLIER, 1.0),
        (keys::GUST_VELOCITY_M_PER_S, 59.50),
    ])
}

pub fn aep(
    rating_kw: f64,
    rotor_diameter_m: f64,
    hub_height_m: f64,
    aep_kwh_per_yr: f64,
) -> AepRecord {
    AepRecord {
        rating_kw,
        rotor_diameter_m,
        hub_height_m,
        aep_kwh_per_yr,
    }
}

pub fn tcc(
    rating_kw: f64,
    rotor_diameter_m: f64,
    hub_height_m: f64,
    tcc_usd_per_kw: f64,
) -> TccRecord {
    TccRecord {
        rating_kw,
        rotor_diameter_m,
        hub_height_m,
        tcc_usd_per_kw,
    }
}
