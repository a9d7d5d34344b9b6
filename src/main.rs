//! windbos entry point: CLI wiring, config loading and pipeline dispatch.

use std::process;

use tracing::{error, info};

use windbos::bos::runner::ScenarioReport;
use windbos::bos::{BosRunner, Manager, ScenarioContext, WeatherSource};
use windbos::cli::{self, CliOptions, Command};
use windbos::config::RunConfig;
use windbos::error::PipelineError;
use windbos::io::export::{
    export_report_json, export_to, read_aep, read_line_items, read_tcc, write_lcoe_csv,
    write_line_items, write_report_csv,
};
use windbos::io::workbook::{CsvWorkbookSource, DataSource};
use windbos::lcoe::run_lcoe;
use windbos::telemetry::init_tracing;

/// Results of a BOS batch, kept for the optional API server.
#[cfg_attr(not(feature = "api"), allow(dead_code))]
struct BosRun {
    runner: BosRunner,
    template: Option<ScenarioContext>,
    reports: Vec<ScenarioReport>,
}

fn load_config(cli: &CliOptions) -> RunConfig {
    // --config takes priority, then --preset, then the default run
    let cfg = if let Some(ref path) = cli.config {
        RunConfig::from_toml_file(path)
    } else if let Some(ref name) = cli.preset {
        RunConfig::from_preset(name)
    } else {
        Ok(RunConfig::default_run())
    };
    let cfg = cfg.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    cfg
}

fn run_bos(cfg: &RunConfig) -> Result<BosRun, PipelineError> {
    // 1. Project list and project data sources
    let list_source = CsvWorkbookSource::new(&cfg.inputs.project_list_dir);
    let project_list = list_source.read_workbook(&cfg.inputs.project_list)?;
    let data_source = CsvWorkbookSource::new(&cfg.inputs.project_data_dir);

    // 2. Batch
    let weather = cfg.inputs.default_weather.clone().map(WeatherSource::File);
    let runner = BosRunner::new(Manager::standard(), weather);
    let template = BosRunner::first_project_context(&data_source, project_list.clone())?;
    let reports = runner.run_batch(&data_source, project_list, &cfg.overrides)?;

    // 3. Exports
    let out = &cfg.output;
    export_to(&out.report_csv, |w| write_report_csv(&reports, w))?;
    export_report_json(&reports, &out.report_json)?;
    let items: Vec<_> = reports.iter().flat_map(ScenarioReport::line_items).collect();
    export_to(&out.line_items_csv, |w| write_line_items(&items, w))?;
    info!(
        report = %out.report_csv.display(),
        line_items = items.len(),
        "BOS exports written"
    );

    for r in &reports {
        match r.outcome.report() {
            Some(costs) => println!("{}\t{:.2}", r.project_id, costs.total_bos_cost),
            None => println!("{}\tFAILED\t{}", r.project_id, r.outcome.errors().join("; ")),
        }
    }

    Ok(BosRun {
        runner,
        template,
        reports,
    })
}

fn run_lcoe_pipeline(cfg: &RunConfig) -> Result<(), PipelineError> {
    let l = &cfg.lcoe;
    let items = read_line_items(&l.line_items)?;
    let aep = read_aep(&l.aep)?;
    let tcc = read_tcc(&l.tcc)?;
    info!(
        line_items = items.len(),
        aep = aep.len(),
        tcc = tcc.len(),
        "loaded LCOE inputs"
    );

    let rows = run_lcoe(&items, &aep, &tcc, &l.branch_spec(), l.params())?;
    export_to(&l.output, |w| write_lcoe_csv(&rows, w))?;

    for r in &rows {
        println!(
            "{:.0} kW\t{:.0} m\t{}\t{:.5} USD/kWh",
            r.rating_kw, r.hub_height_m, r.modification, r.lcoe_usd_per_kwh
        );
    }
    info!(output = %l.output.display(), rows = rows.len(), "LCOE table written");
    Ok(())
}

#[cfg(feature = "api")]
fn serve(run: BosRun, port: u16) {
    use std::net::SocketAddr;
    use std::sync::Arc;

    let state = Arc::new(windbos::api::AppState::new(
        run.runner,
        run.template,
        run.reports,
    ));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    rt.block_on(windbos::api::serve(state, addr));
}

#[cfg(not(feature = "api"))]
fn serve(_run: BosRun, _port: u16) {
    eprintln!("error: --serve requires a build with the `api` feature");
    process::exit(1);
}

fn fail(e: &PipelineError) -> ! {
    error!(error = %e, "pipeline failed");
    eprintln!("error: {e}");
    process::exit(1);
}

fn main() {
    let cli = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(2);
    });
    let cfg = load_config(&cli);

    if let Err(e) = init_tracing(&cfg.logging.level, cfg.logging.json) {
        eprintln!("warning: logging not initialised: {e}");
    }

    match cli.command {
        Command::Bos => {
            let run = run_bos(&cfg).unwrap_or_else(|e| fail(&e));
            if cli.serve {
                serve(run, cli.port);
            }
        }
        Command::Lcoe => {
            if let Err(e) = run_lcoe_pipeline(&cfg) {
                fail(&e);
            }
        }
    }
}
