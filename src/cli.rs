use std::env;
use std::path::PathBuf;

/// Which pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Bos,
    Lcoe,
}

#[derive(Debug)]
pub struct CliOptions {
    pub command: Command,
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub serve: bool,
    pub port: u16,
}

pub const DEFAULT_PORT: u16 = 3000;

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.is_empty() || (args.len() == 1 && (args[0] == "--help" || args[0] == "-h")) {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let command = match args[0].as_str() {
        "bos" => Command::Bos,
        "lcoe" => Command::Lcoe,
        other => return Err(format!("unknown command: {other} (expected `bos` or `lcoe`)")),
    };

    let mut i = 1usize;
    let mut config = None;
    let mut preset = None;
    let mut serve = false;
    let mut port = None;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --config (expected a TOML file path)",
                )?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --preset (expected a preset name)",
                )?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--serve" => serve = true,
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                let parsed = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
                if port.replace(parsed).is_some() {
                    return Err("--port provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if config.is_some() && preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }
    if command == Command::Lcoe && (preset.is_some() || serve || port.is_some()) {
        return Err("`lcoe` accepts only --config".to_string());
    }
    if port.is_some() && !serve {
        return Err("--port requires --serve".to_string());
    }

    Ok(CliOptions {
        command,
        config,
        preset,
        serve,
        port: port.unwrap_or(DEFAULT_PORT),
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("windbos: wind plant balance-of-system costs and LCOE");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  windbos bos [--config <path> | --preset <name>] [--serve] [--port <u16>]");
    eprintln!("  windbos lcoe [--config <path>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>   Load run configuration from a TOML file");
    eprintln!("  --preset <name>   Use a built-in preset (default, reference_plant)");
    eprintln!("  --serve           Start the REST API after the batch (needs feature `api`)");
    eprintln!("  --port <u16>      API server port (default: {DEFAULT_PORT})");
    eprintln!("  --help            Show this help message");
}
