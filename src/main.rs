//! cellgraph - Formula spreadsheet engine on the command line

mod config;
mod error;

use anyhow::Context;
use cellgraph_core::{CellValue, Spreadsheet};
use cellgraph_engine::engine::format_number;
use error::ArgsError;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: cellgraph [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Spreadsheet file to open (.cgs)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula, print the result and exit");
    eprintln!("  -s, --set <NAME=CONTENTS> Set a cell before anything else (can be repeated)");
    eprintln!("  -o, --output <FILE>       Save the spreadsheet to FILE");
    eprintln!("  --config <FILE>           Load settings from FILE instead of config.toml");
    eprintln!("  --no-config               Ignore the user config file");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Without --command or --output, prints NAME, CONTENTS and VALUE of every cell.");
    eprintln!("Set CELLGRAPH_LOG (e.g. CELLGRAPH_LOG=debug) to enable logging.");
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    file_path: Option<PathBuf>,
    command: Option<String>,
    assignments: Vec<(String, String)>,
    output_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    no_config: bool,
    help: bool,
}

fn parse_args<I>(args: I) -> Result<Options, ArgsError>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value_for = |flag: &str| {
            args.next()
                .ok_or_else(|| ArgsError::MissingValue(flag.to_string()))
        };
        match arg.as_str() {
            "-h" | "--help" => options.help = true,
            "-c" | "--command" => options.command = Some(value_for("--command")?),
            "-s" | "--set" => {
                let assignment = value_for("--set")?;
                let Some((name, contents)) = assignment.split_once('=') else {
                    return Err(ArgsError::InvalidAssignment(assignment));
                };
                options
                    .assignments
                    .push((name.trim().to_string(), contents.to_string()));
            }
            "-o" | "--output" => options.output_file = Some(PathBuf::from(value_for("--output")?)),
            "--config" => options.config_file = Some(PathBuf::from(value_for("--config")?)),
            "--no-config" => options.no_config = true,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(ArgsError::UnknownOption(arg));
            }
            _ => {
                if options.file_path.is_some() {
                    return Err(ArgsError::UnexpectedArgument(arg));
                }
                options.file_path = Some(PathBuf::from(arg));
            }
        }
    }

    Ok(options)
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("CELLGRAPH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the command line; returns the process exit code.
fn run(options: Options) -> anyhow::Result<i32> {
    let (config, warnings) = if options.no_config {
        (config::Config::default(), Vec::new())
    } else {
        config::load_config(options.config_file.as_ref())
    };
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    debug!(version = %config.version, normalize = ?config.normalize, "configuration loaded");

    let mut sheet = match &options.file_path {
        Some(path) if path.exists() => config
            .load_sheet(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        _ => config.new_sheet(),
    };

    for (name, contents) in &options.assignments {
        sheet
            .set_contents_of_cell(name, contents)
            .with_context(|| format!("Failed to set {}", name))?;
    }

    if let Some(output_path) = &options.output_file {
        sheet
            .save(output_path)
            .with_context(|| format!("Failed to save {}", output_path.display()))?;
        eprintln!("Saved to {}", output_path.display());
    }

    if let Some(command) = &options.command {
        return Ok(run_command(&sheet, command));
    }

    if options.output_file.is_none() {
        print_cells(&sheet)?;
    }
    Ok(0)
}

/// Evaluate a single formula against the sheet and print the result.
fn run_command(sheet: &Spreadsheet, command: &str) -> i32 {
    let formula = command.trim();
    let formula = formula.strip_prefix('=').unwrap_or(formula);

    let result = sheet
        .parse_formula(formula)
        .map_err(|e| e.to_string())
        .and_then(|f| sheet.evaluate(&f).map_err(|e| e.reason()));

    match result {
        Ok(value) => {
            println!("{}", format_number(value));
            0
        }
        Err(reason) => {
            println!("#ERR: {}", reason);
            1
        }
    }
}

fn print_cells(sheet: &Spreadsheet) -> anyhow::Result<()> {
    for name in sheet.nonempty_cell_names() {
        let contents = sheet.cell_contents(name)?;
        let value = sheet.cell_value(name)?;
        let value = match value {
            CellValue::Text(s) => s.escape_debug().to_string(),
            other => other.to_string(),
        };
        println!(
            "{}\t{}\t{}",
            name,
            contents.to_input_string().escape_debug(),
            value
        );
    }
    Ok(())
}

fn main() {
    init_logging();

    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if options.help {
        print_usage();
        return;
    }

    match run(options) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
