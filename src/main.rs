//! Power rail telemetry sampler for INA3221 sysfs monitors.

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use log::{error, info};
use railsampler::exporters::{self, Exporter};
use railsampler::sensors::ina3221::{Ina3221Sensor, RailLayout, DEFAULT_BASE_PATH, MAX_RAILS};
use railsampler::shutdown::{Shutdown, StopFlag};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[cfg(not(target_os = "linux"))]
compile_error!("Unsupported target OS: railsampler reads Linux sysfs");

// the struct below defines the main railsampler command-line interface
/// Samples the power rails of an INA3221 monitor until interrupted.
#[derive(Parser)]
#[command(author, version)]
struct Cli {
    /// The exporter module to use to output the rail readings
    #[command(subcommand)]
    exporter: ExporterChoice,

    /// Increase the verbosity level
    #[arg(short, action = ArgAction::Count, default_value_t = 0)]
    verbose: u8,

    /// Don't print the header to the standard output
    #[arg(long, default_value_t = false)]
    no_header: bool,

    /// Directory of the iio device exposing the rails
    #[arg(long, value_name = "DIR", default_value = DEFAULT_BASE_PATH)]
    base_path: PathBuf,

    /// Number of rails to sample
    #[arg(long, default_value_t = MAX_RAILS)]
    rails: usize,
}

/// Defines the possible subcommands, one per exporter.
///
/// ### Description style
/// Per the clap documentation, the description of commands and arguments should be written in the style applied here,
/// *not* in the third-person. That is, use "Do xyz" instead of "Does xyz".
#[derive(Subcommand)]
enum ExporterChoice {
    /// Write one JSON report per iteration to stdout
    #[cfg(feature = "json")]
    Json(exporters::json::ExporterArgs),

    /// Write the rail names and the iteration timings to the terminal
    Stdout(exporters::stdout::ExporterArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = loggerv::init_with_verbosity(cli.verbose.into()) {
        eprintln!("unable to initialize the logger: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{}", render_error(e.as_ref()).red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    // Block the stop signals first, so one arriving during startup is not lost.
    let mut shutdown = Shutdown::on_signals(StopFlag::new())?;
    let sensor = build_sensor(&cli)?;
    let no_header = cli.no_header;
    let mut exporter = build_exporter(cli.exporter);
    if !no_header {
        print_railsampler_header(exporter.kind());
    }

    let summary = railsampler::run(Box::new(sensor), &mut shutdown, exporter.as_mut())?;
    info!(
        "{} iterations, {} endpoints released",
        summary.iterations, summary.released
    );
    Ok(())
}

fn build_sensor(cli: &Cli) -> Result<Ina3221Sensor, Box<dyn Error>> {
    let layout = RailLayout::new(cli.base_path.clone(), cli.rails)?;
    Ok(Ina3221Sensor::new(layout))
}

fn build_exporter(choice: ExporterChoice) -> Box<dyn Exporter> {
    match choice {
        #[cfg(feature = "json")]
        ExporterChoice::Json(args) => {
            Box::new(exporters::json::JsonExporter::new(args)) // keep this in braces
        }
        ExporterChoice::Stdout(args) => {
            Box::new(exporters::stdout::StdoutExporter::new(args)) // keep this in braces
        }
    }
    // Note that invalid choices are automatically turned into errors by `parse()` before the Cli is populated,
    // that's why they don't appear in this function.
}

/// Joins an error and its sources, outermost first.
fn render_error(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}

fn print_railsampler_header(exporter_name: &str) {
    let title = format!(
        "railsampler {} {exporter_name} exporter",
        exporters::utils::get_railsampler_version()
    );
    println!("{}", title.red().bold());
    println!("Sampling ⚡ rails");
}
