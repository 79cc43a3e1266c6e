use crate::exporters::stdout::SHUTDOWN_MESSAGE;
use crate::exporters::{utils, Exporter};
use crate::sensors::{Metric, Rail};
use serde::{Deserialize, Serialize};
use std::io::{self, BufWriter, Write};
use std::time::Duration;

/// An Exporter that writes one JSON object per iteration
/// to the standard output.
///
/// The rail names and the shutdown message go to a separate writer,
/// the standard error by default, so that the reports stay one JSON
/// document per line.
pub struct JsonExporter<W: Write = io::Stdout, E: Write = io::Stderr> {
    out_writer: BufWriter<W>,
    notices: E,
    hostname: String,
    pretty: bool,
    pending: Option<Vec<RailReport>>,
    timestamp: f64,
}

/// Holds the arguments for a JsonExporter.
#[derive(clap::Args, Debug, Default)]
pub struct ExporterArgs {
    /// Pretty-print each report instead of writing one per line
    #[arg(long)]
    pub pretty: bool,
}

// Below are the structures that will store the reports.

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Reading {
    pub value: String,
    pub unit: String,
    pub si_value: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct RailReport {
    pub index: usize,
    pub name: String,
    pub current: Reading,
    pub voltage: Reading,
    pub power: Reading,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Report {
    pub host: String,
    pub timestamp: f64,
    pub elapsed: f64,
    pub rails: Vec<RailReport>,
}

fn reading(rail: &Rail, metric: Metric) -> Reading {
    Reading {
        value: rail.get(metric).to_string(),
        unit: metric.unit().symbol().to_string(),
        si_value: rail.si_value(metric),
    }
}

impl From<&Rail> for RailReport {
    fn from(rail: &Rail) -> RailReport {
        RailReport {
            index: rail.index,
            name: rail.name.clone(),
            current: reading(rail, Metric::Current),
            voltage: reading(rail, Metric::Voltage),
            power: reading(rail, Metric::Power),
        }
    }
}

impl JsonExporter<io::Stdout, io::Stderr> {
    /// Instantiates and returns a new JsonExporter writing reports to stdout
    /// and notices to stderr.
    pub fn new(args: ExporterArgs) -> JsonExporter<io::Stdout, io::Stderr> {
        JsonExporter::with_writers(io::stdout(), io::stderr(), args)
    }
}

impl<W: Write, E: Write> JsonExporter<W, E> {
    pub fn with_writers(out: W, notices: E, args: ExporterArgs) -> JsonExporter<W, E> {
        JsonExporter {
            out_writer: BufWriter::new(out),
            notices,
            hostname: utils::get_hostname(),
            pretty: args.pretty,
            pending: None,
            timestamp: 0.0,
        }
    }

    /// Returns the report writer and the notice writer.
    pub fn into_inner(self) -> io::Result<(W, E)> {
        let out = self.out_writer.into_inner().map_err(|e| e.into_error())?;
        Ok((out, self.notices))
    }
}

impl<W: Write, E: Write> Exporter for JsonExporter<W, E> {
    fn announce(&mut self, rails: &[Rail]) -> io::Result<()> {
        for rail in rails {
            writeln!(self.notices, "Rail {}: {}", rail.index, rail.name)?;
        }
        self.notices.flush()
    }

    fn sample(&mut self, rails: &[Rail]) -> io::Result<()> {
        self.timestamp = utils::current_system_time_since_epoch().as_secs_f64();
        self.pending = Some(rails.iter().map(RailReport::from).collect());
        Ok(())
    }

    fn iteration_time(&mut self, elapsed: Duration) -> io::Result<()> {
        let rails = match self.pending.take() {
            Some(rails) => rails,
            None => return Ok(()),
        };
        let report = Report {
            host: self.hostname.clone(),
            timestamp: self.timestamp,
            elapsed: elapsed.as_secs_f64(),
            rails,
        };
        let json = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        }
        .map_err(io::Error::from)?;
        writeln!(self.out_writer, "{json}")?;
        self.out_writer.flush()
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.out_writer.flush()?;
        writeln!(self.notices, "{SHUTDOWN_MESSAGE}")?;
        self.notices.flush()
    }

    fn kind(&self) -> &str {
        "json"
    }
}
