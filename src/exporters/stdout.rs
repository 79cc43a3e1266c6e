use crate::exporters::Exporter;
use crate::sensors::{Metric, Rail};
use colored::*;
use std::io::{self, Write};
use std::time::Duration;

/// Printed once polling has stopped and the endpoints are closed.
pub const SHUTDOWN_MESSAGE: &str = "Stop requested. Closing program...";

/// An Exporter that displays the rails on the standard output of the terminal.
pub struct StdoutExporter<W: Write = io::Stdout> {
    out: W,
    show_values: bool,
    color: bool,
}

/// Holds the arguments for a StdoutExporter.
///
/// When using railsampler as a command-line application, such a struct will be
/// automatically populated by the clap library. If you're using railsampler as
/// a library, you should populate the arguments yourself.
#[derive(clap::Args, Debug, Default)]
pub struct ExporterArgs {
    /// Print the current, voltage and power of every rail on each iteration
    #[arg(long)]
    pub values: bool,

    /// Don't colorize the output
    #[arg(long)]
    pub no_color: bool,
}

impl StdoutExporter<io::Stdout> {
    /// Instantiates and returns a new StdoutExporter writing to stdout.
    pub fn new(args: ExporterArgs) -> StdoutExporter<io::Stdout> {
        StdoutExporter::with_writer(io::stdout(), args)
    }
}

impl<W: Write> StdoutExporter<W> {
    pub fn with_writer(out: W, args: ExporterArgs) -> StdoutExporter<W> {
        StdoutExporter {
            out,
            show_values: args.values,
            color: !args.no_color,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn rail_line(&self, rail: &Rail) -> String {
        let tag = format!("[{:<11}] ", rail.name);
        let tag = if self.color {
            tag.white().bold().to_string()
        } else {
            tag
        };
        let values: Vec<String> = Metric::ALL
            .iter()
            .map(|m| format!("{}: {:>4} {}", m.label(), rail.get(*m), m.unit().symbol()))
            .collect();
        format!("{tag}{}", values.join(" -- "))
    }
}

impl<W: Write> Exporter for StdoutExporter<W> {
    fn announce(&mut self, rails: &[Rail]) -> io::Result<()> {
        for rail in rails {
            writeln!(self.out, "Rail {}: {}", rail.index, rail.name)?;
        }
        self.out.flush()
    }

    fn sample(&mut self, rails: &[Rail]) -> io::Result<()> {
        if !self.show_values {
            return Ok(());
        }
        for rail in rails {
            let line = self.rail_line(rail);
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn iteration_time(&mut self, elapsed: Duration) -> io::Result<()> {
        writeln!(self.out, "End - Start = {}", elapsed.as_secs_f64())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        writeln!(self.out, "{SHUTDOWN_MESSAGE}")?;
        self.out.flush()
    }

    fn kind(&self) -> &str {
        "stdout"
    }
}
