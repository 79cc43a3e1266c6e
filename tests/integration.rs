//  Copyright 2024 The railsampler authors.
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
use railsampler::errors::SamplerError;
use railsampler::exporters::stdout::{ExporterArgs, StdoutExporter, SHUTDOWN_MESSAGE};
use railsampler::exporters::Exporter;
use railsampler::sensors::ina3221::{Ina3221Sensor, RailLayout};
use railsampler::sensors::{Metric, Rail};
use railsampler::shutdown::{Shutdown, StopFlag};
use std::fs;
use std::io;
use std::time::Duration;
use tempfile::{tempdir, TempDir};

/// Writes an iio device directory the way the ina3221x driver lays it out.
fn fake_ina3221(rails: &[(&str, &str, &str, &str)]) -> TempDir {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    for (i, (rail, current, voltage, power)) in rails.iter().enumerate() {
        fs::write(dir.join(format!("rail_name_{i}")), format!("{rail}\n")).unwrap();
        fs::write(dir.join(format!("in_current{i}_input")), format!("{current}\n")).unwrap();
        fs::write(dir.join(format!("in_voltage{i}_input")), format!("{voltage}\n")).unwrap();
        fs::write(dir.join(format!("in_power{i}_input")), format!("{power}\n")).unwrap();
    }
    tmp
}

const JETSON_RAILS: [(&str, &str, &str, &str); 3] = [
    ("VDD_IN", "120", "5000", "600"),
    ("VDD_CPU", "80", "5000", "400"),
    ("VDD_GPU", "20", "5000", "100"),
];

/// Forwards everything to a stdout exporter, keeps the last readings
/// and stops the run after `stop_after` iterations.
struct StopAfter {
    inner: StdoutExporter<Vec<u8>>,
    flag: StopFlag,
    stop_after: u64,
    iterations: u64,
    last: Vec<Rail>,
}

impl StopAfter {
    fn new(flag: StopFlag, stop_after: u64, values: bool) -> StopAfter {
        StopAfter {
            inner: StdoutExporter::with_writer(
                vec![],
                ExporterArgs {
                    values,
                    no_color: true,
                },
            ),
            flag,
            stop_after,
            iterations: 0,
            last: vec![],
        }
    }

    fn output(self) -> String {
        String::from_utf8(self.inner.into_inner()).unwrap()
    }
}

impl Exporter for StopAfter {
    fn announce(&mut self, rails: &[Rail]) -> io::Result<()> {
        self.inner.announce(rails)
    }

    fn sample(&mut self, rails: &[Rail]) -> io::Result<()> {
        self.last = rails.to_vec();
        self.inner.sample(rails)
    }

    fn iteration_time(&mut self, elapsed: Duration) -> io::Result<()> {
        self.inner.iteration_time(elapsed)?;
        self.iterations += 1;
        if self.iterations >= self.stop_after {
            self.flag.raise();
        }
        Ok(())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.inner.shutdown()
    }

    fn kind(&self) -> &str {
        "stop-after"
    }
}

#[test]
fn one_iteration_on_a_jetson_layout() {
    let tmp = fake_ina3221(&JETSON_RAILS);
    let dir = tmp.path();
    let sensor = Ina3221Sensor::new(RailLayout::new(dir, 3).unwrap());
    let flag = StopFlag::new();
    let mut exporter = StopAfter::new(flag.clone(), 1, false);

    let summary =
        railsampler::run(Box::new(sensor), &mut Shutdown::new(flag), &mut exporter).unwrap();
    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.released, 9);

    assert_eq!(exporter.last[0].current, "120");
    assert_eq!(exporter.last[0].voltage, "5000");
    assert_eq!(exporter.last[0].power, "600");
    assert_eq!(exporter.last[2].power, "100");

    let output = exporter.output();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 5, "unexpected output:\n{output}");
    assert_eq!(lines[0], "Rail 0: VDD_IN");
    assert_eq!(lines[1], "Rail 1: VDD_CPU");
    assert_eq!(lines[2], "Rail 2: VDD_GPU");
    let seconds: f64 = lines[3]
        .strip_prefix("End - Start = ")
        .expect("duration line")
        .parse()
        .unwrap();
    assert!(seconds >= 0.0);
    assert_eq!(lines[4], SHUTDOWN_MESSAGE);
}

#[test]
fn values_are_printed_before_timing_when_enabled() {
    let tmp = fake_ina3221(&JETSON_RAILS);
    let dir = tmp.path();
    let sensor = Ina3221Sensor::new(RailLayout::new(dir, 3).unwrap());
    let flag = StopFlag::new();
    let mut exporter = StopAfter::new(flag.clone(), 2, true);

    railsampler::run(Box::new(sensor), &mut Shutdown::new(flag), &mut exporter).unwrap();

    let output = exporter.output();
    let lines: Vec<&str> = output.lines().collect();
    // 3 names, 2 x (3 values + 1 timing), 1 shutdown
    assert_eq!(lines.len(), 12, "unexpected output:\n{output}");
    assert!(lines[3].starts_with("[VDD_IN     ] Current:  120 mA"));
    assert!(lines[5].starts_with("[VDD_GPU    ]"));
    assert!(lines[6].starts_with("End - Start = "));
    assert_eq!(
        lines.iter().filter(|l| **l == SHUTDOWN_MESSAGE).count(),
        1
    );
}

#[test]
fn fewer_rails_than_the_chip_has() {
    let tmp = fake_ina3221(&JETSON_RAILS[..1]);
    let dir = tmp.path();
    let sensor = Ina3221Sensor::new(RailLayout::new(dir, 1).unwrap());
    let flag = StopFlag::new();
    let mut exporter = StopAfter::new(flag.clone(), 1, false);

    let summary =
        railsampler::run(Box::new(sensor), &mut Shutdown::new(flag), &mut exporter).unwrap();
    assert_eq!(summary.released, 3);
    assert!(exporter.output().starts_with("Rail 0: VDD_IN\nEnd - Start = "));
}

#[test]
fn missing_rail_name_aborts_before_anything_is_printed() {
    let tmp = fake_ina3221(&JETSON_RAILS);
    let dir = tmp.path();
    fs::remove_file(dir.join("rail_name_1")).unwrap();
    let sensor = Ina3221Sensor::new(RailLayout::new(dir, 3).unwrap());
    let flag = StopFlag::new();
    let mut exporter = StopAfter::new(flag.clone(), 1, false);

    let result = railsampler::run(Box::new(sensor), &mut Shutdown::new(flag), &mut exporter);
    assert!(matches!(result, Err(SamplerError::RailName { .. })));
    assert!(exporter.output().is_empty());
}

#[test]
fn missing_metric_aborts_without_shutdown_message() {
    let tmp = fake_ina3221(&JETSON_RAILS);
    let dir = tmp.path();
    fs::remove_file(dir.join(Metric::Power.file_name(2))).unwrap();
    let sensor = Ina3221Sensor::new(RailLayout::new(dir, 3).unwrap());
    let flag = StopFlag::new();
    let mut exporter = StopAfter::new(flag.clone(), 1, false);

    let result = railsampler::run(Box::new(sensor), &mut Shutdown::new(flag), &mut exporter);
    match result {
        Err(SamplerError::OpenEndpoint { path, .. }) => {
            assert_eq!(path, dir.join("in_power2_input"))
        }
        other => panic!("expected an open error, got {other:?}"),
    }
    let output = exporter.output();
    assert!(output.starts_with("Rail 0: VDD_IN"));
    assert!(!output.contains(SHUTDOWN_MESSAGE));
}

#[test]
fn read_failure_mid_loop_is_fatal_without_shutdown_message() {
    let tmp = fake_ina3221(&JETSON_RAILS);
    let dir = tmp.path();
    let power = dir.join(Metric::Power.file_name(2));
    // A directory opens fine but every read of it fails.
    fs::remove_file(&power).unwrap();
    fs::create_dir(&power).unwrap();
    let sensor = Ina3221Sensor::new(RailLayout::new(dir, 3).unwrap());
    let flag = StopFlag::new();
    let mut exporter = StopAfter::new(flag.clone(), 1, false);

    let err = railsampler::run(Box::new(sensor), &mut Shutdown::new(flag), &mut exporter)
        .expect_err("a directory can't be read");
    assert!(!err.is_startup());
    match err {
        SamplerError::ReadEndpoint { path, .. } => assert_eq!(path, power),
        other => panic!("expected a read error, got {other:?}"),
    }
    assert_eq!(exporter.iterations, 0);
    let output = exporter.output();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec!["Rail 0: VDD_IN", "Rail 1: VDD_CPU", "Rail 2: VDD_GPU"],
        "unexpected output:\n{output}"
    );
    assert!(!output.contains(SHUTDOWN_MESSAGE));
}

#[cfg(feature = "json")]
#[test]
fn json_reports_keep_names_off_the_report_stream() {
    use railsampler::exporters::json::{ExporterArgs as JsonArgs, JsonExporter};

    let tmp = fake_ina3221(&JETSON_RAILS);
    let dir = tmp.path();
    let sensor = Ina3221Sensor::new(RailLayout::new(dir, 3).unwrap());
    let flag = StopFlag::new();
    flag.raise();
    let mut exporter = JsonExporter::with_writers(vec![], vec![], JsonArgs::default());

    let summary =
        railsampler::run(Box::new(sensor), &mut Shutdown::new(flag), &mut exporter).unwrap();
    assert_eq!(summary.iterations, 0);

    let (reports, notices) = exporter.into_inner().unwrap();
    assert!(reports.is_empty());
    assert_eq!(
        String::from_utf8(notices).unwrap(),
        format!("Rail 0: VDD_IN\nRail 1: VDD_CPU\nRail 2: VDD_GPU\n{SHUTDOWN_MESSAGE}\n")
    );
}
