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
//! Power rail telemetry sampler.
//!
//! Reads the current, voltage and power of every rail of an INA3221 monitor
//! from sysfs, as fast as the reads allow, until a stop is requested.
#[macro_use]
extern crate log;
pub mod errors;
pub mod exporters;
pub mod sampler;
pub mod sensors;
pub mod shutdown;

use errors::SamplerError;
use exporters::Exporter;
use sampler::{RailSampler, RunSummary};
use sensors::Sensor;
use shutdown::Shutdown;

/// Reads the rail names, announces them, then polls until `shutdown` is requested.
///
/// This is the whole program minus argument parsing: startup errors are
/// returned before anything is polled.
pub fn run(
    sensor: Box<dyn Sensor>,
    shutdown: &mut Shutdown,
    exporter: &mut dyn Exporter,
) -> Result<RunSummary, SamplerError> {
    let mut sampler = RailSampler::new(sensor)?;
    exporter.announce(sampler.rails())?;
    sampler.run(shutdown, exporter)
}
