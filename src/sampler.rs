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
use crate::errors::SamplerError;
use crate::exporters::Exporter;
use crate::sensors::{Rail, Sensor};
use crate::shutdown::Shutdown;
use std::time::Instant;

/// What a completed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of complete polling iterations.
    pub iterations: u64,
    /// Number of endpoints closed once polling stopped.
    pub released: usize,
}

/// Polls every rail of a sensor as fast as the reads allow, until asked to stop.
pub struct RailSampler {
    sensor: Box<dyn Sensor>,
    rails: Vec<Rail>,
}

impl RailSampler {
    /// Reads the rail names. Any unreadable name is fatal.
    pub fn new(sensor: Box<dyn Sensor>) -> Result<RailSampler, SamplerError> {
        let rails = sensor.discover_rails()?;
        info!("discovered {} rails", rails.len());
        Ok(RailSampler { sensor, rails })
    }

    pub fn rails(&self) -> &[Rail] {
        &self.rails
    }

    /// Opens every endpoint then polls them until `shutdown` is requested.
    ///
    /// Each iteration reads every endpoint, hands the values to the exporter,
    /// rewinds every endpoint and reports how long that took. There is no
    /// pause between iterations.
    ///
    /// A read or rewind failure ends the run with an error. The endpoints are
    /// closed whatever the outcome, but the exporter is only told about the
    /// shutdown when it was requested.
    pub fn run(
        &mut self,
        shutdown: &mut Shutdown,
        exporter: &mut dyn Exporter,
    ) -> Result<RunSummary, SamplerError> {
        let mut endpoints = self.sensor.open_endpoints()?;
        endpoints.check_rails(self.rails.len())?;
        info!(
            "polling {} endpoints for {} exporter",
            endpoints.len(),
            exporter.kind()
        );

        let mut iterations: u64 = 0;
        while !shutdown.requested()? {
            let start = Instant::now();
            endpoints.read_into(&mut self.rails)?;
            exporter.sample(&self.rails)?;
            endpoints.rewind_all()?;
            let elapsed = start.elapsed();
            exporter.iteration_time(elapsed)?;
            iterations += 1;
            trace!("iteration {iterations} took {elapsed:?}");
        }

        let released = endpoints.release();
        info!("stopped after {iterations} iterations");
        exporter.shutdown()?;
        Ok(RunSummary {
            iterations,
            released,
        })
    }
}
