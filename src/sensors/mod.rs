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
pub mod endpoint;
pub mod ina3221;
pub mod units;

use crate::errors::SamplerError;
use endpoint::EndpointGroup;
use std::fmt;
use units::Unit;

// !!!!!!!!!!!!!!!!! Sensor !!!!!!!!!!!!!!!!!!!!!!!
/// Sensor trait, the Sensor API.
///
/// A sensor knows where the rails of a power monitor live. It reads their
/// names once, and opens the endpoints the sampler polls.
pub trait Sensor {
    /// Returns one [`Rail`] per monitored rail, named and in index order.
    fn discover_rails(&self) -> Result<Vec<Rail>, SamplerError>;
    /// Opens every measurement endpoint of every rail.
    fn open_endpoints(&self) -> Result<EndpointGroup, SamplerError>;
}

// !!!!!!!!!!!!!!!!! Metric !!!!!!!!!!!!!!!!!!!!!!!
/// A quantity sampled on every rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Current,
    Voltage,
    Power,
}

impl Metric {
    /// Polling order of the metrics within a rail.
    pub const ALL: [Metric; 3] = [Metric::Current, Metric::Voltage, Metric::Power];

    /// Name of the sysfs attribute holding this metric for `rail`.
    pub fn file_name(&self, rail: usize) -> String {
        match self {
            Metric::Current => format!("in_current{rail}_input"),
            Metric::Voltage => format!("in_voltage{rail}_input"),
            Metric::Power => format!("in_power{rail}_input"),
        }
    }

    /// The unit the monitor reports this metric in.
    pub fn unit(&self) -> Unit {
        match self {
            Metric::Current => Unit::MilliAmpere,
            Metric::Voltage => Unit::MilliVolt,
            Metric::Power => Unit::MilliWatt,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Current => "Current",
            Metric::Voltage => "Voltage",
            Metric::Power => "Power",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label().to_lowercase())
    }
}

// !!!!!!!!!!!!!!!!! Rail !!!!!!!!!!!!!!!!!!!!!!!
/// One monitored power supply line and its latest readings.
///
/// Readings are kept as the text the monitor produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rail {
    pub index: usize,
    pub name: String,
    pub current: String,
    pub voltage: String,
    pub power: String,
}

impl Rail {
    pub fn new(index: usize, name: String) -> Rail {
        Rail {
            index,
            name,
            current: String::new(),
            voltage: String::new(),
            power: String::new(),
        }
    }

    pub fn get(&self, metric: Metric) -> &str {
        match metric {
            Metric::Current => &self.current,
            Metric::Voltage => &self.voltage,
            Metric::Power => &self.power,
        }
    }

    pub fn set(&mut self, metric: Metric, value: String) {
        match metric {
            Metric::Current => self.current = value,
            Metric::Voltage => self.voltage = value,
            Metric::Power => self.power = value,
        }
    }

    /// The reading for `metric` converted to A, V or W, if it is numeric.
    pub fn si_value(&self, metric: Metric) -> Option<f64> {
        let raw: f64 = self.get(metric).trim().parse().ok()?;
        let unit = metric.unit();
        Unit::to(raw, &unit, &unit.si()).ok()
    }
}
