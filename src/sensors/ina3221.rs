//! # ina3221
//!
//! Sensor for the INA3221 triple-channel power monitor, as exposed by the
//! `ina3221x` iio driver on Jetson boards.
use crate::errors::SamplerError;
use crate::sensors::endpoint::{read_first_line, EndpointGroup};
use crate::sensors::{Metric, Rail, Sensor};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Where the driver exposes the monitor on the board.
pub const DEFAULT_BASE_PATH: &str = "/sys/bus/i2c/drivers/ina3221x/6-0040/iio:device0/";
/// Number of channels of the chip.
pub const MAX_RAILS: usize = 3;

/// Locates the files of every rail under one iio device directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailLayout {
    base_path: PathBuf,
    rail_count: usize,
}

impl RailLayout {
    pub fn new<P: Into<PathBuf>>(base_path: P, rail_count: usize) -> Result<RailLayout, SamplerError> {
        if rail_count == 0 || rail_count > MAX_RAILS {
            return Err(SamplerError::InvalidLayout(format!(
                "rail count should be between 1 and {MAX_RAILS}, got {rail_count}"
            )));
        }
        Ok(RailLayout {
            base_path: base_path.into(),
            rail_count,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn rail_count(&self) -> usize {
        self.rail_count
    }

    pub fn name_path(&self, rail: usize) -> PathBuf {
        self.base_path.join(format!("rail_name_{rail}"))
    }

    pub fn metric_path(&self, rail: usize, metric: Metric) -> PathBuf {
        self.base_path.join(metric.file_name(rail))
    }

    /// Every (rail, metric, path) triple, in polling order.
    pub fn metric_sources(&self) -> Vec<(usize, Metric, PathBuf)> {
        let mut sources = Vec::with_capacity(self.rail_count * Metric::ALL.len());
        for rail in 0..self.rail_count {
            for metric in Metric::ALL {
                sources.push((rail, metric, self.metric_path(rail, metric)));
            }
        }
        sources
    }
}

impl Default for RailLayout {
    fn default() -> RailLayout {
        RailLayout {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            rail_count: MAX_RAILS,
        }
    }
}

pub struct Ina3221Sensor {
    layout: RailLayout,
}

impl Ina3221Sensor {
    pub fn new(layout: RailLayout) -> Ina3221Sensor {
        Ina3221Sensor { layout }
    }

    fn read_rail_name(&self, rail: usize) -> Result<String, SamplerError> {
        let path = self.layout.name_path(rail);
        File::open(&path)
            .and_then(|file| read_first_line(&mut BufReader::new(file)))
            .map_err(|source| SamplerError::RailName { path, source })
    }
}

impl Sensor for Ina3221Sensor {
    fn discover_rails(&self) -> Result<Vec<Rail>, SamplerError> {
        let mut rails = vec![];
        debug!("reading rail names under {}", self.layout.base_path().display());
        for index in 0..self.layout.rail_count() {
            let name = self.read_rail_name(index)?;
            debug!("rail {index} is named {name:?}");
            rails.push(Rail::new(index, name));
        }
        Ok(rails)
    }

    fn open_endpoints(&self) -> Result<EndpointGroup, SamplerError> {
        EndpointGroup::open(self.layout.metric_sources())
    }
}
