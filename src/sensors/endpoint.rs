//! # endpoint
//!
//! Open measurement files that are read again and again without being reopened.
//! A sysfs attribute only produces a fresh value when it's read from offset 0,
//! so every read is followed by a rewind.
use crate::errors::SamplerError;
use crate::sensors::{Metric, Rail};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::mem;
use std::path::{Path, PathBuf};

/// Reads the first line of `reader`, without its trailing newline.
/// An empty source gives an empty string.
pub fn read_first_line<R: BufRead>(reader: &mut R) -> std::io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

/// One readable text source bound to a single (rail, metric) pair.
#[derive(Debug)]
pub struct MeasurementEndpoint {
    rail: usize,
    metric: Metric,
    path: PathBuf,
    reader: BufReader<File>,
}

impl MeasurementEndpoint {
    pub fn open(rail: usize, metric: Metric, path: &Path) -> Result<MeasurementEndpoint, SamplerError> {
        let file = File::open(path).map_err(|source| SamplerError::OpenEndpoint {
            path: path.to_path_buf(),
            source,
        })?;
        trace!("opened {} for rail {} {}", path.display(), rail, metric);
        Ok(MeasurementEndpoint {
            rail,
            metric,
            path: path.to_path_buf(),
            reader: BufReader::new(file),
        })
    }

    /// Reads one line from the current position.
    pub fn read_value(&mut self) -> Result<String, SamplerError> {
        read_first_line(&mut self.reader).map_err(|source| SamplerError::ReadEndpoint {
            path: self.path.clone(),
            source,
        })
    }

    /// Puts the read position back at the start of the file.
    /// Seeking the BufReader also throws away whatever it had buffered.
    pub fn rewind(&mut self) -> Result<(), SamplerError> {
        self.reader
            .seek(SeekFrom::Start(0))
            .map(|_| ())
            .map_err(|source| SamplerError::RewindEndpoint {
                path: self.path.clone(),
                source,
            })
    }
}

/// The set of endpoints opened together before polling starts, and closed
/// together when polling ends.
///
/// Endpoints are kept in polling order: rail by rail, and within a rail in
/// [`Metric::ALL`] order. Opening is all or nothing: if one file can't be
/// opened, those already opened are closed before the error is returned.
/// The files are closed by [`EndpointGroup::release`] on the normal path and
/// by `Drop` on every other path.
#[derive(Debug)]
pub struct EndpointGroup {
    endpoints: Vec<MeasurementEndpoint>,
}

impl EndpointGroup {
    pub fn open<I>(sources: I) -> Result<EndpointGroup, SamplerError>
    where
        I: IntoIterator<Item = (usize, Metric, PathBuf)>,
    {
        let mut endpoints = vec![];
        for (rail, metric, path) in sources {
            endpoints.push(MeasurementEndpoint::open(rail, metric, &path)?);
        }
        debug!("opened {} measurement endpoints", endpoints.len());
        Ok(EndpointGroup { endpoints })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Checks that every endpoint belongs to one of `rail_count` rails.
    /// Meant to run once, before polling starts.
    pub fn check_rails(&self, rail_count: usize) -> Result<(), SamplerError> {
        match self.endpoints.iter().find(|e| e.rail >= rail_count) {
            Some(endpoint) => Err(SamplerError::InvalidLayout(format!(
                "endpoint {} belongs to unknown rail {}",
                endpoint.path.display(),
                endpoint.rail
            ))),
            None => Ok(()),
        }
    }

    /// Reads every endpoint once, in order, and stores each value in its rail.
    /// Values of endpoints whose rail is missing from `rails` are dropped,
    /// see [`EndpointGroup::check_rails`].
    pub fn read_into(&mut self, rails: &mut [Rail]) -> Result<(), SamplerError> {
        for endpoint in self.endpoints.iter_mut() {
            let value = endpoint.read_value()?;
            if let Some(rail) = rails.get_mut(endpoint.rail) {
                rail.set(endpoint.metric, value);
            }
        }
        Ok(())
    }

    pub fn rewind_all(&mut self) -> Result<(), SamplerError> {
        for endpoint in self.endpoints.iter_mut() {
            endpoint.rewind()?;
        }
        Ok(())
    }

    /// Closes every endpoint and returns how many were closed.
    pub fn release(mut self) -> usize {
        let endpoints = mem::take(&mut self.endpoints);
        let released = endpoints.len();
        drop(endpoints);
        debug!("released {released} measurement endpoints");
        released
    }
}

impl Drop for EndpointGroup {
    fn drop(&mut self) {
        if !self.endpoints.is_empty() {
            debug!(
                "releasing {} measurement endpoints on early exit",
                self.endpoints.len()
            );
        }
    }
}
