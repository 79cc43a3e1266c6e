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
use std::convert;
use std::io;
use std::path::PathBuf;
use std::{error::Error, fmt};

/// Everything that can stop the sampler before a requested shutdown.
#[derive(Debug)]
pub enum SamplerError {
    /// The name of a rail couldn't be read at startup.
    RailName { path: PathBuf, source: io::Error },
    /// A measurement endpoint couldn't be opened at startup.
    OpenEndpoint { path: PathBuf, source: io::Error },
    /// Reading an open endpoint failed while polling.
    ReadEndpoint { path: PathBuf, source: io::Error },
    /// Seeking an open endpoint back to its start failed while polling.
    RewindEndpoint { path: PathBuf, source: io::Error },
    /// The stop signals couldn't be blocked or read.
    #[cfg(target_os = "linux")]
    Signal(nix::Error),
    /// Writing a report failed.
    Output(io::Error),
    /// The rail count or the endpoints of a sensor don't fit together.
    /// Only raised before polling starts.
    InvalidLayout(String),
}

impl SamplerError {
    /// True for the errors raised before the polling loop could start.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            SamplerError::RailName { .. }
                | SamplerError::OpenEndpoint { .. }
                | SamplerError::InvalidLayout(_)
        )
    }
}

impl Error for SamplerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SamplerError::RailName { source, .. }
            | SamplerError::OpenEndpoint { source, .. }
            | SamplerError::ReadEndpoint { source, .. }
            | SamplerError::RewindEndpoint { source, .. } => Some(source),
            #[cfg(target_os = "linux")]
            SamplerError::Signal(e) => Some(e),
            SamplerError::Output(e) => Some(e),
            SamplerError::InvalidLayout(_) => None,
        }
    }
}

impl fmt::Display for SamplerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SamplerError::RailName { path, .. } => {
                write!(f, "Couldn't read rail name from {}", path.display())
            }
            SamplerError::OpenEndpoint { path, .. } => {
                write!(f, "Unable to open file: {}", path.display())
            }
            SamplerError::ReadEndpoint { path, .. } => {
                write!(f, "Couldn't read from {}", path.display())
            }
            SamplerError::RewindEndpoint { path, .. } => {
                write!(f, "Couldn't rewind {}", path.display())
            }
            #[cfg(target_os = "linux")]
            SamplerError::Signal(_) => write!(f, "Couldn't listen for stop signals"),
            SamplerError::Output(_) => write!(f, "Couldn't write report"),
            SamplerError::InvalidLayout(reason) => write!(f, "Invalid rail layout: {reason}"),
        }
    }
}

impl convert::From<io::Error> for SamplerError {
    fn from(error: io::Error) -> Self {
        SamplerError::Output(error)
    }
}

#[cfg(target_os = "linux")]
impl convert::From<nix::Error> for SamplerError {
    fn from(error: nix::Error) -> Self {
        SamplerError::Signal(error)
    }
}
