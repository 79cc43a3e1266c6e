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
#[cfg(feature = "json")]
pub mod json;
pub mod stdout;
pub mod utils;

use crate::sensors::Rail;
use std::io;
use std::time::Duration;

/// An Exporter is what tells the outside world about the rails.
///
/// The sampler owns the polling loop and calls the exporter at fixed points
/// of it: once when the rails are known, on every iteration before the
/// endpoints are rewound, once the iteration is timed, and once after the
/// endpoints have been released.
pub trait Exporter {
    /// Called once, after the rail names have been read.
    fn announce(&mut self, rails: &[Rail]) -> io::Result<()>;

    /// Called on every iteration with freshly read values.
    fn sample(&mut self, rails: &[Rail]) -> io::Result<()>;

    /// Called on every iteration with the time spent reading and rewinding.
    fn iteration_time(&mut self, elapsed: Duration) -> io::Result<()>;

    /// Called once when polling stopped on request.
    fn shutdown(&mut self) -> io::Result<()>;

    fn kind(&self) -> &str;
}
