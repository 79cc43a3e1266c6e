//! # utils
//!
//! The utils module provides common functions used by the exporters.
use clap::crate_version;
use std::time::{Duration, SystemTime};

/// Returns railsampler version.
pub fn get_railsampler_version() -> String {
    String::from(crate_version!())
}

/// Returns the hostname of the system running railsampler,
/// or "unknown" if it can't be represented.
#[cfg(feature = "json")]
pub fn get_hostname() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            warn!("Fail to get system hostname: {e}");
            String::from("unknown")
        }
    }
}

/// Time elapsed since the unix epoch. A clock set before 1970 gives zero.
pub fn current_system_time_since_epoch() -> Duration {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
}
