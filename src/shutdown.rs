//! # shutdown
//!
//! How the polling loop learns that it has to stop.
//!
//! The loop owns a [`Shutdown`], which holds a [`StopFlag`] and, when running
//! as a program, a [`SignalListener`]. Stop signals are blocked for the thread
//! and consumed through a non-blocking `signalfd`, so no signal handler ever
//! runs and nothing outside the loop's context is mutated.
use crate::errors::SamplerError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(target_os = "linux")]
use nix::sys::{
    signal::{SigSet, Signal},
    signalfd::{SfdFlags, SignalFd},
};

/// One-way false to true switch shared with whoever may stop the loop.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> StopFlag {
        StopFlag::default()
    }

    /// Raises the flag. Returns true only for the call that raised it.
    pub fn raise(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Signals that request a graceful stop.
#[cfg(target_os = "linux")]
pub const STOP_SIGNALS: [Signal; 2] = [Signal::SIGINT, Signal::SIGTERM];

/// Receives stop signals without installing a handler.
#[cfg(target_os = "linux")]
pub struct SignalListener {
    fd: SignalFd,
}

#[cfg(target_os = "linux")]
impl SignalListener {
    /// Blocks `signals` for the calling thread and starts listening for them.
    ///
    /// The signals stay blocked after the listener is dropped: a signal
    /// arriving once the loop is over stays pending instead of killing the
    /// process before it reports its shutdown.
    pub fn new(signals: &[Signal]) -> Result<SignalListener, SamplerError> {
        let mut mask = SigSet::empty();
        for signal in signals {
            mask.add(*signal);
        }
        mask.thread_block()?;
        let fd = SignalFd::with_flags(&mask, SfdFlags::SFD_NONBLOCK | SfdFlags::SFD_CLOEXEC)?;
        debug!("listening for {signals:?}");
        Ok(SignalListener { fd })
    }

    /// Consumes every pending signal. The first one raises `flag`.
    pub fn drain(&mut self, flag: &StopFlag) -> Result<(), SamplerError> {
        while let Some(info) = self.fd.read_signal()? {
            let name = Signal::try_from(info.ssi_signo as i32)
                .map(|s| s.as_str())
                .unwrap_or("unknown signal");
            if flag.raise() {
                info!("Caught {name}, stopping");
            } else {
                debug!("Caught {name} while already stopping, ignoring it");
            }
        }
        Ok(())
    }
}

/// Everything the polling loop checks before starting an iteration.
pub struct Shutdown {
    flag: StopFlag,
    #[cfg(target_os = "linux")]
    listener: Option<SignalListener>,
}

impl Shutdown {
    /// A shutdown that only happens through `flag`.
    pub fn new(flag: StopFlag) -> Shutdown {
        Shutdown {
            flag,
            #[cfg(target_os = "linux")]
            listener: None,
        }
    }

    /// A shutdown that also happens on any of [`STOP_SIGNALS`].
    #[cfg(target_os = "linux")]
    pub fn on_signals(flag: StopFlag) -> Result<Shutdown, SamplerError> {
        Ok(Shutdown {
            flag,
            listener: Some(SignalListener::new(&STOP_SIGNALS)?),
        })
    }

    pub fn flag(&self) -> StopFlag {
        self.flag.clone()
    }

    /// True once a stop has been requested.
    pub fn requested(&mut self) -> Result<bool, SamplerError> {
        #[cfg(target_os = "linux")]
        if let Some(listener) = self.listener.as_mut() {
            listener.drain(&self.flag)?;
        }
        Ok(self.flag.is_raised())
    }
}
