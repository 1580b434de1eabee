use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Raised when the process receives SIGINT or SIGTERM.
#[derive(Clone, Debug)]
pub(crate) struct OsSignal {
    signal_received: Arc<AtomicBool>,
}

impl OsSignal {
    /// Create the flag and install the event listeners.
    pub(crate) fn install() -> io::Result<OsSignal> {
        // The signals to listen to for termination.
        const TERMINATION_SIGNALS: &[std::ffi::c_int] =
            &[signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM];

        let signal = OsSignal {
            signal_received: Arc::new(AtomicBool::new(false)),
        };

        for &kind in TERMINATION_SIGNALS {
            let _ = signal_hook::flag::register(kind, Arc::clone(&signal.signal_received))?;
        }

        Ok(signal)
    }

    pub(crate) fn is_raised(&self) -> bool {
        self.signal_received.load(Ordering::Relaxed)
    }

    /// The shared flag, to be polled by a running search.
    pub(crate) fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.signal_received)
    }
}
