//! In-store client agent pieces: device identity for trial-abuse heuristics
//! and the debounce primitive used around bursty inputs.

pub mod debounce;
pub mod fingerprint;

pub use debounce::Debouncer;
pub use fingerprint::{DeviceSignals, Fingerprint, FingerprintCollector};
