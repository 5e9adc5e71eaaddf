//! Device fingerprint collection for trial-abuse prevention.
//!
//! The fingerprint is a weak identity signal consumed by fraud heuristics
//! downstream, so this module is deliberately error-tolerant: any failure in
//! signal gathering degrades to a generated pseudo-identity instead of
//! failing the caller.

use parking_lot::RwLock;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("could not read host signals: {0}")]
    Unavailable(String),
}

/// Raw host signals the fingerprint hash is derived from.
///
/// The set is fixed: adding or removing a signal changes every device's hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSignals {
    pub hostname: String,
    pub os: &'static str,
    pub arch: &'static str,
    pub locale: String,
    pub timezone: String,
    pub cpu_count: usize,
}

impl DeviceSignals {
    fn combined(&self) -> String {
        format!(
            "{}|||{}|||{}|||{}|||{}|||{}",
            self.hostname, self.os, self.arch, self.locale, self.timezone, self.cpu_count
        )
    }
}

/// A collected identity: the stable hash plus the signals it came from.
/// `raw` is `None` on the fallback path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fingerprint {
    pub value: String,
    pub raw: Option<DeviceSignals>,
}

/// Hex-encoded SHA-256 over the combined signal set.
pub fn fingerprint_hash(signals: &DeviceSignals) -> String {
    let digest = Sha256::digest(signals.combined().as_bytes());
    hex::encode(digest)
}

/// Reads the fixed signal set from the host environment.
pub fn gather_signals() -> Result<DeviceSignals, SignalError> {
    Ok(DeviceSignals {
        hostname: read_hostname()?,
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        locale: env_signal("LC_ALL")
            .or_else(|| env_signal("LANG"))
            .unwrap_or_else(|| "unknown".to_string()),
        timezone: env_signal("TZ").unwrap_or_else(read_timezone_file),
        cpu_count: std::thread::available_parallelism()
            .map(usize::from)
            .unwrap_or(0),
    })
}

fn env_signal(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn read_hostname() -> Result<String, SignalError> {
    if let Ok(name) = std::env::var("HOSTNAME")
        && !name.is_empty()
    {
        return Ok(name);
    }
    std::fs::read_to_string("/etc/hostname")
        .map(|s| s.trim().to_string())
        .map_err(|e| SignalError::Unavailable(format!("hostname: {e}")))
}

fn read_timezone_file() -> String {
    std::fs::read_to_string("/etc/timezone")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Pseudo-identity used when signal gathering fails. Always non-empty.
fn fallback_identity() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("fallback-{millis}-{suffix}")
}

type Gatherer = dyn Fn() -> Result<DeviceSignals, SignalError> + Send + Sync;

/// Snapshot of the collector's latest attempt.
#[derive(Debug, Clone, Default)]
pub struct CollectorState {
    pub value: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub raw_data: Option<DeviceSignals>,
}

/// Collects the device fingerprint and keeps only the latest result.
pub struct FingerprintCollector {
    gather: Arc<Gatherer>,
    state: RwLock<CollectorState>,
}

impl FingerprintCollector {
    pub fn new() -> Self {
        Self::with_gatherer(gather_signals)
    }

    /// Injectable signal source; tests use this to force the fallback path.
    pub fn with_gatherer<G>(gather: G) -> Self
    where
        G: Fn() -> Result<DeviceSignals, SignalError> + Send + Sync + 'static,
    {
        Self {
            gather: Arc::new(gather),
            state: RwLock::new(CollectorState::default()),
        }
    }

    /// Runs one collection attempt and returns the resulting identity.
    ///
    /// Always resolves: a gathering failure produces a fallback identity with
    /// the error recorded in the snapshot state.
    pub async fn refresh(&self) -> Fingerprint {
        self.state.write().is_loading = true;

        let outcome = (self.gather)();
        let (fingerprint, error) = match outcome {
            Ok(signals) => (
                Fingerprint {
                    value: fingerprint_hash(&signals),
                    raw: Some(signals),
                },
                None,
            ),
            Err(err) => {
                tracing::warn!("fingerprint collection failed, using fallback identity: {err}");
                (
                    Fingerprint {
                        value: fallback_identity(),
                        raw: None,
                    },
                    Some(err.to_string()),
                )
            }
        };

        let mut state = self.state.write();
        state.is_loading = false;
        state.value = Some(fingerprint.value.clone());
        state.error = error;
        state.raw_data = fingerprint.raw.clone();

        fingerprint
    }

    pub fn snapshot(&self) -> CollectorState {
        self.state.read().clone()
    }
}

impl Default for FingerprintCollector {
    fn default() -> Self {
        Self::new()
    }
}
