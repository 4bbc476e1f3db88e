//! Wall-clock helpers.

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the UNIX epoch, as used by every `ts` field in the system.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// The standard polling/pacing cadence (5 Hz) used by the TM distributor's
/// pacing activity (spec §4.6) and satisfying the TC executor's ≥2 Hz
/// polling requirement (spec §4.5).
pub const PACING_INTERVAL: std::time::Duration = std::time::Duration::from_millis(200);
