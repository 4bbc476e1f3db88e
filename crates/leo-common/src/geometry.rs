//! The immutable geometry snapshot produced by the orbit model.

use serde::{Deserialize, Serialize};

/// A point-in-time snapshot of spacecraft/ground-station geometry.
///
/// Never stored: recomputed on demand by the orbit model for every caller.
/// Has no mutable shared state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryState {
    /// Wall-clock seconds since the UNIX epoch.
    pub ts: f64,
    /// Elevation angle of the spacecraft above the ground station's horizon, in degrees.
    pub elev_deg: f64,
    /// Signed Doppler shift at the link's carrier frequency, in Hz. Positive when closing range.
    pub doppler_hz: f64,
    /// True iff `elev_deg > elev_mask_deg`. The single visibility gate used downstream.
    pub visible: bool,
    /// Instantaneous permitted downlink bit-rate in Mbps. Zero when not visible.
    pub rate_dl_mbps: f64,
    /// Instantaneous permitted uplink bit-rate in Mbps. Zero when not visible.
    pub rate_ul_mbps: f64,
}
