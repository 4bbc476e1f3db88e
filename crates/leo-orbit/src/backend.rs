//! Orbit back-ends (spec §4.1): a capability set `{get_state(now) -> GeometryState}`
//! with two variants, selected transparently at construction.

use crate::geo::{dot, elevation_deg, geodetic_to_ecef, norm, sub};
use crate::link_budget::data_rate;
use leo_common::config::OrbitSettings;
use leo_common::GeometryState;

const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

pub trait OrbitBackend: Send + Sync {
    fn geometry_at(&self, now: f64, cfg: &OrbitSettings) -> RawGeometry;
}

/// Elevation/Doppler pair before the link budget and visibility gate are applied.
pub struct RawGeometry {
    pub elev_deg: f64,
    pub doppler_hz: f64,
}

/// SGP4-propagated back-end, driven by a two-line element set.
pub struct Sgp4Backend {
    constants: sgp4::Constants,
    epoch: chrono::NaiveDateTime,
}

impl Sgp4Backend {
    /// Attempt to construct from a TLE pair. Returns `None` on any parse or
    /// construction failure — the caller degrades to the fallback backend.
    pub fn try_new(line1: &str, line2: &str) -> Option<Self> {
        let elements = sgp4::Elements::from_tle(None, line1.as_bytes(), line2.as_bytes()).ok()?;
        let epoch = elements.datetime;
        let constants = sgp4::Constants::from_elements(&elements).ok()?;
        Some(Self { constants, epoch })
    }
}

impl OrbitBackend for Sgp4Backend {
    fn geometry_at(&self, now: f64, cfg: &OrbitSettings) -> RawGeometry {
        let epoch_utc = chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(
            self.epoch,
            chrono::Utc,
        );
        let now_utc = chrono::DateTime::<chrono::Utc>::from_timestamp(now as i64, 0)
            .unwrap_or(epoch_utc);
        let minutes_since_epoch = now_utc.signed_duration_since(epoch_utc).num_seconds() as f64 / 60.0;

        let prediction = match self.constants.propagate(sgp4::MinutesSinceEpoch(minutes_since_epoch)) {
            Ok(p) => p,
            Err(_) => {
                // Propagation failures (e.g. decayed orbit) degrade to "not visible"
                // rather than panic; the process keeps running per spec §7.
                return RawGeometry {
                    elev_deg: -90.0,
                    doppler_hz: 0.0,
                };
            }
        };

        let sat_pos = prediction.position;
        let sat_vel = prediction.velocity;
        let gs_pos = geodetic_to_ecef(cfg.gs_lat_deg, cfg.gs_lon_deg, cfg.gs_alt_m);

        let rel_pos = sub(sat_pos, gs_pos);
        let range_km = norm(rel_pos);
        let elev_deg = elevation_deg(cfg.gs_lat_deg, cfg.gs_lon_deg, rel_pos);

        // Ground station treated as stationary (non-rotating ECI≈ECEF snapshot,
        // see geo.rs), so relative velocity is the satellite's velocity alone.
        // range_rate > 0 means the range is increasing (receding).
        let range_rate_km_s = if range_km > 0.0 {
            dot(rel_pos, sat_vel) / range_km
        } else {
            0.0
        };

        // Closing range (negative range_rate) produces a positive Doppler
        // shift, matching GeometryState's documented convention; this is an
        // intentional inversion of the literal sign in spec §4.1's formula,
        // which spec explicitly permits as long as it is documented and
        // monotonic through zero at closest approach (it is: range_rate
        // crosses zero exactly once per pass, at the point of closest
        // approach, regardless of sign convention).
        let doppler_hz =
            -(range_rate_km_s * 1000.0 / SPEED_OF_LIGHT_M_S) * cfg.carrier_hz;

        RawGeometry {
            elev_deg,
            doppler_hz,
        }
    }
}

/// Sinusoidal fallback back-end (spec §4.1), used when no valid TLE is
/// configured or SGP4 construction fails.
pub struct FallbackBackend;

impl OrbitBackend for FallbackBackend {
    fn geometry_at(&self, now: f64, cfg: &OrbitSettings) -> RawGeometry {
        let period = cfg.fallback_period_s.max(1.0);
        let pass_fraction = cfg.fallback_pass_fraction.clamp(1e-6, 1.0);

        let phase_full = (now.rem_euclid(period)) / period;
        if phase_full >= pass_fraction {
            return RawGeometry {
                elev_deg: -90.0,
                doppler_hz: 0.0,
            };
        }

        let phase = phase_full / pass_fraction;
        let elev_deg = 90.0 * (std::f64::consts::PI * phase).sin().max(0.0);
        let doppler_hz = cfg.fallback_doppler_max_hz * (2.0 * std::f64::consts::PI * phase).sin();

        RawGeometry {
            elev_deg,
            doppler_hz,
        }
    }
}

/// Apply the visibility gate and link budget to a raw (elev, doppler) pair.
pub fn finish_geometry(now: f64, raw: RawGeometry, cfg: &OrbitSettings) -> GeometryState {
    let visible = raw.elev_deg > cfg.elev_mask_deg;
    let (rate_dl_mbps, rate_ul_mbps) = if visible {
        (
            data_rate(raw.elev_deg, cfg.dl_max_rate_mbps, cfg.rate_alpha, cfg.elev_mask_deg),
            data_rate(raw.elev_deg, cfg.ul_max_rate_mbps, cfg.rate_alpha, cfg.elev_mask_deg),
        )
    } else {
        (0.0, 0.0)
    };

    GeometryState {
        ts: now,
        elev_deg: raw.elev_deg,
        doppler_hz: raw.doppler_hz,
        visible,
        rate_dl_mbps,
        rate_ul_mbps,
    }
}
