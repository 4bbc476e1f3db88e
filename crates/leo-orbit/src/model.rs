//! `OrbitModel`: the public entry point for C1, polymorphic over back-ends.

use crate::backend::{finish_geometry, FallbackBackend, OrbitBackend, Sgp4Backend};
use leo_common::config::OrbitSettings;
use leo_common::GeometryState;
use tracing::warn;

pub struct OrbitModel {
    backend: Box<dyn OrbitBackend>,
    cfg: OrbitSettings,
}

impl OrbitModel {
    /// Construct the model, preferring the SGP4 propagator when both TLE
    /// lines are present and parse; degrading to the fallback otherwise.
    /// Never fails: back-end unavailability is not surfaced to callers
    /// (spec §7).
    pub fn new(cfg: OrbitSettings) -> Self {
        let backend: Box<dyn OrbitBackend> = match (&cfg.elements_line1, &cfg.elements_line2) {
            (Some(l1), Some(l2)) => match Sgp4Backend::try_new(l1, l2) {
                Some(b) => Box::new(b),
                None => {
                    warn!("malformed TLE elements, degrading to fallback orbit backend");
                    Box::new(FallbackBackend)
                }
            },
            _ => Box::new(FallbackBackend),
        };
        Self { backend, cfg }
    }

    /// `get_state(now) -> GeometryState` (spec §4.1). Pure function of `now`
    /// and the configuration; recomputed on every call.
    pub fn get_state(&self, now: f64) -> GeometryState {
        let raw = self.backend.geometry_at(now, &self.cfg);
        finish_geometry(now, raw, &self.cfg)
    }

    pub fn elev_mask_deg(&self) -> f64 {
        self.cfg.elev_mask_deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_elements_uses_fallback_without_panicking() {
        let model = OrbitModel::new(OrbitSettings::default());
        let g = model.get_state(0.0);
        assert!(g.elev_deg.is_finite());
    }

    #[test]
    fn malformed_elements_degrade_to_fallback() {
        let cfg = OrbitSettings {
            elements_line1: Some("not a tle".to_string()),
            elements_line2: Some("also not a tle".to_string()),
            ..OrbitSettings::default()
        };
        let model = OrbitModel::new(cfg);
        let g = model.get_state(0.0);
        assert!(g.elev_deg.is_finite());
    }

    #[test]
    fn visibility_matches_elevation_gate_for_all_sampled_times() {
        // Testable property 1 and 2, sampled across a full fallback period.
        let cfg = OrbitSettings::default();
        let model = OrbitModel::new(cfg.clone());
        let mut t = 0.0;
        while t < cfg.fallback_period_s {
            let g = model.get_state(t);
            assert_eq!(g.visible, g.elev_deg > cfg.elev_mask_deg);
            if !g.visible {
                assert_eq!(g.rate_dl_mbps, 0.0);
                assert_eq!(g.rate_ul_mbps, 0.0);
            }
            t += 137.0;
        }
    }
}
