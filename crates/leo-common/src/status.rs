//! Status Reporter (C8): a periodic, read-only snapshot of engine state.
//!
//! Shared by both SAT and BBU binaries — each feeds a closure that gathers a
//! [`StatusSnapshot`] from whatever local state it owns, and this helper
//! takes care of the tick loop and the structured log line.

use crate::geometry::GeometryState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Everything the status line reports (spec §4.8). Buffer/queue depths that
/// don't apply to a given process are left at zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusSnapshot {
    pub visible: bool,
    pub elev_deg: f64,
    pub rate_dl_mbps: f64,
    pub rate_ul_mbps: f64,
    pub live_depth: usize,
    pub hist_depth: usize,
    pub tc_queue_depth: usize,
}

impl StatusSnapshot {
    pub fn from_geometry(g: GeometryState) -> Self {
        Self {
            visible: g.visible,
            elev_deg: g.elev_deg,
            rate_dl_mbps: g.rate_dl_mbps,
            rate_ul_mbps: g.rate_ul_mbps,
            ..Default::default()
        }
    }
}

/// Runs a status-reporting loop on the calling thread until `shutdown` is set.
///
/// `snapshot` is called once per tick; it must not block on anything the rest
/// of the system depends on — it's read-only by contract (spec §4.8).
pub fn run_status_loop(
    label: &str,
    interval: Duration,
    shutdown: &Arc<AtomicBool>,
    mut snapshot: impl FnMut() -> StatusSnapshot,
) {
    while !shutdown.load(Ordering::Relaxed) {
        let start = Instant::now();
        let s = snapshot();
        info!(
            target: "status",
            proc = label,
            visible = s.visible,
            elev_deg = format!("{:.2}", s.elev_deg),
            rate_dl_mbps = format!("{:.4}", s.rate_dl_mbps),
            rate_ul_mbps = format!("{:.4}", s.rate_ul_mbps),
            live_depth = s.live_depth,
            hist_depth = s.hist_depth,
            tc_queue_depth = s.tc_queue_depth,
            "status"
        );
        let elapsed = start.elapsed();
        if elapsed < interval {
            std::thread::sleep(interval - elapsed);
        }
    }
}
