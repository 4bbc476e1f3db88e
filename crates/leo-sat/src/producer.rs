//! TM Producer (C4): emits telemetry at the link-budgeted rate during visibility.

use leo_channel::{Direction, Packet, RfChannel};
use leo_common::config::ProducerSettings;
use leo_common::wire::TmFrame;
use leo_common::{time, GeometryState};
use leo_orbit::OrbitModel;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Runs the TM producer loop on the calling thread until `shutdown` is set.
pub fn run(
    orbit: Arc<OrbitModel>,
    downlink: Arc<RfChannel>,
    tm_socket: UdpSocket,
    cfg: ProducerSettings,
    shutdown: Arc<AtomicBool>,
) {
    let tick = Duration::from_secs_f64(cfg.tick_s);
    let bits_per_packet = 8.0 * (cfg.payload_bytes + cfg.header_bytes) as f64;
    let mut seq: u32 = 0;

    while !shutdown.load(Ordering::Relaxed) {
        let tick_start = Instant::now();
        let now = time::unix_now();
        let geometry = orbit.get_state(now);

        if geometry.visible && geometry.rate_dl_mbps > 0.0 {
            let budget = burst_budget(&geometry, cfg.tick_s, bits_per_packet, cfg.max_pkts_per_step);
            emit_burst(
                budget,
                &geometry,
                &downlink,
                orbit.elev_mask_deg(),
                cfg.payload_bytes as usize,
                &tm_socket,
                &mut seq,
            );
        }

        let elapsed = tick_start.elapsed();
        if elapsed < tick {
            std::thread::sleep(tick - elapsed);
        }
    }
}

/// `N = floor((rate_dl · 10^6 · Δt) / bits_per_packet)`, clamped to `MAX_PKTS_PER_STEP`.
fn burst_budget(geometry: &GeometryState, tick_s: f64, bits_per_packet: f64, max: u32) -> u32 {
    let n = ((geometry.rate_dl_mbps * 1.0e6 * tick_s) / bits_per_packet).floor();
    if n < 0.0 {
        0
    } else {
        (n as u32).min(max)
    }
}

fn emit_burst(
    budget: u32,
    geometry: &GeometryState,
    downlink: &RfChannel,
    mask_deg: f64,
    payload_len: usize,
    tm_socket: &UdpSocket,
    seq: &mut u32,
) {
    for _ in 0..budget {
        *seq = seq.wrapping_add(1);
        let packet = Packet::new_tm(
            *seq,
            geometry.ts,
            geometry.elev_deg,
            geometry.doppler_hz,
            payload_len,
        );
        let Some(survivor) = downlink.propagate(packet, geometry.elev_deg, mask_deg) else {
            // Silent loss per spec §4.4 step 5.
            continue;
        };
        let frame = TmFrame::new(
            survivor.seq,
            survivor.ts,
            geometry.elev_deg,
            geometry.doppler_hz,
            geometry.visible,
            survivor.corrupted,
            survivor.duplicated,
            survivor.rf_note.clone(),
            survivor.payload.len() as u32,
        );
        if let Err(e) = tm_socket.send(frame.to_json().as_bytes()) {
            debug!(error = %e, "TM send failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(rate_dl: f64) -> GeometryState {
        GeometryState {
            ts: 0.0,
            elev_deg: 30.0,
            doppler_hz: 0.0,
            visible: true,
            rate_dl_mbps: rate_dl,
            rate_ul_mbps: 0.0,
        }
    }

    #[test]
    fn scenario_s2_budget_is_about_39_packets() {
        let g = geometry(0.0912);
        let bits_per_packet = 8.0 * (256 + 32) as f64;
        let n = burst_budget(&g, 1.0, bits_per_packet, 2000);
        assert_eq!(n, 39);
    }

    #[test]
    fn scenario_s3_budget_is_about_111_packets() {
        let g = geometry(0.258);
        let bits_per_packet = 8.0 * (256 + 32) as f64;
        let n = burst_budget(&g, 1.0, bits_per_packet, 2000);
        assert_eq!(n, 111);
    }

    #[test]
    fn budget_is_zero_when_rate_times_tick_under_one_packet() {
        // Testable property 13.
        let g = geometry(0.0001);
        let bits_per_packet = 8.0 * (256 + 32) as f64;
        let n = burst_budget(&g, 1.0, bits_per_packet, 2000);
        assert_eq!(n, 0);
    }

    #[test]
    fn budget_is_clamped_to_max_pkts_per_step() {
        let g = geometry(100.0);
        let bits_per_packet = 8.0 * (256 + 32) as f64;
        let n = burst_budget(&g, 1.0, bits_per_packet, 2000);
        assert_eq!(n, 2000);
    }

    #[test]
    fn sequence_wraps_at_u32_max() {
        let mut seq: u32 = u32::MAX;
        seq = seq.wrapping_add(1);
        assert_eq!(seq, 0);
    }

    #[test]
    fn testable_property_7_seq_is_strictly_increasing_within_a_burst() {
        use leo_common::config::ChannelSettings;

        let settings = ChannelSettings {
            prop_delay_s: 0.0,
            base_loss: 0.0,
            base_ber: 0.0,
            base_dup: 0.0,
            burst_start: 0.0,
            fade_len: 1,
        };
        let downlink = RfChannel::new(settings, Direction::Downlink);
        let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        listener.set_read_timeout(Some(Duration::from_millis(200))).unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.connect(addr).unwrap();

        let g = geometry(0.258);
        let mut seq: u32 = 0;
        emit_burst(5, &g, &downlink, 10.0, 16, &sender, &mut seq);

        let mut seqs = Vec::new();
        let mut buf = [0u8; 4096];
        for _ in 0..5 {
            let (n, _) = listener.recv_from(&mut buf).unwrap();
            let frame = TmFrame::from_json(&String::from_utf8_lossy(&buf[..n])).unwrap();
            seqs.push(frame.seq);
        }
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    }
}
