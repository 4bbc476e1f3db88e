//! TC Receiver / Executor (C5): ingress holds commands during outage,
//! executor drains the queue once visibility returns.

use leo_channel::{Packet, RfChannel};
use leo_common::time;
use leo_orbit::OrbitModel;
use std::collections::VecDeque;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub type TcQueue = Arc<Mutex<VecDeque<String>>>;

/// Blocking UDP ingress: every well-formed datagram is enqueued; malformed
/// ones are replaced with their lossy-decoded form rather than dropped
/// (spec §4.5, §7).
pub fn run_ingress(socket: UdpSocket, queue: TcQueue, shutdown: Arc<AtomicBool>) {
    let mut buf = [0u8; 4096];
    while !shutdown.load(Ordering::Relaxed) {
        match socket.recv_from(&mut buf) {
            Ok((n, _)) => {
                let command = String::from_utf8_lossy(&buf[..n]).trim().to_string();
                if command.is_empty() {
                    continue;
                }
                queue.lock().expect("tc queue mutex poisoned").push_back(command);
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(e) => {
                warn!(error = %e, "TC ingress recv failed");
            }
        }
    }
}

/// Polls visibility at ≥2 Hz; while visible and the queue is non-empty,
/// dequeues one command and applies the uplink RF channel at the receive
/// side — the design's "uplink path effect applied at the receiver" (spec
/// §4.5) and this implementation's sole authoritative uplink verdict (see
/// DESIGN.md for the resolution of spec §9's double-application question).
pub fn run_executor(
    orbit: Arc<OrbitModel>,
    uplink: Arc<RfChannel>,
    queue: TcQueue,
    shutdown: Arc<AtomicBool>,
) {
    let mut seq: u32 = 0;
    while !shutdown.load(Ordering::Relaxed) {
        let now = time::unix_now();
        let geometry = orbit.get_state(now);

        if geometry.visible {
            let command = queue.lock().expect("tc queue mutex poisoned").pop_front();
            if let Some(command) = command {
                seq = seq.wrapping_add(1);
                let packet = Packet::new_tc(seq, now, &command);
                match uplink.propagate(packet, geometry.elev_deg, orbit.elev_mask_deg()) {
                    None => {
                        debug!(%command, "TC dropped by uplink channel");
                    }
                    Some(p) if p.corrupted => {
                        debug!(%command, "TC corrupted, ignoring (integrity failure)");
                    }
                    Some(_) => {
                        info!(%command, "TC executed");
                    }
                }
                continue;
            }
        }

        std::thread::sleep(time::PACING_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leo_common::config::ChannelSettings;
    use leo_channel::Direction;

    #[test]
    fn queue_is_fifo() {
        let queue: TcQueue = Arc::new(Mutex::new(VecDeque::new()));
        queue.lock().unwrap().push_back("a".to_string());
        queue.lock().unwrap().push_back("b".to_string());
        assert_eq!(queue.lock().unwrap().pop_front(), Some("a".to_string()));
        assert_eq!(queue.lock().unwrap().pop_front(), Some("b".to_string()));
    }

    #[test]
    fn corrupted_command_never_reports_executed() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let settings = ChannelSettings {
            prop_delay_s: 0.0,
            base_loss: 0.0,
            base_ber: 1.0,
            base_dup: 0.0,
            burst_start: 0.0,
            fade_len: 1,
        };
        let uplink = RfChannel::new(settings, Direction::Uplink);
        let pkt = Packet::new_tc(1, 0.0, "PING");
        let out = uplink
            .propagate_inner(pkt, 45.0, 10.0, &mut StdRng::seed_from_u64(3))
            .expect("base_loss=0 so packet is never dropped");
        assert!(out.corrupted);
    }
}
