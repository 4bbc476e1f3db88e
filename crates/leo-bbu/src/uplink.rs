//! TC Ingress + Uplink (C7): one-command-per-connection ingress, visibility-
//! gated transmission toward the spacecraft.

use leo_channel::{Packet, RfChannel};
use leo_common::time;
use leo_orbit::OrbitModel;
use std::collections::VecDeque;
use std::io::Read;
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub type TcQueue = Arc<Mutex<VecDeque<String>>>;

/// TCP short-connection ingress: each accepted connection delivers exactly
/// one command and closes (spec §4.7).
pub fn run_tc_ingress(listener: TcpListener, queue: TcQueue, shutdown: Arc<AtomicBool>) {
    listener
        .set_nonblocking(true)
        .expect("setting TCP listener non-blocking must succeed");
    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Some(command) = read_one_command(stream) {
                    debug!(%peer, %command, "TC enqueued");
                    queue.lock().expect("tc queue mutex poisoned").push_back(command);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(time::PACING_INTERVAL);
            }
            Err(e) => warn!(error = %e, "TC accept failed"),
        }
    }
}

fn read_one_command(mut stream: TcpStream) -> Option<String> {
    let mut buf = String::new();
    match stream.read_to_string(&mut buf) {
        Ok(_) => {
            let command = buf.trim().to_string();
            if command.is_empty() {
                None
            } else {
                Some(command)
            }
        }
        Err(e) => {
            warn!(error = %e, "failed reading TC connection");
            None
        }
    }
}

/// Drains `queue` in FIFO order once visible. The uplink RF channel is
/// applied purely as a simulation side effect: a DROPPED verdict skips the
/// send, a `corrupted` verdict is logged but the datagram is sent anyway so
/// the receiver can observe the corruption (spec §4.7; see DESIGN.md for the
/// resolution of the shared-instance double-application question).
pub fn run_tc_uplink(
    orbit: Arc<OrbitModel>,
    uplink: Arc<RfChannel>,
    queue: TcQueue,
    socket: UdpSocket,
    shutdown: Arc<AtomicBool>,
) {
    let mut seq: u32 = 0;
    while !shutdown.load(Ordering::Relaxed) {
        let now = time::unix_now();
        let geometry = orbit.get_state(now);

        if !geometry.visible {
            std::thread::sleep(time::PACING_INTERVAL);
            continue;
        }

        let command = queue.lock().expect("tc queue mutex poisoned").pop_front();
        let Some(command) = command else {
            std::thread::sleep(time::PACING_INTERVAL);
            continue;
        };

        seq = seq.wrapping_add(1);
        let packet = Packet::new_tc(seq, now, &command);
        match uplink.propagate(packet, geometry.elev_deg, orbit.elev_mask_deg()) {
            None => {
                debug!(%command, "TC dropped by uplink channel, skipping send");
            }
            Some(p) => {
                if p.corrupted {
                    debug!(%command, "TC corrupted by uplink channel, sending anyway");
                }
                if let Err(e) = socket.send(&p.payload) {
                    warn!(error = %e, %command, "TC uplink send failed");
                } else {
                    info!(%command, "TC uplinked");
                }
            }
        }
    }
}
