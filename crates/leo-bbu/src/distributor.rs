//! TM Ingress + Distributor (C6): UDP ingress into the TM buffers, TCP
//! pacing activity out to a single monitoring client.

use crate::buffers::TmBuffers;
use leo_common::time;
use leo_common::wire::{frame_record, StreamMode, TmFrame};
use leo_orbit::OrbitModel;
use std::io::Write;
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};

pub type SharedBuffers = Arc<Mutex<TmBuffers>>;

/// Blocking UDP ingress: every parseable datagram is appended to `history`
/// and, if currently visible, also to `live` (spec §4.6).
pub fn run_tm_ingress(
    socket: UdpSocket,
    buffers: SharedBuffers,
    orbit: Arc<OrbitModel>,
    shutdown: Arc<AtomicBool>,
) {
    let mut buf = [0u8; 4096];
    while !shutdown.load(Ordering::Relaxed) {
        match socket.recv_from(&mut buf) {
            Ok((n, _)) => match TmFrame::from_json(&String::from_utf8_lossy(&buf[..n])) {
                Ok(frame) => {
                    let geometry = orbit.get_state(time::unix_now());
                    buffers
                        .lock()
                        .expect("TM buffers mutex poisoned")
                        .ingest(frame, geometry.visible);
                }
                Err(e) => warn!(error = %e, "malformed TM datagram, dropping"),
            },
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(e) => warn!(error = %e, "TM ingress recv failed"),
        }
    }
}

/// Single-client-at-a-time TCP distributor, pacing LIVE/HIST records at ~5 Hz
/// (spec §4.6). Accepts are polled non-blockingly so shutdown stays responsive.
pub fn run_tm_distributor(
    listener: TcpListener,
    buffers: SharedBuffers,
    orbit: Arc<OrbitModel>,
    shutdown: Arc<AtomicBool>,
) {
    listener
        .set_nonblocking(true)
        .expect("setting TCP listener non-blocking must succeed");
    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, peer)) => {
                info!(%peer, "TM client connected");
                serve_client(stream, &buffers, &orbit, &shutdown);
                info!(%peer, "TM client disconnected");
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(time::PACING_INTERVAL);
            }
            Err(e) => warn!(error = %e, "TM accept failed"),
        }
    }
}

/// Pick the next record to send, given current visibility and buffer state:
/// pop the oldest `live` frame when visible and non-empty, otherwise peek
/// (never pop) the newest `history` frame as a last-known-value beacon
/// (spec §4.6).
fn select_record(visible: bool, buffers: &mut TmBuffers) -> Option<String> {
    if visible {
        if let Some(frame) = buffers.pop_live() {
            return Some(frame_record(StreamMode::Live, &frame.to_json()));
        }
    }
    buffers.peek_history().map(|f| frame_record(StreamMode::Hist, &f.to_json()))
}

fn serve_client(
    mut stream: TcpStream,
    buffers: &SharedBuffers,
    orbit: &Arc<OrbitModel>,
    shutdown: &Arc<AtomicBool>,
) {
    let _ = stream.set_nodelay(true);
    while !shutdown.load(Ordering::Relaxed) {
        let tick_start = Instant::now();
        let geometry = orbit.get_state(time::unix_now());

        let record = select_record(geometry.visible, &mut buffers.lock().expect("TM buffers mutex poisoned"));

        if let Some(record) = record {
            if let Err(e) = stream.write_all(record.as_bytes()) {
                debug!(error = %e, "TM client send failed, closing connection");
                return;
            }
        }

        let elapsed = tick_start.elapsed();
        if elapsed < time::PACING_INTERVAL {
            std::thread::sleep(time::PACING_INTERVAL - elapsed);
        }
    }
}
