//! LEO ground station (BBU) process.
//!
//! Runs the TM Ingress+Distributor (C6) and TC Ingress+Uplink (C7) on
//! independent threads, sharing the orbit model and the uplink RF channel.

mod buffers;
mod distributor;
mod uplink;

use buffers::TmBuffers;
use clap::Parser;
use leo_channel::{Direction, RfChannel};
use leo_common::config::Config;
use leo_common::error::BbuError;
use leo_common::status::{run_status_loop, StatusSnapshot};
use leo_orbit::OrbitModel;
use std::collections::VecDeque;
use std::net::{TcpListener, UdpSocket};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// LEO ground station simulator: telemetry distribution and telecommand uplink.
#[derive(Parser, Debug)]
#[command(name = "leo-bbu", about = "LEO ground station TM/TC simulator")]
struct Cli {
    /// Optional TOML configuration file. Missing sections use built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the TM listen address (UDP, SAT → BBU).
    #[arg(long)]
    tm_listen: Option<std::net::SocketAddr>,

    /// Override the TC client-accept address (TCP).
    #[arg(long)]
    tc_accept: Option<std::net::SocketAddr>,

    /// Override the TM client-accept address (TCP).
    #[arg(long)]
    tm_accept: Option<std::net::SocketAddr>,

    /// Override the SAT TC listen address to uplink toward (UDP).
    #[arg(long)]
    tc_target: Option<std::net::SocketAddr>,

    /// Status reporter interval, in seconds.
    #[arg(long, default_value_t = 3.0)]
    status_interval_s: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(addr) = cli.tm_listen {
        cfg.net.bbu_tm_listen = addr;
    }
    if let Some(addr) = cli.tc_accept {
        cfg.net.bbu_tc_accept = addr;
    }
    if let Some(addr) = cli.tm_accept {
        cfg.net.bbu_tm_accept = addr;
    }
    let sat_tc_listen = cli.tc_target.unwrap_or(cfg.net.sat_tc_listen);

    tracing::info!(
        tm_listen = %cfg.net.bbu_tm_listen,
        tc_accept = %cfg.net.bbu_tc_accept,
        tm_accept = %cfg.net.bbu_tm_accept,
        tc_target = %sat_tc_listen,
        "leo-bbu starting"
    );

    let tm_socket = UdpSocket::bind(cfg.net.bbu_tm_listen).map_err(|source| BbuError::TmBind {
        addr: cfg.net.bbu_tm_listen,
        source,
    })?;
    tm_socket.set_read_timeout(Some(Duration::from_secs(1)))?;

    let tc_accept_listener = TcpListener::bind(cfg.net.bbu_tc_accept).map_err(|source| BbuError::TcAcceptBind {
        addr: cfg.net.bbu_tc_accept,
        source,
    })?;
    let tm_accept_listener = TcpListener::bind(cfg.net.bbu_tm_accept).map_err(|source| BbuError::TmAcceptBind {
        addr: cfg.net.bbu_tm_accept,
        source,
    })?;

    let tc_uplink_socket = UdpSocket::bind("0.0.0.0:0").map_err(|source| BbuError::TcUplinkConnect {
        addr: sat_tc_listen,
        source,
    })?;
    tc_uplink_socket
        .connect(sat_tc_listen)
        .map_err(|source| BbuError::TcUplinkConnect {
            addr: sat_tc_listen,
            source,
        })?;

    let orbit = Arc::new(OrbitModel::new(cfg.orbit.clone()));
    let uplink = Arc::new(RfChannel::new(cfg.channel, Direction::Uplink));
    let tm_buffers: distributor::SharedBuffers = Arc::new(Mutex::new(TmBuffers::new(
        cfg.buffers.live_cap,
        cfg.buffers.hist_cap,
    )));
    let tc_queue: uplink::TcQueue = Arc::new(Mutex::new(VecDeque::new()));

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            tracing::info!("shutdown requested");
            shutdown.store(true, Ordering::Relaxed);
        })?;
    }

    let tm_ingress_handle = {
        let orbit = orbit.clone();
        let buffers = tm_buffers.clone();
        let shutdown = shutdown.clone();
        std::thread::Builder::new()
            .name("tm-ingress".into())
            .spawn(move || distributor::run_tm_ingress(tm_socket, buffers, orbit, shutdown))?
    };

    let tm_distributor_handle = {
        let orbit = orbit.clone();
        let buffers = tm_buffers.clone();
        let shutdown = shutdown.clone();
        std::thread::Builder::new().name("tm-distributor".into()).spawn(move || {
            distributor::run_tm_distributor(tm_accept_listener, buffers, orbit, shutdown)
        })?
    };

    let tc_ingress_handle = {
        let queue = tc_queue.clone();
        let shutdown = shutdown.clone();
        std::thread::Builder::new()
            .name("tc-ingress".into())
            .spawn(move || uplink::run_tc_ingress(tc_accept_listener, queue, shutdown))?
    };

    let tc_uplink_handle = {
        let orbit = orbit.clone();
        let uplink = uplink.clone();
        let queue = tc_queue.clone();
        let shutdown = shutdown.clone();
        std::thread::Builder::new().name("tc-uplink".into()).spawn(move || {
            uplink::run_tc_uplink(orbit, uplink, queue, tc_uplink_socket, shutdown)
        })?
    };

    let status_handle = {
        let orbit = orbit.clone();
        let tm_buffers = tm_buffers.clone();
        let tc_queue = tc_queue.clone();
        let shutdown = shutdown.clone();
        let interval = Duration::from_secs_f64(cli.status_interval_s);
        std::thread::Builder::new().name("status".into()).spawn(move || {
            run_status_loop("bbu", interval, &shutdown, move || {
                let now = leo_common::time::unix_now();
                let geometry = orbit.get_state(now);
                let mut snapshot = StatusSnapshot::from_geometry(geometry);
                let buffers = tm_buffers.lock().expect("TM buffers mutex poisoned");
                snapshot.live_depth = buffers.live_len();
                snapshot.hist_depth = buffers.history_len();
                drop(buffers);
                snapshot.tc_queue_depth = tc_queue.lock().expect("tc queue mutex poisoned").len();
                snapshot
            })
        })?
    };

    tm_ingress_handle.join().expect("TM ingress thread panicked");
    tm_distributor_handle.join().expect("TM distributor thread panicked");
    tc_ingress_handle.join().expect("TC ingress thread panicked");
    tc_uplink_handle.join().expect("TC uplink thread panicked");
    status_handle.join().expect("status thread panicked");

    tracing::info!("leo-bbu stopped");
    Ok(())
}
