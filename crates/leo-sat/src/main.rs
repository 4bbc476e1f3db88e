//! LEO spacecraft process.
//!
//! Runs the TM Producer (C4) and the TC Receiver/Executor (C5) on
//! independent threads sharing the orbit model and the uplink/downlink RF
//! channels.

mod producer;
mod tc_executor;

use clap::Parser;
use leo_channel::{Direction, RfChannel};
use leo_common::config::Config;
use leo_common::error::SatError;
use leo_common::status::{run_status_loop, StatusSnapshot};
use leo_orbit::OrbitModel;
use std::collections::VecDeque;
use std::net::UdpSocket;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// LEO spacecraft simulator: telemetry downlink and telecommand uplink.
#[derive(Parser, Debug)]
#[command(name = "leo-sat", about = "LEO spacecraft TM/TC simulator")]
struct Cli {
    /// Optional TOML configuration file. Missing sections use built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the TC listen address (UDP, BBU → SAT).
    #[arg(long)]
    tc_listen: Option<std::net::SocketAddr>,

    /// Override the BBU TM listen address to send downlink TM toward (UDP).
    #[arg(long)]
    tm_target: Option<std::net::SocketAddr>,

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
    if let Some(addr) = cli.tc_listen {
        cfg.net.sat_tc_listen = addr;
    }
    if let Some(addr) = cli.tm_target {
        cfg.net.bbu_tm_listen = addr;
    }

    tracing::info!(
        tc_listen = %cfg.net.sat_tc_listen,
        tm_target = %cfg.net.bbu_tm_listen,
        "leo-sat starting"
    );

    let tc_socket = UdpSocket::bind(cfg.net.sat_tc_listen).map_err(|source| SatError::TcBind {
        addr: cfg.net.sat_tc_listen,
        source,
    })?;
    tc_socket.set_read_timeout(Some(Duration::from_secs(1)))?;

    let tm_socket = UdpSocket::bind("0.0.0.0:0").map_err(|source| SatError::TmConnect {
        addr: cfg.net.bbu_tm_listen,
        source,
    })?;
    tm_socket
        .connect(cfg.net.bbu_tm_listen)
        .map_err(|source| SatError::TmConnect {
            addr: cfg.net.bbu_tm_listen,
            source,
        })?;

    let orbit = Arc::new(OrbitModel::new(cfg.orbit.clone()));
    let downlink = Arc::new(RfChannel::new(cfg.channel, Direction::Downlink));
    let uplink = Arc::new(RfChannel::new(cfg.channel, Direction::Uplink));
    let tc_queue: tc_executor::TcQueue = Arc::new(Mutex::new(VecDeque::new()));

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            tracing::info!("shutdown requested");
            shutdown.store(true, Ordering::Relaxed);
        })?;
    }

    let producer_handle = {
        let orbit = orbit.clone();
        let downlink = downlink.clone();
        let tm_socket = tm_socket.try_clone()?;
        let cfg = cfg.producer;
        let shutdown = shutdown.clone();
        std::thread::Builder::new()
            .name("tm-producer".into())
            .spawn(move || producer::run(orbit, downlink, tm_socket, cfg, shutdown))?
    };

    let ingress_handle = {
        let tc_socket = tc_socket.try_clone()?;
        let queue = tc_queue.clone();
        let shutdown = shutdown.clone();
        std::thread::Builder::new()
            .name("tc-ingress".into())
            .spawn(move || tc_executor::run_ingress(tc_socket, queue, shutdown))?
    };

    let executor_handle = {
        let orbit = orbit.clone();
        let uplink = uplink.clone();
        let queue = tc_queue.clone();
        let shutdown = shutdown.clone();
        std::thread::Builder::new()
            .name("tc-executor".into())
            .spawn(move || tc_executor::run_executor(orbit, uplink, queue, shutdown))?
    };

    let status_handle = {
        let orbit = orbit.clone();
        let tc_queue = tc_queue.clone();
        let shutdown = shutdown.clone();
        let interval = Duration::from_secs_f64(cli.status_interval_s);
        std::thread::Builder::new().name("status".into()).spawn(move || {
            run_status_loop("sat", interval, &shutdown, move || {
                let now = leo_common::time::unix_now();
                let geometry = orbit.get_state(now);
                let mut snapshot = StatusSnapshot::from_geometry(geometry);
                snapshot.tc_queue_depth = tc_queue.lock().expect("tc queue mutex poisoned").len();
                snapshot
            })
        })?
    };

    producer_handle.join().expect("TM producer thread panicked");
    ingress_handle.join().expect("TC ingress thread panicked");
    executor_handle.join().expect("TC executor thread panicked");
    status_handle.join().expect("status thread panicked");

    tracing::info!("leo-sat stopped");
    Ok(())
}
