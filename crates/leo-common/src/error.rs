//! Fatal startup errors.
//!
//! Nothing in the running system is fatal at steady state (spec §7): transient
//! I/O, malformed input, and channel verdicts are all handled in place by the
//! component that observes them. The only errors that propagate out of `main`
//! are bind failures on the ports each process owns.

use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SatError {
    #[error("failed to bind TC listen socket on {addr}: {source}")]
    TcBind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to connect TM downlink socket to {addr}: {source}")]
    TmConnect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum BbuError {
    #[error("failed to bind TM listen socket on {addr}: {source}")]
    TmBind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to bind TC accept socket on {addr}: {source}")]
    TcAcceptBind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to bind TM accept socket on {addr}: {source}")]
    TmAcceptBind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to connect TC uplink socket to {addr}: {source}")]
    TcUplinkConnect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
