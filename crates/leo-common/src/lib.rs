//! Shared types for the LEO satellite link simulator.
//!
//! This crate contains:
//! - **Geometry** — the immutable orbit/visibility snapshot shared by every component
//! - **Configuration** — `serde`+`toml` settings mirroring the component config tables
//! - **Wire protocol** — TM datagram and LIVE/HIST stream framing
//! - **Status** — the periodic operator snapshot helper used by both SAT and BBU
//! - **Errors** — the small set of fatal startup errors

pub mod config;
pub mod error;
pub mod geometry;
pub mod status;
pub mod time;
pub mod wire;

pub use config::Config;
pub use geometry::GeometryState;
