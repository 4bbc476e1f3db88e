//! Configuration surface.
//!
//! Mirrors the enumerated option groups of spec §6 (Orbit, Channel, Producer,
//! Buffers) plus the network endpoints of the same section. Loaded from an
//! optional TOML file and layered with CLI flag overrides, the way the
//! teacher's agent layers `clap` arguments over struct defaults.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Top-level configuration shared by both the SAT and BBU processes.
///
/// Both binaries load the same file format; each only reads the sections it
/// needs (SAT needs `net.sat_*`, BBU needs `net.bbu_*`, both need `orbit`,
/// `channel`, `buffers`; only SAT needs `producer`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub orbit: OrbitSettings,
    pub channel: ChannelSettings,
    pub producer: ProducerSettings,
    pub buffers: BufferSettings,
    pub net: NetSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            orbit: OrbitSettings::default(),
            channel: ChannelSettings::default(),
            producer: ProducerSettings::default(),
            buffers: BufferSettings::default(),
            net: NetSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults for any
    /// section (or field) the file omits.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {e}", path.display()))?;
        let cfg: Config = toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("parsing config {}: {e}", path.display()))?;
        Ok(cfg)
    }
}

/// Orbit model configuration (spec §3 `OrbitConfig`, §6 Orbit settings).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    /// TLE name line. Informational only.
    pub elements_name: Option<String>,
    /// TLE line 1. If absent (or unparsable alongside `elements_line2`), the
    /// model degrades to the fallback backend at construction.
    pub elements_line1: Option<String>,
    /// TLE line 2.
    pub elements_line2: Option<String>,
    pub gs_lat_deg: f64,
    pub gs_lon_deg: f64,
    pub gs_alt_m: f64,
    pub elev_mask_deg: f64,
    pub carrier_hz: f64,
    pub dl_max_rate_mbps: f64,
    pub ul_max_rate_mbps: f64,
    pub rate_alpha: f64,
    /// Fallback orbital period in seconds, used only by the sinusoidal backend.
    pub fallback_period_s: f64,
    /// Fraction of `fallback_period_s`, starting at phase 0, during which the
    /// fallback backend's sinusoidal pass is active. The remainder of the
    /// period is below the horizon (`elev_deg = -90`, not visible). Spec §3
    /// names both "fallback period and pass fraction" as OrbitConfig fields
    /// without giving the windowing formula explicitly; see DESIGN.md.
    /// `1.0` reproduces the literal §4.1 formula (a pass spanning the whole
    /// period) exactly.
    pub fallback_pass_fraction: f64,
    /// Peak Doppler shift (Hz) used by the fallback backend's sinusoidal
    /// proxy `D_max · sin(2π·phase)`. Not specified numerically in spec §4.1;
    /// defaulted to a value representative of S-band LEO Doppler.
    pub fallback_doppler_max_hz: f64,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            elements_name: None,
            elements_line1: None,
            elements_line2: None,
            gs_lat_deg: 0.0,
            gs_lon_deg: 0.0,
            gs_alt_m: 0.0,
            elev_mask_deg: 10.0,
            carrier_hz: 2.2e9,
            dl_max_rate_mbps: 0.258,
            ul_max_rate_mbps: 0.064,
            rate_alpha: 1.5,
            fallback_period_s: 5400.0,
            fallback_pass_fraction: 1.0,
            fallback_doppler_max_hz: 40_000.0,
        }
    }
}

/// RF channel configuration (spec §4.3, §6 Channel settings).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub prop_delay_s: f64,
    pub base_loss: f64,
    pub base_ber: f64,
    pub base_dup: f64,
    pub burst_start: f64,
    pub fade_len: u32,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            prop_delay_s: 0.25,
            base_loss: 0.08,
            base_ber: 0.02,
            base_dup: 0.002,
            burst_start: 0.0015,
            fade_len: 25,
        }
    }
}

/// TM producer configuration (spec §4.4, §6 Producer settings).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerSettings {
    pub tick_s: f64,
    pub payload_bytes: u32,
    pub header_bytes: u32,
    pub max_pkts_per_step: u32,
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            tick_s: 1.0,
            payload_bytes: 256,
            header_bytes: 32,
            max_pkts_per_step: 2000,
        }
    }
}

/// TM buffer capacities (spec §3, §6 Buffers settings).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferSettings {
    pub live_cap: usize,
    pub hist_cap: usize,
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            live_cap: 2000,
            hist_cap: 5000,
        }
    }
}

/// Network endpoints (spec §6). All loopback by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetSettings {
    /// SAT TC listen, UDP. BBU → SAT.
    pub sat_tc_listen: SocketAddr,
    /// BBU TM listen, UDP. SAT → BBU.
    pub bbu_tm_listen: SocketAddr,
    /// BBU TC accept, TCP. Client → BBU, one command per connection.
    pub bbu_tc_accept: SocketAddr,
    /// BBU TM accept, TCP. BBU → client, one long-lived stream.
    pub bbu_tm_accept: SocketAddr,
}

impl Default for NetSettings {
    fn default() -> Self {
        Self {
            sat_tc_listen: "127.0.0.1:5002".parse().unwrap(),
            bbu_tm_listen: "127.0.0.1:6001".parse().unwrap(),
            bbu_tc_accept: "127.0.0.1:7001".parse().unwrap(),
            bbu_tm_accept: "127.0.0.1:7002".parse().unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = Config::default();
        assert_eq!(cfg.orbit.elev_mask_deg, 10.0);
        assert_eq!(cfg.orbit.rate_alpha, 1.5);
        assert_eq!(cfg.channel.prop_delay_s, 0.25);
        assert_eq!(cfg.channel.base_loss, 0.08);
        assert_eq!(cfg.channel.base_ber, 0.02);
        assert_eq!(cfg.channel.base_dup, 0.002);
        assert_eq!(cfg.channel.burst_start, 0.0015);
        assert_eq!(cfg.channel.fade_len, 25);
        assert_eq!(cfg.producer.tick_s, 1.0);
        assert_eq!(cfg.producer.max_pkts_per_step, 2000);
        assert_eq!(cfg.buffers.live_cap, 2000);
        assert_eq!(cfg.buffers.hist_cap, 5000);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let toml_src = r#"
            [channel]
            base_loss = 0.5
        "#;
        let cfg: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(cfg.channel.base_loss, 0.5);
        assert_eq!(cfg.channel.base_ber, 0.02);
        assert_eq!(cfg.orbit.elev_mask_deg, 10.0);
    }
}
