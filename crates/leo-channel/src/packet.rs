//! The logical unit that flows through the RF channel (spec §3).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Tm,
    Tc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub kind: PacketKind,
    /// 32-bit wrapping counter, scoped to the producer.
    pub seq: u32,
    pub ts: f64,
    /// Geometry snapshot at emission. `None` for TC (TM only, per spec §3).
    pub elev_deg: Option<f64>,
    pub doppler_hz: Option<f64>,
    pub payload: Vec<u8>,
    pub corrupted: bool,
    /// Marker only — the channel never produces a second copy (spec §9).
    pub duplicated: bool,
    pub rf_note: Option<String>,
}

impl Packet {
    pub fn new_tm(seq: u32, ts: f64, elev_deg: f64, doppler_hz: f64, payload_len: usize) -> Self {
        Self {
            kind: PacketKind::Tm,
            seq,
            ts,
            elev_deg: Some(elev_deg),
            doppler_hz: Some(doppler_hz),
            payload: vec![0u8; payload_len],
            corrupted: false,
            duplicated: false,
            rf_note: None,
        }
    }

    pub fn new_tc(seq: u32, ts: f64, command: &str) -> Self {
        Self {
            kind: PacketKind::Tc,
            seq,
            ts,
            elev_deg: None,
            doppler_hz: None,
            payload: command.as_bytes().to_vec(),
            corrupted: false,
            duplicated: false,
            rf_note: None,
        }
    }
}
