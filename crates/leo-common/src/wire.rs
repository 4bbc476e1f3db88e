//! Wire formats (spec §6).
//!
//! TM datagrams are JSON; TC datagrams and client↔BBU command bytes are plain
//! UTF-8 with no framing; the BBU→client TM stream is a concatenation of
//! `"LIVE|<json>"` / `"HIST|<json>"` records with no length prefix, matching
//! spec's deliberately under-specified framing for a client this design does
//! not own.

use serde::{Deserialize, Serialize};

/// TM datagram sent SAT → BBU, and the record body streamed BBU → client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmFrame {
    #[serde(rename = "type")]
    pub kind: String,
    pub seq: u32,
    pub ts: f64,
    pub elev_deg: f64,
    pub doppler_hz: f64,
    pub visible: bool,
    pub corrupted: bool,
    pub duplicated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rf_note: Option<String>,
    pub payload_len: u32,
}

impl TmFrame {
    pub fn new(
        seq: u32,
        ts: f64,
        elev_deg: f64,
        doppler_hz: f64,
        visible: bool,
        corrupted: bool,
        duplicated: bool,
        rf_note: Option<String>,
        payload_len: u32,
    ) -> Self {
        Self {
            kind: "TM".to_string(),
            seq,
            ts,
            elev_deg,
            doppler_hz,
            visible,
            corrupted,
            duplicated,
            rf_note,
            payload_len,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("TmFrame serialization is infallible")
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

/// Record mode tag used by the BBU→client TM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    Live,
    Hist,
}

impl StreamMode {
    fn tag(self) -> &'static str {
        match self {
            StreamMode::Live => "LIVE",
            StreamMode::Hist => "HIST",
        }
    }
}

/// Frame a TM frame's raw JSON with its three-character mode tag and `|` separator.
///
/// The client splits on the literal `|` between the tag and the remainder;
/// this function produces exactly that shape and nothing more (no trailing
/// newline — the stream is not self-delimited between records, per spec §6).
pub fn frame_record(mode: StreamMode, raw_json: &str) -> String {
    format!("{}|{}", mode.tag(), raw_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let f = TmFrame::new(7, 100.5, 42.0, -1200.0, true, false, false, None, 256);
        let json = f.to_json();
        let back = TmFrame::from_json(&json).unwrap();
        assert_eq!(f, back);
    }

    #[test]
    fn frame_record_uses_pipe_separator() {
        let s = frame_record(StreamMode::Live, r#"{"type":"TM"}"#);
        assert!(s.starts_with("LIVE|"));
        assert_eq!(&s[4..5], "|");
    }

    #[test]
    fn rf_note_omitted_when_absent() {
        let f = TmFrame::new(1, 0.0, 0.0, 0.0, false, false, false, None, 10);
        assert!(!f.to_json().contains("rf_note"));
    }
}
