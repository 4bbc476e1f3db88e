//! RF Channel (C3): a stochastic per-packet transform with internal fade state.

use crate::packet::Packet;
use leo_common::config::ChannelSettings;
use rand::Rng;
use rand::RngExt;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Downlink,
    Uplink,
}

/// `{in_fade, fade_remaining_pkts}` with invariant `in_fade ⇔ fade_remaining_pkts > 0`.
#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    in_fade: bool,
    fade_remaining_pkts: u32,
}

impl ChannelState {
    fn invariant_holds(&self) -> bool {
        self.in_fade == (self.fade_remaining_pkts > 0)
    }
}

/// One RF channel instance. Spec §4.3 requires at least one shared instance
/// per uplink/downlink pair; this implementation uses exactly one per
/// [`Direction`], shared by every caller on that direction (e.g. the BBU
/// uplink sender and the SAT uplink receiver both use the same `Uplink`
/// instance, so the fade state machine reflects the whole uplink path).
pub struct RfChannel {
    state: Mutex<ChannelState>,
    settings: ChannelSettings,
    direction: Direction,
}

impl RfChannel {
    pub fn new(settings: ChannelSettings, direction: Direction) -> Self {
        Self {
            state: Mutex::new(ChannelState::default()),
            settings,
            direction,
        }
    }

    /// `propagate(packet, elev_deg, direction) -> packet | DROPPED` (spec §4.3).
    ///
    /// `mask_deg` is the elevation mask used for the link-quality proxy `q`;
    /// the channel itself does not own orbit configuration, so the caller
    /// (which already holds the `OrbitModel`) supplies it alongside
    /// `elev_deg`. Blocks for the fixed propagation delay before returning.
    /// Steps 2-7 are atomic with respect to every other call on this
    /// instance: the lock is held across them but not across the sleep.
    pub fn propagate(&self, packet: Packet, elev_deg: f64, mask_deg: f64) -> Option<Packet> {
        thread::sleep(Duration::from_secs_f64(self.settings.prop_delay_s));
        let mut rng = rand::rng();
        self.propagate_inner(packet, elev_deg, mask_deg, &mut rng)
    }

    /// Core algorithm, generic over the RNG so tests can inject a seeded one.
    /// Does not sleep — callers that need the propagation delay use
    /// [`Self::propagate`] instead.
    pub fn propagate_inner(
        &self,
        mut packet: Packet,
        elev_deg: f64,
        mask_deg: f64,
        rng: &mut impl Rng,
    ) -> Option<Packet> {
        let q = Self::link_quality(elev_deg, mask_deg);
        let is_uplink = self.direction == Direction::Uplink;

        let mut state = self.state.lock().expect("channel state mutex poisoned");
        debug_assert!(state.invariant_holds());

        // Step 3: active fade.
        if state.in_fade {
            state.fade_remaining_pkts -= 1;
            if state.fade_remaining_pkts == 0 {
                state.in_fade = false;
            }
            debug_assert!(state.invariant_holds());
            return None;
        }

        // Step 4: fade ignition.
        let p_ignite = self.settings.burst_start * (1.0 + 3.0 * (1.0 - q));
        if rng.random::<f64>() < p_ignite {
            state.in_fade = true;
            state.fade_remaining_pkts = self.settings.fade_len;
            debug_assert!(state.invariant_holds());
            return None;
        }
        drop(state);

        // Step 5: loss.
        let mut p_loss = self.settings.base_loss * (1.0 - q).powf(1.6);
        if is_uplink {
            p_loss *= 1.15;
        }
        if rng.random::<f64>() < p_loss {
            return None;
        }

        // Step 6: bit error.
        let mut p_ber = self.settings.base_ber * (1.0 - q).powi(2);
        if is_uplink {
            p_ber *= 1.10;
        }
        if rng.random::<f64>() < p_ber {
            packet.corrupted = true;
            packet.rf_note = Some("bit_error".to_string());
        }

        // Step 7: duplicate marker.
        let p_dup = self.settings.base_dup * (2.0 - q);
        if rng.random::<f64>() < p_dup {
            packet.duplicated = true;
        }

        Some(packet)
    }

    /// `q = clamp((elev_deg - mask) / (90 - mask), 0, 1)`, `0` outside the window.
    fn link_quality(elev_deg: f64, mask_deg: f64) -> f64 {
        ((elev_deg - mask_deg) / (90.0 - mask_deg)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tm(seq: u32) -> Packet {
        Packet::new_tm(seq, 0.0, 45.0, 0.0, 256)
    }

    #[test]
    fn identity_when_all_probabilities_zero() {
        // Testable property 9.
        let settings = ChannelSettings {
            prop_delay_s: 0.0,
            base_loss: 0.0,
            base_ber: 0.0,
            base_dup: 0.0,
            burst_start: 0.0,
            fade_len: 25,
        };
        let chan = RfChannel::new(settings, Direction::Downlink);
        let mut rng = StdRng::seed_from_u64(1);
        let pkt = tm(5);
        let out = chan
            .propagate_inner(pkt.clone(), 45.0, 10.0, &mut rng)
            .expect("never dropped with all-zero probabilities");
        assert_eq!(out.seq, pkt.seq);
        assert_eq!(out.corrupted, pkt.corrupted);
        assert_eq!(out.duplicated, pkt.duplicated);
        assert_eq!(out.payload, pkt.payload);
    }

    #[test]
    fn fade_state_machine_drops_exactly_fade_len_consecutive_packets() {
        // Scenario S4: BURST_START=1.0, FADE_LEN=3 → ignite, 2 more drops, 4th admits.
        let settings = ChannelSettings {
            prop_delay_s: 0.0,
            base_loss: 0.0,
            base_ber: 0.0,
            base_dup: 0.0,
            burst_start: 1.0,
            fade_len: 3,
        };
        let chan = RfChannel::new(settings, Direction::Downlink);
        let mut rng = StdRng::seed_from_u64(42);

        assert!(chan.propagate_inner(tm(1), 45.0, 10.0, &mut rng).is_none());
        assert!(chan.propagate_inner(tm(2), 45.0, 10.0, &mut rng).is_none());
        assert!(chan.propagate_inner(tm(3), 45.0, 10.0, &mut rng).is_none());
        assert!(chan.propagate_inner(tm(4), 45.0, 10.0, &mut rng).is_some());
    }

    #[test]
    fn uplink_multiplies_loss_and_ber() {
        let settings = ChannelSettings {
            prop_delay_s: 0.0,
            base_loss: 0.5,
            base_ber: 0.0,
            base_dup: 0.0,
            burst_start: 0.0,
            fade_len: 25,
        };
        let dl = RfChannel::new(settings, Direction::Downlink);
        let ul = RfChannel::new(settings, Direction::Uplink);

        // q = 1.0 at zenith so p_loss = base_loss (dl) or base_loss*1.15 (ul, clamped < 1).
        let mut rng_dl = StdRng::seed_from_u64(7);
        let mut rng_ul = StdRng::seed_from_u64(7);
        let dl_drops = (0..2000)
            .filter(|_| dl.propagate_inner(tm(0), 90.0, 10.0, &mut rng_dl).is_none())
            .count();
        let ul_drops = (0..2000)
            .filter(|_| ul.propagate_inner(tm(0), 90.0, 10.0, &mut rng_ul).is_none())
            .count();
        assert!(
            ul_drops > dl_drops,
            "uplink should drop more often than downlink at equal elevation: ul={ul_drops} dl={dl_drops}"
        );
    }

    #[test]
    fn invariant_holds_after_many_calls() {
        let settings = ChannelSettings::default();
        let chan = RfChannel::new(settings, Direction::Downlink);
        let mut rng = StdRng::seed_from_u64(99);
        for i in 0..5000u32 {
            chan.propagate_inner(tm(i), 60.0, 10.0, &mut rng);
            let state = chan.state.lock().unwrap();
            assert!(state.invariant_holds());
        }
    }
}
