//! TM buffers owned by C6 (spec §3).
//!
//! `live` holds frames received while visible, `history` holds every frame
//! received regardless of visibility. Both are ring-bounded: pushing past
//! capacity drops the oldest entry first.

use leo_common::wire::TmFrame;
use std::collections::VecDeque;

pub struct TmBuffers {
    live: VecDeque<TmFrame>,
    history: VecDeque<TmFrame>,
    live_cap: usize,
    hist_cap: usize,
}

impl TmBuffers {
    pub fn new(live_cap: usize, hist_cap: usize) -> Self {
        Self {
            live: VecDeque::new(),
            history: VecDeque::new(),
            live_cap,
            hist_cap,
        }
    }

    /// Appends to `history` always, and to `live` when `visible` — the
    /// invariant that every `live` frame also appears in `history`.
    pub fn ingest(&mut self, frame: TmFrame, visible: bool) {
        push_bounded(&mut self.history, frame.clone(), self.hist_cap);
        if visible {
            push_bounded(&mut self.live, frame, self.live_cap);
        }
    }

    /// Removes and returns the oldest `live` frame, if any.
    pub fn pop_live(&mut self) -> Option<TmFrame> {
        self.live.pop_front()
    }

    /// Returns the newest `history` frame without removing it.
    pub fn peek_history(&self) -> Option<&TmFrame> {
        self.history.back()
    }

    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

fn push_bounded(buf: &mut VecDeque<TmFrame>, frame: TmFrame, cap: usize) {
    if cap == 0 {
        return;
    }
    if buf.len() >= cap {
        buf.pop_front();
    }
    buf.push_back(frame);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(seq: u32) -> TmFrame {
        TmFrame::new(seq, seq as f64, 45.0, 0.0, true, false, false, None, 256)
    }

    #[test]
    fn every_live_frame_also_lands_in_history() {
        let mut buffers = TmBuffers::new(10, 10);
        buffers.ingest(frame(1), true);
        assert_eq!(buffers.live_len(), 1);
        assert_eq!(buffers.history_len(), 1);
    }

    #[test]
    fn invisible_frames_skip_live_but_not_history() {
        let mut buffers = TmBuffers::new(10, 10);
        buffers.ingest(frame(1), false);
        assert_eq!(buffers.live_len(), 0);
        assert_eq!(buffers.history_len(), 1);
    }

    #[test]
    fn live_cap_is_never_exceeded() {
        // Testable property 8.
        let mut buffers = TmBuffers::new(3, 100);
        for seq in 0..10 {
            buffers.ingest(frame(seq), true);
        }
        assert_eq!(buffers.live_len(), 3);
        assert_eq!(buffers.history_len(), 10);
    }

    #[test]
    fn history_cap_is_never_exceeded() {
        let mut buffers = TmBuffers::new(100, 4);
        for seq in 0..10 {
            buffers.ingest(frame(seq), false);
        }
        assert_eq!(buffers.history_len(), 4);
    }

    #[test]
    fn pop_live_is_fifo_and_history_peek_is_last_known_value() {
        // Scenario S5: repeated peeks never shrink history.
        let mut buffers = TmBuffers::new(10, 10);
        buffers.ingest(frame(1), true);
        buffers.ingest(frame(2), false);
        assert_eq!(buffers.peek_history().unwrap().seq, 2);
        assert_eq!(buffers.history_len(), 2);
        assert_eq!(buffers.peek_history().unwrap().seq, 2);
        assert_eq!(buffers.history_len(), 2);
        assert_eq!(buffers.pop_live().unwrap().seq, 1);
        assert_eq!(buffers.pop_live(), None);
    }
}
