//! # Frame Handoff
//!
//! Single-slot rendezvous connecting the decoder worker to the sink worker.
//!
//! ## Protocol
//!
//! Two one-shot wake signals serialize access to the one [`PcmFrame`]:
//! "frame ready" (decoder → sink) and "slot free" (sink → decoder). Instead
//! of signals beside a shared buffer, the frame itself is a move-once token
//! carried by the signals:
//!
//! ```text
//! decoder: acquire()  ─── blocks on "slot free",  receives the frame
//! decoder: publish()  ─── fills "frame ready" with the written frame
//! sink:    acquire()  ─── blocks on "frame ready", receives the frame
//! sink:    release()  ─── fills "slot free" with the consumed frame
//! ```
//!
//! Strict alternation is enforced by construction: a side that has published
//! no longer holds the token, so it cannot signal twice, and neither side
//! can touch samples it has handed over. Exactly one frame is in flight at
//! any instant.
//!
//! The handoff is created with the token seeded into the "slot free" cell,
//! which is the kick that lets the decoder start its first cycle.

use crate::frame::PcmFrame;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

struct Slot {
    cell: Mutex<Option<PcmFrame>>,
    filled: Condvar,
}

impl Slot {
    fn empty() -> Self {
        Self {
            cell: Mutex::new(None),
            filled: Condvar::new(),
        }
    }

    fn seeded(frame: PcmFrame) -> Self {
        Self {
            cell: Mutex::new(Some(frame)),
            filled: Condvar::new(),
        }
    }

    fn put(&self, frame: PcmFrame) {
        let mut cell = self.cell.lock();
        debug_assert!(cell.is_none(), "handoff slot signaled twice");
        *cell = Some(frame);
        drop(cell);
        self.filled.notify_one();
    }

    fn take(&self) -> PcmFrame {
        let mut cell = self.cell.lock();
        loop {
            if let Some(frame) = cell.take() {
                return frame;
            }
            self.filled.wait(&mut cell);
        }
    }
}

/// Create a frame handoff seeded with the given frame token.
pub fn frame_handoff(frame: PcmFrame) -> (FrameProducer, FrameConsumer) {
    let ready = Arc::new(Slot::empty());
    let free = Arc::new(Slot::seeded(frame));

    (
        FrameProducer {
            ready: Arc::clone(&ready),
            free: Arc::clone(&free),
        },
        FrameConsumer { ready, free },
    )
}

/// Decoder side of the handoff.
pub struct FrameProducer {
    ready: Arc<Slot>,
    free: Arc<Slot>,
}

impl FrameProducer {
    /// Wait for the sink to hand the frame back ("slot free").
    pub fn acquire(&self) -> PcmFrame {
        self.free.take()
    }

    /// Hand the written frame to the sink ("frame ready").
    pub fn publish(&self, frame: PcmFrame) {
        self.ready.put(frame);
    }
}

/// Sink side of the handoff.
pub struct FrameConsumer {
    ready: Arc<Slot>,
    free: Arc<Slot>,
}

impl FrameConsumer {
    /// Wait for the decoder to publish a frame ("frame ready").
    pub fn acquire(&self) -> PcmFrame {
        self.ready.take()
    }

    /// Hand the consumed frame back to the decoder ("slot free").
    pub fn release(&self, frame: PcmFrame) {
        self.free.put(frame);
    }
}
