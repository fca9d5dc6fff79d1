// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

//! Blind send-rate cap.
//!
//! The console never acknowledges anything, so the only protection against flooding it (or the
//! local socket buffers) is to stall the caller for a fixed time after every
//! `packets_before_pause` datagrams.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

pub const DEFAULT_PAUSE: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct Throttle {
    sent: AtomicU64,
    packets_before_pause: u64,
    pause: Duration,
}

impl Throttle {
    #[must_use]
    pub fn new(packets_before_pause: NonZeroUsize) -> Self {
        Self::with_pause(packets_before_pause, DEFAULT_PAUSE)
    }

    #[must_use]
    pub fn with_pause(packets_before_pause: NonZeroUsize, pause: Duration) -> Self {
        Throttle {
            sent: AtomicU64::new(0),
            packets_before_pause: packets_before_pause.get() as u64,
            pause,
        }
    }

    /// Counts one packet and reports whether the caller must pause before sending it.
    pub fn admit(&self) -> bool {
        let count = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        count % self.packets_before_pause == 0
    }

    /// Counts one packet, blocking the calling thread first if it lands on a pause boundary.
    pub fn wait(&self) {
        if self.admit() {
            trace!("Pausing {:?} after {} packets", self.pause, self.sent());
            std::thread::sleep(self.pause);
        }
    }

    /// Packets counted so far.
    #[must_use]
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}
