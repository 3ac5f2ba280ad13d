#[cfg(test)]
mod queue_test;

use std::collections::VecDeque;

use bytes::Bytes;
use util::sync::Mutex;

/// CtrlPacketQueue hands finished outbound packets from the build path to
/// the transmit path. One lock covers both ends and no I/O happens under it.
#[derive(Debug, Default)]
pub struct CtrlPacketQueue {
    packets: Mutex<VecDeque<Bytes>>,
    max_size: usize, // 0: unlimited
}

impl CtrlPacketQueue {
    pub fn new(max_size: usize) -> Self {
        CtrlPacketQueue {
            packets: Mutex::new(VecDeque::new()),
            max_size,
        }
    }

    /// enqueue appends a packet; false means the queue was full and the
    /// packet was dropped.
    pub fn enqueue(&self, packet: Bytes) -> bool {
        let mut packets = self.packets.lock();

        if self.max_size > 0 && packets.len() >= self.max_size {
            false // dropped
        } else {
            packets.push_back(packet);
            true
        }
    }

    /// drain_all removes and returns everything queued, oldest first.
    pub fn drain_all(&self) -> Vec<Bytes> {
        let mut packets = self.packets.lock();
        packets.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.packets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }
}
