//! Outbound packet queue with cancellation of untouched packets.
//!
//! Every payload handed to the Telnet session becomes a [`Packet`] tagged
//! with a [`PacketId`]. Packets leave the queue strictly in enqueue order;
//! a packet whose first byte has not yet been written can still be
//! withdrawn, which lets the relay replace a stale screen delta with a
//! fresher one.

use std::collections::VecDeque;
use std::fmt;

/// Identifier of a queued packet. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketId(u32);

impl PacketId {
    /// Raw numeric value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One payload and how much of it has reached the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    payload: Vec<u8>,
    sent: usize,
}

impl Packet {
    fn new(payload: Vec<u8>) -> Self {
        Self { payload, sent: 0 }
    }

    /// Full payload, including bytes already written.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Number of bytes already written.
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Bytes still waiting to be written.
    pub fn remaining(&self) -> &[u8] {
        &self.payload[self.sent..]
    }

    /// Nothing has been written yet.
    pub fn is_untouched(&self) -> bool {
        self.sent == 0
    }

    /// Everything has been written.
    pub fn is_consumed(&self) -> bool {
        self.sent >= self.payload.len()
    }
}

/// FIFO of outbound packets.
#[derive(Debug, Clone)]
pub struct PacketQueue {
    packets: VecDeque<(PacketId, Packet)>,
    next_id: u32,
}

impl Default for PacketQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create an empty queue whose first id is `first` (zero becomes one).
    pub(crate) fn starting_at(first: u32) -> Self {
        Self {
            packets: VecDeque::new(),
            next_id: first.max(1),
        }
    }

    /// Append a payload. Empty payloads are refused.
    pub fn enqueue(&mut self, payload: Vec<u8>) -> Option<PacketId> {
        if payload.is_empty() {
            return None;
        }
        let id = self.allocate_id();
        self.packets.push_back((id, Packet::new(payload)));
        Some(id)
    }

    fn allocate_id(&mut self) -> PacketId {
        loop {
            let candidate = self.next_id;
            self.next_id = match self.next_id.wrapping_add(1) {
                0 => 1,
                n => n,
            };
            if !self.contains(PacketId(candidate)) {
                return PacketId(candidate);
            }
        }
    }

    fn contains(&self, id: PacketId) -> bool {
        self.packets.iter().any(|(live, _)| *live == id)
    }

    /// Look up a live packet.
    pub fn get(&self, id: PacketId) -> Option<&Packet> {
        self.packets
            .iter()
            .find(|(live, _)| *live == id)
            .map(|(_, packet)| packet)
    }

    /// True if the packet is queued and none of it has been written.
    pub fn is_cancellable(&self, id: PacketId) -> bool {
        self.get(id).is_some_and(Packet::is_untouched)
    }

    /// Remove an untouched packet. Returns whether it was removed.
    pub fn cancel(&mut self, id: PacketId) -> bool {
        let index = self
            .packets
            .iter()
            .position(|(live, packet)| *live == id && packet.is_untouched());
        match index {
            Some(index) => self.packets.remove(index).is_some(),
            None => false,
        }
    }

    /// Concatenate up to `limit` pending bytes, oldest packet first.
    pub fn gather(&self, limit: usize) -> Vec<u8> {
        let mut chunk = Vec::with_capacity(limit.min(self.pending_bytes()));
        for (_, packet) in &self.packets {
            let room = limit - chunk.len();
            if room == 0 {
                break;
            }
            let remaining = packet.remaining();
            chunk.extend_from_slice(&remaining[..remaining.len().min(room)]);
        }
        chunk
    }

    /// Mark `written` bytes from the front of the queue as sent.
    ///
    /// Fully written packets are dropped.
    pub fn advance(&mut self, mut written: usize) {
        while written > 0 {
            let Some((_, front)) = self.packets.front_mut() else {
                break;
            };
            let step = written.min(front.remaining().len());
            front.sent += step;
            written -= step;
            if front.is_consumed() {
                self.packets.pop_front();
            }
        }
    }

    /// Ids of live packets in send order.
    pub fn ids(&self) -> impl Iterator<Item = PacketId> + '_ {
        self.packets.iter().map(|(id, _)| *id)
    }

    /// Number of live packets.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Bytes still waiting to be written across all packets.
    pub fn pending_bytes(&self) -> usize {
        self.packets.iter().map(|(_, p)| p.remaining().len()).sum()
    }

    /// Drop every packet.
    pub fn clear(&mut self) {
        self.packets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_refused() {
        let mut queue = PacketQueue::new();
        assert_eq!(queue.enqueue(Vec::new()), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ids_increase_from_one() {
        let mut queue = PacketQueue::new();
        let a = queue.enqueue(b"a".to_vec()).unwrap();
        let b = queue.enqueue(b"b".to_vec()).unwrap();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
    }

    #[test]
    fn test_gather_spans_packets_in_order() {
        let mut queue = PacketQueue::new();
        queue.enqueue(b"abc".to_vec());
        queue.enqueue(b"defg".to_vec());

        assert_eq!(queue.gather(5), b"abcde".to_vec());
        assert_eq!(queue.gather(100), b"abcdefg".to_vec());
        assert_eq!(queue.pending_bytes(), 7);
    }

    #[test]
    fn test_advance_drops_consumed_and_marks_partial() {
        let mut queue = PacketQueue::new();
        let first = queue.enqueue(b"abc".to_vec()).unwrap();
        let second = queue.enqueue(b"defg".to_vec()).unwrap();

        queue.advance(4);
        assert!(queue.get(first).is_none());
        let packet = queue.get(second).unwrap();
        assert_eq!(packet.sent(), 1);
        assert_eq!(packet.remaining(), b"efg");
        assert_eq!(queue.gather(10), b"efg".to_vec());
    }

    #[test]
    fn test_fresh_packet_is_cancellable() {
        let mut queue = PacketQueue::new();
        let id = queue.enqueue(b"delta".to_vec()).unwrap();
        assert!(queue.is_cancellable(id));
        assert!(queue.cancel(id));
        assert!(queue.is_empty());
        assert!(!queue.cancel(id));
    }

    #[test]
    fn test_partially_sent_packet_is_not_cancellable() {
        let mut queue = PacketQueue::new();
        let id = queue.enqueue(b"delta".to_vec()).unwrap();
        queue.advance(2);

        assert!(!queue.is_cancellable(id));
        assert!(!queue.cancel(id));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.gather(10), b"lta".to_vec());
    }

    #[test]
    fn test_cancel_keeps_neighbours_in_order() {
        let mut queue = PacketQueue::new();
        let a = queue.enqueue(b"a".to_vec()).unwrap();
        let b = queue.enqueue(b"b".to_vec()).unwrap();
        let c = queue.enqueue(b"c".to_vec()).unwrap();

        assert!(queue.cancel(b));
        assert_eq!(queue.ids().collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(queue.gather(10), b"ac".to_vec());
    }

    #[test]
    fn test_ids_wrap_past_zero() {
        let mut queue = PacketQueue::starting_at(u32::MAX);
        let last = queue.enqueue(b"x".to_vec()).unwrap();
        let wrapped = queue.enqueue(b"y".to_vec()).unwrap();

        assert_eq!(last.get(), u32::MAX);
        assert_eq!(wrapped.get(), 1);
        // Send order follows enqueue order, not id order.
        assert_eq!(queue.ids().collect::<Vec<_>>(), vec![last, wrapped]);
        assert_eq!(queue.gather(10), b"xy".to_vec());
    }

    #[test]
    fn test_wrap_skips_live_ids() {
        let mut queue = PacketQueue::starting_at(1);
        let one = queue.enqueue(b"1".to_vec()).unwrap();
        let two = queue.enqueue(b"2".to_vec()).unwrap();
        queue.next_id = u32::MAX;

        let max = queue.enqueue(b"3".to_vec()).unwrap();
        let after = queue.enqueue(b"4".to_vec()).unwrap();

        assert_eq!(one.get(), 1);
        assert_eq!(two.get(), 2);
        assert_eq!(max.get(), u32::MAX);
        assert_eq!(after.get(), 3);
        assert_eq!(queue.gather(10), b"1234".to_vec());
    }
}
