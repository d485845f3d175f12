//! Shared pending-flow buffer.
//!
//! Parsed records accumulate here until the batch scheduler detaches a
//! batch. Appends and batch detachment are atomic with respect to each
//! other; records arriving during an in-flight flush land undisturbed
//! behind the detached prefix.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::flow::FlowRecord;

/// FIFO buffer of parsed flow records awaiting enrichment and flush.
#[derive(Debug, Default)]
pub struct FlowBuffer {
    inner: Mutex<VecDeque<FlowRecord>>,
}

impl FlowBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning the new buffer length so callers can
    /// check the size trigger without a second lock.
    pub fn push(&self, record: FlowRecord) -> usize {
        let mut inner = self.inner.lock();
        inner.push_back(record);
        inner.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Atomically remove and return up to `max` oldest records, leaving
    /// the remainder for the next batch.
    pub fn detach(&self, max: usize) -> Vec<FlowRecord> {
        let mut inner = self.inner.lock();
        let take = max.min(inner.len());
        inner.drain(..take).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Protocol;
    use chrono::{TimeZone, Utc};

    fn record(seq: u16) -> FlowRecord {
        FlowRecord {
            source_ip: "192.0.2.1".into(),
            dest_ip: "198.51.100.2".into(),
            source_port: seq,
            dest_port: 443,
            protocol: Protocol::Https,
            size: 64,
            tcp_flags: None,
            captured_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn push_reports_new_length() {
        let buffer = FlowBuffer::new();
        assert_eq!(buffer.push(record(1)), 1);
        assert_eq!(buffer.push(record(2)), 2);
    }

    #[test]
    fn detach_takes_oldest_and_leaves_remainder() {
        let buffer = FlowBuffer::new();
        for seq in 0..7 {
            buffer.push(record(seq));
        }

        let batch = buffer.detach(3);
        assert_eq!(batch.len(), 3);
        assert_eq!(buffer.len(), 4);

        let order: Vec<u16> = batch.iter().map(|r| r.source_port).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn detach_on_short_buffer_takes_everything() {
        let buffer = FlowBuffer::new();
        buffer.push(record(1));
        assert_eq!(buffer.detach(10).len(), 1);
        assert!(buffer.is_empty());
        assert!(buffer.detach(10).is_empty());
    }

    #[test]
    fn appends_during_flush_stay_behind_detached_prefix() {
        let buffer = FlowBuffer::new();
        for seq in 0..3 {
            buffer.push(record(seq));
        }
        let batch = buffer.detach(3);
        buffer.push(record(99));

        assert_eq!(batch.len(), 3);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.detach(1)[0].source_port, 99);
    }
}
