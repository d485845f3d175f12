//! Batch scheduler.
//!
//! Two triggers release a batch: the buffer reaching the configured size,
//! and the periodic timer tick. At most one flush is in progress at a
//! time; a trigger arriving while one is active is dropped, not queued —
//! the next tick or size check retries. The in-flight flag is the sole
//! concurrency-control primitive preventing overlapping flushes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use netvakt_core::buffer::FlowBuffer;
use netvakt_core::flow::FlowRecord;

pub struct BatchScheduler {
    buffer: Arc<FlowBuffer>,
    max_batch_size: usize,
    in_flight: Arc<AtomicBool>,
}

impl BatchScheduler {
    pub fn new(buffer: Arc<FlowBuffer>, max_batch_size: usize) -> Self {
        Self {
            buffer,
            max_batch_size,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn buffer(&self) -> &Arc<FlowBuffer> {
        &self.buffer
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Whether a push that left `len` records behind should trigger a flush.
    pub fn size_trigger(&self, len: usize) -> bool {
        len >= self.max_batch_size
    }

    /// Claim the in-flight slot and detach the oldest records.
    ///
    /// Returns `None` when a flush is already active or the buffer is
    /// empty. The permit releases the slot when dropped, so a panicking
    /// flush cannot wedge the scheduler.
    pub fn begin_flush(&self) -> Option<(Vec<FlowRecord>, FlushPermit)> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return None;
        }

        let batch = self.buffer.detach(self.max_batch_size);
        if batch.is_empty() {
            self.in_flight.store(false, Ordering::Release);
            return None;
        }

        Some((
            batch,
            FlushPermit {
                in_flight: Arc::clone(&self.in_flight),
            },
        ))
    }
}

/// Exclusive right to run the current flush.
pub struct FlushPermit {
    in_flight: Arc<AtomicBool>,
}

impl Drop for FlushPermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use netvakt_core::flow::Protocol;

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

    fn scheduler_with(records: u16, max: usize) -> BatchScheduler {
        let buffer = Arc::new(FlowBuffer::new());
        for seq in 0..records {
            buffer.push(record(seq));
        }
        BatchScheduler::new(buffer, max)
    }

    #[test]
    fn flush_detaches_oldest_up_to_max() {
        let scheduler = scheduler_with(7, 3);

        let (batch, _permit) = scheduler.begin_flush().unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(scheduler.buffer().len(), 4);
        assert_eq!(batch[0].source_port, 0);
        assert_eq!(batch[2].source_port, 2);
    }

    #[test]
    fn second_trigger_during_flush_is_dropped() {
        let scheduler = scheduler_with(7, 3);

        let first = scheduler.begin_flush();
        assert!(first.is_some());
        // A back-to-back trigger while the first is in progress is a no-op.
        assert!(scheduler.begin_flush().is_none());
        assert_eq!(scheduler.buffer().len(), 4);

        drop(first);
        // Once the permit is released the next trigger succeeds.
        let (batch, _permit) = scheduler.begin_flush().unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(scheduler.buffer().len(), 1);
    }

    #[test]
    fn empty_buffer_releases_the_slot() {
        let scheduler = scheduler_with(0, 3);
        assert!(scheduler.begin_flush().is_none());

        scheduler.buffer().push(record(9));
        assert!(scheduler.begin_flush().is_some());
    }

    #[test]
    fn size_trigger_fires_at_capacity() {
        let scheduler = scheduler_with(0, 3);
        assert!(!scheduler.size_trigger(2));
        assert!(scheduler.size_trigger(3));
        assert!(scheduler.size_trigger(4));
    }

    #[test]
    fn records_arriving_during_flush_wait_for_the_next_batch() {
        let scheduler = scheduler_with(3, 3);

        let (batch, permit) = scheduler.begin_flush().unwrap();
        scheduler.buffer().push(record(50));
        assert_eq!(batch.len(), 3);
        assert_eq!(scheduler.buffer().len(), 1);

        drop(permit);
        let (next, _permit) = scheduler.begin_flush().unwrap();
        assert_eq!(next[0].source_port, 50);
    }
}
