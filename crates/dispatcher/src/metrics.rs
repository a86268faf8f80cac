//! Per-sink counters

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters shared between a [`SinkHandle`](crate::SinkHandle) and its worker
#[derive(Debug, Default)]
pub struct SinkMetrics {
    queue_len: AtomicUsize,
    written: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    /// `seq + 1` of the last frame written, 0 before the first write
    last_written: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Frames written successfully
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Record a successful write of frame `seq`
    pub fn record_written(&self, seq: u64) {
        self.written.fetch_add(1, Ordering::Relaxed);
        self.last_written.fetch_max(seq + 1, Ordering::Relaxed);
    }

    /// Writes that returned an error
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Frames dropped because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Highest sequence number written so far
    pub fn last_seq(&self) -> Option<u64> {
        self.last_written.load(Ordering::Relaxed).checked_sub(1)
    }

    pub fn snapshot(&self) -> SinkSnapshot {
        SinkSnapshot {
            queue_len: self.queue_len(),
            written: self.written(),
            failed: self.failed(),
            dropped: self.dropped(),
            last_seq: self.last_seq(),
        }
    }
}

/// Point-in-time copy of [`SinkMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkSnapshot {
    pub queue_len: usize,
    pub written: u64,
    pub failed: u64,
    pub dropped: u64,
    pub last_seq: Option<u64>,
}
