//! Per-channel message queue with timestamp-based ordering.
//!
//! Uses index-based separation for better performance:
//! - HeapRb stores lightweight metadata (timestamp + slab key)
//! - Slab stores actual StreamMessage data
//!
//! This avoids moving image payloads during queue operations.

use std::fmt;

use contracts::{StreamMessage, Timestamp};
use ringbuf::{traits::*, HeapRb};
use slab::Slab;

/// Lightweight metadata stored in ring buffer
#[derive(Debug, Clone, Copy)]
struct MessageMeta {
    stamp: Timestamp,
    /// Key into the slab storage
    slab_key: usize,
}

/// Fixed-depth queue for one input channel.
///
/// Entries are kept in non-decreasing stamp order: a message older than the
/// newest accepted one is refused. Pushing onto a full queue discards the
/// oldest entry.
pub struct ChannelBuffer {
    /// Ring buffer of metadata (timestamp + slab key)
    index: HeapRb<MessageMeta>,
    /// Actual message storage
    storage: Slab<StreamMessage>,
    max_size: usize,
    dropped_count: u64,
    out_of_order_count: u64,
    last_stamp: Option<Timestamp>,
}

impl fmt::Debug for ChannelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelBuffer")
            .field("len", &self.index.occupied_len())
            .field("max_size", &self.max_size)
            .field("dropped", &self.dropped_count)
            .finish()
    }
}

/// Result of [`ChannelBuffer::push`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// Queued after discarding the oldest entry
    Evicted,
    /// Older than the newest queued message, not queued
    OutOfOrder,
}

impl ChannelBuffer {
    /// Create a new queue (depth is clamped to at least one)
    #[inline]
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            index: HeapRb::new(max_size),
            storage: Slab::with_capacity(max_size),
            max_size,
            dropped_count: 0,
            out_of_order_count: 0,
            last_stamp: None,
        }
    }

    #[inline]
    pub fn push(&mut self, message: StreamMessage) -> PushOutcome {
        let stamp = message.stamp();

        if self.last_stamp.is_some_and(|last| stamp < last) {
            self.out_of_order_count += 1;
            return PushOutcome::OutOfOrder;
        }
        self.last_stamp = Some(stamp);

        // Overwriting hands back the oldest entry; its slab slot goes with it
        let slab_key = self.storage.insert(message);
        match self.index.push_overwrite(MessageMeta { stamp, slab_key }) {
            Some(old_meta) => {
                self.storage.remove(old_meta.slab_key);
                self.dropped_count += 1;
                PushOutcome::Evicted
            }
            None => PushOutcome::Queued,
        }
    }

    /// Stamp of the oldest queued message
    #[inline]
    pub fn front_stamp(&self) -> Option<Timestamp> {
        self.index.iter().next().map(|meta| meta.stamp)
    }

    /// Stamp of the newest queued message
    #[inline]
    pub fn back_stamp(&self) -> Option<Timestamp> {
        self.index.iter().last().map(|meta| meta.stamp)
    }

    /// Position and stamp of the message closest to `target`.
    /// Ties go to the earlier message.
    pub fn closest_to(&self, target: Timestamp) -> Option<(usize, Timestamp)> {
        let mut best: Option<(usize, Timestamp, u64)> = None;
        for (pos, meta) in self.index.iter().enumerate() {
            let distance = meta.stamp.abs_diff(target);
            match best {
                Some((_, _, best_distance)) if distance >= best_distance => {
                    // sorted queue: distances only grow past the target
                    if meta.stamp > target {
                        break;
                    }
                }
                _ => best = Some((pos, meta.stamp, distance)),
            }
        }
        best.map(|(pos, stamp, _)| (pos, stamp))
    }

    /// Remove and return the oldest message
    #[inline]
    pub fn pop_front(&mut self) -> Option<StreamMessage> {
        let meta = self.index.try_pop()?;
        Some(self.storage.remove(meta.slab_key))
    }

    /// Consume every message up to and including `position`, returning the
    /// one at `position`. Skipped messages count as dropped.
    pub fn take_through(&mut self, position: usize) -> Option<StreamMessage> {
        if position >= self.len() {
            return None;
        }
        for _ in 0..position {
            if self.pop_front().is_some() {
                self.dropped_count += 1;
            }
        }
        self.pop_front()
    }

    /// Drop everything queued (counters are kept)
    pub fn clear(&mut self) -> usize {
        let removed = self.index.pop_iter().count();
        self.storage.clear();
        removed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Messages discarded by eviction or skipped when a group was formed
    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }

    #[inline]
    pub fn out_of_order_count(&self) -> u64 {
        self.out_of_order_count
    }
}
