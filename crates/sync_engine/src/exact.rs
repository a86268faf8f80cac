//! Exact-stamp matching.
//!
//! Messages correlate only when all four stamps are bit-identical. Partial
//! tuples wait in a stamp-ordered map whose size is bounded by the queue
//! depth; completing one emits it and discards every older partial tuple.

use std::collections::BTreeMap;

use contracts::{StreamChannel, StreamMessage, SyncGroup, Timestamp};
use tracing::debug;

use crate::tuple::MessageTuple;

#[derive(Debug)]
pub(crate) struct ExactMatcher {
    pending: BTreeMap<Timestamp, MessageTuple>,
    capacity: usize,
    last_emitted: Option<Timestamp>,
    dropped: [u64; 4],
    late: u64,
}

impl ExactMatcher {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: BTreeMap::new(),
            capacity: capacity.max(1),
            last_emitted: None,
            dropped: [0; 4],
            late: 0,
        }
    }

    pub fn push(&mut self, message: StreamMessage) -> Option<SyncGroup> {
        let stamp = message.stamp();
        let channel = message.channel();

        if self.last_emitted.is_some_and(|last| stamp <= last) {
            debug!(
                channel = %channel,
                stamp = %stamp,
                "message at or before last emitted stamp, discarded"
            );
            self.late += 1;
            self.count_drop(channel);
            return None;
        }

        if !self.pending.contains_key(&stamp) && self.pending.len() >= self.capacity {
            if let Some((oldest, tuple)) = self.pending.pop_first() {
                debug!(stamp = %oldest, "exact queue full, oldest partial tuple discarded");
                self.discard(tuple);
            }
        }

        let tuple = self.pending.entry(stamp).or_default();
        let replaced = tuple.insert(message).is_some();
        let complete = tuple.is_complete();
        if replaced {
            // same channel, same stamp: newest wins
            self.count_drop(channel);
        }
        if !complete {
            return None;
        }

        let tuple = self.pending.remove(&stamp)?;
        let newer = self.pending.split_off(&stamp);
        let stale = std::mem::replace(&mut self.pending, newer);
        for (_, tuple) in stale {
            self.discard(tuple);
        }
        self.last_emitted = Some(stamp);

        tuple.into_group()
    }

    /// Messages discarded so far, per channel
    pub fn dropped(&self) -> [u64; 4] {
        self.dropped
    }

    pub fn late_count(&self) -> u64 {
        self.late
    }

    /// Messages waiting in partial tuples
    pub fn queued(&self) -> [usize; 4] {
        let mut queued = [0; 4];
        for tuple in self.pending.values() {
            for channel in tuple.occupied() {
                queued[channel.index()] += 1;
            }
        }
        queued
    }

    fn discard(&mut self, tuple: MessageTuple) {
        for channel in tuple.occupied() {
            self.count_drop(channel);
        }
    }

    fn count_drop(&mut self, channel: StreamChannel) {
        self.dropped[channel.index()] += 1;
        observability::record_sync_dropped(channel, 1);
    }
}
