//! Approximate (closest-stamp) matching.
//!
//! Every channel owns a bounded queue. The pivot is the latest of the four
//! queue heads; once each channel holds a message at or after the pivot its
//! closest-to-pivot candidate is final and the group can be formed. With a
//! max interval set, a candidate set spreading wider than it causes the
//! oldest head to be discarded and matching to retry.

use contracts::{StreamChannel, StreamMessage, SyncGroup, Timestamp};
use tracing::{debug, trace};

use crate::buffer::{ChannelBuffer, PushOutcome};
use crate::tuple::MessageTuple;

#[derive(Debug)]
pub(crate) struct ApproximateMatcher {
    queues: [ChannelBuffer; 4],
    /// Nanoseconds; `None` = unbounded
    max_interval: Option<u64>,
    /// Heads discarded for exceeding the max interval
    interval_rejections: u64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    position: usize,
    stamp: Timestamp,
}

impl ApproximateMatcher {
    pub fn new(depth: usize, max_interval: Option<u64>) -> Self {
        Self {
            queues: std::array::from_fn(|_| ChannelBuffer::new(depth)),
            max_interval: max_interval.filter(|nanos| *nanos > 0),
            interval_rejections: 0,
        }
    }

    pub fn push(&mut self, message: StreamMessage) -> Option<SyncGroup> {
        let channel = message.channel();
        match self.queues[channel.index()].push(message) {
            PushOutcome::Queued => {}
            PushOutcome::Evicted => {
                trace!(channel = %channel, "queue full, oldest message discarded");
                observability::record_sync_dropped(channel, 1);
            }
            PushOutcome::OutOfOrder => {
                debug!(channel = %channel, "out-of-order message discarded");
                observability::record_sync_dropped(channel, 1);
                return None;
            }
        }
        self.try_match()
    }

    fn try_match(&mut self) -> Option<SyncGroup> {
        loop {
            let candidates = self.select_candidates()?;

            if let Some(max_interval) = self.max_interval {
                let oldest = candidates.iter().map(|c| c.stamp).min()?;
                let newest = candidates.iter().map(|c| c.stamp).max()?;
                if newest.abs_diff(oldest) > max_interval {
                    self.discard_oldest_head();
                    continue;
                }
            }

            return self.consume(candidates);
        }
    }

    /// Closest-to-pivot candidate per channel, or `None` while any channel
    /// is empty or could still receive a closer message.
    fn select_candidates(&self) -> Option<[Candidate; 4]> {
        let mut pivot = Timestamp::ZERO;
        for queue in &self.queues {
            pivot = pivot.max(queue.front_stamp()?);
        }

        let mut candidates = [Candidate {
            position: 0,
            stamp: pivot,
        }; 4];
        for (queue, candidate) in self.queues.iter().zip(candidates.iter_mut()) {
            if queue.back_stamp()? < pivot {
                return None;
            }
            let (position, stamp) = queue.closest_to(pivot)?;
            *candidate = Candidate { position, stamp };
        }
        Some(candidates)
    }

    fn discard_oldest_head(&mut self) {
        let oldest = StreamChannel::ALL
            .into_iter()
            .filter_map(|channel| {
                self.queues[channel.index()]
                    .front_stamp()
                    .map(|stamp| (stamp, channel))
            })
            .min_by_key(|(stamp, _)| *stamp);

        if let Some((stamp, channel)) = oldest {
            debug!(channel = %channel, stamp = %stamp, "candidate spread over max interval, head discarded");
            self.queues[channel.index()].pop_front();
            self.interval_rejections += 1;
            observability::record_sync_dropped(channel, 1);
        }
    }

    fn consume(&mut self, candidates: [Candidate; 4]) -> Option<SyncGroup> {
        let mut tuple = MessageTuple::default();
        for (channel, candidate) in StreamChannel::ALL.into_iter().zip(candidates) {
            let message = self.queues[channel.index()].take_through(candidate.position)?;
            if candidate.position > 0 {
                observability::record_sync_dropped(channel, candidate.position as u64);
            }
            tuple.insert(message);
        }
        tuple.into_group()
    }

    /// Messages discarded so far, per channel
    pub fn dropped(&self) -> [u64; 4] {
        std::array::from_fn(|i| self.queues[i].dropped_count())
    }

    pub fn out_of_order_count(&self) -> u64 {
        self.queues.iter().map(ChannelBuffer::out_of_order_count).sum()
    }

    pub fn interval_rejections(&self) -> u64 {
        self.interval_rejections
    }

    pub fn queued(&self) -> [usize; 4] {
        std::array::from_fn(|i| self.queues[i].len())
    }
}
