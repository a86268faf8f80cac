//! Frame synchronizer: owns exactly one matching policy.

use contracts::{StreamChannel, StreamMessage, SyncGroup, SyncPolicy, SyncSettings};
use tracing::{debug, info, instrument};

use crate::approximate::ApproximateMatcher;
use crate::exact::ExactMatcher;

/// Active matching state
#[derive(Debug)]
enum Matcher {
    Exact(ExactMatcher),
    Approximate(ApproximateMatcher),
}

impl Matcher {
    fn build(settings: &SyncSettings) -> Self {
        match settings.policy {
            SyncPolicy::Exact => Matcher::Exact(ExactMatcher::new(settings.queue_size)),
            SyncPolicy::Approximate => {
                let max_interval = settings
                    .max_interval
                    .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));
                Matcher::Approximate(ApproximateMatcher::new(settings.queue_size, max_interval))
            }
        }
    }
}

/// Diagnostics snapshot of a synchronizer
#[derive(Debug, Clone, PartialEq)]
pub struct SynchronizerStats {
    pub policy: SyncPolicy,
    pub queue_size: usize,
    pub groups_emitted: u64,
    /// Discarded messages, indexed by [`StreamChannel::index`]
    pub dropped: [u64; 4],
    /// Messages older than what the channel already accepted
    pub out_of_order: u64,
    /// Messages currently waiting, indexed by [`StreamChannel::index`]
    pub queued: [usize; 4],
}

impl SynchronizerStats {
    pub fn total_dropped(&self) -> u64 {
        self.dropped.iter().sum()
    }

    pub fn total_queued(&self) -> usize {
        self.queued.iter().sum()
    }
}

/// Correlates the four input channels into [`SyncGroup`]s.
///
/// Exactly one policy is active at a time; [`FrameSynchronizer::rebuild`]
/// replaces the whole state.
#[derive(Debug)]
pub struct FrameSynchronizer {
    settings: SyncSettings,
    matcher: Matcher,
    groups_emitted: u64,
}

impl FrameSynchronizer {
    pub fn new(settings: SyncSettings) -> Self {
        let settings = SyncSettings {
            queue_size: settings.queue_size.max(1),
            ..settings
        };
        debug!(
            policy = settings.policy.as_str(),
            queue_size = settings.queue_size,
            max_interval = ?settings.max_interval,
            "frame synchronizer created"
        );
        Self {
            matcher: Matcher::build(&settings),
            settings,
            groups_emitted: 0,
        }
    }

    /// Offer one message; returns a group when correlation succeeds
    #[instrument(
        level = "trace",
        name = "frame_sync_push",
        skip(self, message),
        fields(channel = %message.channel(), stamp = %message.stamp())
    )]
    pub fn push(&mut self, message: StreamMessage) -> Option<SyncGroup> {
        let group = match &mut self.matcher {
            Matcher::Exact(matcher) => matcher.push(message),
            Matcher::Approximate(matcher) => matcher.push(message),
        }?;

        self.groups_emitted += 1;
        observability::record_sync_group(self.settings.policy);
        Some(group)
    }

    /// Replace the policy and queue depth, discarding every unmatched message
    #[instrument(name = "frame_sync_rebuild", skip(self))]
    pub fn rebuild(&mut self, policy: SyncPolicy, depth: usize) {
        let settings = SyncSettings {
            policy,
            queue_size: depth,
            max_interval: self.settings.max_interval,
        };
        self.reconfigure(settings);
    }

    /// Like [`FrameSynchronizer::rebuild`], also replacing the max interval
    pub fn reconfigure(&mut self, settings: SyncSettings) {
        let discarded = self.stats().total_queued();
        *self = Self::new(settings);
        info!(
            policy = self.settings.policy.as_str(),
            queue_size = self.settings.queue_size,
            discarded,
            "synchronizer rebuilt"
        );
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn policy(&self) -> SyncPolicy {
        self.settings.policy
    }

    pub fn stats(&self) -> SynchronizerStats {
        let (dropped, out_of_order, queued) = match &self.matcher {
            Matcher::Exact(m) => (m.dropped(), m.late_count(), m.queued()),
            Matcher::Approximate(m) => (m.dropped(), m.out_of_order_count(), m.queued()),
        };
        SynchronizerStats {
            policy: self.settings.policy,
            queue_size: self.settings.queue_size,
            groups_emitted: self.groups_emitted,
            dropped,
            out_of_order,
            queued,
        }
    }

    /// Publish per-channel queue depths as gauges
    pub fn record_queue_depths(&self) {
        let stats = self.stats();
        for channel in StreamChannel::ALL {
            observability::record_queue_depth(channel, stats.queued[channel.index()]);
        }
    }
}
