//! Pipeline statistics and metrics.

use std::time::Duration;

use dispatcher::SinkSnapshot;
use frontend::FrontendStats;
use ingestion::MetricsSnapshot as IngestionSnapshot;
use observability::MetricsSummary;
use sync_engine::SynchronizerStats;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Front end event counters
    pub frontend: FrontendStats,

    /// Synchronizer counters (four-stream input only)
    pub sync: Option<SynchronizerStats>,

    /// Rig channel counters
    pub ingestion: Option<IngestionSnapshot>,

    /// Emitted frame statistics
    pub frames: MetricsSummary,

    /// Frames the dispatcher queue refused
    pub handoff_dropped: u64,

    /// "No data" watchdog warnings issued
    pub watchdog_warnings: u64,

    /// Final per-sink counters
    pub sinks: Vec<(String, SinkSnapshot)>,

    /// Total duration of the pipeline run
    pub duration: Duration,
}

impl PipelineStats {
    /// Emitted frames per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frontend.frames_emitted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of correlated groups that did not become a frame, in percent
    pub fn drop_rate(&self) -> f64 {
        let groups = self.frontend.groups;
        if groups > 0 {
            (groups - self.frontend.frames_emitted) as f64 / groups as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        let f = &self.frontend;
        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Input events: {} ({} rejected)", f.events, f.rejected_events);
        println!("   ├─ Correlated groups: {}", f.groups);
        println!("   ├─ Frames emitted: {}", f.frames_emitted);
        println!(
            "   ├─ Frames dropped: {} (+{} while paused, {:.2}%)",
            f.frames_dropped,
            f.paused_drops,
            self.drop_rate()
        );
        println!("   ├─ FPS: {:.2}", self.fps());
        println!("   └─ Watchdog warnings: {}", self.watchdog_warnings);

        if let Some(sync) = &self.sync {
            println!("\n🔗 Synchronizer");
            println!(
                "   ├─ Policy: {} (queue_size={})",
                sync.policy.as_str(),
                sync.queue_size
            );
            println!("   ├─ Groups: {}", sync.groups_emitted);
            println!("   ├─ Discarded messages: {:?}", sync.dropped);
            println!("   ├─ Out of order: {}", sync.out_of_order);
            println!("   └─ Still queued: {:?}", sync.queued);
        }

        if let Some(ingestion) = &self.ingestion {
            println!("\n📥 Rig channel");
            println!("   ├─ Received: {}", ingestion.events_received);
            println!("   └─ Dropped (backpressure): {}", ingestion.events_dropped);
        }

        println!("\n📈 Frames");
        println!("   ├─ Baseline (m): {}", self.frames.baseline_m);
        println!("   ├─ Interval (ms): {}", self.frames.frame_interval_ms);
        println!("   ├─ Sequence gaps: {}", self.frames.sequence_gaps);
        println!("   └─ Dispatcher queue drops: {}", self.handoff_dropped);

        if !self.frames.dropped_by_reason.is_empty() {
            println!("\n🚫 Drop reasons");
            let mut reasons: Vec<_> = self.frames.dropped_by_reason.iter().collect();
            reasons.sort();
            for (reason, count) in reasons {
                println!("   - {reason}: {count}");
            }
        }

        if !self.sinks.is_empty() {
            println!("\n📤 Sinks");
            for (i, (name, sink)) in self.sinks.iter().enumerate() {
                let prefix = if i == self.sinks.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: written={}, failed={}, dropped={}",
                    prefix, name, sink.written, sink.failed, sink.dropped
                );
            }
        }

        println!();
    }
}
