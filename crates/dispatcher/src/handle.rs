//! SinkHandle - one sink behind its own bounded queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{DataSink, SensorFrame};

use crate::error::DispatcherError;
use crate::metrics::SinkMetrics;

/// Handle to a running sink worker
pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<SensorFrame>,
    metrics: Arc<SinkMetrics>,
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn the worker task for `sink`
    pub fn spawn<S: DataSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Queue a frame without waiting
    ///
    /// # Errors
    /// `QueueFull` when the worker is behind; the frame is dropped for this
    /// sink only. `SinkClosed` when the worker is gone.
    pub fn try_send(&self, frame: SensorFrame) -> Result<(), DispatcherError> {
        match self.tx.try_send(frame) {
            Ok(()) => {
                self.metrics
                    .set_queue_len(self.tx.max_capacity() - self.tx.capacity());
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(f)) => {
                self.metrics.record_dropped();
                warn!(sink = %self.name, seq = f.seq, "Queue full, frame dropped");
                Err(DispatcherError::QueueFull {
                    sink_name: self.name.clone(),
                    seq: f.seq,
                })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                Err(DispatcherError::SinkClosed(self.name.clone()))
            }
        }
    }

    /// Close the queue and wait for the worker to drain it
    #[instrument(name = "sink_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: DataSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<SensorFrame>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(frame) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.write(&frame).await {
            Ok(()) => {
                metrics.record_written(frame.seq);
                observability::record_frame_dispatched(&name, true);
            }
            Err(e) => {
                metrics.record_failed();
                observability::record_frame_dispatched(&name, false);
                error!(sink = %name, seq = frame.seq, error = %e, "Write failed");
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::frame;
    use contracts::ContractError;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    struct MockSink {
        name: String,
        write_count: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl MockSink {
        fn new(name: &str, write_count: &Arc<AtomicU64>) -> Self {
            Self {
                name: name.to_string(),
                write_count: Arc::clone(write_count),
                should_fail: false,
                delay_ms: 0,
            }
        }
    }

    impl DataSink for MockSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&mut self, _frame: &SensorFrame) -> Result<(), ContractError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(ContractError::sink_write(&self.name, "mock failure"));
            }
            self.write_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sink_handle_basic() {
        let write_count = Arc::new(AtomicU64::new(0));
        let handle = SinkHandle::spawn(MockSink::new("test", &write_count), 10);

        for seq in 0..5 {
            assert!(handle.try_send(frame(seq)).is_ok());
        }

        let metrics = Arc::clone(handle.metrics());
        handle.shutdown().await;
        assert_eq!(write_count.load(Ordering::Relaxed), 5);
        assert_eq!(metrics.last_seq(), Some(4));
    }

    #[tokio::test]
    async fn test_sink_handle_queue_full() {
        let write_count = Arc::new(AtomicU64::new(0));
        let mut sink = MockSink::new("slow", &write_count);
        sink.delay_ms = 100;

        let handle = SinkHandle::spawn(sink, 2);

        let rejected = (0..10)
            .filter_map(|seq| handle.try_send(frame(seq)).err())
            .collect::<Vec<_>>();

        assert!(!rejected.is_empty());
        assert!(matches!(
            rejected[0],
            DispatcherError::QueueFull { ref sink_name, .. } if sink_name == "slow"
        ));
        assert_eq!(handle.metrics().dropped(), rejected.len() as u64);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sink_handle_failure_isolation() {
        let mut sink = MockSink::new("failing", &Arc::new(AtomicU64::new(0)));
        sink.should_fail = true;

        let handle = SinkHandle::spawn(sink, 10);
        for seq in 0..3 {
            handle.try_send(frame(seq)).unwrap();
        }

        let metrics = Arc::clone(handle.metrics());
        handle.shutdown().await;

        assert_eq!(metrics.failed(), 3);
        assert_eq!(metrics.last_seq(), None);
    }
}
