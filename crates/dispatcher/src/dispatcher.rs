//! Dispatcher - main loop for fan-out to sinks

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{SensorFrame, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::SinkSnapshot;
use crate::sinks::{FileSink, LogSink};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub sinks: Vec<SinkConfig>,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<SensorFrame>,
}

impl DispatcherBuilder {
    pub fn new(config: DispatcherConfig, input_rx: mpsc::Receiver<SensorFrame>) -> Self {
        Self { config, input_rx }
    }

    /// Create every configured sink and start its worker
    ///
    /// Must be called inside a tokio runtime.
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(sink_count = self.config.sinks.len())
    )]
    pub fn build(self) -> Result<Dispatcher, DispatcherError> {
        let handles = self
            .config
            .sinks
            .iter()
            .map(create_sink_handle)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Dispatcher {
            handles,
            input_rx: self.input_rx,
        })
    }
}

#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::from_params(&config.name, &config.params);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Fans emitted frames out to sinks; a slow sink only loses its own frames
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    input_rx: mpsc::Receiver<SensorFrame>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(
        handles: Vec<SinkHandle>,
        input_rx: mpsc::Receiver<SensorFrame>,
    ) -> Self {
        Self { handles, input_rx }
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.handles.iter().map(SinkHandle::name).collect()
    }

    /// Metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, SinkSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run until the input channel closes, then drain and close every sink.
    ///
    /// Returns the final metrics of each sink.
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(mut self) -> Vec<(String, SinkSnapshot)> {
        info!(sinks = self.handles.len(), "Dispatcher started");

        let mut frame_count: u64 = 0;

        while let Some(frame) = self.input_rx.recv().await {
            frame_count += 1;
            self.dispatch_frame(frame);

            if frame_count.is_multiple_of(100) {
                debug!(frames = frame_count, "Dispatcher progress");
            }
        }

        info!(
            frames = frame_count,
            "Dispatcher input closed, shutting down"
        );

        let metrics = Self::shutdown_handles(self.handles).await;

        info!("Dispatcher shutdown complete");
        metrics
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<Vec<(String, SinkSnapshot)>> {
        tokio::spawn(self.run())
    }

    fn dispatch_frame(&self, frame: SensorFrame) {
        let Some((last, rest)) = self.handles.split_last() else {
            return;
        };
        // Full queues are already counted and logged by the handle
        for handle in rest {
            let _ = handle.try_send(frame.clone());
        }
        let _ = last.try_send(frame);
    }

    async fn shutdown_handles(handles: Vec<SinkHandle>) -> Vec<(String, SinkSnapshot)> {
        let mut metrics = Vec::with_capacity(handles.len());
        for handle in handles {
            let name = handle.name().to_string();
            let sink_metrics = std::sync::Arc::clone(handle.metrics());
            handle.shutdown().await;
            metrics.push((name, sink_metrics.snapshot()));
        }
        metrics
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs, input_rx))]
pub fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
    input_rx: mpsc::Receiver<SensorFrame>,
) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        sinks: sink_configs,
    };
    DispatcherBuilder::new(config, input_rx).build()
}
