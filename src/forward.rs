use crate::sink::{LogSink, SinkError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

/// Asynchronous destination that receives lines handed off by a
/// [`ForwardingSink`].
#[async_trait]
pub trait LineTransport: Send + Sync {
    /// Deliver a single formatted line.
    ///
    /// Failures are counted and reported on the diagnostic subscriber;
    /// the line is not retried.
    async fn deliver(&self, line: String) -> Result<(), SinkError>;
}

/// Sink that hands lines to an async [`LineTransport`] through a bounded
/// channel drained by a background Tokio task.
///
/// `write_line` never waits: when the channel is full the line is dropped
/// and counted in `dropped_lines`.
pub struct ForwardingSink {
    sender: mpsc::Sender<String>,
    /// Lines accepted into the channel.
    pub enqueued_lines: Arc<AtomicU64>,
    /// Lines dropped because the channel was full or closed.
    pub dropped_lines: Arc<AtomicU64>,
    /// Lines the transport rejected.
    pub failed_lines: Arc<AtomicU64>,
}

impl ForwardingSink {
    /// Create the sink and spawn its delivery task on the current Tokio
    /// runtime.
    ///
    /// The task ends once every clone of the sender is dropped, i.e. when
    /// the sink is dropped, after draining what is still queued.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(transport: Arc<dyn LineTransport>, buffer: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<String>(buffer.max(1));

        let enqueued_lines = Arc::new(AtomicU64::new(0));
        let dropped_lines = Arc::new(AtomicU64::new(0));
        let failed_lines = Arc::new(AtomicU64::new(0));

        let failed_lines_bg = Arc::clone(&failed_lines);
        let handle = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                if let Err(e) = transport.deliver(line).await {
                    failed_lines_bg.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(error = %e, "log line delivery failed");
                }
            }
        });

        (
            ForwardingSink {
                sender: tx,
                enqueued_lines,
                dropped_lines,
                failed_lines,
            },
            handle,
        )
    }
}

impl LogSink for ForwardingSink {
    fn write_line(&self, line: &str) -> Result<(), SinkError> {
        match self.sender.try_send(line.to_string()) {
            Ok(()) => {
                self.enqueued_lines.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.dropped_lines.fetch_add(1, Ordering::Relaxed);
                Err(SinkError::Full)
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped_lines.fetch_add(1, Ordering::Relaxed);
                Err(SinkError::Closed)
            }
        }
    }
}
