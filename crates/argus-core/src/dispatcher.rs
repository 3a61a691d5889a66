//! Rate-limited outbound notification queue.
//!
//! Decouples match discovery from delivery: the engine enqueues without
//! blocking, a single background consumer sends in FIFO order with a fixed
//! pacing delay after every send. The consumer is bound to the run's
//! lifetime — it drains and exits when every handle is dropped, and stops
//! immediately on cancellation.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::NotificationMessage;
use crate::traits::Notifier;

/// Configuration for the notification dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Pacing delay observed after each send, regardless of outcome.
    pub send_delay: Duration,
    /// Outbound queue capacity. Overflow drops the newest message.
    pub queue_capacity: usize,
}

impl Default for DispatcherConfig {
    /// 30 second pacing, as the notification channel expects at most a
    /// couple of messages per minute per sender.
    fn default() -> Self {
        Self {
            send_delay: Duration::from_secs(30),
            queue_capacity: 256,
        }
    }
}

impl DispatcherConfig {
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

/// Producer side of the dispatcher queue.
///
/// Cloneable; dropping the last handle closes the queue and lets the
/// consumer drain and exit.
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<NotificationMessage>,
    send_delay: Duration,
}

impl DispatcherHandle {
    pub(crate) fn new(tx: mpsc::Sender<NotificationMessage>, send_delay: Duration) -> Self {
        Self { tx, send_delay }
    }

    /// Enqueue a message without blocking.
    ///
    /// Returns false when the message was dropped: queue full (drop-newest
    /// overflow policy) or consumer already gone.
    pub fn enqueue(&self, text: impl Into<String>) -> bool {
        let message = NotificationMessage::new(text, self.send_delay);
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                tracing::warn!(
                    text = %dropped.text.lines().next().unwrap_or(""),
                    "Notification queue full, dropping message"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Notification consumer stopped, dropping message");
                false
            }
        }
    }
}

/// Spawns the single-consumer send loop for a [`Notifier`].
pub struct NotificationDispatcher;

impl NotificationDispatcher {
    /// Start the background consumer. Returns the producer handle and the
    /// consumer task, which resolves to the number of messages delivered.
    pub fn spawn<N>(
        notifier: N,
        config: DispatcherConfig,
        cancel: CancellationToken,
    ) -> (DispatcherHandle, JoinHandle<u64>)
    where
        N: Notifier + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<NotificationMessage>(config.queue_capacity);
        let handle = DispatcherHandle::new(tx, config.send_delay);

        let task = tokio::spawn(async move {
            let mut delivered = 0u64;
            loop {
                let message = tokio::select! {
                    maybe = rx.recv() => match maybe {
                        Some(m) => m,
                        // All handles dropped and queue drained: run is over.
                        None => break,
                    },
                    () = cancel.cancelled() => break,
                };

                match notifier.notify(&message.text).await {
                    Ok(()) => delivered += 1,
                    // Logged and swallowed: a failed send is never retried
                    // and never stops the consumer.
                    Err(e) => tracing::warn!(error = %e, "Notification send failed"),
                }

                tokio::select! {
                    () = tokio::time::sleep(message.delay) => {}
                    () = cancel.cancelled() => break,
                }
            }
            tracing::debug!(%delivered, "Notification consumer stopped");
            delivered
        });

        (handle, task)
    }
}
