use crate::bus::Event;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

/// Ergonomic receiving for bus subscribers.
///
/// A lagging subscriber skips ahead to the oldest retained event instead of
/// surfacing [`RecvError::Lagged`]; a closed channel yields `None`.
pub trait EventReceiverExt<T> {
    /// Waits for the next event, returning `None` once the channel is closed.
    fn recv_event(&mut self) -> impl Future<Output = Option<Arc<T>>> + Send;

    /// Returns the next buffered event without waiting.
    fn try_recv_event(&mut self) -> Option<Arc<T>>;
}

impl<T: Event> EventReceiverExt<T> for broadcast::Receiver<Arc<T>> {
    async fn recv_event(&mut self) -> Option<Arc<T>> {
        let mut skipped = 0u64;

        loop {
            match self.recv().await {
                Ok(event) => {
                    if skipped > 0 {
                        warn!(
                            event = std::any::type_name::<T>(),
                            skipped, "Event receiver lagged; continuing from oldest retained event"
                        );
                    }
                    return Some(event);
                },
                Err(RecvError::Lagged(n)) => {
                    skipped = skipped.saturating_add(n);
                    debug!(event = std::any::type_name::<T>(), skipped = n, "Event receiver lagged");
                },
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn try_recv_event(&mut self) -> Option<Arc<T>> {
        loop {
            match self.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(_)) => {},
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
