use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::{Receiver, Sender};
use tokio::sync::Mutex;

/// Broadcasts a single shutdown signal to every listener created from it.
///
/// Listeners must be created with [ShutdownHandle::new_listener] before the signal is sent,
/// otherwise they will not observe it.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: Sender<()>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            sender: tokio::sync::broadcast::channel(1).0,
        }
    }

    pub fn shutdown(&self) {
        if let Err(e) = self.sender.send(()) {
            // Will fail if nobody is listening for a shutdown signal, in which case the log message
            // can be ignored.
            log::warn!("Failed to send shutdown signal: {e:?}");
        }
    }

    pub fn new_listener(&self) -> DelegatedShutdownListener {
        DelegatedShutdownListener::new(self.sender.subscribe())
    }
}

#[derive(Clone, Debug)]
pub struct DelegatedShutdownListener {
    receiver: Arc<Mutex<Receiver<()>>>,
}

impl DelegatedShutdownListener {
    pub(crate) fn new(receiver: Receiver<()>) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Wait for the shutdown signal to be received.
    ///
    /// It is safe to race this with another future so that the shutdown signal can be used to
    /// cancel other work in progress, such as the sleep between two polling cycles.
    pub async fn wait_for_shutdown(&mut self) {
        match self.receiver.lock().await.recv().await {
            Ok(()) => {}
            Err(RecvError::Lagged(_)) => {
                log::trace!("Shutdown listener lagged, treating as shutdown");
            }
            Err(RecvError::Closed) => {
                log::trace!("All shutdown handles dropped, treating as shutdown");
            }
        }
    }
}
