use flume::Sender;
use log::debug;
use tokio_util::sync::CancellationToken;

/// Sending half of a [`crate::StateCtx`] mailbox.
///
/// Async tasks hold an `Updater` to report their result back to the owner. Once the owning
/// context is shut down every send becomes a no-op, so late results can never mutate state
/// after teardown.
#[derive(Debug)]
pub struct Updater<M> {
    send: Sender<M>,
    shutdown: CancellationToken,
}

impl<M> Clone for Updater<M> {
    fn clone(&self) -> Self {
        Self {
            send: self.send.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<M> Updater<M> {
    pub(crate) fn new(send: Sender<M>, shutdown: CancellationToken) -> Self {
        Self { send, shutdown }
    }

    /// Queue a message for the owner.
    ///
    /// Returns `false` when the message was dropped because the context is gone.
    pub fn send(&self, message: M) -> bool {
        if self.shutdown.is_cancelled() {
            debug!("Dropping update sent after shutdown");
            return false;
        }

        self.send.send(message).is_ok()
    }
}
