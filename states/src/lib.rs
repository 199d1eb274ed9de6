//! Single-owner state context used by the roster business layer.
//!
//! A [`StateCtx`] owns one [`State`] value. Async work is spawned through the context and
//! reports back through an [`Updater`] mailbox; the owner drains the mailbox with
//! [`StateCtx::take_messages`] and decides how each message mutates the state. Observers
//! receive cloned snapshots via [`StateCtx::subscribe`].

mod ctx;
mod error;
mod state;
mod state_sync_status;
mod task;
mod updater;

pub use ctx::StateCtx;
pub use error::Error;
pub use state::State;
pub use state_sync_status::StateSyncStatus;
pub use task::{TaskHandle, TaskId};
pub use updater::Updater;
