use std::future::Future;

use flume::{Receiver, Sender};
use log::{debug, error};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::{Error, State, StateSyncStatus, TaskHandle, TaskId, Updater};

/// Owner of a single [`State`] value plus the async work feeding it.
///
/// `M` is the message type spawned tasks report back with. Only the owner mutates the
/// state; tasks never touch it directly; they send an `M` through the mailbox and the owner
/// applies it after calling [`StateCtx::take_messages`].
///
/// Spawning requires a running tokio runtime.
#[derive(Debug)]
pub struct StateCtx<S: State, M: Send + 'static> {
    state: S,
    status: StateSyncStatus,

    send: Sender<M>,
    recv: Receiver<M>,

    subscribers: Vec<Sender<S>>,

    tasks: JoinSet<()>,
    shutdown: CancellationToken,
    generation: u64,
}

impl<S: State, M: Send + 'static> StateCtx<S, M> {
    pub fn new(state: S) -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            state,
            status: StateSyncStatus::Init,
            send,
            recv,
            subscribers: Vec::new(),
            tasks: JoinSet::new(),
            shutdown: CancellationToken::new(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn status(&self) -> StateSyncStatus {
        self.status
    }

    /// Mutate the owned state and mark it dirty for the next [`StateCtx::publish`].
    pub fn update<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> R {
        self.status = StateSyncStatus::Dirty;
        f(&mut self.state)
    }

    pub fn updater(&self) -> Updater<M> {
        Updater::new(self.send.clone(), self.shutdown.clone())
    }

    /// Spawn `work` and route its output back into the mailbox.
    ///
    /// The task is raced against its own cancellation token (a child of the context's
    /// shutdown token); a cancelled task reports nothing.
    pub fn spawn<F>(&mut self, kind: &'static str, work: F) -> Result<TaskHandle, Error>
    where
        F: Future<Output = M> + Send + 'static,
    {
        if self.is_shut_down() {
            return Err(Error::shut_down(S::NAME, format!("spawn {kind}")));
        }

        self.generation += 1;
        let id = TaskId::new(kind, self.generation);
        let handle = TaskHandle::new(id, self.shutdown.child_token());

        let token = handle.cancellation_token();
        let updater = self.updater();
        self.tasks.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Task {id} cancelled before completion");
                }
                message = work => {
                    if !updater.send(message) {
                        debug!("Task {id} finished after its context closed");
                    }
                }
            }
        });

        debug!("Spawned task {id} for {}", S::NAME);
        Ok(handle)
    }

    /// Drain every message queued by finished tasks.
    ///
    /// After shutdown the mailbox is emptied and nothing is returned.
    pub fn take_messages(&mut self) -> Vec<M> {
        if self.is_shut_down() {
            let dropped = self.recv.drain().count();
            if dropped > 0 {
                debug!("Discarded {dropped} message(s) for {} after shutdown", S::NAME);
            }
            return Vec::new();
        }

        self.recv.try_iter().collect()
    }

    /// Register an observer. The current state is delivered immediately.
    pub fn subscribe(&mut self) -> Receiver<S> {
        let (tx, rx) = flume::unbounded();
        if tx.send(self.state.clone()).is_ok() {
            self.subscribers.push(tx);
        }
        rx
    }

    /// Send the state to every live subscriber if it changed since the last publish.
    ///
    /// Returns `true` when a snapshot went out.
    pub fn publish(&mut self) -> bool {
        if self.status == StateSyncStatus::Clean || self.is_shut_down() {
            return false;
        }

        let snapshot = &self.state;
        self.subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
        self.status = StateSyncStatus::Clean;
        true
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Number of spawned tasks not yet joined.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for the next spawned task to finish. Returns `None` when none are outstanding.
    pub async fn join_next(&mut self) -> Option<()> {
        let joined = self.tasks.join_next().await?;
        if let Err(err) = joined {
            if err.is_panic() {
                error!("Task for {} panicked: {err}", S::NAME);
            } else {
                debug!("Task for {} ended without output: {err}", S::NAME);
            }
        }
        Some(())
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Tear the context down: cancel every task, wait for them to stop, drop queued
    /// messages and detach subscribers. Later sends through any [`Updater`] are no-ops.
    pub async fn shutdown(&mut self) {
        if self.is_shut_down() {
            return;
        }

        self.shutdown.cancel();
        self.tasks.shutdown().await;
        let _dropped = self.take_messages();
        self.subscribers.clear();
        debug!("State context for {} shut down", S::NAME);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct Counter {
        value: i32,
    }

    impl State for Counter {
        const NAME: &'static str = "counter";
    }

    fn ctx() -> StateCtx<Counter, i32> {
        StateCtx::new(Counter::default())
    }

    async fn settle(ctx: &mut StateCtx<Counter, i32>) {
        while ctx.task_count() > 0 {
            ctx.join_next().await;
        }
        for delta in ctx.take_messages() {
            ctx.update(|s| s.value += delta);
        }
    }

    #[test]
    fn update_marks_dirty() {
        let mut ctx = ctx();
        assert_eq!(ctx.status(), StateSyncStatus::Init);

        ctx.update(|s| s.value = 3);

        assert_eq!(ctx.state().value, 3);
        assert_eq!(ctx.status(), StateSyncStatus::Dirty);
    }

    #[test]
    fn subscribe_receives_current_state_then_changes() {
        let mut ctx = ctx();
        let rx = ctx.subscribe();
        assert_eq!(rx.try_recv().ok(), Some(Counter { value: 0 }));

        ctx.update(|s| s.value = 5);
        assert!(ctx.publish());
        assert_eq!(rx.try_recv().ok(), Some(Counter { value: 5 }));

        // Nothing changed, nothing sent.
        assert!(!ctx.publish());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut ctx = ctx();
        let rx = ctx.subscribe();
        drop(rx);

        ctx.update(|s| s.value = 1);
        ctx.publish();

        assert_eq!(ctx.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn spawned_results_arrive_through_mailbox() {
        let mut ctx = ctx();
        let first = ctx.spawn("add", async { 2 }).unwrap();
        let second = ctx.spawn("add", async { 3 }).unwrap();

        assert!(second.id().generation() > first.id().generation());

        settle(&mut ctx).await;

        assert_eq!(ctx.state().value, 5);
        assert_eq!(ctx.task_count(), 0);
    }

    #[tokio::test]
    async fn cancelled_task_reports_nothing() {
        let mut ctx = ctx();
        let handle = ctx
            .spawn("slow", async {
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                100
            })
            .unwrap();

        handle.cancel();
        settle(&mut ctx).await;

        assert_eq!(ctx.state().value, 0);
    }

    #[tokio::test]
    async fn shutdown_discards_late_updates() {
        let mut ctx = ctx();
        let updater = ctx.updater();
        let rx = ctx.subscribe();
        let _ = rx.try_recv();

        ctx.shutdown().await;

        assert!(!updater.send(9));
        assert!(ctx.take_messages().is_empty());
        assert!(ctx.spawn("late", async { 1 }).is_err());

        ctx.update(|s| s.value = 1);
        assert!(!ctx.publish());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn shutdown_drops_messages_already_queued() {
        let mut ctx = ctx();
        ctx.updater().send(4);

        ctx.shutdown().await;

        assert!(ctx.take_messages().is_empty());
    }
}
