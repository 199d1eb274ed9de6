//! The directory controller: owns [`DirectoryState`], runs reducer effects against a
//! [`DirectoryService`] and pushes snapshots and notifications to the view.
//!
//! Typical wiring for a view:
//!
//! ```ignore
//! let controller = DirectoryController::from_config(&DirectoryConfig::from_env()?)?;
//! let (intents, inbox) = flume::unbounded();
//! let snapshots = controller.subscribe();
//! let toasts = controller.notifications();
//! tokio::spawn(controller.run(inbox));
//! intents.send(Intent::Load("amal".into()))?;
//! ```
//!
//! Tests drive it by hand instead: `dispatch` an intent, then `settle().await` to let every
//! spawned call (and any refresh it triggers) finish.

use std::sync::Arc;

use chrono::Utc;
use flume::{Receiver, Sender, TrySendError};
use log::{debug, error, info, warn};
use roster_states::{StateCtx, TaskHandle};

use crate::api::HttpDirectoryService;
use crate::config::DirectoryConfig;
use crate::intent::{Effect, Intent, Notification, Outcome};
use crate::reducer;
use crate::service::{DirectoryResult, DirectoryService};
use crate::state::DirectoryState;

/// Notifications kept for a view that is not draining them; newer ones are dropped.
pub const NOTIFICATION_CAPACITY: usize = 64;

pub struct DirectoryController {
    ctx: StateCtx<DirectoryState, Outcome>,
    service: Arc<dyn DirectoryService>,
    /// The list call for the newest Load; cancelled when a newer Load supersedes it.
    list_task: Option<TaskHandle>,
    notify_tx: Sender<Notification>,
    notify_rx: Receiver<Notification>,
}

impl std::fmt::Debug for DirectoryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryController")
            .field("state", self.ctx.state())
            .field("pending_tasks", &self.ctx.task_count())
            .field("queued_notifications", &self.notify_rx.len())
            .finish()
    }
}

enum Event {
    Intent(Option<Intent>),
    Joined,
}

impl DirectoryController {
    pub fn new(service: Arc<dyn DirectoryService>) -> Self {
        Self::with_state(service, DirectoryState::new())
    }

    pub fn with_state(service: Arc<dyn DirectoryService>, state: DirectoryState) -> Self {
        let (notify_tx, notify_rx) = flume::bounded(NOTIFICATION_CAPACITY);
        Self {
            ctx: StateCtx::new(state),
            service,
            list_task: None,
            notify_tx,
            notify_rx,
        }
    }

    /// Controller talking to the REST directory service described by `config`.
    pub fn from_config(config: &DirectoryConfig) -> DirectoryResult<Self> {
        let service = HttpDirectoryService::new(config)?;
        info!("Directory controller using {}", config.api_url());
        Ok(Self::new(Arc::new(service)))
    }

    pub fn state(&self) -> &DirectoryState {
        self.ctx.state()
    }

    /// Snapshots of the state, starting with the current one.
    pub fn subscribe(&mut self) -> Receiver<DirectoryState> {
        self.ctx.subscribe()
    }

    /// Success and failure messages for the view to show.
    ///
    /// At most [`NOTIFICATION_CAPACITY`] undrained messages are kept.
    pub fn notifications(&self) -> Receiver<Notification> {
        self.notify_rx.clone()
    }

    /// Number of service calls not yet joined.
    pub fn pending_tasks(&self) -> usize {
        self.ctx.task_count()
    }

    /// Initial fetch of the unfiltered list, as done when the view mounts.
    pub fn start(&mut self) {
        self.dispatch(Intent::Load(String::new()));
    }

    /// Apply a view intent. Must be called inside a tokio runtime.
    pub fn dispatch(&mut self, intent: Intent) {
        if self.ctx.is_shut_down() {
            debug!("Ignoring {intent:?} after shutdown");
            return;
        }

        let effects = self.ctx.update(|state| reducer::reduce(state, intent));
        self.run_effects(effects);
        self.ctx.publish();
    }

    /// Apply every outcome reported so far. Returns how many were applied.
    pub fn sync(&mut self) -> usize {
        let outcomes = self.ctx.take_messages();
        let applied = outcomes.len();

        for outcome in outcomes {
            let effects = self
                .ctx
                .update(|state| reducer::resolve(state, outcome, Utc::now()));
            self.run_effects(effects);
        }

        self.ctx.publish();
        applied
    }

    /// Wait until no service call is outstanding, applying outcomes as they land.
    ///
    /// Refreshes triggered by a write are waited for too.
    pub async fn settle(&mut self) {
        self.sync();
        while self.ctx.task_count() > 0 {
            if self.ctx.join_next().await.is_some() {
                self.sync();
            }
        }
        self.sync();
    }

    /// Event loop for a live view. Runs until the intent sender is dropped, then shuts down.
    pub async fn run(mut self, intents: Receiver<Intent>) {
        self.start();

        loop {
            let busy = self.ctx.task_count() > 0;
            let event = tokio::select! {
                intent = intents.recv_async() => Event::Intent(intent.ok()),
                _ = self.ctx.join_next(), if busy => Event::Joined,
            };

            match event {
                Event::Intent(Some(intent)) => self.dispatch(intent),
                Event::Intent(None) => break,
                Event::Joined => {
                    self.sync();
                }
            }
        }

        self.shutdown().await;
    }

    /// Tear down: outstanding calls are cancelled and their results never applied.
    pub async fn shutdown(&mut self) {
        self.ctx.shutdown().await;
        info!("Directory controller shut down");
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Notify(notification) => self.notify(notification),
                Effect::List { generation, query } => {
                    if let Some(previous) = self.list_task.take() {
                        let id = previous.id();
                        debug!("Cancelling superseded {} call #{}", id.kind(), id.generation());
                        previous.cancel();
                    }

                    let service = Arc::clone(&self.service);
                    self.list_task = self.spawn("list", async move {
                        let result = service.list(&query).await;
                        Outcome::Listed { generation, result }
                    });
                }
                Effect::Update { id, fields } => {
                    let service = Arc::clone(&self.service);
                    self.spawn("update", async move {
                        let result = service.update(id, &fields).await;
                        Outcome::Updated { id, result }
                    });
                }
                Effect::Delete { id } => {
                    let service = Arc::clone(&self.service);
                    self.spawn("delete", async move {
                        let result = service.delete(id).await;
                        Outcome::Deleted { id, result }
                    });
                }
                Effect::Create { fields } => {
                    let service = Arc::clone(&self.service);
                    self.spawn("create", async move {
                        let result = service.create(&fields).await;
                        Outcome::Created { result }
                    });
                }
            }
        }
    }

    fn spawn(
        &mut self,
        kind: &'static str,
        work: impl Future<Output = Outcome> + Send + 'static,
    ) -> Option<TaskHandle> {
        self.ctx
            .spawn(kind, work)
            .inspect_err(|err| warn!("Dropped {kind} call: {err}"))
            .ok()
    }

    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::Success(message) => info!("{message}"),
            Notification::Failure { kind, message } => error!("{kind:?}: {message}"),
        }
        if let Err(TrySendError::Full(dropped)) = self.notify_tx.try_send(notification) {
            warn!("Notification queue full, dropping {dropped:?}");
        }
    }
}
