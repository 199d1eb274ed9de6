//! User-directory business layer.
//!
//! Keeps a local list of directory users in step with the remote directory service:
//! the view sends [`Intent`]s to a [`DirectoryController`], the controller runs them through
//! the pure [`reducer`], executes the resulting service calls and publishes
//! [`DirectoryState`] snapshots and [`Notification`]s back to the view.

pub mod api;
pub mod config;
pub mod controller;
pub mod create_dialog;
pub mod http;
pub mod intent;
pub mod model;
pub mod reducer;
pub mod service;
pub mod state;
pub mod validation;

pub use api::HttpDirectoryService;
pub use config::DirectoryConfig;
pub use controller::{DirectoryController, NOTIFICATION_CAPACITY};
pub use intent::{Effect, FailureKind, Intent, Notification, Outcome};
pub use model::{FormField, ListUsersResponse, Role, UserFields, UserForm, UserId, UserRecord};
pub use service::{DirectoryError, DirectoryResult, DirectoryService};
pub use state::{CreateSession, Dialog, DirectoryState, EditSession};
pub use validation::{ValidationErrors, validate};
