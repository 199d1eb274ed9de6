//! Messages flowing through the directory controller.
//!
//! - [`Intent`]: what the view asks for
//! - [`Effect`]: what the reducer asks the controller to do in response
//! - [`Outcome`]: what a service call came back with

use crate::model::{FormField, UserFields, UserForm, UserId, UserRecord};
use crate::service::DirectoryResult;

/// A user action emitted by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Commit a search and fetch the list. An empty query lists everyone.
    Load(String),
    /// Open the edit dialog for a row.
    EditRow(UserRecord),
    /// A keystroke/selection in the open dialog's form.
    EditField { field: FormField, value: String },
    CancelEdit,
    SubmitEdit(UserForm),
    DeleteRow(UserId),
    OpenCreate,
    CloseCreate,
    /// Submit the Add-User dialog.
    SubmitCreate(UserForm),
    /// Search box input. Sets the search term used by later loads; does not fetch.
    SetSearchText(String),
}

/// Why something went wrong, as surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Listing failed; the previous records are still shown.
    FetchFailed,
    /// Create, update or delete failed; the dialog stays as it was.
    WriteFailed,
    /// The form was rejected locally; nothing was sent.
    ValidationFailed,
}

/// A toast-style message for the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Failure { kind: FailureKind, message: String },
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Failure { message, .. } => message,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// A side effect requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    List { generation: u64, query: String },
    Update { id: UserId, fields: UserFields },
    Delete { id: UserId },
    Create { fields: UserFields },
    Notify(Notification),
}

impl Effect {
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List { .. })
    }
}

/// Result of a service call, fed back into the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Listed {
        generation: u64,
        result: DirectoryResult<Vec<UserRecord>>,
    },
    Updated {
        id: UserId,
        result: DirectoryResult<UserRecord>,
    },
    Deleted {
        id: UserId,
        result: DirectoryResult<()>,
    },
    Created {
        result: DirectoryResult<UserRecord>,
    },
}
