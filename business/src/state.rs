//! State owned by the directory controller.
//!
//! The view only ever sees clones of [`DirectoryState`]; every mutation goes through the
//! reducer in [`crate::reducer`].

use chrono::{DateTime, Utc};
use roster_states::State;

use crate::model::{FormField, UserForm, UserRecord};
use crate::validation::ValidationErrors;

/// An open edit dialog: the record being edited plus the form bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    /// Snapshot of the record as last returned by the service, merged with submitted values.
    pub target: UserRecord,
    pub form: UserForm,
    pub errors: ValidationErrors,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSession {
    pub form: UserForm,
    pub errors: ValidationErrors,
}

/// Which modal is showing. Dialogs are mutually exclusive, so this is a single value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Dialog {
    #[default]
    Closed,
    Edit(EditSession),
    Create(CreateSession),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryState {
    /// Records in service order, replaced wholesale by each successful fetch.
    pub(crate) records: Vec<UserRecord>,

    /// Current search term. Every list request, including refreshes after writes, uses it.
    pub(crate) search_query: String,

    pub(crate) dialog: Dialog,

    /// Generation of the newest list request still outstanding.
    pub(crate) pending_load: Option<u64>,

    /// Generation handed to the most recently issued list request.
    pub(crate) load_generation: u64,

    /// A create/update is outstanding; further submits are rejected.
    pub(crate) write_in_flight: bool,

    pub(crate) last_fetch: Option<DateTime<Utc>>,
}

impl State for DirectoryState {
    const NAME: &'static str = "directory";
}

impl DirectoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State with records already present, e.g. restored from a previous view.
    pub fn with_records(records: Vec<UserRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    /// True while a list request or a write is outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some() || self.write_in_flight
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn edit_dialog_open(&self) -> bool {
        matches!(self.dialog, Dialog::Edit(_))
    }

    pub fn create_dialog_open(&self) -> bool {
        matches!(self.dialog, Dialog::Create(_))
    }

    pub fn edit_target(&self) -> Option<&UserRecord> {
        match &self.dialog {
            Dialog::Edit(session) => Some(&session.target),
            _ => None,
        }
    }

    /// Form bound to whichever dialog is open.
    pub fn form(&self) -> Option<&UserForm> {
        match &self.dialog {
            Dialog::Edit(session) => Some(&session.form),
            Dialog::Create(session) => Some(&session.form),
            Dialog::Closed => None,
        }
    }

    /// Validation message for `field` in the open dialog.
    pub fn field_error(&self, field: FormField) -> Option<&'static str> {
        match &self.dialog {
            Dialog::Edit(session) => session.errors.get(field),
            Dialog::Create(session) => session.errors.get(field),
            Dialog::Closed => None,
        }
    }

    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    /// Start a list request for `query` and return its generation.
    pub(crate) fn begin_load(&mut self, query: String) -> u64 {
        self.search_query = query;
        self.load_generation += 1;
        self.pending_load = Some(self.load_generation);
        self.load_generation
    }

    /// Whether `generation` is the newest outstanding list request.
    pub(crate) fn is_current_load(&self, generation: u64) -> bool {
        self.pending_load == Some(generation)
    }

    /// Apply a successful fetch. Takes `now` so tests can pin the timestamp.
    pub(crate) fn update_records(&mut self, records: Vec<UserRecord>, now: DateTime<Utc>) {
        self.records = records;
        self.pending_load = None;
        self.last_fetch = Some(now);
    }

    pub(crate) fn fail_load(&mut self) {
        self.pending_load = None;
    }
}
