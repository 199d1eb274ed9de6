//! Pure state transitions for the directory list.
//!
//! `reduce` handles view intents and `resolve` handles service outcomes. Both mutate the
//! state in place and return the effects the controller must run. No function here performs
//! IO, so the whole state machine is testable without a runtime.
//!
//! The service is the only source of truth for `records`: writes never touch the list
//! locally, they refetch with the committed search query once the write succeeds.

use chrono::{DateTime, Utc};
use log::{debug, error, info};

use crate::create_dialog;
use crate::intent::{Effect, FailureKind, Intent, Notification, Outcome};
use crate::model::{FormField, UserForm, UserId, UserRecord};
use crate::service::DirectoryResult;
use crate::state::{Dialog, DirectoryState, EditSession};
use crate::validation::{ValidationErrors, validate};

const UPDATE_FAILED: &str = "Failed to update user. Please try again.";
const DELETE_FAILED: &str = "Failed to delete user. Please try again.";

pub fn reduce(state: &mut DirectoryState, intent: Intent) -> Vec<Effect> {
    match intent {
        Intent::Load(query) => load(state, query),
        Intent::EditRow(record) => {
            request_edit(state, record);
            Vec::new()
        }
        Intent::EditField { field, value } => {
            edit_field(state, field, value);
            Vec::new()
        }
        Intent::CancelEdit => {
            cancel_edit(state);
            Vec::new()
        }
        Intent::SubmitEdit(form) => submit_edit(state, form),
        Intent::DeleteRow(id) => request_delete(id),
        Intent::OpenCreate => {
            create_dialog::open(state);
            Vec::new()
        }
        Intent::CloseCreate => {
            create_dialog::close(state);
            Vec::new()
        }
        Intent::SubmitCreate(form) => create_dialog::submit(state, form),
        Intent::SetSearchText(text) => {
            state.search_query = text;
            Vec::new()
        }
    }
}

pub fn resolve(state: &mut DirectoryState, outcome: Outcome, now: DateTime<Utc>) -> Vec<Effect> {
    match outcome {
        Outcome::Listed { generation, result } => resolve_list(state, generation, result, now),
        Outcome::Updated { id, result } => resolve_update(state, id, result),
        Outcome::Deleted { id, result } => resolve_delete(state, id, result),
        Outcome::Created { result } => create_dialog::resolve(state, result, refresh),
    }
}

/// Commit `query` and request the list. Supersedes any list request still outstanding.
pub fn load(state: &mut DirectoryState, query: impl Into<String>) -> Vec<Effect> {
    let query = query.into();
    let generation = state.begin_load(query.clone());
    vec![Effect::List { generation, query }]
}

/// Reload with the last committed query.
pub fn refresh(state: &mut DirectoryState) -> Vec<Effect> {
    let query = state.search_query.clone();
    load(state, query)
}

fn request_edit(state: &mut DirectoryState, record: UserRecord) {
    if state.dialog != Dialog::Closed {
        debug!("Ignoring edit of {} while another dialog is showing", record.id);
        return;
    }

    if !state.records.iter().any(|r| r.id == record.id) {
        debug!("Ignoring edit of {}: not in the current list", record.id);
        return;
    }

    state.dialog = Dialog::Edit(EditSession {
        form: UserForm::from_record(&record),
        target: record,
        errors: ValidationErrors::default(),
    });
}

fn edit_field(state: &mut DirectoryState, field: FormField, value: String) {
    let (form, errors) = match &mut state.dialog {
        Dialog::Edit(session) => (&mut session.form, &mut session.errors),
        Dialog::Create(session) => (&mut session.form, &mut session.errors),
        Dialog::Closed => {
            debug!("Ignoring input for {} with no dialog open", field.name());
            return;
        }
    };

    form.set(field, value);
    errors.clear(field);
}

fn cancel_edit(state: &mut DirectoryState) {
    if matches!(state.dialog, Dialog::Edit(_)) {
        state.dialog = Dialog::Closed;
    }
}

fn submit_edit(state: &mut DirectoryState, form: UserForm) -> Vec<Effect> {
    let busy = state.is_loading();
    let Dialog::Edit(session) = &mut state.dialog else {
        debug!("Ignoring edit submit with no edit dialog open");
        return Vec::new();
    };

    if busy {
        debug!("Ignoring duplicate edit submit while a request is outstanding");
        return Vec::new();
    }

    let result = validate(&form);
    session.form = form;

    match result {
        Err(errors) => {
            debug!("Edit form for {} rejected: {errors}", session.target.id);
            session.errors = errors;
            vec![Effect::Notify(Notification::failure(
                FailureKind::ValidationFailed,
                UPDATE_FAILED,
            ))]
        }
        Ok(fields) => {
            session.errors = ValidationErrors::default();
            session.target = session.target.merge(fields.clone());
            let id = session.target.id;
            state.write_in_flight = true;
            info!("Updating user {id}");
            vec![Effect::Update { id, fields }]
        }
    }
}

fn request_delete(id: UserId) -> Vec<Effect> {
    info!("Deleting user {id}");
    vec![Effect::Delete { id }]
}

fn resolve_list(
    state: &mut DirectoryState,
    generation: u64,
    result: DirectoryResult<Vec<UserRecord>>,
    now: DateTime<Utc>,
) -> Vec<Effect> {
    if !state.is_current_load(generation) {
        debug!("Discarding stale list response #{generation}");
        return Vec::new();
    }

    match result {
        Ok(records) => {
            debug!("Loaded {} user(s)", records.len());
            state.update_records(records, now);
            Vec::new()
        }
        Err(err) => {
            error!("Failed to fetch users: {err}");
            state.fail_load();
            vec![Effect::Notify(Notification::failure(
                FailureKind::FetchFailed,
                err.to_string(),
            ))]
        }
    }
}

fn resolve_update(
    state: &mut DirectoryState,
    id: UserId,
    result: DirectoryResult<UserRecord>,
) -> Vec<Effect> {
    state.write_in_flight = false;

    match result {
        Ok(_) => {
            info!("Updated user {id}");
            if matches!(&state.dialog, Dialog::Edit(session) if session.target.id == id) {
                state.dialog = Dialog::Closed;
            }
            let mut effects = vec![Effect::Notify(Notification::success(
                "User updated successfully!",
            ))];
            effects.extend(refresh(state));
            effects
        }
        Err(err) => {
            error!("Failed to update user {id}: {err}");
            vec![Effect::Notify(Notification::failure(
                FailureKind::WriteFailed,
                UPDATE_FAILED,
            ))]
        }
    }
}

fn resolve_delete(
    state: &mut DirectoryState,
    id: UserId,
    result: DirectoryResult<()>,
) -> Vec<Effect> {
    match result {
        Ok(()) => {
            info!("Deleted user {id}");
            let mut effects = vec![Effect::Notify(Notification::success(
                "User deleted successfully!",
            ))];
            effects.extend(refresh(state));
            effects
        }
        Err(err) => {
            error!("Failed to delete user {id}: {err}");
            vec![Effect::Notify(Notification::failure(
                FailureKind::WriteFailed,
                DELETE_FAILED,
            ))]
        }
    }
}
