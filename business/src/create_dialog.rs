//! The Add-User dialog.
//!
//! Creation is owned here rather than by the list reducer: the dialog validates its own
//! form, asks for the create call, and on success hands control back through an
//! `on_added` callback (the list refresh).

use log::{debug, error, info};

use crate::intent::{Effect, FailureKind, Notification};
use crate::model::{UserForm, UserRecord};
use crate::service::DirectoryResult;
use crate::state::{CreateSession, Dialog, DirectoryState};
use crate::validation::{ValidationErrors, validate};

const ADD_FAILED: &str = "Failed to add user. Please try again.";

pub fn open(state: &mut DirectoryState) {
    if state.dialog != Dialog::Closed {
        debug!("Ignoring open-create while another dialog is showing");
        return;
    }
    state.dialog = Dialog::Create(CreateSession::default());
}

/// Close the dialog and discard whatever was typed.
pub fn close(state: &mut DirectoryState) {
    if matches!(state.dialog, Dialog::Create(_)) {
        state.dialog = Dialog::Closed;
    }
}

pub fn submit(state: &mut DirectoryState, form: UserForm) -> Vec<Effect> {
    let busy = state.is_loading();
    let Dialog::Create(session) = &mut state.dialog else {
        debug!("Ignoring create submit with no create dialog open");
        return Vec::new();
    };

    if busy {
        debug!("Ignoring duplicate create submit while a request is outstanding");
        return Vec::new();
    }

    let result = validate(&form);
    session.form = form;

    match result {
        Err(errors) => {
            debug!("Create form rejected: {errors}");
            session.errors = errors;
            vec![Effect::Notify(Notification::failure(
                FailureKind::ValidationFailed,
                ADD_FAILED,
            ))]
        }
        Ok(fields) => {
            session.errors = ValidationErrors::default();
            state.write_in_flight = true;
            info!("Creating user {}", fields.email);
            vec![Effect::Create { fields }]
        }
    }
}

pub fn resolve(
    state: &mut DirectoryState,
    result: DirectoryResult<UserRecord>,
    on_added: impl FnOnce(&mut DirectoryState) -> Vec<Effect>,
) -> Vec<Effect> {
    state.write_in_flight = false;

    match result {
        Ok(record) => {
            info!("Created user {}", record.id);
            close(state);
            let mut effects = vec![Effect::Notify(Notification::success(
                "User added successfully!",
            ))];
            effects.extend(on_added(state));
            effects
        }
        Err(err) => {
            error!("Failed to add user: {err}");
            vec![Effect::Notify(Notification::failure(
                FailureKind::WriteFailed,
                ADD_FAILED,
            ))]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormField, Role, UserId};
    use crate::service::DirectoryError;

    fn form() -> UserForm {
        UserForm {
            first_name: "Kamal".to_owned(),
            last_name: "Fernando".to_owned(),
            email: "kamal@example.com".to_owned(),
            nic: "921234567V".to_owned(),
            address: "7 Temple Rd".to_owned(),
            telephone: "0712345678".to_owned(),
            role: "admin".to_owned(),
        }
    }

    fn created() -> UserRecord {
        crate::validation::validate(&form())
            .unwrap()
            .with_id(UserId::new("u7"))
    }

    fn refresh_marker(_: &mut DirectoryState) -> Vec<Effect> {
        vec![Effect::List {
            generation: 99,
            query: "marker".to_owned(),
        }]
    }

    #[test]
    fn open_and_close_toggle_the_dialog() {
        let mut state = DirectoryState::new();

        open(&mut state);
        assert!(state.create_dialog_open());

        close(&mut state);
        assert!(!state.create_dialog_open());
        assert_eq!(state, DirectoryState::new());
    }

    #[test]
    fn submit_without_open_dialog_is_ignored() {
        let mut state = DirectoryState::new();

        assert!(submit(&mut state, form()).is_empty());
    }

    #[test]
    fn invalid_form_stays_open_with_errors() {
        let mut state = DirectoryState::new();
        open(&mut state);
        let mut bad = form();
        bad.email = "not-an-email".to_owned();

        let effects = submit(&mut state, bad);

        assert!(state.create_dialog_open());
        assert!(state.field_error(FormField::Email).is_some());
        assert!(!effects.iter().any(|e| matches!(e, Effect::Create { .. })));
        assert!(!state.is_loading());
    }

    #[test]
    fn valid_form_requests_create() {
        let mut state = DirectoryState::new();
        open(&mut state);

        let effects = submit(&mut state, form());

        assert_eq!(effects.len(), 1);
        let Effect::Create { fields } = &effects[0] else {
            panic!("expected create effect, got {effects:?}");
        };
        assert_eq!(fields.role, Role::Admin);
        assert!(state.is_loading());
    }

    #[test]
    fn success_closes_and_calls_back() {
        let mut state = DirectoryState::new();
        open(&mut state);
        submit(&mut state, form());

        let effects = resolve(&mut state, Ok(created()), refresh_marker);

        assert!(!state.create_dialog_open());
        assert!(!state.is_loading());
        assert!(matches!(&effects[0], Effect::Notify(n) if n.is_success()));
        assert!(effects.iter().any(Effect::is_list));
    }

    #[test]
    fn failure_keeps_dialog_and_skips_callback() {
        let mut state = DirectoryState::new();
        open(&mut state);
        submit(&mut state, form());

        let effects = resolve(
            &mut state,
            Err(DirectoryError::new("API returned status: 409")),
            refresh_marker,
        );

        assert!(state.create_dialog_open());
        assert!(!state.is_loading());
        assert_eq!(
            effects,
            vec![Effect::Notify(Notification::failure(
                FailureKind::WriteFailed,
                ADD_FAILED
            ))]
        );
    }
}
