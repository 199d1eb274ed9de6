//! Required/format checks for the user form.
//!
//! Only the local rules live here: every field non-empty, `email` well formed, `role` one of
//! the known values. Anything stricter is the directory service's call.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::model::{FormField, UserFields, UserForm};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern is a valid regex")
});

/// Field-level messages for a rejected form, keyed in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} form field(s) are invalid", .errors.len())]
pub struct ValidationErrors {
    errors: BTreeMap<FormField, &'static str>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    /// Drop the message for one field, e.g. once the user edits it.
    pub fn clear(&mut self, field: FormField) {
        self.errors.remove(&field);
    }

    fn insert(&mut self, field: FormField, message: &'static str) {
        self.errors.entry(field).or_insert(message);
    }
}

fn required_message(field: FormField) -> &'static str {
    match field {
        FormField::FirstName => "Please enter the first name",
        FormField::LastName => "Please enter the last name",
        FormField::Email => "Please enter the email",
        FormField::Nic => "Please enter the NIC",
        FormField::Address => "Please enter the address",
        FormField::Telephone => "Please enter the telephone number",
        FormField::Role => "Please select a role",
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Check `form` and produce the persistable fields, or every failing field's message.
///
/// Values are trimmed; a whitespace-only value counts as empty.
pub fn validate(form: &UserForm) -> Result<UserFields, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    for field in FormField::ALL {
        if form.get(field).trim().is_empty() {
            errors.insert(field, required_message(field));
        }
    }

    let email = form.email.trim();
    if !email.is_empty() && !is_valid_email(email) {
        errors.insert(FormField::Email, "Please enter a valid email");
    }

    let role = form.role.parse().ok();
    if role.is_none() && !form.role.trim().is_empty() {
        errors.insert(FormField::Role, "Please select a valid role");
    }

    match role {
        Some(role) if errors.is_empty() => Ok(UserFields {
            first_name: form.first_name.trim().to_owned(),
            last_name: form.last_name.trim().to_owned(),
            email: email.to_owned(),
            nic: form.nic.trim().to_owned(),
            address: form.address.trim().to_owned(),
            telephone: form.telephone.trim().to_owned(),
            role,
        }),
        _ => Err(errors),
    }
}
