//! Wire and form types for directory users.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ustr::Ustr;

/// Service-assigned identity of a user record.
///
/// Ids are cloned into every effect and outcome, so they are interned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Ustr);

impl UserId {
    pub fn new(id: &str) -> Self {
        Self(Ustr::from(id))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}

/// A user as returned by the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub nic: String,
    pub address: String,
    pub telephone: String,
    pub role: Role,
}

impl UserRecord {
    pub fn fields(&self) -> UserFields {
        UserFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            nic: self.nic.clone(),
            address: self.address.clone(),
            telephone: self.telephone.clone(),
            role: self.role,
        }
    }

    /// Overlay validated form values onto this record, keeping its identity.
    pub fn merge(&self, fields: UserFields) -> Self {
        let UserFields {
            first_name,
            last_name,
            email,
            nic,
            address,
            telephone,
            role,
        } = fields;

        Self {
            id: self.id,
            first_name,
            last_name,
            email,
            nic,
            address,
            telephone,
            role,
        }
    }
}

/// Validated, persistable user fields (everything except the identity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub nic: String,
    pub address: String,
    pub telephone: String,
    pub role: Role,
}

impl UserFields {
    pub fn with_id(self, id: UserId) -> UserRecord {
        let UserFields {
            first_name,
            last_name,
            email,
            nic,
            address,
            telephone,
            role,
        } = self;

        UserRecord {
            id,
            first_name,
            last_name,
            email,
            nic,
            address,
            telephone,
            role,
        }
    }
}

/// One input of the user form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Nic,
    Address,
    Telephone,
    Role,
}

impl FormField {
    pub const ALL: [Self; 7] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Nic,
        Self::Address,
        Self::Telephone,
        Self::Role,
    ];

    /// Wire name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Nic => "nic",
            Self::Address => "address",
            Self::Telephone => "telephone",
            Self::Role => "role",
        }
    }

}

/// Raw values bound to a create or edit dialog, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub nic: String,
    pub address: String,
    pub telephone: String,
    pub role: String,
}

impl UserForm {
    /// Form pre-filled with a record's current values.
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            nic: record.nic.clone(),
            address: record.address.clone(),
            telephone: record.telephone.clone(),
            role: record.role.as_str().to_owned(),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Email => &self.email,
            FormField::Nic => &self.nic,
            FormField::Address => &self.address,
            FormField::Telephone => &self.telephone,
            FormField::Role => &self.role,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::Email => &mut self.email,
            FormField::Nic => &mut self.nic,
            FormField::Address => &mut self.address,
            FormField::Telephone => &mut self.telephone,
            FormField::Role => &mut self.role,
        };
        *slot = value.into();
    }
}

/// Response body of `GET /api/users/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserRecord>,
}
