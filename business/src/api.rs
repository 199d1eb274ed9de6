//! Directory service over the REST `/api/users` endpoints.
//!
//! - `GET    /api/users/?search={filter}` → `{ "users": [...] }`
//! - `PUT    /api/users/{id}`             body: full record
//! - `DELETE /api/users/{id}`
//! - `POST   /api/users/`                 body: user fields
//!
//! Every failure (transport, non-2xx status, undecodable body) becomes a [`DirectoryError`].

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::DirectoryConfig;
use crate::http::{Client, Response};
use crate::model::{ListUsersResponse, UserFields, UserId, UserRecord};
use crate::service::{DirectoryError, DirectoryResult, DirectoryService};

#[derive(Debug, Serialize)]
struct UpdateUserRequest<'a> {
    #[serde(rename = "_id")]
    id: UserId,
    #[serde(flatten)]
    fields: &'a UserFields,
}

/// Write endpoints answer with either the bare record or `{ "user": record }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserEnvelope {
    Wrapped { user: UserRecord },
    Bare(UserRecord),
}

impl UserEnvelope {
    fn into_record(self) -> UserRecord {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

fn status_error(response: &Response) -> DirectoryError {
    let detail = response
        .json::<ErrorBody>()
        .ok()
        .and_then(|body| body.message.or(body.error));

    match detail {
        Some(detail) => DirectoryError::new(format!(
            "API returned status: {} ({detail})",
            response.status
        )),
        None => DirectoryError::new(format!("API returned status: {}", response.status)),
    }
}

fn transport_error(err: impl std::fmt::Display) -> DirectoryError {
    DirectoryError::new(err.to_string())
}

#[derive(Debug, Clone)]
pub struct HttpDirectoryService {
    client: Client,
    users_url: String,
}

impl HttpDirectoryService {
    pub fn new(config: &DirectoryConfig) -> DirectoryResult<Self> {
        let client = Client::new(config.request_timeout).map_err(transport_error)?;
        Ok(Self {
            client,
            users_url: format!("{}/users", config.api_url()),
        })
    }

    fn user_url(&self, id: UserId) -> String {
        format!("{}/{id}", self.users_url)
    }
}

#[async_trait]
impl DirectoryService for HttpDirectoryService {
    async fn list(&self, filter: &str) -> DirectoryResult<Vec<UserRecord>> {
        let response = self
            .client
            .get(format!("{}/", self.users_url))
            .query("search", filter)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.is_success() {
            return Err(status_error(&response));
        }

        let body: ListUsersResponse = response.json().map_err(|e| {
            DirectoryError::new(format!("Failed to parse ListUsersResponse: {e}"))
        })?;

        debug!("Listed {} user(s) for filter {filter:?}", body.users.len());
        Ok(body.users)
    }

    async fn update(&self, id: UserId, fields: &UserFields) -> DirectoryResult<UserRecord> {
        let request = self
            .client
            .put(self.user_url(id))
            .json(&UpdateUserRequest { id, fields })
            .map_err(|e| DirectoryError::new(format!("Failed to serialize request: {e}")))?;

        let response = request.send().await.map_err(transport_error)?;

        if !response.is_success() {
            return Err(status_error(&response));
        }

        // The list is always refetched after a write, so an empty or foreign body is fine.
        match response.json::<UserEnvelope>() {
            Ok(envelope) => Ok(envelope.into_record()),
            Err(e) => {
                debug!("Update of {id} returned no readable record ({e}); using submitted fields");
                Ok(fields.clone().with_id(id))
            }
        }
    }

    async fn delete(&self, id: UserId) -> DirectoryResult<()> {
        let response = self
            .client
            .delete(self.user_url(id))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.is_success() {
            return Err(status_error(&response));
        }

        Ok(())
    }

    async fn create(&self, fields: &UserFields) -> DirectoryResult<UserRecord> {
        let request = self
            .client
            .post(format!("{}/", self.users_url))
            .json(fields)
            .map_err(|e| DirectoryError::new(format!("Failed to serialize request: {e}")))?;

        let response = request.send().await.map_err(transport_error)?;

        if !response.is_success() {
            return Err(status_error(&response));
        }

        response
            .json::<UserEnvelope>()
            .map(UserEnvelope::into_record)
            .map_err(|e| DirectoryError::new(format!("Failed to parse created user: {e}")))
    }
}
