//! Shared fixtures for controller integration tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use roster_business::{
    DirectoryController, DirectoryError, DirectoryResult, DirectoryService, Notification, Role,
    UserFields, UserForm, UserId, UserRecord,
};

/// A call the controller made against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Update(UserId, UserFields),
    Delete(UserId),
    Create(UserFields),
}

/// In-memory directory service that records every call.
#[derive(Debug, Default)]
pub struct MockDirectoryService {
    records: Mutex<Vec<UserRecord>>,
    calls: Mutex<Vec<Call>>,
    fail_list: AtomicBool,
    fail_writes: AtomicBool,
    next_id: AtomicU32,
    /// Lists for this filter hang until cancelled.
    stalled_filter: Mutex<Option<String>>,
}

impl MockDirectoryService {
    pub fn with_records(records: Vec<UserRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            next_id: AtomicU32::new(100),
            ..Self::default()
        }
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn stall_list(&self, filter: &str) {
        *self.stalled_filter.lock().unwrap() = Some(filter.to_owned());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List(filter) => Some(filter),
                _ => None,
            })
            .collect()
    }

    pub fn update_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Update(..)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_error(&self) -> Option<DirectoryError> {
        self.fail_writes
            .load(Ordering::SeqCst)
            .then(|| DirectoryError::new("API returned status: 500"))
    }
}

#[async_trait]
impl DirectoryService for MockDirectoryService {
    async fn list(&self, filter: &str) -> DirectoryResult<Vec<UserRecord>> {
        self.record(Call::List(filter.to_owned()));
        let stalled = self.stalled_filter.lock().unwrap().as_deref() == Some(filter);
        if stalled {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(DirectoryError::new("error sending request: connection refused"));
        }

        let needle = filter.to_lowercase();
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                needle.is_empty()
                    || r.first_name.to_lowercase().contains(&needle)
                    || r.last_name.to_lowercase().contains(&needle)
                    || r.email.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn update(&self, id: UserId, fields: &UserFields) -> DirectoryResult<UserRecord> {
        self.record(Call::Update(id, fields.clone()));
        if let Some(err) = self.write_error() {
            return Err(err);
        }

        let mut records = self.records.lock().unwrap();
        let slot = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DirectoryError::new("API returned status: 404"))?;
        *slot = slot.merge(fields.clone());
        Ok(slot.clone())
    }

    async fn delete(&self, id: UserId) -> DirectoryResult<()> {
        self.record(Call::Delete(id));
        if let Some(err) = self.write_error() {
            return Err(err);
        }

        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn create(&self, fields: &UserFields) -> DirectoryResult<UserRecord> {
        self.record(Call::Create(fields.clone()));
        if let Some(err) = self.write_error() {
            return Err(err);
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = fields.clone().with_id(UserId::new(&format!("u{n}")));
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn amal() -> UserRecord {
    UserRecord {
        id: UserId::new("u1"),
        first_name: "Amal".to_owned(),
        last_name: "Perera".to_owned(),
        email: "amal@example.com".to_owned(),
        nic: "901234567V".to_owned(),
        address: "12 Lake Rd, Colombo".to_owned(),
        telephone: "0771234567".to_owned(),
        role: Role::User,
    }
}

pub fn nimal() -> UserRecord {
    UserRecord {
        id: UserId::new("u2"),
        first_name: "Nimal".to_owned(),
        last_name: "Silva".to_owned(),
        email: "nimal@example.com".to_owned(),
        nic: "881234567V".to_owned(),
        address: "4 Hill St, Kandy".to_owned(),
        telephone: "0711111111".to_owned(),
        role: Role::Admin,
    }
}

pub fn new_user_form() -> UserForm {
    UserForm {
        first_name: "Kamal".to_owned(),
        last_name: "Fernando".to_owned(),
        email: "kamal@example.com".to_owned(),
        nic: "921234567V".to_owned(),
        address: "7 Temple Rd, Galle".to_owned(),
        telephone: "0712345678".to_owned(),
        role: "user".to_owned(),
    }
}

/// Let every outstanding call finish, failing the test if that takes too long.
pub async fn settle(controller: &mut DirectoryController) {
    tokio::time::timeout(Duration::from_secs(5), controller.settle())
        .await
        .expect("controller did not settle within 5s");
}

pub fn drain(notifications: &flume::Receiver<Notification>) -> Vec<Notification> {
    notifications.drain().collect()
}
