#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use warden_api::database::audit::{AuditError, AuditSink};
use warden_api::database::models::audit::AuditEntry;
use warden_api::database::models::user::{NewUser, User};
use warden_api::database::users::{DirectoryError, UserDirectory};
use warden_api::notify::{
    NotificationFanout, Notifier, NotifyError, PresenceBroadcaster, SupervisorChangeBroadcast,
    SupervisorChangeNotice,
};
use warden_api::roles::Role;
use warden_api::services::authorization::AuthorizationService;
use warden_api::services::reassignment::SupervisorReassignment;
use warden_api::services::users::UserAdminService;

/// In-memory user directory. Mirrors the Postgres adapter's semantics:
/// supervisor updates are all-or-nothing, role changes away from Employee
/// clear the supervisor link, soft deletes force the role to Unassigned.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: Mutex<Vec<User>>,
    /// Emails looked up via find_active_by_email, in call order.
    pub email_lookups: Mutex<Vec<String>>,
    /// When set, update_supervisor fails without mutating anything.
    pub fail_supervisor_writes: AtomicBool,
}

impl InMemoryDirectory {
    pub fn seed(&self, external_id: &str, email: &str, name: &str, role: Role) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            external_id: external_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role,
            supervisor_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn seed_deleted(&self, external_id: &str, email: &str, name: &str) -> User {
        let mut user = self.seed(external_id, email, name, Role::Unassigned);
        let now = Utc::now();
        {
            let mut users = self.users.lock().unwrap();
            let stored = users.iter_mut().find(|u| u.id == user.id).unwrap();
            stored.deleted_at = Some(now);
        }
        user.deleted_at = Some(now);
        user
    }

    pub fn set_supervisor(&self, user_id: Uuid, supervisor_id: Option<Uuid>) {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| u.id == user_id).unwrap();
        user.supervisor_id = supervisor_id;
    }

    pub fn get(&self, user_id: Uuid) -> User {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .expect("user seeded")
    }

    pub fn get_by_email(&self, email: &str) -> User {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .expect("user seeded")
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_active_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>, DirectoryError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.external_id == external_id && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, DirectoryError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.external_id == external_id).cloned())
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        self.email_lookups.lock().unwrap().push(email.to_string());
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, DirectoryError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn list_active(&self) -> Result<Vec<User>, DirectoryError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().filter(|u| u.deleted_at.is_none()).cloned().collect())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, DirectoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(DirectoryError::EmailTaken(new_user.email));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            external_id: new_user.external_id,
            email: new_user.email,
            name: new_user.name,
            role: new_user.role,
            supervisor_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<(), DirectoryError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id && u.deleted_at.is_none())
            .ok_or(DirectoryError::NotFound(user_id))?;
        user.role = role;
        if role != Role::Employee {
            user.supervisor_id = None;
        }
        user.updated_at = Utc::now();
        if role != Role::Supervisor {
            for report in users.iter_mut().filter(|u| u.supervisor_id == Some(user_id)) {
                report.supervisor_id = None;
            }
        }
        Ok(())
    }

    async fn update_supervisor(
        &self,
        user_ids: &[Uuid],
        supervisor_id: Option<Uuid>,
    ) -> Result<(), DirectoryError> {
        if self.fail_supervisor_writes.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("injected write failure".into()));
        }

        let mut users = self.users.lock().unwrap();
        let active = users
            .iter()
            .filter(|u| user_ids.contains(&u.id) && u.deleted_at.is_none())
            .count();
        if active != user_ids.len() {
            return Err(DirectoryError::PartialWrite {
                expected: user_ids.len(),
                updated: active,
            });
        }

        for user in users.iter_mut() {
            if user_ids.contains(&user.id) {
                user.supervisor_id = supervisor_id;
                user.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn soft_delete(&self, user_id: Uuid) -> Result<(), DirectoryError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id && u.deleted_at.is_none())
            .ok_or(DirectoryError::NotFound(user_id))?;
        user.role = Role::Unassigned;
        user.supervisor_id = None;
        user.deleted_at = Some(Utc::now());
        user.updated_at = Utc::now();
        for report in users.iter_mut().filter(|u| u.supervisor_id == Some(user_id)) {
            report.supervisor_id = None;
        }
        Ok(())
    }
}

/// Records direct notices; per-email failure injection.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, SupervisorChangeNotice)>>,
    pub fail_for: Mutex<HashSet<String>>,
}

impl RecordingNotifier {
    pub fn fail_delivery_to(&self, email: &str) {
        self.fail_for.lock().unwrap().insert(email.to_string());
    }

    pub fn sent_emails(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(email, _)| email.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_to_user(
        &self,
        email: &str,
        notice: &SupervisorChangeNotice,
    ) -> Result<(), NotifyError> {
        if self.fail_for.lock().unwrap().contains(email) {
            return Err(NotifyError::Transport("injected delivery failure".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), notice.clone()));
        Ok(())
    }
}

/// Records presence broadcasts; whole-channel failure injection.
#[derive(Default)]
pub struct RecordingBroadcaster {
    pub broadcasts: Mutex<Vec<SupervisorChangeBroadcast>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl PresenceBroadcaster for RecordingBroadcaster {
    async fn broadcast_supervisor_change(
        &self,
        details: &SupervisorChangeBroadcast,
    ) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Transport("injected broadcast failure".into()));
        }
        self.broadcasts.lock().unwrap().push(details.clone());
        Ok(())
    }
}

/// Records audit entries; whole-sink failure injection.
#[derive(Default)]
pub struct RecordingAuditSink {
    pub entries: Mutex<Vec<AuditEntry>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AuditError::Unavailable("injected sink failure".into()));
        }
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

/// Full service wiring over the in-memory fakes.
pub struct Harness {
    pub directory: Arc<InMemoryDirectory>,
    pub notifier: Arc<RecordingNotifier>,
    pub broadcaster: Arc<RecordingBroadcaster>,
    pub audit: Arc<RecordingAuditSink>,
    pub authorization: AuthorizationService,
    pub reassignment: SupervisorReassignment,
    pub users: UserAdminService,
}

impl Harness {
    pub fn new() -> Self {
        let directory = Arc::new(InMemoryDirectory::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let audit = Arc::new(RecordingAuditSink::default());

        let authorization = AuthorizationService::new(directory.clone());
        let fanout = NotificationFanout::new(notifier.clone(), broadcaster.clone());
        let reassignment = SupervisorReassignment::new(
            authorization.clone(),
            directory.clone(),
            fanout,
            audit.clone(),
        );
        let users = UserAdminService::new(authorization.clone(), directory.clone(), audit.clone());

        Self {
            directory,
            notifier,
            broadcaster,
            audit,
            authorization,
            reassignment,
            users,
        }
    }
}
