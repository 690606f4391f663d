use crate::{
    api::ApiClient,
    constants::{
        CONFIRM_DELETE_INCIDENT, CONFIRM_DELETE_USER, DEFAULT_NEW_INCIDENT_STATUS_ID,
        DEFAULT_NEW_USER_ROLE_ID, OPEN_STATUS_ID, RESOLVED_STATUS_ID,
    },
    error::ConsoleError,
    models::{
        DeviceType, Incident, IncidentPayload, IncidentStatus, Office, User, UserPayload, UserRole,
    },
    pagination::Pager,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

#[derive(Debug, Default, Clone)]
pub struct Caches {
    pub users: Vec<User>,
    pub incidents: Vec<Incident>,
    pub offices: Vec<Office>,
    pub roles: Vec<UserRole>,
    pub statuses: Vec<IncidentStatus>,
    pub device_types: Vec<DeviceType>,
}

impl Caches {
    pub fn role_name(&self, role_id: i64) -> String {
        self.roles
            .iter()
            .find(|role| role.role_id == role_id)
            .map(|role| role.name.clone())
            .unwrap_or_default()
    }

    pub fn status_name(&self, status_id: i64) -> String {
        self.statuses
            .iter()
            .find(|status| status.status_id == status_id)
            .map(|status| status.name.clone())
            .unwrap_or_default()
    }

    pub fn office_city(&self, office_id: i64) -> String {
        self.offices
            .iter()
            .find(|office| office.office_id == office_id)
            .map(|office| office.city.clone())
            .unwrap_or_default()
    }

    pub fn device_type_name(&self, type_id: i64) -> String {
        self.device_types
            .iter()
            .find(|device| device.type_id == type_id)
            .map(|device| device.name.clone())
            .unwrap_or_default()
    }

    pub fn user_display_name(&self, user_id: i64) -> String {
        self.users
            .iter()
            .find(|user| user.user_id == user_id)
            .map(User::display_name)
            .unwrap_or_default()
    }

    pub fn overview(&self) -> Overview {
        Overview {
            total_users: self.users.len(),
            total_incidents: self.incidents.len(),
            open_incidents: self
                .incidents
                .iter()
                .filter(|incident| incident.status_id == OPEN_STATUS_ID)
                .count(),
            resolved_incidents: self
                .incidents
                .iter()
                .filter(|incident| incident.status_id == RESOLVED_STATUS_ID)
                .count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overview {
    pub total_users: usize,
    pub total_incidents: usize,
    pub open_incidents: usize,
    pub resolved_incidents: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub applied: usize,
    pub failed: usize,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsersPage {
    pub rows: Vec<User>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FormState<D> {
    pub open: bool,
    pub editing: Option<i64>,
    pub draft: D,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role_id: i64,
    pub office_id: Option<i64>,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
            role_id: DEFAULT_NEW_USER_ROLE_ID,
            office_id: None,
        }
    }
}

impl UserDraft {
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password: String::new(),
            role_id: user.role_id,
            office_id: user.office_id,
        }
    }

    fn build_payload(&self, creating: bool) -> Result<UserPayload, ConsoleError> {
        if self.first_name.trim().is_empty() {
            return Err(ConsoleError::missing_field("first_name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ConsoleError::missing_field("last_name"));
        }
        if self.email.trim().is_empty() {
            return Err(ConsoleError::missing_field("email"));
        }
        if creating && self.password.is_empty() {
            return Err(ConsoleError::missing_field("password"));
        }
        Ok(UserPayload {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            password: if self.password.is_empty() {
                None
            } else {
                Some(self.password.clone())
            },
            role_id: self.role_id,
            office_id: self.office_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncidentDraft {
    pub description: String,
    pub status_id: i64,
    pub reporter_id: Option<i64>,
    pub office_id: Option<i64>,
    pub device_id: Option<i64>,
}

impl Default for IncidentDraft {
    fn default() -> Self {
        Self {
            description: String::new(),
            status_id: DEFAULT_NEW_INCIDENT_STATUS_ID,
            reporter_id: None,
            office_id: None,
            device_id: None,
        }
    }
}

impl IncidentDraft {
    pub fn from_incident(incident: &Incident) -> Self {
        Self {
            description: incident.description.clone(),
            status_id: incident.status_id,
            reporter_id: incident.reporter_id,
            office_id: Some(incident.office_id),
            device_id: incident.device_id,
        }
    }

    fn build_payload(&self) -> Result<IncidentPayload, ConsoleError> {
        if self.description.trim().is_empty() {
            return Err(ConsoleError::missing_field("description"));
        }
        let reporter_id = self
            .reporter_id
            .ok_or(ConsoleError::missing_field("reporter_id"))?;
        let office_id = self
            .office_id
            .ok_or(ConsoleError::missing_field("office_id"))?;
        Ok(IncidentPayload {
            description: self.description.clone(),
            status_id: self.status_id,
            reporter_id,
            office_id,
            device_id: self.device_id,
        })
    }
}

pub struct Dashboard {
    api: ApiClient,
    generation: AtomicU64,
    caches: RwLock<Caches>,
    pager: RwLock<Pager>,
    user_form: RwLock<FormState<UserDraft>>,
    incident_form: RwLock<FormState<IncidentDraft>>,
}

impl Dashboard {
    pub fn new(api: ApiClient, page_size: usize) -> Self {
        Self {
            api,
            generation: AtomicU64::new(0),
            caches: RwLock::new(Caches::default()),
            pager: RwLock::new(Pager::new(page_size)),
            user_form: RwLock::new(FormState::default()),
            incident_form: RwLock::new(FormState::default()),
        }
    }

    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Result<RefreshReport, ConsoleError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (users, incidents, offices, roles, statuses, device_types) = tokio::join!(
            self.api.list_users(),
            self.api.list_incidents(),
            self.api.list_offices(),
            self.api.list_roles(),
            self.api.list_statuses(),
            self.api.list_device_types(),
        );

        let failures = [
            self.apply_users(ticket, users).await,
            self.apply_slot(ticket, "incidents", incidents, |caches, rows| {
                caches.incidents = rows;
            })
            .await,
            self.apply_slot(ticket, "offices", offices, |caches, rows| {
                caches.offices = rows;
            })
            .await,
            self.apply_slot(ticket, "roles", roles, |caches, rows| {
                caches.roles = rows;
            })
            .await,
            self.apply_slot(ticket, "statuses", statuses, |caches, rows| {
                caches.statuses = rows;
            })
            .await,
            self.apply_slot(ticket, "device_types", device_types, |caches, rows| {
                caches.device_types = rows;
            })
            .await,
        ];

        let mut report = RefreshReport::default();
        let mut credential_rejected = false;
        for failure in failures {
            match failure {
                None => report.applied += 1,
                Some(err) => {
                    credential_rejected |= err.is_auth();
                    report.failed += 1;
                }
            }
        }
        if credential_rejected {
            return Err(ConsoleError::Auth);
        }
        debug!(applied = report.applied, failed = report.failed, "refresh finished");
        Ok(report)
    }

    pub async fn caches(&self) -> Caches {
        self.caches.read().await.clone()
    }

    pub async fn overview(&self) -> Overview {
        self.caches.read().await.overview()
    }

    pub async fn users_page(&self) -> UsersPage {
        let caches = self.caches.read().await;
        let pager = self.pager.read().await;
        UsersPage {
            rows: pager.slice(&caches.users).to_vec(),
            page: pager.current_page(),
            total_pages: pager.total_pages(caches.users.len()),
            total: caches.users.len(),
        }
    }

    pub async fn next_page(&self) {
        let count = self.caches.read().await.users.len();
        self.pager.write().await.next(count);
    }

    pub async fn previous_page(&self) {
        self.pager.write().await.previous();
    }

    pub async fn go_to_page(&self, page: usize) {
        let count = self.caches.read().await.users.len();
        self.pager.write().await.go_to(page, count);
    }

    pub async fn user_form(&self) -> FormState<UserDraft> {
        self.user_form.read().await.clone()
    }

    pub async fn open_user_create(&self) {
        let mut form = self.user_form.write().await;
        *form = FormState {
            open: true,
            editing: None,
            draft: UserDraft::default(),
        };
    }

    pub async fn open_user_edit(&self, user_id: i64) -> Result<(), ConsoleError> {
        let draft = {
            let caches = self.caches.read().await;
            let user = caches
                .users
                .iter()
                .find(|user| user.user_id == user_id)
                .ok_or(ConsoleError::UnknownRecord {
                    kind: "user",
                    id: user_id,
                })?;
            UserDraft::from_user(user)
        };
        let mut form = self.user_form.write().await;
        *form = FormState {
            open: true,
            editing: Some(user_id),
            draft,
        };
        Ok(())
    }

    pub async fn edit_user_draft<F>(&self, apply: F)
    where
        F: FnOnce(&mut UserDraft),
    {
        apply(&mut self.user_form.write().await.draft);
    }

    pub async fn cancel_user_form(&self) {
        *self.user_form.write().await = FormState::default();
    }

    #[instrument(skip(self))]
    pub async fn submit_user_form(&self) -> Result<(), ConsoleError> {
        let (editing, payload) = {
            let form = self.user_form.read().await;
            let payload = form.draft.build_payload(form.editing.is_none())?;
            (form.editing, payload)
        };
        match editing {
            Some(user_id) => self.api.update_user(user_id, &payload).await?,
            None => self.api.create_user(&payload).await?,
        }
        *self.user_form.write().await = FormState::default();
        if editing.is_none() {
            self.pager.write().await.reset();
        }
        self.load_all().await?;
        Ok(())
    }

    #[instrument(skip(self, prompt))]
    pub async fn delete_user(
        &self,
        user_id: i64,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<(), ConsoleError> {
        if !prompt.confirm(CONFIRM_DELETE_USER).await {
            debug!(user_id, "delete aborted at prompt");
            return Err(ConsoleError::ConfirmationDeclined);
        }
        self.api.delete_user(user_id).await?;
        // Page clamping happens when the reload replaces the user cache.
        self.load_all().await?;
        Ok(())
    }

    pub async fn incident_form(&self) -> FormState<IncidentDraft> {
        self.incident_form.read().await.clone()
    }

    pub async fn open_incident_create(&self) {
        let mut form = self.incident_form.write().await;
        *form = FormState {
            open: true,
            editing: None,
            draft: IncidentDraft::default(),
        };
    }

    pub async fn open_incident_edit(&self, incident_id: i64) -> Result<(), ConsoleError> {
        let draft = {
            let caches = self.caches.read().await;
            let incident = caches
                .incidents
                .iter()
                .find(|incident| incident.incident_id == incident_id)
                .ok_or(ConsoleError::UnknownRecord {
                    kind: "incident",
                    id: incident_id,
                })?;
            IncidentDraft::from_incident(incident)
        };
        let mut form = self.incident_form.write().await;
        *form = FormState {
            open: true,
            editing: Some(incident_id),
            draft,
        };
        Ok(())
    }

    pub async fn edit_incident_draft<F>(&self, apply: F)
    where
        F: FnOnce(&mut IncidentDraft),
    {
        apply(&mut self.incident_form.write().await.draft);
    }

    pub async fn cancel_incident_form(&self) {
        *self.incident_form.write().await = FormState::default();
    }

    #[instrument(skip(self))]
    pub async fn submit_incident_form(&self) -> Result<(), ConsoleError> {
        let (editing, payload) = {
            let form = self.incident_form.read().await;
            let payload = form.draft.build_payload()?;
            (form.editing, payload)
        };
        match editing {
            Some(incident_id) => self.api.update_incident(incident_id, &payload).await?,
            None => self.api.create_incident(&payload).await?,
        }
        *self.incident_form.write().await = FormState::default();
        self.load_all().await?;
        Ok(())
    }

    #[instrument(skip(self, prompt))]
    pub async fn delete_incident(
        &self,
        incident_id: i64,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<(), ConsoleError> {
        if !prompt.confirm(CONFIRM_DELETE_INCIDENT).await {
            debug!(incident_id, "delete aborted at prompt");
            return Err(ConsoleError::ConfirmationDeclined);
        }
        self.api.delete_incident(incident_id).await?;
        self.load_all().await?;
        Ok(())
    }

    async fn apply_users(
        &self,
        ticket: u64,
        outcome: Result<Vec<User>, ConsoleError>,
    ) -> Option<ConsoleError> {
        match outcome {
            Ok(rows) => {
                let count = rows.len();
                {
                    let mut caches = self.caches.write().await;
                    if self.generation.load(Ordering::SeqCst) != ticket {
                        debug!(slot = "users", ticket, "discarding stale refresh");
                        return None;
                    }
                    caches.users = rows;
                }
                self.pager.write().await.sync_len(count);
                debug!(slot = "users", rows = count, "cache refreshed");
                None
            }
            Err(err) => {
                warn!(slot = "users", error = %err, "refresh failed; keeping previous rows");
                Some(err)
            }
        }
    }

    async fn apply_slot<T, F>(
        &self,
        ticket: u64,
        slot: &'static str,
        outcome: Result<Vec<T>, ConsoleError>,
        apply: F,
    ) -> Option<ConsoleError>
    where
        F: FnOnce(&mut Caches, Vec<T>),
    {
        match outcome {
            Ok(rows) => {
                let mut caches = self.caches.write().await;
                if self.generation.load(Ordering::SeqCst) != ticket {
                    debug!(slot, ticket, "discarding stale refresh");
                    return None;
                }
                debug!(slot, rows = rows.len(), "cache refreshed");
                apply(&mut caches, rows);
                None
            }
            Err(err) => {
                warn!(slot, error = %err, "refresh failed; keeping previous rows");
                Some(err)
            }
        }
    }
}
