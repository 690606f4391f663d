use crate::{
    constants::{
        DEVICE_TYPES_PATH, INCIDENT_STATUSES_PATH, INCIDENTS_PATH, LOGIN_PATH, ME_PATH,
        OFFICES_PATH, USER_ROLES_PATH, USERS_PATH,
    },
    error::ConsoleError,
    models::{
        DeviceType, Identity, Incident, IncidentPayload, IncidentStatus, LoginResponse, Office,
        User, UserPayload, UserRole,
    },
    session::SessionStore,
};
use reqwest::{Client, Response, StatusCode, redirect::Policy};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, instrument, warn};

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout_ms: u64,
        session: Arc<SessionStore>,
    ) -> Result<Self, ConsoleError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConsoleError::config("api base url is required"));
        }

        let timeout = Duration::from_millis(timeout_ms.max(250));
        let connect_timeout = timeout.min(Duration::from_secs(3));
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(15))
            .pool_max_idle_per_host(2)
            .tcp_keepalive(Duration::from_secs(30))
            .http1_only()
            .redirect(Policy::limited(3))
            .build()
            .map_err(|err| ConsoleError::transport(err.to_string()))?;

        debug!(base_url, timeout_ms, "initialized api client");
        Ok(Self {
            base_url,
            client,
            session,
        })
    }

    pub fn session(&self) -> Arc<SessionStore> {
        Arc::clone(&self.session)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ConsoleError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        let response = self
            .client
            .post(url)
            .json(&json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, "login request failed");
                ConsoleError::Transport(err.to_string())
            })?;

        // 401 here is a bad password, not a rejected session; any stored credential stays.
        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "login rejected");
            return Err(ConsoleError::Auth);
        }

        let body = response.json::<LoginResponse>().await.map_err(|err| {
            error!(error = %err, "login response was not valid JSON");
            ConsoleError::Transport(err.to_string())
        })?;
        self.session.store(body.access_token).await?;
        debug!("login succeeded");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<Identity, ConsoleError> {
        let response = self.get_authed(ME_PATH).await?;
        let response = ensure_success(ME_PATH, response)?;
        response.json::<Identity>().await.map_err(|err| {
            error!(error = %err, "identity response was not valid JSON");
            ConsoleError::Transport(err.to_string())
        })
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ConsoleError> {
        self.fetch_collection(USERS_PATH).await
    }

    pub async fn list_incidents(&self) -> Result<Vec<Incident>, ConsoleError> {
        self.fetch_collection(INCIDENTS_PATH).await
    }

    pub async fn list_offices(&self) -> Result<Vec<Office>, ConsoleError> {
        self.fetch_collection(OFFICES_PATH).await
    }

    pub async fn list_roles(&self) -> Result<Vec<UserRole>, ConsoleError> {
        self.fetch_collection(USER_ROLES_PATH).await
    }

    pub async fn list_statuses(&self) -> Result<Vec<IncidentStatus>, ConsoleError> {
        self.fetch_collection(INCIDENT_STATUSES_PATH).await
    }

    pub async fn list_device_types(&self) -> Result<Vec<DeviceType>, ConsoleError> {
        self.fetch_collection(DEVICE_TYPES_PATH).await
    }

    #[instrument(skip(self, payload))]
    pub async fn create_user(&self, payload: &UserPayload) -> Result<(), ConsoleError> {
        self.post_json(USERS_PATH, payload).await
    }

    #[instrument(skip(self, payload))]
    pub async fn update_user(
        &self,
        user_id: i64,
        payload: &UserPayload,
    ) -> Result<(), ConsoleError> {
        self.put_json(&format!("{USERS_PATH}{user_id}"), payload).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: i64) -> Result<(), ConsoleError> {
        self.delete_authed(&format!("{USERS_PATH}{user_id}")).await
    }

    #[instrument(skip(self, payload))]
    pub async fn create_incident(&self, payload: &IncidentPayload) -> Result<(), ConsoleError> {
        self.post_json(INCIDENTS_PATH, payload).await
    }

    #[instrument(skip(self, payload))]
    pub async fn update_incident(
        &self,
        incident_id: i64,
        payload: &IncidentPayload,
    ) -> Result<(), ConsoleError> {
        self.put_json(&format!("{INCIDENTS_PATH}{incident_id}"), payload)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_incident(&self, incident_id: i64) -> Result<(), ConsoleError> {
        self.delete_authed(&format!("{INCIDENTS_PATH}{incident_id}"))
            .await
    }

    async fn fetch_collection<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, ConsoleError> {
        let response = self.get_authed(path).await?;
        let response = ensure_success(path, response)?;
        response.json::<Vec<T>>().await.map_err(|err| {
            error!(path, error = %err, "collection payload was not valid JSON");
            ConsoleError::Transport(err.to_string())
        })
    }

    async fn get_authed(&self, path: &str) -> Result<Response, ConsoleError> {
        let token = self.bearer_token().await?;
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|err| {
                error!(path, error = %err, "request failed");
                ConsoleError::Transport(err.to_string())
            })?;
        self.screen_credential_rejection(path, response).await
    }

    async fn post_json<T: Serialize>(&self, path: &str, payload: &T) -> Result<(), ConsoleError> {
        let token = self.bearer_token().await?;
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .json(payload)
            .send()
            .await
            .map_err(|err| {
                error!(path, error = %err, "request failed");
                ConsoleError::Transport(err.to_string())
            })?;
        let response = self.screen_credential_rejection(path, response).await?;
        reject_failure(path, response).await
    }

    async fn put_json<T: Serialize>(&self, path: &str, payload: &T) -> Result<(), ConsoleError> {
        let token = self.bearer_token().await?;
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .put(url)
            .bearer_auth(&token)
            .json(payload)
            .send()
            .await
            .map_err(|err| {
                error!(path, error = %err, "request failed");
                ConsoleError::Transport(err.to_string())
            })?;
        let response = self.screen_credential_rejection(path, response).await?;
        reject_failure(path, response).await
    }

    async fn delete_authed(&self, path: &str) -> Result<(), ConsoleError> {
        let token = self.bearer_token().await?;
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .delete(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|err| {
                error!(path, error = %err, "request failed");
                ConsoleError::Transport(err.to_string())
            })?;
        let response = self.screen_credential_rejection(path, response).await?;
        reject_failure(path, response).await
    }

    async fn bearer_token(&self) -> Result<String, ConsoleError> {
        self.session.token().await.ok_or(ConsoleError::Auth)
    }

    async fn screen_credential_rejection(
        &self,
        path: &str,
        response: Response,
    ) -> Result<Response, ConsoleError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(
                path,
                status = status.as_u16(),
                "credential rejected; destroying session"
            );
            if let Err(err) = self.session.clear().await {
                warn!(error = %err, "failed to remove rejected session");
            }
            return Err(ConsoleError::Auth);
        }
        Ok(response)
    }
}

fn ensure_success(path: &str, response: Response) -> Result<Response, ConsoleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    warn!(path, status = status.as_u16(), "unexpected response status");
    Err(ConsoleError::transport(format!(
        "unexpected status {} from {path}",
        status.as_u16()
    )))
}

async fn reject_failure(path: &str, response: Response) -> Result<(), ConsoleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let message = extract_error_message(response)
        .await
        .unwrap_or_else(|| format!("unexpected status {} from {path}", status.as_u16()));
    warn!(path, status = status.as_u16(), detail = %message, "mutation rejected");
    Err(ConsoleError::Transport(message))
}

async fn extract_error_message(response: Response) -> Option<String> {
    let parsed = response.json::<Value>().await.ok()?;
    parsed
        .get("detail")
        .and_then(Value::as_str)
        .or_else(|| parsed.get("error").and_then(Value::as_str))
        .or_else(|| parsed.get("message").and_then(Value::as_str))
        .map(ToOwned::to_owned)
}
