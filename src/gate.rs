use crate::{api::ApiClient, models::{Identity, Role}};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum GateStatus {
    Pending,
    Authorized(Identity),
    Unauthorized,
}

impl GateStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(self, GateStatus::Authorized(_))
    }
}

pub struct AccessGate {
    api: ApiClient,
    epoch: AtomicU64,
    status: RwLock<GateStatus>,
}

impl AccessGate {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            epoch: AtomicU64::new(0),
            status: RwLock::new(GateStatus::Pending),
        }
    }

    pub async fn status(&self) -> GateStatus {
        self.status.read().await.clone()
    }

    pub async fn mount(&self) -> u64 {
        let ticket = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        *self.status.write().await = GateStatus::Pending;
        ticket
    }

    #[instrument(skip(self))]
    pub async fn verify(&self, required: Option<Role>) -> GateStatus {
        let ticket = self.mount().await;
        self.resolve(ticket, required).await
    }

    pub async fn resolve(&self, ticket: u64, required: Option<Role>) -> GateStatus {
        let outcome = self.evaluate(required).await;
        let mut status = self.status.write().await;
        if self.epoch.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "discarding stale verification");
            return status.clone();
        }
        *status = outcome.clone();
        outcome
    }

    async fn evaluate(&self, required: Option<Role>) -> GateStatus {
        if !self.api.session().has_token().await {
            debug!("no stored credential; refusing entry");
            return GateStatus::Unauthorized;
        }
        match self.api.me().await {
            Ok(identity) if required.is_none_or(|role| identity.role_id == role.as_id()) => {
                debug!(role_id = identity.role_id, "identity verified");
                GateStatus::Authorized(identity)
            }
            Ok(identity) => {
                warn!(
                    role_id = identity.role_id,
                    required = required.map(Role::as_id),
                    "role mismatch; refusing entry"
                );
                GateStatus::Unauthorized
            }
            Err(err) => {
                warn!(error = %err, "identity verification failed; refusing entry");
                GateStatus::Unauthorized
            }
        }
    }
}
