//! Shared state and the request-scoped credential.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::config::Config;
use crate::models::enums::Role;
use crate::notify::Notifier;
use crate::triage::RemoteClassifier;

/// Shared context for all routes and middleware. Connections are opened
/// per request from the configured path; migrations ran at startup.
#[derive(Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
    pub classifier: Option<Arc<RemoteClassifier>>,
    pub notifier: Arc<Notifier>,
    pub meet_base_url: String,
}

impl AppState {
    pub fn new(
        db_path: PathBuf,
        classifier: Option<RemoteClassifier>,
        notifier: Notifier,
        meet_base_url: String,
    ) -> Self {
        Self {
            db_path: Arc::new(db_path),
            classifier: classifier.map(Arc::new),
            notifier: Arc::new(notifier),
            meet_base_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let classifier = config.classifier.as_ref().map(|c| {
            RemoteClassifier::new(&c.base_url, &c.model, &c.api_key, c.timeout_secs)
        });
        Self::new(
            config.db_path.clone(),
            classifier,
            Notifier::new(config.doctor_phone.clone(), config.doctor_email.clone()),
            config.meet_base_url.clone(),
        )
    }

    /// Open a database connection for this request.
    pub fn conn(&self) -> Result<Connection, ApiError> {
        crate::db::connect(&self.db_path).map_err(ApiError::from)
    }

    pub fn classifier(&self) -> Option<&RemoteClassifier> {
        self.classifier.as_deref()
    }
}

/// Authenticated requester, injected into request extensions by the auth
/// middleware. Core operations receive what they need from here
/// explicitly — there is no ambient auth state.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
    /// Role-specific profile id (patient/doctor/ASHA/pharmacist). Admins
    /// have none.
    pub profile_id: Option<Uuid>,
}
