//! Account registration and login.

use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::context::AppState;
use crate::api::error::ApiError;
use crate::auth;
use crate::db::repository::user as user_repo;
use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::user::{Patient, User};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    // Patient-only demographics.
    pub contact: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub profile_id: Option<Uuid>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPayload,
}

/// `POST /auth/register` — create a user plus their role profile in one
/// transaction, then hand back a session token for immediate login.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Name and email are required".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters".into(),
        ));
    }
    let role = req.role.unwrap_or(Role::Patient);

    let conn = state.conn()?;
    if user_repo::get_user_by_email(&conn, &req.email)?.is_some() {
        return Err(ApiError::BadRequest(
            "Registration failed or email exists".into(),
        ));
    }

    let password_hash = auth::hash_password(&req.password)?;
    let user = User {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        role,
        created_at: Utc::now(),
    };

    let tx = conn.unchecked_transaction().map_err(DatabaseError::Sqlite)?;
    user_repo::insert_user(&tx, &user, &password_hash)?;
    let profile_id = match role {
        Role::Patient => {
            let patient = Patient {
                id: Uuid::new_v4(),
                user_id: user.id,
                contact: req.contact,
                address: req.address,
                gender: req.gender.or_else(|| Some("Other".into())),
                date_of_birth: req.date_of_birth,
                asha_id: None,
            };
            user_repo::insert_patient(&tx, &patient)?;
            Some(patient.id)
        }
        Role::Admin => None,
        other => Some(user_repo::insert_role_profile(&tx, other, &user.id)?),
    };
    tx.commit().map_err(DatabaseError::Sqlite)?;

    let token = auth::issue_session(&conn, &user.id, role, profile_id)?;
    tracing::info!(user = %user.id, role = role.as_str(), "user registered");

    Ok(Json(AuthResponse {
        token,
        user: UserPayload {
            id: user.id,
            name: user.name,
            email: user.email,
            role,
            profile_id,
        },
    }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// When supplied, the account must actually hold this role.
    pub role: Option<Role>,
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let conn = state.conn()?;

    let Some((user, stored_hash)) = user_repo::get_user_by_email(&conn, &req.email)? else {
        return Err(ApiError::InvalidCredentials("Invalid credentials".into()));
    };

    if let Some(expected) = req.role {
        if user.role != expected {
            return Err(ApiError::InvalidCredentials(format!(
                "Invalid role. This account is registered as a {}",
                user.role.as_str()
            )));
        }
    }

    if !auth::verify_password(&req.password, &stored_hash) {
        return Err(ApiError::InvalidCredentials("Invalid credentials".into()));
    }

    let profile_id = user_repo::get_profile_id(&conn, user.role, &user.id)?;
    let token = auth::issue_session(&conn, &user.id, user.role, profile_id)?;

    Ok(Json(AuthResponse {
        token,
        user: UserPayload {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            profile_id,
        },
    }))
}
