//! Admin-only user management.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::api::context::{AppState, AuthContext};
use crate::api::error::ApiError;
use crate::db::repository::user as user_repo;
use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::user::User;

#[derive(Serialize)]
pub struct UserStats {
    pub total: usize,
    pub patients: usize,
    pub doctors: usize,
    pub asha: usize,
    pub pharmacists: usize,
    pub admins: usize,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
    pub stats: UserStats,
}

/// `GET /admin/users` — every account plus per-role counts.
pub async fn users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UsersResponse>, ApiError> {
    require_admin(&auth)?;

    let conn = state.conn()?;
    let users = user_repo::list_users(&conn)?;

    let count = |role: Role| users.iter().filter(|u| u.role == role).count();
    let stats = UserStats {
        total: users.len(),
        patients: count(Role::Patient),
        doctors: count(Role::Doctor),
        asha: count(Role::Asha),
        pharmacists: count(Role::Pharmacist),
        admins: count(Role::Admin),
    };

    Ok(Json(UsersResponse { users, stats }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}

/// `DELETE /admin/users/:id` — remove the user and all their role
/// profiles in one transaction.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    require_admin(&auth)?;

    let conn = state.conn()?;
    let tx = conn.unchecked_transaction().map_err(DatabaseError::Sqlite)?;
    match user_repo::delete_user_and_profiles(&tx, &id) {
        Ok(()) => {}
        Err(DatabaseError::NotFound { .. }) => {
            return Err(ApiError::NotFound("User not found".into()))
        }
        Err(e) => return Err(e.into()),
    }
    tx.commit().map_err(DatabaseError::Sqlite)?;

    tracing::info!(user = %id, by = %auth.user_id, "user deleted");
    Ok(Json(DeleteResponse {
        message: "User deleted successfully",
    }))
}

fn require_admin(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}
