//! Inventory ledger and reorder tracker endpoints.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::context::{AppState, AuthContext};
use crate::api::error::ApiError;
use crate::care::inventory::{self, InventoryUpsert};
use crate::db::repository::inventory as inventory_repo;
use crate::models::enums::ReorderStatus;
use crate::models::inventory::{InventoryItem, ReorderRequest};

#[derive(Serialize)]
pub struct InventoryResponse {
    pub items: Vec<InventoryItem>,
}

/// `GET /inventory`
pub async fn list(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
) -> Result<Json<InventoryResponse>, ApiError> {
    let conn = state.conn()?;
    let items = inventory_repo::list_items(&conn)?;
    Ok(Json(InventoryResponse { items }))
}

/// `GET /inventory/low-stock` — items at or below their reorder threshold.
pub async fn low_stock(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
) -> Result<Json<InventoryResponse>, ApiError> {
    let conn = state.conn()?;
    let items = inventory_repo::list_low_stock(&conn)?;
    Ok(Json(InventoryResponse { items }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRequest {
    pub name: String,
    pub stock: Option<i64>,
    pub unit: Option<String>,
    pub reorder_threshold: Option<i64>,
}

/// `POST /inventory/update` — create or partially update a stock item.
pub async fn upsert(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpsertRequest>,
) -> Result<Json<InventoryItem>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Item name is required".into()));
    }
    if req.stock.is_some_and(|s| s < 0) || req.reorder_threshold.is_some_and(|t| t < 0) {
        return Err(ApiError::BadRequest(
            "Stock and reorder threshold must not be negative".into(),
        ));
    }

    let conn = state.conn()?;
    let item = inventory::upsert_item(
        &conn,
        InventoryUpsert {
            name: req.name,
            stock: req.stock,
            unit: req.unit,
            reorder_threshold: req.reorder_threshold,
        },
    )?;
    tracing::info!(item = %item.name, stock = item.stock, by = %auth.user_id, "inventory updated");
    Ok(Json(item))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReorderRequest {
    pub inventory_id: Uuid,
    pub quantity: i64,
}

/// `POST /inventory/reorder` — manual reorder request.
pub async fn create_reorder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateReorderRequest>,
) -> Result<Json<ReorderRequest>, ApiError> {
    if req.quantity <= 0 {
        return Err(ApiError::BadRequest("Quantity must be positive".into()));
    }
    let conn = state.conn()?;
    let reorder = inventory::create_reorder(
        &conn,
        &req.inventory_id,
        req.quantity,
        &auth.user_id.to_string(),
    )?;
    Ok(Json(reorder))
}

#[derive(Serialize)]
pub struct ReordersResponse {
    pub reorders: Vec<ReorderRequest>,
}

/// `GET /inventory/reorders` — newest first.
pub async fn list_reorders(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
) -> Result<Json<ReordersResponse>, ApiError> {
    let conn = state.conn()?;
    let reorders = inventory_repo::list_reorders(&conn)?;
    Ok(Json(ReordersResponse { reorders }))
}

#[derive(Deserialize)]
pub struct AdvanceReorderRequest {
    pub status: ReorderStatus,
}

/// `PUT /inventory/reorder/:id` — advance the reorder; receipt replenishes
/// the linked item's stock.
pub async fn advance_reorder(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdvanceReorderRequest>,
) -> Result<Json<ReorderRequest>, ApiError> {
    let conn = state.conn()?;
    let reorder = inventory::advance_reorder(&conn, &id, req.status)?;
    Ok(Json(reorder))
}
