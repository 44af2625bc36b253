use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::enums::ReorderStatus;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub stock: i64,
    pub unit: String,
    pub reorder_threshold: i64,
}

impl InventoryItem {
    pub fn is_low(&self) -> bool {
        self.stock <= self.reorder_threshold
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub quantity: i64,
    pub status: ReorderStatus,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
