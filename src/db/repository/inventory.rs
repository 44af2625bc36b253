use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::ReorderStatus;
use crate::models::inventory::{InventoryItem, ReorderRequest};

use super::user::parse_uuid;

pub fn insert_item(conn: &Connection, item: &InventoryItem) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO inventory (id, name, stock, unit, reorder_threshold)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            item.id.to_string(),
            item.name,
            item.stock,
            item.unit,
            item.reorder_threshold,
        ],
    )?;
    Ok(())
}

pub fn update_item(conn: &Connection, item: &InventoryItem) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE inventory SET stock = ?2, unit = ?3, reorder_threshold = ?4 WHERE id = ?1",
        params![item.id.to_string(), item.stock, item.unit, item.reorder_threshold],
    )?;
    Ok(())
}

pub fn get_item(conn: &Connection, id: &Uuid) -> Result<Option<InventoryItem>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, stock, unit, reorder_threshold FROM inventory WHERE id = ?1",
        params![id.to_string()],
        item_from_row,
    )
    .optional()?
    .map(item_from_raw)
    .transpose()
}

/// Case-sensitive exact match: prescription lines must name the inventory
/// item exactly as the pharmacist entered it.
pub fn get_item_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<InventoryItem>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, stock, unit, reorder_threshold FROM inventory WHERE name = ?1",
        params![name],
        item_from_row,
    )
    .optional()?
    .map(item_from_raw)
    .transpose()
}

pub fn list_items(conn: &Connection) -> Result<Vec<InventoryItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, stock, unit, reorder_threshold FROM inventory ORDER BY name ASC",
    )?;
    let out = collect_items(stmt.query_map([], item_from_row)?);
    out
}

pub fn list_low_stock(conn: &Connection) -> Result<Vec<InventoryItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, stock, unit, reorder_threshold FROM inventory
         WHERE stock <= reorder_threshold ORDER BY name ASC",
    )?;
    let out = collect_items(stmt.query_map([], item_from_row)?);
    out
}

/// Conditional decrement: succeeds only when enough stock remains, so the
/// read-modify-write race between concurrent dispenses collapses into one
/// atomic statement and stock can never go negative.
pub fn try_decrement_stock(
    conn: &Connection,
    id: &Uuid,
    quantity: i64,
) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE inventory SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2",
        params![id.to_string(), quantity],
    )?;
    Ok(updated == 1)
}

pub fn increment_stock(conn: &Connection, id: &Uuid, quantity: i64) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE inventory SET stock = stock + ?2 WHERE id = ?1",
        params![id.to_string(), quantity],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "InventoryItem".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn get_stock(conn: &Connection, id: &Uuid) -> Result<i64, DatabaseError> {
    conn.query_row(
        "SELECT stock FROM inventory WHERE id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| DatabaseError::NotFound {
        entity_type: "InventoryItem".into(),
        id: id.to_string(),
    })
}

// ── Reorder requests ────────────────────────────────────────────────────────

pub fn insert_reorder(conn: &Connection, reorder: &ReorderRequest) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO reorder_requests (id, inventory_id, quantity, status, requested_by,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            reorder.id.to_string(),
            reorder.inventory_id.to_string(),
            reorder.quantity,
            reorder.status.as_str(),
            reorder.requested_by,
            reorder.created_at,
            reorder.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_reorder(conn: &Connection, id: &Uuid) -> Result<Option<ReorderRequest>, DatabaseError> {
    conn.query_row(
        "SELECT id, inventory_id, quantity, status, requested_by, created_at, updated_at
         FROM reorder_requests WHERE id = ?1",
        params![id.to_string()],
        reorder_from_row,
    )
    .optional()?
    .map(reorder_from_raw)
    .transpose()
}

pub fn list_reorders(conn: &Connection) -> Result<Vec<ReorderRequest>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, inventory_id, quantity, status, requested_by, created_at, updated_at
         FROM reorder_requests ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map([], reorder_from_row)?;

    let mut reorders = Vec::new();
    for row in rows {
        reorders.push(reorder_from_raw(row?)?);
    }
    Ok(reorders)
}

pub fn update_reorder_status(
    conn: &Connection,
    id: &Uuid,
    status: ReorderStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE reorder_requests SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), status.as_str(), Utc::now()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "ReorderRequest".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// Internal row types

type ItemRaw = (String, String, i64, String, i64);

fn item_from_row(row: &rusqlite::Row<'_>) -> Result<ItemRaw, rusqlite::Error> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn item_from_raw(raw: ItemRaw) -> Result<InventoryItem, DatabaseError> {
    let (id, name, stock, unit, reorder_threshold) = raw;
    Ok(InventoryItem {
        id: parse_uuid(&id)?,
        name,
        stock,
        unit,
        reorder_threshold,
    })
}

fn collect_items(
    rows: impl Iterator<Item = Result<ItemRaw, rusqlite::Error>>,
) -> Result<Vec<InventoryItem>, DatabaseError> {
    let mut items = Vec::new();
    for row in rows {
        items.push(item_from_raw(row?)?);
    }
    Ok(items)
}

type ReorderRaw = (
    String,
    String,
    i64,
    String,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn reorder_from_row(row: &rusqlite::Row<'_>) -> Result<ReorderRaw, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn reorder_from_raw(raw: ReorderRaw) -> Result<ReorderRequest, DatabaseError> {
    let (id, inventory_id, quantity, status, requested_by, created_at, updated_at) = raw;
    Ok(ReorderRequest {
        id: parse_uuid(&id)?,
        inventory_id: parse_uuid(&inventory_id)?,
        quantity,
        status: ReorderStatus::from_str(&status)?,
        requested_by,
        created_at,
        updated_at,
    })
}
