//! Inventory ledger upserts and the reorder tracker.
//!
//! Reorder requests move strictly forward: PENDING -> ORDERED -> RECEIVED
//! (a PENDING request may also be received directly). RECEIVED is terminal
//! and replenishes the linked item's stock exactly once, in the same
//! transaction as the status change.

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::inventory as repo;
use crate::models::enums::ReorderStatus;
use crate::models::inventory::{InventoryItem, ReorderRequest};

use super::WorkflowError;

pub const DEFAULT_UNIT: &str = "units";
pub const DEFAULT_REORDER_THRESHOLD: i64 = 10;

pub struct InventoryUpsert {
    pub name: String,
    pub stock: Option<i64>,
    pub unit: Option<String>,
    pub reorder_threshold: Option<i64>,
}

/// Create the item if absent (with defaults), otherwise update only the
/// supplied fields.
pub fn upsert_item(
    conn: &Connection,
    upsert: InventoryUpsert,
) -> Result<InventoryItem, WorkflowError> {
    match repo::get_item_by_name(conn, &upsert.name)? {
        Some(mut item) => {
            if let Some(stock) = upsert.stock {
                item.stock = stock;
            }
            if let Some(unit) = upsert.unit {
                item.unit = unit;
            }
            if let Some(threshold) = upsert.reorder_threshold {
                item.reorder_threshold = threshold;
            }
            repo::update_item(conn, &item)?;
            Ok(item)
        }
        None => {
            let item = InventoryItem {
                id: Uuid::new_v4(),
                name: upsert.name,
                stock: upsert.stock.unwrap_or(0),
                unit: upsert.unit.unwrap_or_else(|| DEFAULT_UNIT.into()),
                reorder_threshold: upsert
                    .reorder_threshold
                    .unwrap_or(DEFAULT_REORDER_THRESHOLD),
            };
            repo::insert_item(conn, &item)?;
            Ok(item)
        }
    }
}

/// Raise a manual reorder request.
pub fn create_reorder(
    conn: &Connection,
    inventory_id: &Uuid,
    quantity: i64,
    requested_by: &str,
) -> Result<ReorderRequest, WorkflowError> {
    if repo::get_item(conn, inventory_id)?.is_none() {
        return Err(WorkflowError::NotFound {
            entity: "InventoryItem",
            id: inventory_id.to_string(),
        });
    }

    let now = Utc::now();
    let reorder = ReorderRequest {
        id: Uuid::new_v4(),
        inventory_id: *inventory_id,
        quantity,
        status: ReorderStatus::Pending,
        requested_by: requested_by.to_string(),
        created_at: now,
        updated_at: now,
    };
    repo::insert_reorder(conn, &reorder)?;
    Ok(reorder)
}

/// Advance a reorder request. Receipt replenishes the item's stock by the
/// request quantity atomically with the status change.
pub fn advance_reorder(
    conn: &Connection,
    id: &Uuid,
    next: ReorderStatus,
) -> Result<ReorderRequest, WorkflowError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(crate::db::DatabaseError::Sqlite)?;

    let reorder = repo::get_reorder(&tx, id)?.ok_or_else(|| WorkflowError::NotFound {
        entity: "ReorderRequest",
        id: id.to_string(),
    })?;

    if !transition_allowed(reorder.status, next) {
        return Err(WorkflowError::InvalidTransition {
            from: reorder.status.as_str(),
            to: next.as_str(),
        });
    }

    repo::update_reorder_status(&tx, id, next)?;
    if next == ReorderStatus::Received {
        repo::increment_stock(&tx, &reorder.inventory_id, reorder.quantity)?;
        tracing::info!(
            reorder = %id,
            item = %reorder.inventory_id,
            quantity = reorder.quantity,
            "reorder received, stock replenished"
        );
    }

    tx.commit().map_err(crate::db::DatabaseError::Sqlite)?;

    repo::get_reorder(conn, id)?.ok_or_else(|| WorkflowError::NotFound {
        entity: "ReorderRequest",
        id: id.to_string(),
    })
}

fn transition_allowed(from: ReorderStatus, to: ReorderStatus) -> bool {
    use ReorderStatus::*;
    matches!(
        (from, to),
        (Pending, Ordered) | (Pending, Received) | (Ordered, Received)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::care::testutil::{seed_inventory, test_db};

    #[test]
    fn upsert_creates_with_defaults() {
        let conn = test_db();
        let item = upsert_item(
            &conn,
            InventoryUpsert {
                name: "Zinc Tablets".into(),
                stock: None,
                unit: None,
                reorder_threshold: None,
            },
        )
        .unwrap();

        assert_eq!(item.stock, 0);
        assert_eq!(item.unit, DEFAULT_UNIT);
        assert_eq!(item.reorder_threshold, DEFAULT_REORDER_THRESHOLD);
    }

    #[test]
    fn upsert_updates_only_supplied_fields() {
        let conn = test_db();
        seed_inventory(&conn, "Paracetamol 500mg", 100, 20);

        let item = upsert_item(
            &conn,
            InventoryUpsert {
                name: "Paracetamol 500mg".into(),
                stock: Some(150),
                unit: None,
                reorder_threshold: None,
            },
        )
        .unwrap();

        assert_eq!(item.stock, 150);
        assert_eq!(item.unit, "strips"); // untouched
        assert_eq!(item.reorder_threshold, 20); // untouched
    }

    #[test]
    fn reorder_for_unknown_item_is_not_found() {
        let conn = test_db();
        let err = create_reorder(&conn, &Uuid::new_v4(), 50, "pharmacist-1").unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { entity: "InventoryItem", .. }));
    }

    #[test]
    fn receive_replenishes_stock() {
        let conn = test_db();
        let item_id = seed_inventory(&conn, "Amoxicillin 250mg", 5, 10);
        let reorder = create_reorder(&conn, &item_id, 50, "pharmacist-1").unwrap();

        let ordered = advance_reorder(&conn, &reorder.id, ReorderStatus::Ordered).unwrap();
        assert_eq!(ordered.status, ReorderStatus::Ordered);

        let received = advance_reorder(&conn, &reorder.id, ReorderStatus::Received).unwrap();
        assert_eq!(received.status, ReorderStatus::Received);
        assert_eq!(repo::get_stock(&conn, &item_id).unwrap(), 55);
    }

    #[test]
    fn pending_can_be_received_directly() {
        let conn = test_db();
        let item_id = seed_inventory(&conn, "ORS Packets", 0, 50);
        let reorder = create_reorder(&conn, &item_id, 200, "pharmacist-1").unwrap();

        advance_reorder(&conn, &reorder.id, ReorderStatus::Received).unwrap();
        assert_eq!(repo::get_stock(&conn, &item_id).unwrap(), 200);
    }

    #[test]
    fn repeated_receive_is_rejected_and_increments_once() {
        let conn = test_db();
        let item_id = seed_inventory(&conn, "Amoxicillin 250mg", 5, 10);
        let reorder = create_reorder(&conn, &item_id, 50, "pharmacist-1").unwrap();

        advance_reorder(&conn, &reorder.id, ReorderStatus::Received).unwrap();
        let err = advance_reorder(&conn, &reorder.id, ReorderStatus::Received).unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::InvalidTransition { from: "RECEIVED", to: "RECEIVED" }
        ));
        assert_eq!(repo::get_stock(&conn, &item_id).unwrap(), 55);
    }

    #[test]
    fn backward_transition_is_rejected() {
        let conn = test_db();
        let item_id = seed_inventory(&conn, "Amoxicillin 250mg", 5, 10);
        let reorder = create_reorder(&conn, &item_id, 50, "pharmacist-1").unwrap();

        advance_reorder(&conn, &reorder.id, ReorderStatus::Ordered).unwrap();
        let err = advance_reorder(&conn, &reorder.id, ReorderStatus::Pending).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[test]
    fn low_stock_listing_uses_threshold() {
        let conn = test_db();
        seed_inventory(&conn, "Paracetamol 500mg", 100, 20);
        seed_inventory(&conn, "Amoxicillin 250mg", 10, 10); // at threshold counts
        seed_inventory(&conn, "ORS Packets", 5, 50);

        let low = repo::list_low_stock(&conn).unwrap();
        let names: Vec<&str> = low.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Amoxicillin 250mg", "ORS Packets"]);
    }
}
