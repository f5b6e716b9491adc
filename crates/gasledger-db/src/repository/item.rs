//! # Item Repository (Stock Ledger)
//!
//! Single source of truth for each item's available quantity.
//!
//! ## The Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │            Why decrement_stock is one statement                     │
//! │                                                                     │
//! │  ❌ WRONG: read-then-write across two round trips                  │
//! │     SELECT stock FROM items WHERE id = ?    -- sees 10             │
//! │     UPDATE items SET stock = 4 WHERE id = ? -- clobbers            │
//! │                                                                     │
//! │     Two concurrent sales each see stock 10, each write their own   │
//! │     result, and together they oversell (lost update).              │
//! │                                                                     │
//! │  ✅ CORRECT: conditional single statement, affected-row check      │
//! │     UPDATE items SET stock = stock - ?                             │
//! │     WHERE id = ? AND stock >= ?                                    │
//! │                                                                     │
//! │     rows_affected == 0 means the stock moved under us; the caller  │
//! │     gets a typed outcome instead of a corrupted counter.           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gasledger_core::validation::{
    validate_name, validate_price_cents, validate_stock, validate_weight_kg,
};
use gasledger_core::{Identity, Item, ItemPatch, NewItem};

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone)]
pub enum StockDecrement {
    /// The decrement applied; carries the refreshed item.
    Applied(Item),
    /// The item exists but had fewer units than requested at the moment
    /// the statement ran.
    Insufficient { available: i64 },
}

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

const ITEM_COLUMNS: &str = "id, owner_id, name, weight_kg, buy_price_cents, \
                            sell_price_cents, stock, created_at, updated_at";

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Gets an item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Item))` - Item found
    /// * `Ok(None)` - Item not found (or belongs to another owner)
    pub async fn get_by_id(&self, identity: &Identity, id: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(id)
        .bind(&identity.owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists the owner's items, newest first.
    pub async fn list(&self, identity: &Identity) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(&identity.owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts the owner's items (dashboard widget).
    pub async fn count(&self, identity: &Identity) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE owner_id = ?1")
            .bind(&identity.owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts a new item.
    ///
    /// The id and timestamps are assigned here; initial stock defaults
    /// to 0 via `NewItem`.
    pub async fn insert(&self, identity: &Identity, new: NewItem) -> DbResult<Item> {
        validate_name(&new.name)?;
        validate_weight_kg(new.weight_kg)?;
        validate_price_cents(new.buy_price_cents)?;
        validate_price_cents(new.sell_price_cents)?;
        validate_stock(new.stock)?;

        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            owner_id: identity.owner_id.clone(),
            name: new.name,
            weight_kg: new.weight_kg,
            buy_price_cents: new.buy_price_cents,
            sell_price_cents: new.sell_price_cents,
            stock: new.stock,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, name = %item.name, "Inserting item");

        sqlx::query(
            "INSERT INTO items (id, owner_id, name, weight_kg, buy_price_cents, \
             sell_price_cents, stock, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&item.id)
        .bind(&item.owner_id)
        .bind(&item.name)
        .bind(item.weight_kg)
        .bind(item.buy_price_cents)
        .bind(item.sell_price_cents)
        .bind(item.stock)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Applies a partial-field update to an item.
    ///
    /// `None` fields are left unchanged. Stock is not touched here; it
    /// only moves through `set_stock`, `decrement_stock` and `restock`.
    pub async fn update(&self, identity: &Identity, id: &str, patch: ItemPatch) -> DbResult<Item> {
        let mut item = self.fetch(identity, id).await?;

        if let Some(name) = patch.name {
            validate_name(&name)?;
            item.name = name;
        }
        if let Some(weight_kg) = patch.weight_kg {
            validate_weight_kg(weight_kg)?;
            item.weight_kg = weight_kg;
        }
        if let Some(buy) = patch.buy_price_cents {
            validate_price_cents(buy)?;
            item.buy_price_cents = buy;
        }
        if let Some(sell) = patch.sell_price_cents {
            validate_price_cents(sell)?;
            item.sell_price_cents = sell;
        }
        item.updated_at = Utc::now();

        debug!(id = %item.id, "Updating item");

        let result = sqlx::query(
            "UPDATE items SET name = ?3, weight_kg = ?4, buy_price_cents = ?5, \
             sell_price_cents = ?6, updated_at = ?7 \
             WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(&item.id)
        .bind(&identity.owner_id)
        .bind(&item.name)
        .bind(item.weight_kg)
        .bind(item.buy_price_cents)
        .bind(item.sell_price_cents)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(item)
    }

    /// Sets an item's stock to an absolute level.
    ///
    /// Rejects negative levels before any SQL runs.
    pub async fn set_stock(&self, identity: &Identity, id: &str, new_stock: i64) -> DbResult<Item> {
        validate_stock(new_stock)?;

        let now = Utc::now();

        debug!(id = %id, new_stock = %new_stock, "Setting stock");

        let result = sqlx::query(
            "UPDATE items SET stock = ?3, updated_at = ?4 WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(id)
        .bind(&identity.owner_id)
        .bind(new_stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.fetch(identity, id).await
    }

    /// Atomically takes `amount` units from an item's stock.
    ///
    /// The availability check and the write are one conditional statement
    /// (one round trip), so concurrent callers can never jointly drive
    /// the stock negative: the slower one sees `rows_affected == 0` and
    /// gets `StockDecrement::Insufficient` with the live count.
    pub async fn decrement_stock(
        &self,
        identity: &Identity,
        id: &str,
        amount: i64,
    ) -> DbResult<StockDecrement> {
        let now = Utc::now();

        debug!(id = %id, amount = %amount, "Decrementing stock");

        let result = sqlx::query(
            "UPDATE items SET stock = stock - ?3, updated_at = ?4 \
             WHERE id = ?1 AND owner_id = ?2 AND stock >= ?3",
        )
        .bind(id)
        .bind(&identity.owner_id)
        .bind(amount)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Did not apply: either the item is gone or stock moved
            // under us. Disambiguate with a fresh read.
            return match self.get_by_id(identity, id).await? {
                Some(item) => Ok(StockDecrement::Insufficient {
                    available: item.stock,
                }),
                None => Err(DbError::not_found("Item", id)),
            };
        }

        Ok(StockDecrement::Applied(self.fetch(identity, id).await?))
    }

    /// Returns `amount` units to an item's stock.
    ///
    /// Used by the sale coordinator to reverse applied decrements when a
    /// later step of a multi-line sale fails.
    pub async fn restock(&self, identity: &Identity, id: &str, amount: i64) -> DbResult<Item> {
        let now = Utc::now();

        debug!(id = %id, amount = %amount, "Restocking");

        let result = sqlx::query(
            "UPDATE items SET stock = stock + ?3, updated_at = ?4 \
             WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(id)
        .bind(&identity.owner_id)
        .bind(amount)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.fetch(identity, id).await
    }

    /// Deletes an item.
    ///
    /// Fails with a foreign-key violation if historical sale lines still
    /// reference it; those sales are the audit trail and win.
    pub async fn delete(&self, identity: &Identity, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting item");

        let result = sqlx::query("DELETE FROM items WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(&identity.owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Fetches an item, turning absence into a typed NotFound.
    async fn fetch(&self, identity: &Identity, id: &str) -> DbResult<Item> {
        self.get_by_id(identity, id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn setup() -> (Database, Identity) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        (db, Identity::new("user-1"))
    }

    fn cylinder(stock: i64) -> NewItem {
        NewItem {
            name: "14.2kg Domestic Cylinder".to_string(),
            weight_kg: 14.2,
            buy_price_cents: 70_000,
            sell_price_cents: 90_000,
            stock,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (db, who) = setup().await;
        let item = db.items().insert(&who, cylinder(10)).await.unwrap();

        let found = db.items().get_by_id(&who, &item.id).await.unwrap().unwrap();
        assert_eq!(found.name, "14.2kg Domestic Cylinder");
        assert_eq!(found.stock, 10);
    }

    #[tokio::test]
    async fn test_owner_isolation() {
        let (db, who) = setup().await;
        let other = Identity::new("user-2");

        let item = db.items().insert(&who, cylinder(10)).await.unwrap();

        assert!(db.items().get_by_id(&other, &item.id).await.unwrap().is_none());
        assert_eq!(db.items().list(&other).await.unwrap().len(), 0);
        assert_eq!(db.items().count(&who).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_decrement_applies() {
        let (db, who) = setup().await;
        let item = db.items().insert(&who, cylinder(10)).await.unwrap();

        match db.items().decrement_stock(&who, &item.id, 4).await.unwrap() {
            StockDecrement::Applied(updated) => assert_eq!(updated.stock, 6),
            other => panic!("expected Applied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_decrement_rejects_overdraw() {
        let (db, who) = setup().await;
        let item = db.items().insert(&who, cylinder(6)).await.unwrap();

        match db.items().decrement_stock(&who, &item.id, 7).await.unwrap() {
            StockDecrement::Insufficient { available } => assert_eq!(available, 6),
            other => panic!("expected Insufficient, got {other:?}"),
        }

        // Stock untouched by the rejected decrement
        let after = db.items().get_by_id(&who, &item.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 6);
    }

    #[tokio::test]
    async fn test_decrement_missing_item_is_not_found() {
        let (db, who) = setup().await;
        let err = db
            .items()
            .decrement_stock(&who, "no-such-id", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_restock_reverses_decrement() {
        let (db, who) = setup().await;
        let item = db.items().insert(&who, cylinder(10)).await.unwrap();

        db.items().decrement_stock(&who, &item.id, 4).await.unwrap();
        let restored = db.items().restock(&who, &item.id, 4).await.unwrap();
        assert_eq!(restored.stock, 10);
    }

    #[tokio::test]
    async fn test_set_stock_rejects_negative() {
        let (db, who) = setup().await;
        let item = db.items().insert(&who, cylinder(5)).await.unwrap();

        let err = db.items().set_stock(&who, &item.id, -1).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let ok = db.items().set_stock(&who, &item.id, 25).await.unwrap();
        assert_eq!(ok.stock, 25);
    }

    #[tokio::test]
    async fn test_patch_update_leaves_other_fields() {
        let (db, who) = setup().await;
        let item = db.items().insert(&who, cylinder(5)).await.unwrap();

        let patch = ItemPatch {
            sell_price_cents: Some(95_000),
            ..Default::default()
        };
        let updated = db.items().update(&who, &item.id, patch).await.unwrap();

        assert_eq!(updated.sell_price_cents, 95_000);
        assert_eq!(updated.buy_price_cents, 70_000);
        assert_eq!(updated.stock, 5);
        assert_eq!(updated.name, item.name);
    }
}
