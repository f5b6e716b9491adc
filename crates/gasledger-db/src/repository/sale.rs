//! # Sale Repository
//!
//! Database operations for sale headers and their line items.
//!
//! This layer is deliberately dumb storage: inserts, deletes and reads.
//! The multi-step write that keeps sales and stock consistent lives in
//! [`crate::coordinator`], which drives these operations in order and
//! reverses them on partial failure.
//!
//! ## Snapshot Pattern
//! A line's `price_at_sale_cents` is copied from the agreed price at
//! checkout. Later edits to the item's sell price never touch recorded
//! sales.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use gasledger_core::{Identity, Money, Sale, SaleLine};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

const SALE_COLUMNS: &str = "id, owner_id, sale_date, customer_id, total_amount_cents, notes";
const LINE_COLUMNS: &str = "id, sale_id, item_id, quantity, price_at_sale_cents";

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, identity: &Identity, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(id)
        .bind(&identity.owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Inserts a sale header.
    pub async fn insert_sale(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, total = %sale.total_amount_cents, "Inserting sale");

        sqlx::query(
            "INSERT INTO sales (id, owner_id, sale_date, customer_id, total_amount_cents, notes) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&sale.id)
        .bind(&sale.owner_id)
        .bind(sale.sale_date)
        .bind(&sale.customer_id)
        .bind(sale.total_amount_cents)
        .bind(&sale.notes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts one line item.
    pub async fn insert_line(&self, line: &SaleLine) -> DbResult<()> {
        debug!(sale_id = %line.sale_id, item_id = %line.item_id, "Inserting sale line");

        sqlx::query(
            "INSERT INTO sale_lines (id, sale_id, item_id, quantity, price_at_sale_cents) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&line.id)
        .bind(&line.sale_id)
        .bind(&line.item_id)
        .bind(line.quantity)
        .bind(line.price_at_sale_cents)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets all line items for a sale.
    pub async fn get_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM sale_lines WHERE sale_id = ?1 ORDER BY id"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Deletes a sale header; the schema cascades deletion of its lines.
    ///
    /// Stock is intentionally not touched here - see the coordinator's
    /// `delete_sale` for the documented semantics.
    pub async fn delete(&self, identity: &Identity, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(&identity.owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Lists the owner's sales, newest first.
    pub async fn list(&self, identity: &Identity) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE owner_id = ?1 ORDER BY sale_date DESC"
        ))
        .bind(&identity.owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists the owner's most recent sales (dashboard widget).
    pub async fn recent(&self, identity: &Identity, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE owner_id = ?1 \
             ORDER BY sale_date DESC LIMIT ?2"
        ))
        .bind(&identity.owner_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Sums sale totals over a half-open timestamp window `[from, to)`.
    ///
    /// Backs the "today's sales" / "this month's sales" dashboard
    /// figures.
    pub async fn total_between(
        &self,
        identity: &Identity,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Money> {
        let cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount_cents), 0) FROM sales \
             WHERE owner_id = ?1 AND sale_date >= ?2 AND sale_date < ?3",
        )
        .bind(&identity.owner_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(cents))
    }

    /// Counts the owner's sales.
    pub async fn count(&self, identity: &Identity) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE owner_id = ?1")
            .bind(&identity.owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts lines across all of the owner's sales (test/diagnostic
    /// helper).
    pub async fn count_lines(&self, identity: &Identity) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sale_lines l \
             JOIN sales s ON s.id = l.sale_id WHERE s.owner_id = ?1",
        )
        .bind(&identity.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use uuid::Uuid;

    fn sale(owner: &Identity, total_cents: i64, at: DateTime<Utc>) -> Sale {
        Sale {
            id: Uuid::new_v4().to_string(),
            owner_id: owner.owner_id.clone(),
            sale_date: at,
            customer_id: None,
            total_amount_cents: total_cents,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_delete_cascades_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let who = Identity::new("user-1");

        let item = db
            .items()
            .insert(
                &who,
                gasledger_core::NewItem {
                    name: "Cylinder".to_string(),
                    weight_kg: 14.2,
                    buy_price_cents: 70_000,
                    sell_price_cents: 90_000,
                    stock: 10,
                },
            )
            .await
            .unwrap();

        let s = sale(&who, 90_000, Utc::now());
        db.sales().insert_sale(&s).await.unwrap();
        db.sales()
            .insert_line(&SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_id: s.id.clone(),
                item_id: item.id.clone(),
                quantity: 1,
                price_at_sale_cents: 90_000,
            })
            .await
            .unwrap();

        assert_eq!(db.sales().count_lines(&who).await.unwrap(), 1);

        db.sales().delete(&who, &s.id).await.unwrap();

        assert_eq!(db.sales().count(&who).await.unwrap(), 0);
        // Lines went with the header
        assert_eq!(db.sales().get_lines(&s.id).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_sale_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let who = Identity::new("user-1");

        let err = db.sales().delete(&who, "no-such-sale").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_total_between_is_half_open() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let who = Identity::new("user-1");

        let day_start = Utc::now();
        let inside = sale(&who, 1000, day_start + Duration::hours(1));
        let boundary = sale(&who, 500, day_start + Duration::hours(24));
        db.sales().insert_sale(&inside).await.unwrap();
        db.sales().insert_sale(&boundary).await.unwrap();

        let total = db
            .sales()
            .total_between(&who, day_start, day_start + Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(total.cents(), 1000);
    }

    #[tokio::test]
    async fn test_recent_orders_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let who = Identity::new("user-1");

        let now = Utc::now();
        let older = sale(&who, 100, now - Duration::days(2));
        let newer = sale(&who, 200, now);
        db.sales().insert_sale(&older).await.unwrap();
        db.sales().insert_sale(&newer).await.unwrap();

        let recent = db.sales().recent(&who, 1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, newer.id);
    }
}
