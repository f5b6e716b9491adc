//! # Transaction Record Repository
//!
//! Storage access for the independent reporting ledger. Rows are created,
//! edited and deleted directly by the caller; they carry no stock side
//! effect and no foreign keys into items or sales. The report aggregator
//! only ever reads them.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gasledger_core::validation::{validate_name, validate_price_cents, validate_weight_kg};
use gasledger_core::{Identity, NewTransactionRecord, TransactionPatch, TransactionRecord};

/// Repository for transaction-record database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

const RECORD_COLUMNS: &str = "id, owner_id, date, product_name, weight_kg, \
                              buy_price_per_kg_cents, sell_price_per_kg_cents, \
                              created_at, updated_at";

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    pub async fn get_by_id(
        &self,
        identity: &Identity,
        id: &str,
    ) -> DbResult<Option<TransactionRecord>> {
        let record = sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM transaction_records WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(id)
        .bind(&identity.owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Lists the owner's records, optionally bounded by an inclusive
    /// date window, newest ledger date first.
    pub async fn list(
        &self,
        identity: &Identity,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> DbResult<Vec<TransactionRecord>> {
        // ISO dates compare correctly as text, so optional bounds can be
        // folded into the WHERE clause with sentinel-free conditions.
        let mut sql = format!(
            "SELECT {RECORD_COLUMNS} FROM transaction_records WHERE owner_id = ?1"
        );
        if date_from.is_some() {
            sql.push_str(" AND date >= ?2");
        }
        if date_to.is_some() {
            sql.push_str(if date_from.is_some() {
                " AND date <= ?3"
            } else {
                " AND date <= ?2"
            });
        }
        sql.push_str(" ORDER BY date DESC, created_at DESC");

        let mut query = sqlx::query_as::<_, TransactionRecord>(&sql).bind(&identity.owner_id);
        if let Some(from) = date_from {
            query = query.bind(from);
        }
        if let Some(to) = date_to {
            query = query.bind(to);
        }

        let records = query.fetch_all(&self.pool).await?;
        Ok(records)
    }

    /// Lists the owner's records for one ledger date.
    pub async fn list_by_date(
        &self,
        identity: &Identity,
        date: NaiveDate,
    ) -> DbResult<Vec<TransactionRecord>> {
        let records = sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM transaction_records \
             WHERE owner_id = ?1 AND date = ?2 ORDER BY created_at DESC"
        ))
        .bind(&identity.owner_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn insert(
        &self,
        identity: &Identity,
        new: NewTransactionRecord,
    ) -> DbResult<TransactionRecord> {
        validate_name(&new.product_name)?;
        validate_weight_kg(new.weight_kg)?;
        validate_price_cents(new.buy_price_per_kg_cents)?;
        validate_price_cents(new.sell_price_per_kg_cents)?;

        let now = Utc::now();
        let record = TransactionRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: identity.owner_id.clone(),
            date: new.date,
            product_name: new.product_name,
            weight_kg: new.weight_kg,
            buy_price_per_kg_cents: new.buy_price_per_kg_cents,
            sell_price_per_kg_cents: new.sell_price_per_kg_cents,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %record.id, date = %record.date, "Inserting transaction record");

        sqlx::query(
            "INSERT INTO transaction_records (id, owner_id, date, product_name, weight_kg, \
             buy_price_per_kg_cents, sell_price_per_kg_cents, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&record.id)
        .bind(&record.owner_id)
        .bind(record.date)
        .bind(&record.product_name)
        .bind(record.weight_kg)
        .bind(record.buy_price_per_kg_cents)
        .bind(record.sell_price_per_kg_cents)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    /// Applies a partial-field update to a record.
    pub async fn update(
        &self,
        identity: &Identity,
        id: &str,
        patch: TransactionPatch,
    ) -> DbResult<TransactionRecord> {
        let mut record = self
            .get_by_id(identity, id)
            .await?
            .ok_or_else(|| DbError::not_found("TransactionRecord", id))?;

        if let Some(date) = patch.date {
            record.date = date;
        }
        if let Some(product_name) = patch.product_name {
            validate_name(&product_name)?;
            record.product_name = product_name;
        }
        if let Some(weight_kg) = patch.weight_kg {
            validate_weight_kg(weight_kg)?;
            record.weight_kg = weight_kg;
        }
        if let Some(buy) = patch.buy_price_per_kg_cents {
            validate_price_cents(buy)?;
            record.buy_price_per_kg_cents = buy;
        }
        if let Some(sell) = patch.sell_price_per_kg_cents {
            validate_price_cents(sell)?;
            record.sell_price_per_kg_cents = sell;
        }
        record.updated_at = Utc::now();

        debug!(id = %record.id, "Updating transaction record");

        let result = sqlx::query(
            "UPDATE transaction_records SET date = ?3, product_name = ?4, weight_kg = ?5, \
             buy_price_per_kg_cents = ?6, sell_price_per_kg_cents = ?7, updated_at = ?8 \
             WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(&record.id)
        .bind(&identity.owner_id)
        .bind(record.date)
        .bind(&record.product_name)
        .bind(record.weight_kg)
        .bind(record.buy_price_per_kg_cents)
        .bind(record.sell_price_per_kg_cents)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TransactionRecord", id));
        }

        Ok(record)
    }

    pub async fn delete(&self, identity: &Identity, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting transaction record");

        let result = sqlx::query("DELETE FROM transaction_records WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(&identity.owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TransactionRecord", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn record(date: NaiveDate, weight: f64) -> NewTransactionRecord {
        NewTransactionRecord {
            date,
            product_name: "Commercial 19kg".to_string(),
            weight_kg: weight,
            buy_price_per_kg_cents: 7000,
            sell_price_per_kg_cents: 9000,
        }
    }

    #[tokio::test]
    async fn test_insert_list_window() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let who = Identity::new("user-1");

        let d1 = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();

        for d in [d1, d2, d3] {
            db.transactions().insert(&who, record(d, 19.0)).await.unwrap();
        }

        // Inclusive window catches both June records
        let june = db
            .transactions()
            .list(&who, Some(d1), Some(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()))
            .await
            .unwrap();
        assert_eq!(june.len(), 2);

        // Open-ended lower bound
        let from_mid_june = db.transactions().list(&who, Some(d2), None).await.unwrap();
        assert_eq!(from_mid_june.len(), 2);

        // No bounds returns everything
        let all = db.transactions().list(&who, None, None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let who = Identity::new("user-1");

        let d = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let rec = db.transactions().insert(&who, record(d, 19.0)).await.unwrap();

        let patch = TransactionPatch {
            weight_kg: Some(38.0),
            ..Default::default()
        };
        let updated = db.transactions().update(&who, &rec.id, patch).await.unwrap();
        assert_eq!(updated.weight_kg, 38.0);
        assert_eq!(updated.product_name, "Commercial 19kg");

        db.transactions().delete(&who, &rec.id).await.unwrap();
        let err = db.transactions().delete(&who, &rec.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let who = Identity::new("user-1");
        let d = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let mut bad = record(d, 19.0);
        bad.weight_kg = -1.0;
        assert!(matches!(
            db.transactions().insert(&who, bad).await.unwrap_err(),
            DbError::Validation(_)
        ));

        let mut bad = record(d, 19.0);
        bad.sell_price_per_kg_cents = -5;
        assert!(matches!(
            db.transactions().insert(&who, bad).await.unwrap_err(),
            DbError::Validation(_)
        ));
    }
}
