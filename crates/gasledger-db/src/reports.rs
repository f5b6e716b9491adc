//! # Report Aggregator
//!
//! Read-only, time-windowed summaries over the transaction-record
//! ledger: total weight moved, money in, money out, profit. Never
//! mutates anything and is safe to re-run any number of times.
//!
//! Derived figures per record (weight × per-kg rate, rounded to cents)
//! come from [`gasledger_core::TransactionRecord`]; this module only
//! picks the window and sums.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::DbError;
use crate::pool::Database;
use gasledger_core::{Identity, Money};

// =============================================================================
// Errors
// =============================================================================

/// Errors from report operations.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The requested window cannot be expressed as calendar dates
    /// (month outside 1-12, unrepresentable year).
    #[error("Invalid date window: {0}")]
    InvalidDate(String),

    /// The underlying store failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] DbError),
}

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

// =============================================================================
// Summary Type
// =============================================================================

/// Aggregate figures over an inclusive date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSummary {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// Total weight moved, in kilograms.
    pub total_weight_kg: f64,
    /// Sum of per-record `weight × buy_price_per_kg`.
    pub total_buy: Money,
    /// Sum of per-record `weight × sell_price_per_kg`.
    pub total_sell: Money,
    /// `total_sell − total_buy`.
    pub total_profit: Money,
    /// Number of records in the window.
    pub count: usize,
}

impl RangeSummary {
    fn empty(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        RangeSummary {
            date_from,
            date_to,
            total_weight_kg: 0.0,
            total_buy: Money::zero(),
            total_sell: Money::zero(),
            total_profit: Money::zero(),
            count: 0,
        }
    }
}

// =============================================================================
// Report Aggregator
// =============================================================================

/// Produces date-windowed summaries for one owner's ledger.
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    db: Database,
    identity: Identity,
}

impl ReportAggregator {
    /// Creates an aggregator acting as the given identity.
    pub fn new(db: Database, identity: Identity) -> Self {
        ReportAggregator { db, identity }
    }

    /// Summarizes all records whose date falls in `[date_from, date_to]`
    /// inclusive.
    ///
    /// An empty or inverted window simply yields a zero summary.
    pub async fn summarize_range(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> ReportResult<RangeSummary> {
        debug!(%date_from, %date_to, "Summarizing transaction records");

        let records = self
            .db
            .transactions()
            .list(&self.identity, Some(date_from), Some(date_to))
            .await?;

        let mut summary = RangeSummary::empty(date_from, date_to);
        for record in &records {
            summary.total_weight_kg += record.weight_kg;
            summary.total_buy += record.total_buy();
            summary.total_sell += record.total_sell();
            summary.total_profit += record.profit();
        }
        summary.count = records.len();

        Ok(summary)
    }

    /// Summarizes a single ledger day.
    pub async fn summarize_day(&self, date: NaiveDate) -> ReportResult<RangeSummary> {
        self.summarize_range(date, date).await
    }

    /// Summarizes a calendar month, first through last day.
    ///
    /// Month length is computed calendrically, leap years included.
    pub async fn summarize_month(&self, year: i32, month: u32) -> ReportResult<RangeSummary> {
        let (first, last) = month_bounds(year, month)?;
        self.summarize_range(first, last).await
    }
}

/// Returns the first and last day of the given calendar month.
fn month_bounds(year: i32, month: u32) -> ReportResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ReportError::InvalidDate(format!("{year}-{month:02} is not a month")))?;

    // Last day = day before the first of the next month.
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| ReportError::InvalidDate(format!("{year}-{month:02} has no successor")))?;

    let last = next_first
        .pred_opt()
        .ok_or_else(|| ReportError::InvalidDate(format!("{year}-{month:02} has no last day")))?;

    debug_assert_eq!(first.month(), last.month());
    Ok((first, last))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use gasledger_core::NewTransactionRecord;

    async fn setup() -> (Database, Identity) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        (db, Identity::new("user-1"))
    }

    async fn add_record(
        db: &Database,
        who: &Identity,
        date: NaiveDate,
        weight_kg: f64,
        buy_per_kg: i64,
        sell_per_kg: i64,
    ) {
        db.transactions()
            .insert(
                who,
                NewTransactionRecord {
                    date,
                    product_name: "Domestic 14.2kg".to_string(),
                    weight_kg,
                    buy_price_per_kg_cents: buy_per_kg,
                    sell_price_per_kg_cents: sell_per_kg,
                },
            )
            .await
            .unwrap();
    }

    #[test]
    fn test_month_bounds() {
        let (first, last) = month_bounds(2024, 2).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()); // leap year

        let (_, last) = month_bounds(2025, 2).unwrap();
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());

        let (_, last) = month_bounds(2025, 12).unwrap();
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

        let (_, last) = month_bounds(2025, 4).unwrap();
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
    }

    #[test]
    fn test_month_bounds_rejects_bad_month() {
        assert!(matches!(month_bounds(2025, 0), Err(ReportError::InvalidDate(_))));
        assert!(matches!(month_bounds(2025, 13), Err(ReportError::InvalidDate(_))));
    }

    #[tokio::test]
    async fn test_summarize_day_matches_manual_sums() {
        let (db, who) = setup().await;
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let other_day = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();

        add_record(&db, &who, day, 14.2, 7000, 9000).await;
        add_record(&db, &who, day, 19.0, 7000, 9500).await;
        add_record(&db, &who, other_day, 5.0, 7000, 9000).await; // excluded

        let summary = db.reports(who.clone()).summarize_day(day).await.unwrap();

        assert_eq!(summary.count, 2);
        assert!((summary.total_weight_kg - 33.2).abs() < 1e-9);
        // 14.2*7000 + 19.0*7000 = 99_400 + 133_000
        assert_eq!(summary.total_buy.cents(), 232_400);
        // 14.2*9000 + 19.0*9500 = 127_800 + 180_500
        assert_eq!(summary.total_sell.cents(), 308_300);
        assert_eq!(summary.total_profit.cents(), 308_300 - 232_400);
    }

    #[tokio::test]
    async fn test_summarize_month_equals_sum_of_days() {
        let (db, who) = setup().await;

        // February 2024 is a leap month; the 29th must be inside the
        // window and March 1st outside it.
        let feb1 = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let feb29 = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mar1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        add_record(&db, &who, feb1, 14.2, 7000, 9000).await;
        add_record(&db, &who, feb29, 19.0, 7000, 9500).await;
        add_record(&db, &who, mar1, 47.5, 6500, 9000).await;

        let reports = db.reports(who.clone());
        let month = reports.summarize_month(2024, 2).await.unwrap();

        assert_eq!(month.count, 2);

        // Month summary equals the fold of its day summaries
        let mut day_profit = Money::zero();
        let mut day_count = 0;
        let mut d = feb1;
        while d <= feb29 {
            let day = reports.summarize_day(d).await.unwrap();
            day_profit += day.total_profit;
            day_count += day.count;
            d = d.succ_opt().unwrap();
        }
        assert_eq!(month.total_profit, day_profit);
        assert_eq!(month.count, day_count);
    }

    #[tokio::test]
    async fn test_empty_window_is_zero() {
        let (db, who) = setup().await;
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();

        let summary = db.reports(who.clone()).summarize_day(day).await.unwrap();
        assert_eq!(summary.count, 0);
        assert!(summary.total_buy.is_zero());
        assert!(summary.total_sell.is_zero());
        assert!(summary.total_profit.is_zero());
        assert_eq!(summary.total_weight_kg, 0.0);
    }

    #[tokio::test]
    async fn test_reports_are_owner_scoped() {
        let (db, who) = setup().await;
        let other = Identity::new("user-2");
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();

        add_record(&db, &who, day, 14.2, 7000, 9000).await;
        add_record(&db, &other, day, 100.0, 1, 2).await;

        let summary = db.reports(who.clone()).summarize_day(day).await.unwrap();
        assert_eq!(summary.count, 1);
        assert!((summary.total_weight_kg - 14.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_summaries_are_idempotent() {
        let (db, who) = setup().await;
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        add_record(&db, &who, day, 14.2, 7000, 9000).await;

        let reports = db.reports(who.clone());
        let first = reports.summarize_day(day).await.unwrap();
        let second = reports.summarize_day(day).await.unwrap();
        assert_eq!(first, second);
    }
}
