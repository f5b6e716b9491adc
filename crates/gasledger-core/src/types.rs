//! # Domain Types
//!
//! Core domain types used throughout Gasledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌────────────────────┐    │
//! │  │     Item      │   │     Sale      │   │  TransactionRecord │    │
//! │  │  ───────────  │   │  ───────────  │   │  ────────────────  │    │
//! │  │  id (UUID)    │   │  id (UUID)    │   │  id (UUID)         │    │
//! │  │  weight_kg    │   │  sale_date    │   │  date              │    │
//! │  │  sell_price   │   │  total_amount │   │  weight_kg         │    │
//! │  │  stock        │   │  customer_id? │   │  buy/sell per kg   │    │
//! │  └───────┬───────┘   └───────┬───────┘   └────────────────────┘    │
//! │          │                   │                                      │
//! │          │    ┌──────────────┴──┐                                   │
//! │          └────┤    SaleLine     │  quantity × price_at_sale         │
//! │               │  (snapshot)     │  price frozen at sale time        │
//! │               └─────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Every persisted entity carries the `owner_id` of the user that created
//! it; repositories scope all reads to the calling owner.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Identity Context
// =============================================================================

/// The calling user's identity, threaded through every repository call.
///
/// Rows are tagged with `owner_id` on insert and all reads filter on it,
/// so one owner's rows are invisible to another. Authentication itself
/// happens outside this crate; this is only the resulting owner handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub owner_id: String,
}

impl Identity {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Identity {
            owner_id: owner_id.into(),
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// A stocked product sold by weight, with buy/sell price per unit and a
/// mutable stock quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owner this item belongs to.
    pub owner_id: String,

    /// Display name, e.g. "14.2kg Domestic Cylinder".
    pub name: String,

    /// Net weight of one unit in kilograms.
    pub weight_kg: f64,

    /// Purchase price per unit in cents.
    pub buy_price_cents: i64,

    /// Selling price per unit in cents.
    pub sell_price_cents: i64,

    /// Units currently available. Never negative after any committed
    /// operation.
    pub stock: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the buy price as a Money type.
    #[inline]
    pub fn buy_price(&self) -> Money {
        Money::from_cents(self.buy_price_cents)
    }

    /// Returns the sell price as a Money type.
    #[inline]
    pub fn sell_price(&self) -> Money {
        Money::from_cents(self.sell_price_cents)
    }

    /// Checks whether `quantity` units can be taken from current stock.
    #[inline]
    pub fn can_fill(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }
}

/// Fields for creating a new item. Identity and timestamps are assigned
/// by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub weight_kg: f64,
    pub buy_price_cents: i64,
    pub sell_price_cents: i64,
    /// Initial stock; defaults to 0 when omitted.
    #[serde(default)]
    pub stock: i64,
}

/// Partial-field update for an item. `None` fields are left unchanged.
/// Stock is deliberately absent: it only moves through `set_stock`,
/// `decrement_stock` and `restock`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub weight_kg: Option<f64>,
    pub buy_price_cents: Option<i64>,
    pub sell_price_cents: Option<i64>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer a sale can optionally reference. No invariant beyond
/// existence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a new customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial-field update for a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

// =============================================================================
// Sale
// =============================================================================

/// A single checkout transaction composed of one or more line items.
///
/// `total_amount_cents` equals the sum of `quantity × price_at_sale_cents`
/// over its lines, evaluated at creation time and never recomputed (lines
/// are immutable once written).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub owner_id: String,
    pub sale_date: DateTime<Utc>,
    pub customer_id: Option<String>,
    pub total_amount_cents: i64,
    pub notes: Option<String>,
}

impl Sale {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

/// One item/quantity/price entry within a sale.
/// Uses snapshot pattern to freeze the agreed price at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub item_id: String,
    /// Units sold.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub price_at_sale_cents: i64,
}

impl SaleLine {
    /// Returns the snapshotted unit price as Money.
    #[inline]
    pub fn price_at_sale(&self) -> Money {
        Money::from_cents(self.price_at_sale_cents)
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_at_sale_cents * self.quantity)
    }
}

/// One requested line of a sale being created: which item, how many, at
/// what agreed price. The price is the caller's agreed figure and is
/// snapshotted as-is, not re-read from the item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineRequest {
    pub item_id: String,
    pub quantity: i64,
    pub price_at_sale_cents: i64,
}

/// Everything needed to create a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSaleRequest {
    pub customer_id: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<SaleLineRequest>,
}

// =============================================================================
// Stock Shortage
// =============================================================================

/// One over-requested line detected during the stock check: the item, how
/// many units were available at check time, and how many were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockShortage {
    pub item_id: String,
    pub available: i64,
    pub requested: i64,
}

// =============================================================================
// Transaction Record
// =============================================================================

/// An independent ledger entry used only for time-windowed profit
/// reporting. Not linked to Item/Sale and carries no stock side effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionRecord {
    pub id: String,
    pub owner_id: String,
    /// Ledger date this entry belongs to (not the row's creation instant).
    pub date: NaiveDate,
    pub product_name: String,
    pub weight_kg: f64,
    pub buy_price_per_kg_cents: i64,
    pub sell_price_per_kg_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// `weight_kg × buy_price_per_kg`, rounded to cents.
    #[inline]
    pub fn total_buy(&self) -> Money {
        Money::from_weight_rate(self.weight_kg, Money::from_cents(self.buy_price_per_kg_cents))
    }

    /// `weight_kg × sell_price_per_kg`, rounded to cents.
    #[inline]
    pub fn total_sell(&self) -> Money {
        Money::from_weight_rate(self.weight_kg, Money::from_cents(self.sell_price_per_kg_cents))
    }

    /// `total_sell − total_buy`. Negative when sold below cost.
    #[inline]
    pub fn profit(&self) -> Money {
        self.total_sell() - self.total_buy()
    }
}

/// Fields for creating a new transaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransactionRecord {
    pub date: NaiveDate,
    pub product_name: String,
    pub weight_kg: f64,
    pub buy_price_per_kg_cents: i64,
    pub sell_price_per_kg_cents: i64,
}

/// Partial-field update for a transaction record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub product_name: Option<String>,
    pub weight_kg: Option<f64>,
    pub buy_price_per_kg_cents: Option<i64>,
    pub sell_price_per_kg_cents: Option<i64>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(weight_kg: f64, buy: i64, sell: i64) -> TransactionRecord {
        TransactionRecord {
            id: "t1".to_string(),
            owner_id: "u1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            product_name: "Domestic 14.2kg".to_string(),
            weight_kg,
            buy_price_per_kg_cents: buy,
            sell_price_per_kg_cents: sell,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_derived_totals() {
        let r = record(14.2, 7000, 9000);
        assert_eq!(r.total_buy().cents(), 99_400);
        assert_eq!(r.total_sell().cents(), 127_800);
        assert_eq!(r.profit().cents(), 28_400);
    }

    #[test]
    fn test_record_profit_can_be_negative() {
        let r = record(10.0, 9000, 7000);
        assert_eq!(r.profit().cents(), -200_000);
    }

    #[test]
    fn test_line_total() {
        let line = SaleLine {
            id: "l1".to_string(),
            sale_id: "s1".to_string(),
            item_id: "i1".to_string(),
            quantity: 4,
            price_at_sale_cents: 30_000,
        };
        assert_eq!(line.line_total().cents(), 120_000);
    }

    #[test]
    fn test_item_can_fill() {
        let item = Item {
            id: "i1".to_string(),
            owner_id: "u1".to_string(),
            name: "Cylinder".to_string(),
            weight_kg: 14.2,
            buy_price_cents: 70_000,
            sell_price_cents: 90_000,
            stock: 6,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(item.can_fill(6));
        assert!(!item.can_fill(7));
    }
}
