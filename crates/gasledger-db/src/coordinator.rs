//! # Sale Coordinator
//!
//! The one place in Gasledger where several rows must stay consistent:
//! a sale header, its line items, and each line's item stock.
//!
//! ## Write Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     create_sale write path                          │
//! │                                                                     │
//! │  1. VALIDATE            lines non-empty, qty > 0, price >= 0       │
//! │          │              (fail here = no writes at all)             │
//! │          ▼                                                          │
//! │  2. STOCK CHECK         read every item, reject over-requests      │
//! │          │              (fail here = no writes at all)             │
//! │          ▼                                                          │
//! │  3. SALE HEADER         insert sales row with computed total       │
//! │          │              (fail here = nothing to undo)              │
//! │          ▼                                                          │
//! │  4. PER LINE, IN ORDER  insert sale_lines row                      │
//! │          │              conditional stock decrement                │
//! │          │                                                          │
//! │          ├── all lines ok ──► return persisted Sale                │
//! │          │                                                          │
//! │          └── any failure ──► COMPENSATE:                           │
//! │                              restock earlier decrements (reverse   │
//! │                              order), delete header (lines cascade),│
//! │                              return PartialFailure                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The step-2 check is advisory: it gives fast, write-free rejection for
//! the common case. Correctness against concurrent sales comes from the
//! conditional decrement in step 4 - two callers can both pass step 2,
//! but only one of them can win each unit of stock.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::item::StockDecrement;
use gasledger_core::validation::{
    validate_line_count, validate_notes, validate_price_cents, validate_quantity,
};
use gasledger_core::{
    CoreError, CreateSaleRequest, Identity, Money, Sale, SaleLine, StockShortage, ValidationError,
};

// =============================================================================
// Errors
// =============================================================================

/// Errors from the multi-step sale operations.
#[derive(Debug, thiserror::Error)]
pub enum SaleError {
    /// A business rule rejected the request: malformed input, an
    /// unknown item/customer/sale reference, or insufficient stock.
    /// Always surfaced before any write survives.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The underlying store failed for reasons unrelated to business
    /// rules.
    #[error("Persistence error: {0}")]
    Persistence(#[from] DbError),

    /// A multi-step sale write failed after some sub-writes succeeded.
    /// Compensation ran before this was surfaced; `compensated` reports
    /// whether every reversal went through.
    #[error(
        "Sale {sale_id} failed at item {failed_item_id} after partial write \
         (compensated: {compensated}): {cause}"
    )]
    PartialFailure {
        /// Id the sale header was written (and then deleted) under.
        sale_id: String,
        /// The line on which the sequence stopped.
        failed_item_id: String,
        /// Items whose stock decrements were reversed.
        rolled_back_items: Vec<String>,
        /// True when every compensating write succeeded; false means
        /// manual reconciliation is needed (details in the log).
        compensated: bool,
        /// What actually went wrong on the failing line.
        #[source]
        cause: Box<SaleError>,
    },
}

impl From<ValidationError> for SaleError {
    fn from(err: ValidationError) -> Self {
        SaleError::Core(CoreError::Validation(err))
    }
}

/// Result type for coordinator operations.
pub type SaleResult<T> = Result<T, SaleError>;

// =============================================================================
// Compensation Log
// =============================================================================

/// One line's progress through step 4, recorded so the rollback path
/// knows exactly what to reverse.
#[derive(Debug)]
struct AppliedLine {
    item_id: String,
    quantity: i64,
    stock_decremented: bool,
}

// =============================================================================
// Sale Coordinator
// =============================================================================

/// Orchestrates creation and deletion of sales on behalf of one owner.
///
/// ## Usage
/// ```rust,ignore
/// let coordinator = db.sale_coordinator(Identity::new(user_id));
/// let sale = coordinator.create_sale(request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SaleCoordinator {
    db: Database,
    identity: Identity,
}

impl SaleCoordinator {
    /// Creates a coordinator acting as the given identity.
    pub fn new(db: Database, identity: Identity) -> Self {
        SaleCoordinator { db, identity }
    }

    /// Creates a sale: header, lines, and one stock decrement per line.
    ///
    /// On success exactly one sale, N lines and N decrements have been
    /// written. On any error the store is back in its pre-call state
    /// (for [`SaleError::PartialFailure`], via best-effort compensation;
    /// check its `compensated` flag).
    ///
    /// The agreed per-line prices are snapshotted as given; the sale
    /// total is their quantity-weighted sum, fixed at creation.
    pub async fn create_sale(&self, request: CreateSaleRequest) -> SaleResult<Sale> {
        validate_line_count(request.lines.len())?;
        for line in &request.lines {
            validate_quantity(line.quantity)?;
            validate_price_cents(line.price_at_sale_cents)?;
        }
        if let Some(notes) = &request.notes {
            validate_notes(notes)?;
        }

        let items = self.db.items();
        let sales = self.db.sales();

        if let Some(customer_id) = &request.customer_id {
            if self
                .db
                .customers()
                .get_by_id(&self.identity, customer_id)
                .await?
                .is_none()
            {
                return Err(CoreError::CustomerNotFound(customer_id.clone()).into());
            }
        }

        // Advisory stock check: reject the common over-request case
        // before any mutation begins. Collects every shortage so the
        // caller can report them all at once.
        let mut shortages = Vec::new();
        for line in &request.lines {
            let item = items
                .get_by_id(&self.identity, &line.item_id)
                .await?
                .ok_or_else(|| CoreError::ItemNotFound(line.item_id.clone()))?;

            if !item.can_fill(line.quantity) {
                shortages.push(StockShortage {
                    item_id: item.id,
                    available: item.stock,
                    requested: line.quantity,
                });
            }
        }
        if !shortages.is_empty() {
            return Err(CoreError::InsufficientStock(shortages).into());
        }

        let total: Money = request
            .lines
            .iter()
            .map(|line| Money::from_cents(line.price_at_sale_cents) * line.quantity)
            .sum();

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            owner_id: self.identity.owner_id.clone(),
            sale_date: Utc::now(),
            customer_id: request.customer_id.clone(),
            total_amount_cents: total.cents(),
            notes: request.notes.clone(),
        };

        // First write. If this fails there is nothing to undo.
        sales.insert_sale(&sale).await?;

        // Per line, in order: line row, then stock. Progress is recorded
        // in `applied` so compensation knows what to reverse.
        let mut applied: Vec<AppliedLine> = Vec::new();

        for line in &request.lines {
            let sale_line = SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                item_id: line.item_id.clone(),
                quantity: line.quantity,
                price_at_sale_cents: line.price_at_sale_cents,
            };

            if let Err(e) = sales.insert_line(&sale_line).await {
                return Err(self
                    .compensate(&sale, &line.item_id, applied, SaleError::Persistence(e))
                    .await);
            }

            applied.push(AppliedLine {
                item_id: line.item_id.clone(),
                quantity: line.quantity,
                stock_decremented: false,
            });

            match items
                .decrement_stock(&self.identity, &line.item_id, line.quantity)
                .await
            {
                Ok(StockDecrement::Applied(_)) => {
                    // this line's entry was pushed just above
                    applied.last_mut().unwrap().stock_decremented = true;
                }
                Ok(StockDecrement::Insufficient { available }) => {
                    // A concurrent sale (or a duplicate line) consumed
                    // the stock between the advisory check and here.
                    let cause = SaleError::Core(CoreError::InsufficientStock(vec![StockShortage {
                        item_id: line.item_id.clone(),
                        available,
                        requested: line.quantity,
                    }]));
                    return Err(self.compensate(&sale, &line.item_id, applied, cause).await);
                }
                Err(e) => {
                    return Err(self
                        .compensate(&sale, &line.item_id, applied, SaleError::Persistence(e))
                        .await);
                }
            }
        }

        info!(
            sale_id = %sale.id,
            total = %sale.total_amount_cents,
            lines = request.lines.len(),
            "Sale created"
        );

        Ok(sale)
    }

    /// Deletes a sale; the store cascades deletion of its lines.
    ///
    /// Item stock is intentionally NOT restored: deleting a sale is a
    /// destructive administrative action, not a return/refund. A future
    /// "cancel sale" operation would reverse stock explicitly.
    pub async fn delete_sale(&self, id: &str) -> SaleResult<()> {
        match self.db.sales().delete(&self.identity, id).await {
            Ok(()) => {
                info!(sale_id = %id, "Sale deleted");
                Ok(())
            }
            Err(DbError::NotFound { .. }) => Err(CoreError::SaleNotFound(id.to_string()).into()),
            Err(e) => Err(SaleError::Persistence(e)),
        }
    }

    /// Reverses everything `create_sale` managed to write before the
    /// failing line, then wraps the cause in a `PartialFailure`.
    ///
    /// Walks the applied-line log in reverse and restores each recorded
    /// decrement, then deletes the sale header (the schema cascades the
    /// already-inserted lines). Each reversal is attempted even if an
    /// earlier one fails; failures are logged and reported through the
    /// `compensated` flag.
    async fn compensate(
        &self,
        sale: &Sale,
        failed_item_id: &str,
        applied: Vec<AppliedLine>,
        cause: SaleError,
    ) -> SaleError {
        warn!(
            sale_id = %sale.id,
            failed_item_id = %failed_item_id,
            applied = applied.len(),
            "Sale write failed partway; compensating"
        );

        let items = self.db.items();
        let mut compensated = true;
        let mut rolled_back_items = Vec::new();

        for entry in applied.iter().rev() {
            if !entry.stock_decremented {
                continue;
            }
            match items
                .restock(&self.identity, &entry.item_id, entry.quantity)
                .await
            {
                Ok(_) => rolled_back_items.push(entry.item_id.clone()),
                Err(e) => {
                    compensated = false;
                    warn!(
                        sale_id = %sale.id,
                        item_id = %entry.item_id,
                        quantity = entry.quantity,
                        error = %e,
                        "Failed to restore stock during compensation"
                    );
                }
            }
        }

        if let Err(e) = self.db.sales().delete(&self.identity, &sale.id).await {
            compensated = false;
            warn!(
                sale_id = %sale.id,
                error = %e,
                "Failed to delete sale header during compensation"
            );
        }

        SaleError::PartialFailure {
            sale_id: sale.id.clone(),
            failed_item_id: failed_item_id.to_string(),
            rolled_back_items,
            compensated,
            cause: Box::new(cause),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
