//! # gasledger-db: Database Layer for Gasledger
//!
//! This crate provides database access for Gasledger. It uses SQLite for
//! local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Gasledger Data Flow                           │
//! │                                                                     │
//! │  Caller (UI action: checkout, stock edit, dashboard)                │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                  gasledger-db (THIS CRATE)                  │   │
//! │  │                                                             │   │
//! │  │  ┌─────────────┐   ┌──────────────┐   ┌─────────────────┐  │   │
//! │  │  │  Database   │   │ Repositories │   │ SaleCoordinator │  │   │
//! │  │  │  (pool.rs)  │◄──│ item, sale,  │◄──│ ReportAggregator│  │   │
//! │  │  │  SqlitePool │   │ customer,    │   │ (orchestration) │  │   │
//! │  │  │  Migrations │   │ transaction  │   │                 │  │   │
//! │  │  └─────────────┘   └──────────────┘   └─────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database file (WAL mode, foreign keys on)                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Per-entity storage access
//! - [`coordinator`] - The multi-step sale write and its compensation
//! - [`reports`] - Date-windowed profit summaries
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gasledger_db::{Database, DbConfig};
//! use gasledger_core::Identity;
//!
//! let db = Database::new(DbConfig::new("path/to/gasledger.db")).await?;
//! let coordinator = db.sale_coordinator(Identity::new(user_id));
//! let sale = coordinator.create_sale(request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coordinator;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use coordinator::{SaleCoordinator, SaleError};
pub use error::DbError;
pub use pool::{Database, DbConfig};
pub use reports::{RangeSummary, ReportAggregator, ReportError};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::item::{ItemRepository, StockDecrement};
pub use repository::sale::SaleRepository;
pub use repository::transaction::TransactionRepository;
