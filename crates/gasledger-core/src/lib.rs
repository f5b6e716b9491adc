//! # gasledger-core: Pure Business Logic for Gasledger
//!
//! This crate is the heart of Gasledger, an inventory-and-sales ledger for
//! a shop selling packaged goods (gas cylinders) by weight. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Gasledger Architecture                         │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                 Caller (UI / API, out of scope)             │   │
//! │  └───────────────────────────┬─────────────────────────────────┘   │
//! │                              │                                      │
//! │  ┌───────────────────────────▼─────────────────────────────────┐   │
//! │  │             ★ gasledger-core (THIS CRATE) ★                 │   │
//! │  │                                                             │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌─────────────┐              │   │
//! │  │   │  types   │  │  money   │  │ validation  │              │   │
//! │  │   │  Item    │  │  Money   │  │   rules     │              │   │
//! │  │   │  Sale    │  │          │  │   checks    │              │   │
//! │  │   └──────────┘  └──────────┘  └─────────────┘              │   │
//! │  │                                                             │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS       │   │
//! │  └───────────────────────────┬─────────────────────────────────┘   │
//! │                              │                                      │
//! │  ┌───────────────────────────▼─────────────────────────────────┐   │
//! │  │             gasledger-db (Database Layer)                   │   │
//! │  │   SQLite repositories, sale coordinator, report aggregator  │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Sale, TransactionRecord, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single sale.
///
/// Prevents runaway requests and keeps a single checkout's write sequence
/// (header + N lines + N stock decrements) bounded.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single item per line.
///
/// Guards against accidental over-ordering (e.g. typing 1000 instead
/// of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
