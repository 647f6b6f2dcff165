//! Promotion Engine
//!
//! Promotion evaluation and redemption for the made-to-order storefront.
//! Given a candidate order and a promo code, the engine decides whether the
//! code is redeemable, computes the discount, and durably accounts for each
//! redemption.
//!
//! # Module Structure
//!
//! ```text
//! promo-engine/src/
//! ├── core/          # Configuration
//! ├── db/            # SQLite pool, schema, repositories
//! ├── evaluation/    # Status derivation, gating, discount math, engine facade
//! ├── money/         # Decimal money arithmetic and boundary validation
//! └── utils/         # Logging
//! ```
//!
//! # Contract
//!
//! Two entry points, both on [`PromotionEngine`]:
//!
//! - `validate(code, order)`: read-only preview, callable repeatedly with
//!   no side effects (cart / checkout-preview time)
//! - `redeem(code, order)`: transactional, exactly once per confirmed
//!   order; consumes one use and updates the attribution counters

pub mod core;
pub mod db;
pub mod evaluation;
pub mod money;
pub mod utils;

// Re-export public types
pub use self::core::Config;
pub use db::DbService;
pub use evaluation::PromotionEngine;

// Re-export unified error types from shared
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
