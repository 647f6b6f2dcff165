//! Shared types for the promotion engine
//!
//! Common types used across the workspace: domain models, the unified
//! error system, and small time/ID utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
