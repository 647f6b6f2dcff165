//! Unified error codes for the promotion engine
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Promotion errors
//! - 8xxx: Client errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order already has a redeemed promotion
    OrderAlreadyRedeemed = 4002,
    /// Order amount is invalid
    OrderInvalidAmount = 4003,

    // ==================== 5xxx: Promotion ====================
    /// Promotion code not found
    PromotionNotFound = 5001,
    /// Promotion is deactivated
    PromotionInactive = 5002,
    /// Promotion has not started yet
    PromotionScheduled = 5003,
    /// Promotion has expired
    PromotionExpired = 5004,
    /// Promotion usage limit reached
    PromotionExhausted = 5005,
    /// Order amount below the promotion minimum
    BelowMinimumAmount = 5006,
    /// Client does not match the target audience
    AudienceMismatch = 5007,
    /// Promotion not valid on this weekday
    WeekdayRestricted = 5008,
    /// Client reached the per-client usage limit
    PerClientLimitReached = 5009,
    /// Promotion is restricted to first orders
    FirstOrderOnly = 5010,
    /// No order item matches the promotion's eligible categories/products
    ItemsNotEligible = 5011,

    /// Promotion code already exists
    PromotionCodeExists = 5101,

    // ==================== 8xxx: Client ====================
    /// Client not found
    ClientNotFound = 8001,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyRedeemed => "Order already has a redeemed promotion",
            ErrorCode::OrderInvalidAmount => "Order amount is invalid",

            // Promotion
            ErrorCode::PromotionNotFound => "Promotion code not found",
            ErrorCode::PromotionInactive => "This promotion is not active",
            ErrorCode::PromotionScheduled => "This promotion has not started yet",
            ErrorCode::PromotionExpired => "This promotion has expired",
            ErrorCode::PromotionExhausted => "This promotion has reached its usage limit",
            ErrorCode::BelowMinimumAmount => "Order amount is below the promotion minimum",
            ErrorCode::AudienceMismatch => "This promotion is not available for your account",
            ErrorCode::WeekdayRestricted => "This promotion is not valid today",
            ErrorCode::PerClientLimitReached => "You have already used this promotion",
            ErrorCode::FirstOrderOnly => "This promotion is only valid on a first order",
            ErrorCode::ItemsNotEligible => "No item in the order is eligible for this promotion",
            ErrorCode::PromotionCodeExists => "Promotion code already exists",

            // Client
            ErrorCode::ClientNotFound => "Client not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyRedeemed),
            4003 => Ok(ErrorCode::OrderInvalidAmount),

            // Promotion
            5001 => Ok(ErrorCode::PromotionNotFound),
            5002 => Ok(ErrorCode::PromotionInactive),
            5003 => Ok(ErrorCode::PromotionScheduled),
            5004 => Ok(ErrorCode::PromotionExpired),
            5005 => Ok(ErrorCode::PromotionExhausted),
            5006 => Ok(ErrorCode::BelowMinimumAmount),
            5007 => Ok(ErrorCode::AudienceMismatch),
            5008 => Ok(ErrorCode::WeekdayRestricted),
            5009 => Ok(ErrorCode::PerClientLimitReached),
            5010 => Ok(ErrorCode::FirstOrderOnly),
            5011 => Ok(ErrorCode::ItemsNotEligible),
            5101 => Ok(ErrorCode::PromotionCodeExists),

            // Client
            8001 => Ok(ErrorCode::ClientNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            other => Err(InvalidErrorCode(other)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
