//! Store-level error taxonomy.
//!
//! Business-rule failures (not-found, insufficient balance, invalid
//! operation) are terminal-but-expected and carry enough context for a
//! client-fault response. `Transaction`/`Read` variants wrap store faults
//! and surface as opaque server errors.

use thiserror::Error;

/// Fault in the underlying store (connection, constraint, corrupt row).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable in {operation}: {message}")]
    Unavailable {
        operation: &'static str,
        message: String,
    },

    #[error("constraint violated in {operation}: {message}")]
    Constraint {
        operation: &'static str,
        message: String,
    },

    #[error("corrupt row in {operation}: {message}")]
    Corrupt {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn unavailable(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            operation,
            message: message.into(),
        }
    }

    pub fn constraint(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Constraint {
            operation,
            message: message.into(),
        }
    }

    pub fn corrupt(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Corrupt {
            operation,
            message: message.into(),
        }
    }
}

/// Outcome of a purchase attempt.
#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("account not found")]
    AccountNotFound,

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("insufficient balance: have {balance}, need {price}")]
    InsufficientBalance { balance: i64, price: i64 },

    #[error("transaction failed: {0}")]
    Transaction(#[from] StoreError),
}

/// Outcome of a transfer attempt.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("transfer amount must be positive")]
    InvalidAmount,

    #[error("cannot send coins to yourself")]
    SelfTransfer,

    #[error("sender not found")]
    SenderNotFound,

    #[error("receiver not found")]
    ReceiverNotFound,

    #[error("insufficient balance: have {balance}, need {amount}")]
    InsufficientBalance { balance: i64, amount: i64 },

    #[error("transaction failed: {0}")]
    Transaction(#[from] StoreError),
}

/// Outcome of a profile aggregation.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("account not found")]
    AccountNotFound,

    #[error("profile read failed: {0}")]
    Read(#[from] StoreError),
}
