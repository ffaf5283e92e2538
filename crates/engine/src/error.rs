//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidAmount`] thrown when an amount is not strictly positive or
//!   cannot be parsed.
//! - [`HierarchyMismatch`] thrown when a subcategory does not belong to the
//!   category named alongside it.
//! - [`UnauthorizedParent`] thrown when a child entry is created under a
//!   parent the caller does not own.
//! - [`KeyNotFound`] thrown when an item is not found *or* not owned by the
//!   caller; the two cases read the same so ids cannot be probed.
//! - [`ReferencedByLedger`] thrown when a catalog row cannot be reclaimed
//!   because money flows still reference it.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`HierarchyMismatch`]: EngineError::HierarchyMismatch
//!  [`UnauthorizedParent`]: EngineError::UnauthorizedParent
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ReferencedByLedger`]: EngineError::ReferencedByLedger
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Hierarchy mismatch: {0}")]
    HierarchyMismatch(String),
    #[error("Unauthorized parent: {0}")]
    UnauthorizedParent(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Referenced by ledger: {0}")]
    ReferencedByLedger(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::HierarchyMismatch(a), Self::HierarchyMismatch(b)) => a == b,
            (Self::UnauthorizedParent(a), Self::UnauthorizedParent(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ReferencedByLedger(a), Self::ReferencedByLedger(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
