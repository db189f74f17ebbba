// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger error types

use thiserror::Error;

/// Errors surfaced by the capital, plan and bet ledgers.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("At boundary: {0}")]
    AtBoundary(String),

    /// A bet mutation could not update every dependent record. The
    /// surrounding transaction has been rolled back.
    #[error("Cascade failure during {operation}: {source}")]
    CascadeFailure {
        operation: &'static str,
        #[source]
        source: Box<LedgerError>,
    },

    #[error("Corrupt value in {field}: '{value}'")]
    Corrupt { field: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn not_found(what: impl Into<String>) -> Self {
        LedgerError::NotFound(what.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        LedgerError::InvalidInput(msg.into())
    }

    pub fn cascade(operation: &'static str, source: LedgerError) -> Self {
        match source {
            // Lookup failures before any write are reported as-is.
            LedgerError::NotFound(_) | LedgerError::InvalidInput(_) => source,
            other => LedgerError::CascadeFailure {
                operation,
                source: Box::new(other),
            },
        }
    }

    /// Short machine-readable code, printed alongside CLI errors.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::InvalidInput(_) => "INVALID_INPUT",
            LedgerError::AtBoundary(_) => "AT_BOUNDARY",
            LedgerError::CascadeFailure { .. } => "CASCADE_FAILURE",
            LedgerError::Corrupt { .. } => "CORRUPT_VALUE",
            LedgerError::Database(_) => "DATABASE_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
