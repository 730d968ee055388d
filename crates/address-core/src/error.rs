//! # Error Types
//!
//! Domain-specific error types for address-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  address-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  address-db errors (separate crate)                                    │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - CoreError | DbError during a save              │
//! │                                                                         │
//! │  address-api errors (in app)                                           │
//! │  └── ApiError         - What HTTP clients see (serialized)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Address business rule errors.
///
/// Every variant carries a user-facing message; [`CoreError::title`] gives the
/// short dialog title shown next to it.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A company address has no Company row in its links.
    ///
    /// ## When This Occurs
    /// ```text
    /// Save Address { is_your_company_address: true, links: [Customer "Bob"] }
    ///      │
    ///      ▼
    /// validate_reference() → no link with doctype "Company"
    ///      │
    ///      ▼
    /// CompanyNotLinked → save aborted
    /// ```
    #[error("Address needs to be linked to a Company. Please add a row for Company in the Links table.")]
    CompanyNotLinked,

    /// Address cannot be found.
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// Customer cannot be found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Short title for the error dialog.
    pub fn title(&self) -> &'static str {
        match self {
            CoreError::CompanyNotLinked => "Company Not Linked",
            CoreError::AddressNotFound(_) => "Address Not Found",
            CoreError::CustomerNotFound(_) => "Customer Not Found",
            CoreError::Validation(_) => "Invalid Address",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., the same link twice).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
