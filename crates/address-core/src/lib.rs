//! # address-core: Pure Business Logic for Addresses
//!
//! Address rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Address Book Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    address-api (HTTP/JSON)                      │   │
//! │  │    get_shipping_address, save address, customers                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           address-db (lifecycle, lookups, repositories)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ address-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐                 │   │
//! │  │   │   types   │  │ validation │  │  display  │                 │   │
//! │  │   │  Address  │  │ company    │  │ templates │                 │   │
//! │  │   │  Customer │  │ links      │  │ rendering │                 │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Address, AddressLink, Customer, Contact, ...)
//! - [`validation`] - Company-address rules and field validation
//! - [`display`] - Address template selection and rendering
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use address_core::types::{Address, AddressLink};
//! use address_core::validation::{update_company_address, validate_reference};
//!
//! let mut address = Address::new("Acme HQ", "1 Main St", "Springfield", "United States");
//! address.links.push(AddressLink::company("Acme"));
//!
//! validate_reference(&address).unwrap();
//! update_company_address(&mut address);
//! assert!(address.is_your_company_address);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod display;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Link doctype that marks an address as belonging to one of our companies.
pub const COMPANY_DOCTYPE: &str = "Company";

/// Link doctype for customer addresses.
pub const CUSTOMER_DOCTYPE: &str = "Customer";

/// Maximum length of single-line address fields (title, lines, city).
pub const MAX_FIELD_LENGTH: usize = 140;
