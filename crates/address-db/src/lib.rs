//! # address-db: Database Layer for the Address Book
//!
//! SQLite storage for addresses, customers, contacts and address templates,
//! plus the address save lifecycle and the shipping-address lookup.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Address Book Data Flow                           │
//! │                                                                         │
//! │  HTTP handler (save address / get_shipping_address)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    address-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌──────────────┐     │   │
//! │  │   │  lifecycle    │   │  Repositories │   │  Migrations  │     │   │
//! │  │   │  lookup       │──►│  Address      │   │  (embedded)  │     │   │
//! │  │   │               │   │  Customer     │   │              │     │   │
//! │  │   │               │   │  Contact      │   │ 001_address_ │     │   │
//! │  │   │               │   │  Template     │   │ schema.sql   │     │   │
//! │  │   └───────────────┘   └───────┬───────┘   └──────────────┘     │   │
//! │  │                               │  Database (pool.rs)            │   │
//! │  └───────────────────────────────┼─────────────────────────────────┘   │
//! │                                  ▼                                      │
//! │                           SQLite Database                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`repository`] - Repository implementations
//! - [`lifecycle`] - Address save hooks (validate, link, on_update)
//! - [`lookup`] - Company shipping address and display rendering
//!
//! ## Usage
//!
//! ```rust,ignore
//! use address_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("addresses.db")).await?;
//!
//! let saved = db.lifecycle().save(address).await?;
//! let shipping = address_db::get_shipping_address(&db, "Acme", None).await?;
//! ```

pub mod error;
pub mod lifecycle;
pub mod lookup;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use lifecycle::AddressLifecycle;
pub use lookup::{get_address_display, get_shipping_address};
pub use pool::{Database, DbConfig};

pub use repository::address::{AddressRepository, PreferredFlag};
pub use repository::contact::ContactRepository;
pub use repository::customer::CustomerRepository;
pub use repository::template::AddressTemplateRepository;
