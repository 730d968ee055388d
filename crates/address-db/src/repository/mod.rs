//! # Repository Module
//!
//! Database repository implementations for the address book.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AddressLifecycle / lookup / HTTP handler                               │
//! │       │                                                                 │
//! │       │  db.addresses().get_by_name("Acme-Shipping")                    │
//! │       ▼                                                                 │
//! │  AddressRepository                                                      │
//! │  ├── insert / update        (address + links, one transaction)          │
//! │  ├── get_by_name            (address + links)                           │
//! │  ├── find_company_address   (company shipping lookup)                   │
//! │  └── clear_preferred_flag   (one preferred address per party)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`AddressRepository`](address::AddressRepository) - Addresses and their links
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers and cached primary address
//! - [`ContactRepository`](contact::ContactRepository) - Contacts used for link resolution
//! - [`AddressTemplateRepository`](template::AddressTemplateRepository) - Per-country templates

pub mod address;
pub mod contact;
pub mod customer;
pub mod template;
