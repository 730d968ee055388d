//! # Domain Types
//!
//! Address book domain types.
//!
//! ## Type Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌─────────────────┐  1    n  ┌─────────────────┐                      │
//! │  │    Address      │─────────►│  AddressLink    │                      │
//! │  │  ─────────────  │          │  ─────────────  │                      │
//! │  │  name           │          │  link_doctype   │──► "Company"         │
//! │  │  is_your_       │          │  link_name      │──► "Customer"        │
//! │  │  company_address│          │  link_title     │──► ...               │
//! │  │  is_shipping_   │          └─────────────────┘                      │
//! │  │  address        │                                                    │
//! │  └────────▲────────┘                                                    │
//! │           │ customer_primary_address                                    │
//! │  ┌────────┴────────┐          ┌─────────────────┐                      │
//! │  │    Customer     │          │ AddressTemplate │                      │
//! │  │  primary_address│◄─ text ──│  country        │                      │
//! │  │  (rendered)     │          │  template       │                      │
//! │  └─────────────────┘          └─────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Links are polymorphic: `(link_doctype, link_name)` can point at any entity
//! type, so they are plain strings rather than foreign keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::COMPANY_DOCTYPE;

// =============================================================================
// Address Type
// =============================================================================

/// What an address is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum AddressType {
    #[default]
    Billing,
    Shipping,
    Office,
    Personal,
    Plant,
    Postal,
    Shop,
    Subsidiary,
    Warehouse,
    Current,
    Permanent,
    Other,
}

impl std::fmt::Display for AddressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AddressType::Billing => "Billing",
            AddressType::Shipping => "Shipping",
            AddressType::Office => "Office",
            AddressType::Personal => "Personal",
            AddressType::Plant => "Plant",
            AddressType::Postal => "Postal",
            AddressType::Shop => "Shop",
            AddressType::Subsidiary => "Subsidiary",
            AddressType::Warehouse => "Warehouse",
            AddressType::Current => "Current",
            AddressType::Permanent => "Permanent",
            AddressType::Other => "Other",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Address Link
// =============================================================================

/// A row of the address's Links table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AddressLink {
    /// Entity type the address is attached to ("Company", "Customer", ...).
    pub link_doctype: String,

    /// Identifier of the linked entity.
    pub link_name: String,

    /// Display title of the linked entity.
    #[serde(default)]
    pub link_title: Option<String>,
}

impl AddressLink {
    /// Creates a link to an arbitrary entity.
    pub fn new(doctype: impl Into<String>, name: impl Into<String>) -> Self {
        AddressLink {
            link_doctype: doctype.into(),
            link_name: name.into(),
            link_title: None,
        }
    }

    /// Creates a link to one of our companies.
    pub fn company(name: impl Into<String>) -> Self {
        AddressLink::new(COMPANY_DOCTYPE, name)
    }

    /// Returns true if this row references a Company.
    #[inline]
    pub fn is_company(&self) -> bool {
        self.link_doctype == COMPANY_DOCTYPE
    }
}

// =============================================================================
// Address
// =============================================================================

/// A postal address and the entities it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Address {
    /// Unique identifier. Empty until the address is named on first save.
    #[serde(default)]
    pub name: String,

    /// Human title, usually the owning party's name.
    #[serde(default)]
    pub address_title: String,

    #[serde(default)]
    pub address_type: AddressType,

    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    pub country: String,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub email_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub fax: Option<String>,

    /// Preferred billing address of the linked parties.
    #[serde(default)]
    pub is_primary_address: bool,

    /// Preferred shipping address of the linked parties.
    #[serde(default)]
    pub is_shipping_address: bool,

    /// Address belongs to one of our own companies.
    #[serde(default)]
    pub is_your_company_address: bool,

    #[serde(default)]
    pub disabled: bool,

    /// Email of the user who created the address.
    #[serde(default)]
    pub owner: Option<String>,

    #[ts(as = "String")]
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    /// Links table (ordered). Loaded separately from `address_links`.
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub links: Vec<AddressLink>,
}

impl Address {
    /// Creates an unsaved address with the required fields set.
    pub fn new(
        title: impl Into<String>,
        line1: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Address {
            name: String::new(),
            address_title: title.into(),
            address_type: AddressType::default(),
            address_line1: line1.into(),
            address_line2: None,
            city: city.into(),
            county: None,
            state: None,
            country: country.into(),
            pincode: None,
            email_id: None,
            phone: None,
            fax: None,
            is_primary_address: false,
            is_shipping_address: false,
            is_your_company_address: false,
            disabled: false,
            owner: None,
            created_at: now,
            updated_at: now,
            links: Vec::new(),
        }
    }

    /// Returns true if any Links row references a Company.
    pub fn has_company_link(&self) -> bool {
        self.links.iter().any(AddressLink::is_company)
    }

    /// Returns true if the address is linked to the given entity.
    pub fn has_link(&self, doctype: &str, name: &str) -> bool {
        self.links
            .iter()
            .any(|l| l.link_doctype == doctype && l.link_name == name)
    }

    /// Base name for a new address: `{address_title}-{address_type}`.
    pub fn autoname(&self) -> String {
        format!("{}-{}", self.address_title.trim(), self.address_type)
    }

    /// Field values available to address templates.
    ///
    /// Optional fields resolve to an empty string.
    pub fn template_context(&self) -> Vec<(&'static str, String)> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            ("name", self.name.clone()),
            ("address_title", self.address_title.clone()),
            ("address_type", self.address_type.to_string()),
            ("address_line1", self.address_line1.clone()),
            ("address_line2", opt(&self.address_line2)),
            ("city", self.city.clone()),
            ("county", opt(&self.county)),
            ("state", opt(&self.state)),
            ("country", self.country.clone()),
            ("pincode", opt(&self.pincode)),
            ("email_id", opt(&self.email_id)),
            ("phone", opt(&self.phone)),
            ("fax", opt(&self.fax)),
        ]
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer, with its primary address cached as rendered text.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub name: String,
    pub customer_name: String,
    #[serde(default)]
    pub email_id: Option<String>,

    /// Name of the Address chosen as the customer's primary address.
    #[serde(default)]
    pub customer_primary_address: Option<String>,

    /// Rendered display text of `customer_primary_address`.
    #[serde(default)]
    pub primary_address: Option<String>,
}

// =============================================================================
// Contact
// =============================================================================

/// A contact person. Its links are copied onto addresses the person creates.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Contact {
    #[serde(default)]
    pub name: String,
    pub email_id: String,
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub links: Vec<AddressLink>,
}

// =============================================================================
// Address Template
// =============================================================================

/// Per-country layout used to render an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AddressTemplate {
    pub country: String,
    pub template: String,
    #[serde(default)]
    pub is_default: bool,
}

// =============================================================================
// Shipping Address
// =============================================================================

/// Result of a company shipping-address lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingAddress {
    /// Address name.
    pub name: String,
    /// Address rendered through its template.
    pub display: String,
}
