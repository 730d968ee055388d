//! # Validation Module
//!
//! Address rules applied on every save.
//!
//! ## Save Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Address Validation                                 │
//! │                                                                         │
//! │  validate_reference()        ← company flag needs a Company link       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  update_company_address()    ← Company link sets the company flag      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_base()                                                       │
//! │  ├── default title from first link                                     │
//! │  ├── required fields / lengths / email                                 │
//! │  ├── link rows well-formed, no duplicates                              │
//! │  └── link titles filled in                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  link_address (address-db)   ← skipped for company addresses           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`validate_company_address`] runs the first two steps; the
//! database-backed steps live in `address-db`'s lifecycle.

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Address;
use crate::MAX_FIELD_LENGTH;

/// Result type for field validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Company Address Rules
// =============================================================================

/// Rejects a company address that is not linked to any Company.
///
/// ## Example
/// ```rust
/// use address_core::types::{Address, AddressLink};
/// use address_core::validation::validate_reference;
///
/// let mut address = Address::new("Acme", "1 Main St", "Springfield", "United States");
/// address.is_your_company_address = true;
/// assert!(validate_reference(&address).is_err());
///
/// address.links.push(AddressLink::company("Acme"));
/// assert!(validate_reference(&address).is_ok());
/// ```
pub fn validate_reference(address: &Address) -> CoreResult<()> {
    if address.is_your_company_address && !address.has_company_link() {
        return Err(CoreError::CompanyNotLinked);
    }

    Ok(())
}

/// Flags the address as a company address when any link is a Company.
///
/// Never clears the flag.
pub fn update_company_address(address: &mut Address) {
    if address.has_company_link() {
        address.is_your_company_address = true;
    }
}

/// Whether owner-based link resolution may run for this address.
///
/// Company addresses keep exactly the links they were saved with.
#[inline]
pub fn should_resolve_links(address: &Address) -> bool {
    !address.is_your_company_address
}

// =============================================================================
// Base Validation
// =============================================================================

/// Defaults a blank title to the first link's name.
pub fn set_default_title(address: &mut Address) {
    if address.address_title.trim().is_empty() {
        if let Some(link) = address.links.first() {
            address.address_title = link.link_name.clone();
        }
    }
}

/// Fills in missing link titles with the link name.
pub fn set_link_titles(address: &mut Address) {
    for link in &mut address.links {
        if link.link_title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            link.link_title = Some(link.link_name.clone());
        }
    }
}

/// Validates a required single-line field.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_FIELD_LENGTH,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@`, non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
///
/// ## Example
/// ```rust
/// use address_core::validation::validate_email;
///
/// assert!(validate_email("billing@acme.com").is_ok());
/// assert!(validate_email("acme.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email_id".to_string(),
        reason: reason.to_string(),
    };

    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("missing '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must be of the form name@domain"));
    }

    match domain.find('.') {
        Some(pos) if pos > 0 && !domain.ends_with('.') => Ok(()),
        _ => Err(invalid("domain must contain a dot")),
    }
}

/// Validates the links table.
///
/// Rows need both a doctype and a name, and the same entity may only be
/// linked once.
pub fn validate_links(address: &Address) -> ValidationResult<()> {
    let mut seen = HashSet::new();

    for link in &address.links {
        validate_required("link_doctype", &link.link_doctype)?;
        validate_required("link_name", &link.link_name)?;

        if !seen.insert((link.link_doctype.as_str(), link.link_name.as_str())) {
            return Err(ValidationError::Duplicate {
                field: "link".to_string(),
                value: format!("{}: {}", link.link_doctype, link.link_name),
            });
        }
    }

    Ok(())
}

/// Field-level validation shared by every address.
pub fn validate_base(address: &mut Address) -> ValidationResult<()> {
    set_default_title(address);

    validate_required("address_title", &address.address_title)?;
    validate_required("address_line1", &address.address_line1)?;
    validate_required("city", &address.city)?;
    validate_required("country", &address.country)?;

    if let Some(line2) = address.address_line2.as_deref() {
        if line2.chars().count() > MAX_FIELD_LENGTH {
            return Err(ValidationError::TooLong {
                field: "address_line2".to_string(),
                max: MAX_FIELD_LENGTH,
            });
        }
    }

    if let Some(email) = address.email_id.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }

    validate_links(address)?;
    set_link_titles(address);

    Ok(())
}

/// Company-address rules, in save order.
///
/// [`validate_reference`] runs first, before the flag can be set from links,
/// then [`update_company_address`]. Link resolution and [`validate_base`]
/// follow in `address-db`'s lifecycle.
pub fn validate_company_address(address: &mut Address) -> CoreResult<()> {
    validate_reference(address)?;
    update_company_address(address);
    Ok(())
}
