//! # Address Lookups
//!
//! Read-only queries that render addresses for documents.
//!
//! ## Company Shipping Address
//! ```text
//! get_shipping_address("Acme", address)
//!      │
//!      ▼
//! candidates: linked to Company "Acme" AND is_your_company_address
//!      │
//!      ├── address given AND linked to Acme ──► that address only
//!      │
//!      └── otherwise ─────────────────────────► is_shipping_address only
//!      │
//!      ▼
//! newest match ──► ShippingAddress { name, display } | None
//! ```

use tracing::debug;

use crate::error::DbResult;
use crate::pool::Database;
use address_core::{ShippingAddress, COMPANY_DOCTYPE};

/// Resolves the shipping address of one of our companies.
///
/// ## Arguments
/// * `company` - Company name
/// * `address` - Preferred address; honoured only when it is linked to the company
///
/// ## Returns
/// * `Ok(Some(ShippingAddress))` - name and rendered display text
/// * `Ok(None)` - the company has no matching address
pub async fn get_shipping_address(
    db: &Database,
    company: &str,
    address: Option<&str>,
) -> DbResult<Option<ShippingAddress>> {
    let repo = db.addresses();

    let mut exact = address.map(str::trim).filter(|a| !a.is_empty());
    if let Some(name) = exact {
        if !repo.is_linked_to(name, COMPANY_DOCTYPE, company).await? {
            debug!(company = %company, address = %name, "Address not linked to company, using shipping address");
            exact = None;
        }
    }

    let Some(found) = repo.find_company_address(company, exact, true).await? else {
        debug!(company = %company, "No company shipping address");
        return Ok(None);
    };

    let display = db.templates().render(&found).await?;

    Ok(Some(ShippingAddress {
        name: found.name,
        display,
    }))
}

/// Renders a stored address by name.
///
/// ## Returns
/// `Ok(None)` when the address doesn't exist.
pub async fn get_address_display(db: &Database, name: &str) -> DbResult<Option<String>> {
    match db.addresses().get_by_name(name).await? {
        Some(address) => Ok(Some(db.templates().render(&address).await?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use address_core::{Address, AddressLink, AddressTemplate, AddressType};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn save(db: &Database, title: &str, kind: AddressType, company: &str, shipping: bool) -> String {
        let mut a = Address::new(title, format!("{} Road", title), "Springfield", "United States");
        a.address_type = kind;
        a.is_shipping_address = shipping;
        a.links.push(AddressLink::company(company));
        db.lifecycle().save(a).await.unwrap().name
    }

    #[tokio::test]
    async fn test_returns_flagged_shipping_address() {
        let db = db().await;
        save(&db, "Acme HQ", AddressType::Billing, "Acme", false).await;
        let ship = save(&db, "Acme Dock", AddressType::Shipping, "Acme", true).await;

        let found = get_shipping_address(&db, "Acme", None).await.unwrap().unwrap();
        assert_eq!(found.name, ship);
        assert_eq!(
            found.display,
            "Acme Dock Road<br>Springfield<br>United States<br>"
        );
    }

    #[tokio::test]
    async fn test_none_without_shipping_address() {
        let db = db().await;
        save(&db, "Acme HQ", AddressType::Billing, "Acme", false).await;

        assert!(get_shipping_address(&db, "Acme", None).await.unwrap().is_none());
        assert!(get_shipping_address(&db, "Globex", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_linked_address_is_used() {
        let db = db().await;
        let hq = save(&db, "Acme HQ", AddressType::Billing, "Acme", false).await;
        save(&db, "Acme Dock", AddressType::Shipping, "Acme", true).await;

        let found = get_shipping_address(&db, "Acme", Some(&hq)).await.unwrap().unwrap();
        assert_eq!(found.name, hq);
    }

    #[tokio::test]
    async fn test_unlinked_address_falls_back_to_shipping_flag() {
        let db = db().await;
        let other = save(&db, "Globex HQ", AddressType::Billing, "Globex", false).await;
        let ship = save(&db, "Acme Dock", AddressType::Shipping, "Acme", true).await;

        let found = get_shipping_address(&db, "Acme", Some(&other)).await.unwrap().unwrap();
        assert_eq!(found.name, ship);

        let found = get_shipping_address(&db, "Acme", Some("No-Such-Address")).await.unwrap().unwrap();
        assert_eq!(found.name, ship);
    }

    #[tokio::test]
    async fn test_non_company_addresses_are_ignored() {
        let db = db().await;
        // Linked to a customer named like the company: not a company address.
        let mut a = Address::new("Acme", "1 Main St", "Springfield", "United States");
        a.is_shipping_address = true;
        a.links.push(AddressLink::new("Customer", "Acme"));
        db.lifecycle().save(a).await.unwrap();

        assert!(get_shipping_address(&db, "Acme", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_display_uses_country_template() {
        let db = db().await;
        db.templates()
            .upsert(&AddressTemplate {
                country: "United States".to_string(),
                template: "{{address_line1}}\n{{city}}, {{state}}".to_string(),
                is_default: false,
            })
            .await
            .unwrap();
        save(&db, "Acme Dock", AddressType::Shipping, "Acme", true).await;

        let found = get_shipping_address(&db, "Acme", None).await.unwrap().unwrap();
        assert_eq!(found.display, "Acme Dock Road<br>Springfield,<br>");

        let display = get_address_display(&db, &found.name).await.unwrap();
        assert_eq!(display.as_deref(), Some(found.display.as_str()));
        assert!(get_address_display(&db, "missing").await.unwrap().is_none());
    }
}
