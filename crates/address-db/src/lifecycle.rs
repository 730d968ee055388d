//! # Address Lifecycle
//!
//! The hooks that run when an address is saved.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AddressLifecycle::save                           │
//! │                                                                         │
//! │  stored row? ─► keep its owner and created_at                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate()                                                             │
//! │  ├── validate_company_address()  Company link ⇔ company flag            │
//! │  ├── link_address()            skipped for company addresses            │
//! │  └── validate_base()           fields, links, titles                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  name (new only) ─► insert / update   ← address + links, one tx         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  clear preferred flags on sibling addresses                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  on_update()                                                            │
//! │  └── render display text ─► every Customer whose                        │
//! │      customer_primary_address = this address                            │
//! │      (one independent write per customer)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{debug, info};

use crate::error::ServiceResult;
use crate::pool::Database;
use crate::repository::address::PreferredFlag;
use address_core::validation;
use address_core::Address;

/// Runs validation, persistence and post-save hooks for addresses.
#[derive(Debug, Clone)]
pub struct AddressLifecycle {
    db: Database,
}

impl AddressLifecycle {
    /// Creates a lifecycle bound to a database.
    pub fn new(db: Database) -> Self {
        AddressLifecycle { db }
    }

    /// Validates an address before it is written.
    ///
    /// Fails with `CoreError::CompanyNotLinked` when the company flag is set
    /// without a Company link. May set the company flag, add links resolved
    /// from the owner's contact, default the title and fill link titles.
    pub async fn validate(&self, address: &mut Address) -> ServiceResult<()> {
        validation::validate_company_address(address)?;

        self.link_address(address).await?;
        validation::validate_base(address)?;

        Ok(())
    }

    /// Resolves links for an address without any.
    ///
    /// Company addresses are left alone. Otherwise, if the address has no
    /// links and its owner's email belongs to a contact, the contact's links
    /// are copied onto the address.
    ///
    /// ## Returns
    /// `true` if links were added.
    pub async fn link_address(&self, address: &mut Address) -> ServiceResult<bool> {
        if !validation::should_resolve_links(address) {
            debug!(name = %address.name, "Company address, skipping link resolution");
            return Ok(false);
        }

        if !address.links.is_empty() {
            return Ok(false);
        }

        let Some(owner) = address.owner.as_deref().filter(|o| !o.trim().is_empty()) else {
            return Ok(false);
        };

        let links = self.db.contacts().links_for_email(owner).await?;
        if links.is_empty() {
            return Ok(false);
        }

        debug!(owner = %owner, count = links.len(), "Linking address from owner's contact");
        address.links.extend(links);
        Ok(true)
    }

    /// Validates and persists an address, then runs [`Self::on_update`].
    ///
    /// A blank name means a new address, named `{title}-{type}` with a numeric
    /// suffix if needed. An existing address keeps its owner and creation time.
    pub async fn save(&self, mut address: Address) -> ServiceResult<Address> {
        let repo = self.db.addresses();

        let existing = if address.name.trim().is_empty() {
            None
        } else {
            repo.get_by_name(&address.name).await?
        };

        // Link resolution reads the owner, so the stored one applies from here on.
        if let Some(existing) = &existing {
            address.owner = existing.owner.clone();
            address.created_at = existing.created_at;
        }

        self.validate(&mut address).await?;

        let now = Utc::now();
        address.updated_at = now;

        if existing.is_some() {
            repo.update(&address).await?;
            info!(name = %address.name, "Address updated");
        } else {
            if address.name.trim().is_empty() {
                address.name = repo.next_available_name(&address.autoname()).await?;
            }
            address.created_at = now;
            repo.insert(&address).await?;
            info!(name = %address.name, company = address.is_your_company_address, "Address created");
        }

        for flag in PreferredFlag::set_on(&address) {
            repo.clear_preferred_flag(flag, &address.name, &address.links)
                .await?;
        }

        self.on_update(&address).await?;

        Ok(address)
    }

    /// Refreshes the cached primary address of dependent customers.
    ///
    /// ## Returns
    /// Number of customers updated.
    pub async fn on_update(&self, address: &Address) -> ServiceResult<usize> {
        let display = self.db.templates().render(address).await?;

        let customers = self.db.customers();
        let names = customers.names_with_primary_address(&address.name).await?;

        for name in &names {
            customers.set_primary_address(name, &display).await?;
        }

        if !names.is_empty() {
            info!(address = %address.name, customers = names.len(), "Refreshed customer primary address");
        }

        Ok(names.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::DbConfig;
    use address_core::{AddressLink, AddressType, Contact, CoreError, Customer};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn address() -> Address {
        Address::new("Acme", "1 Main St", "Springfield", "United States")
    }

    #[tokio::test]
    async fn test_company_flag_without_company_link_blocks_save() {
        let db = db().await;
        let mut a = address();
        a.is_your_company_address = true;
        a.links.push(AddressLink::new("Customer", "Bob"));

        let err = db.lifecycle().save(a).await.unwrap_err();
        assert!(matches!(err, ServiceError::Rule(CoreError::CompanyNotLinked)));
        assert_eq!(db.addresses().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_company_link_sets_flag_on_save() {
        let db = db().await;
        let mut a = address();
        a.links.push(AddressLink::company("Acme"));

        let saved = db.lifecycle().save(a).await.unwrap();
        assert_eq!(saved.name, "Acme-Billing");
        assert!(saved.is_your_company_address);

        let loaded = db.addresses().get_by_name("Acme-Billing").await.unwrap().unwrap();
        assert!(loaded.is_your_company_address);
        assert_eq!(loaded.links[0].link_title.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_autoname_adds_suffix() {
        let db = db().await;
        let lifecycle = db.lifecycle();

        let first = lifecycle.save(address()).await.unwrap();
        let second = lifecycle.save(address()).await.unwrap();
        assert_eq!(first.name, "Acme-Billing");
        assert_eq!(second.name, "Acme-Billing-1");
    }

    #[tokio::test]
    async fn test_link_address_from_owner_contact() {
        let db = db().await;
        db.contacts()
            .insert(&Contact {
                name: String::new(),
                email_id: "bob@bikes.example".to_string(),
                links: vec![AddressLink::new("Customer", "Bob's Bikes")],
            })
            .await
            .unwrap();

        let mut a = address();
        a.address_title = String::new();
        a.owner = Some("bob@bikes.example".to_string());

        let saved = db.lifecycle().save(a).await.unwrap();
        assert_eq!(saved.links, vec![AddressLink {
            link_doctype: "Customer".to_string(),
            link_name: "Bob's Bikes".to_string(),
            link_title: Some("Bob's Bikes".to_string()),
        }]);
        assert_eq!(saved.address_title, "Bob's Bikes");
    }

    #[tokio::test]
    async fn test_company_address_skips_link_resolution() {
        let db = db().await;
        db.contacts()
            .insert(&Contact {
                name: String::new(),
                email_id: "admin@acme.example".to_string(),
                links: vec![AddressLink::new("Customer", "Bob's Bikes")],
            })
            .await
            .unwrap();

        let mut a = address();
        a.owner = Some("admin@acme.example".to_string());
        a.is_your_company_address = true;
        a.links.push(AddressLink::company("Acme"));

        let mut validated = a.clone();
        assert!(!db.lifecycle().link_address(&mut validated).await.unwrap());
        assert_eq!(validated.links.len(), 1);

        // Even with no links at all, a flagged company address is not resolved.
        let mut bare = address();
        bare.owner = Some("admin@acme.example".to_string());
        bare.is_your_company_address = true;
        assert!(!db.lifecycle().link_address(&mut bare).await.unwrap());
        assert!(bare.links.is_empty());
    }

    #[tokio::test]
    async fn test_update_refreshes_customer_primary_address() {
        let db = db().await;
        let lifecycle = db.lifecycle();

        let mut a = address();
        a.links.push(AddressLink::new("Customer", "Bob"));
        let saved = lifecycle.save(a).await.unwrap();

        db.customers()
            .insert(&Customer {
                name: "Bob".to_string(),
                customer_name: "Bob".to_string(),
                email_id: None,
                customer_primary_address: Some(saved.name.clone()),
                primary_address: None,
            })
            .await
            .unwrap();

        let mut edited = saved.clone();
        edited.address_line1 = "742 Evergreen Terrace".to_string();
        lifecycle.save(edited).await.unwrap();

        let bob = db.customers().get_by_name("Bob").await.unwrap().unwrap();
        assert_eq!(
            bob.primary_address.as_deref(),
            Some("742 Evergreen Terrace<br>Springfield<br>United States<br>")
        );
    }

    #[tokio::test]
    async fn test_on_update_ignores_unrelated_customers() {
        let db = db().await;
        db.customers()
            .insert(&Customer {
                name: "Carol".to_string(),
                customer_name: "Carol".to_string(),
                email_id: None,
                customer_primary_address: Some("Other-Billing".to_string()),
                primary_address: Some("old".to_string()),
            })
            .await
            .unwrap();

        let saved = db.lifecycle().save(address()).await.unwrap();
        assert_eq!(db.lifecycle().on_update(&saved).await.unwrap(), 0);

        let carol = db.customers().get_by_name("Carol").await.unwrap().unwrap();
        assert_eq!(carol.primary_address.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_shipping_flag_is_exclusive_per_party() {
        let db = db().await;
        let lifecycle = db.lifecycle();

        let mut first = address();
        first.address_type = AddressType::Shipping;
        first.is_shipping_address = true;
        first.links.push(AddressLink::company("Acme"));
        let first = lifecycle.save(first).await.unwrap();

        let mut second = address();
        second.address_title = "Acme Warehouse".to_string();
        second.address_type = AddressType::Warehouse;
        second.is_shipping_address = true;
        second.links.push(AddressLink::company("Acme"));
        lifecycle.save(second).await.unwrap();

        let first = db.addresses().get_by_name(&first.name).await.unwrap().unwrap();
        assert!(!first.is_shipping_address);
        let second = db.addresses().get_by_name("Acme Warehouse-Warehouse").await.unwrap().unwrap();
        assert!(second.is_shipping_address);
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_created_at() {
        let db = db().await;
        let mut a = address();
        a.owner = Some("clerk@acme.example".to_string());
        a.links.push(AddressLink::company("Acme"));
        let saved = db.lifecycle().save(a).await.unwrap();

        let mut edited = saved.clone();
        edited.owner = Some("someone@else.example".to_string());
        let updated = db.lifecycle().save(edited).await.unwrap();

        assert_eq!(updated.owner.as_deref(), Some("clerk@acme.example"));
        assert_eq!(updated.created_at, saved.created_at);
    }

    #[tokio::test]
    async fn test_update_resolves_links_from_stored_owner() {
        let db = db().await;
        for (email, party) in [("bob@bikes.example", "Bob's Bikes"), ("mallory@corp.example", "Mallory Corp")] {
            db.contacts()
                .insert(&Contact {
                    name: String::new(),
                    email_id: email.to_string(),
                    links: vec![AddressLink::new("Customer", party)],
                })
                .await
                .unwrap();
        }

        let mut a = address();
        a.owner = Some("bob@bikes.example".to_string());
        a.links.push(AddressLink::new("Customer", "Bob's Bikes"));
        let saved = db.lifecycle().save(a).await.unwrap();

        let mut edited = saved.clone();
        edited.links.clear();
        edited.owner = Some("mallory@corp.example".to_string());
        db.lifecycle().save(edited).await.unwrap();

        let stored = db.addresses().get_by_name(&saved.name).await.unwrap().unwrap();
        assert_eq!(stored.owner.as_deref(), Some("bob@bikes.example"));
        assert_eq!(stored.links.len(), 1);
        assert_eq!(stored.links[0].link_name, "Bob's Bikes");
    }
}
