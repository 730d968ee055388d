//! # Address Repository
//!
//! Database operations for addresses and their Links table.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  addresses                          address_links                       │
//! │  ─────────────────────────          ──────────────────────────────      │
//! │  name (PK)  ◄────────────────────── parent (FK, ON DELETE CASCADE)      │
//! │  address_title                      idx            (row order)          │
//! │  is_your_company_address            link_doctype   "Company" / ...      │
//! │  is_shipping_address                link_name      "Acme"               │
//! │  ...                                link_title                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An address and its links are always written together in one transaction;
//! updates replace the whole links table of the address.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use address_core::{Address, AddressLink, COMPANY_DOCTYPE};

const ADDRESS_COLUMNS: &str = "
    a.name, a.address_title, a.address_type, a.address_line1, a.address_line2,
    a.city, a.county, a.state, a.country, a.pincode, a.email_id, a.phone, a.fax,
    a.is_primary_address, a.is_shipping_address, a.is_your_company_address,
    a.disabled, a.owner, a.created_at, a.updated_at";

/// Preferred-address flags that only one address per linked party may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredFlag {
    Primary,
    Shipping,
}

impl PreferredFlag {
    fn column(self) -> &'static str {
        match self {
            PreferredFlag::Primary => "is_primary_address",
            PreferredFlag::Shipping => "is_shipping_address",
        }
    }

    /// Flags set on the given address.
    pub fn set_on(address: &Address) -> Vec<PreferredFlag> {
        let mut flags = Vec::new();
        if address.is_primary_address {
            flags.push(PreferredFlag::Primary);
        }
        if address.is_shipping_address {
            flags.push(PreferredFlag::Shipping);
        }
        flags
    }
}

/// Repository for address database operations.
#[derive(Debug, Clone)]
pub struct AddressRepository {
    pool: SqlitePool,
}

impl AddressRepository {
    /// Creates a new AddressRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AddressRepository { pool }
    }

    /// Returns true if an address with this name exists.
    pub async fn exists(&self, name: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM addresses WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Returns `base`, or `base-1`, `base-2`, ... whichever is free first.
    pub async fn next_available_name(&self, base: &str) -> DbResult<String> {
        if !self.exists(base).await? {
            return Ok(base.to_string());
        }

        let mut suffix = 1u32;
        loop {
            let candidate = format!("{}-{}", base, suffix);
            if !self.exists(&candidate).await? {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }

    /// Gets an address (with its links) by name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Address>> {
        let sql = format!("SELECT {} FROM addresses a WHERE a.name = ?1", ADDRESS_COLUMNS);

        let address: Option<Address> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match address {
            Some(mut address) => {
                address.links = self.get_links(name).await?;
                Ok(Some(address))
            }
            None => Ok(None),
        }
    }

    /// Gets the Links table of an address, in row order.
    pub async fn get_links(&self, name: &str) -> DbResult<Vec<AddressLink>> {
        let links: Vec<AddressLink> = sqlx::query_as(
            r#"
            SELECT link_doctype, link_name, link_title
            FROM address_links
            WHERE parent = ?1
            ORDER BY idx
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    /// Inserts a new address and its links.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - the name is taken
    pub async fn insert(&self, address: &Address) -> DbResult<()> {
        debug!(name = %address.name, links = address.links.len(), "Inserting address");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO addresses (
                name, address_title, address_type, address_line1, address_line2,
                city, county, state, country, pincode, email_id, phone, fax,
                is_primary_address, is_shipping_address, is_your_company_address,
                disabled, owner, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16,
                ?17, ?18, ?19, ?20
            )
            "#,
        )
        .bind(&address.name)
        .bind(&address.address_title)
        .bind(address.address_type)
        .bind(&address.address_line1)
        .bind(&address.address_line2)
        .bind(&address.city)
        .bind(&address.county)
        .bind(&address.state)
        .bind(&address.country)
        .bind(&address.pincode)
        .bind(&address.email_id)
        .bind(&address.phone)
        .bind(&address.fax)
        .bind(address.is_primary_address)
        .bind(address.is_shipping_address)
        .bind(address.is_your_company_address)
        .bind(address.disabled)
        .bind(&address.owner)
        .bind(address.created_at)
        .bind(address.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: address.name.clone(),
            },
            other => other,
        })?;

        insert_links(&mut *tx, &address.name, &address.links).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Updates an existing address and replaces its links.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - the address doesn't exist
    pub async fn update(&self, address: &Address) -> DbResult<()> {
        debug!(name = %address.name, links = address.links.len(), "Updating address");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE addresses SET
                address_title = ?2,
                address_type = ?3,
                address_line1 = ?4,
                address_line2 = ?5,
                city = ?6,
                county = ?7,
                state = ?8,
                country = ?9,
                pincode = ?10,
                email_id = ?11,
                phone = ?12,
                fax = ?13,
                is_primary_address = ?14,
                is_shipping_address = ?15,
                is_your_company_address = ?16,
                disabled = ?17,
                updated_at = ?18
            WHERE name = ?1
            "#,
        )
        .bind(&address.name)
        .bind(&address.address_title)
        .bind(address.address_type)
        .bind(&address.address_line1)
        .bind(&address.address_line2)
        .bind(&address.city)
        .bind(&address.county)
        .bind(&address.state)
        .bind(&address.country)
        .bind(&address.pincode)
        .bind(&address.email_id)
        .bind(&address.phone)
        .bind(&address.fax)
        .bind(address.is_primary_address)
        .bind(address.is_shipping_address)
        .bind(address.is_your_company_address)
        .bind(address.disabled)
        .bind(address.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Address", &address.name));
        }

        sqlx::query("DELETE FROM address_links WHERE parent = ?1")
            .bind(&address.name)
            .execute(&mut *tx)
            .await?;

        insert_links(&mut *tx, &address.name, &address.links).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Lists addresses linked to an entity, most recently modified first.
    pub async fn list_linked(&self, doctype: &str, link_name: &str) -> DbResult<Vec<Address>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM addresses a
            INNER JOIN address_links l ON l.parent = a.name
            WHERE l.link_doctype = ?1 AND l.link_name = ?2
            ORDER BY a.updated_at DESC
            "#,
            ADDRESS_COLUMNS
        );

        let mut addresses: Vec<Address> = sqlx::query_as(&sql)
            .bind(doctype)
            .bind(link_name)
            .fetch_all(&self.pool)
            .await?;

        for address in &mut addresses {
            address.links = self.get_links(&address.name).await?;
        }

        Ok(addresses)
    }

    /// Returns true if the address has a link to the given entity.
    pub async fn is_linked_to(&self, name: &str, doctype: &str, link_name: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT 1 FROM address_links
            WHERE parent = ?1 AND link_doctype = ?2 AND link_name = ?3
            "#,
        )
        .bind(name)
        .bind(doctype)
        .bind(link_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    /// Finds the newest company address of `company`.
    ///
    /// ## Filters
    /// - linked to `Company: company`
    /// - `is_your_company_address` set
    /// - `exact_name`: only that address
    /// - otherwise `shipping_only`: only addresses with `is_shipping_address`
    pub async fn find_company_address(
        &self,
        company: &str,
        exact_name: Option<&str>,
        shipping_only: bool,
    ) -> DbResult<Option<Address>> {
        let mut sql = format!(
            r#"
            SELECT {}
            FROM addresses a
            INNER JOIN address_links l ON l.parent = a.name
            WHERE l.link_doctype = ?1
              AND l.link_name = ?2
              AND a.is_your_company_address = 1
            "#,
            ADDRESS_COLUMNS
        );

        if exact_name.is_some() {
            sql.push_str(" AND a.name = ?3");
        } else if shipping_only {
            sql.push_str(" AND a.is_shipping_address = 1");
        }
        sql.push_str(" ORDER BY a.updated_at DESC LIMIT 1");

        let mut query = sqlx::query_as::<_, Address>(&sql)
            .bind(COMPANY_DOCTYPE)
            .bind(company);
        if let Some(name) = exact_name {
            query = query.bind(name);
        }

        match query.fetch_optional(&self.pool).await? {
            Some(mut address) => {
                address.links = self.get_links(&address.name).await?;
                Ok(Some(address))
            }
            None => Ok(None),
        }
    }

    /// Clears a preferred flag on other addresses sharing any of `links`.
    ///
    /// ## Returns
    /// Number of addresses that lost the flag.
    pub async fn clear_preferred_flag(
        &self,
        flag: PreferredFlag,
        except: &str,
        links: &[AddressLink],
    ) -> DbResult<u64> {
        let sql = format!(
            r#"
            UPDATE addresses SET {col} = 0, updated_at = ?1
            WHERE name <> ?2
              AND {col} = 1
              AND name IN (
                  SELECT parent FROM address_links
                  WHERE link_doctype = ?3 AND link_name = ?4
              )
            "#,
            col = flag.column()
        );

        let now = Utc::now();
        let mut cleared = 0;

        for link in links {
            let result = sqlx::query(&sql)
                .bind(now)
                .bind(except)
                .bind(&link.link_doctype)
                .bind(&link.link_name)
                .execute(&self.pool)
                .await?;
            cleared += result.rows_affected();
        }

        if cleared > 0 {
            debug!(flag = ?flag, except = %except, cleared, "Cleared preferred address flag");
        }

        Ok(cleared)
    }

    /// Counts addresses (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Writes the Links table rows of an address, numbering them from 1.
async fn insert_links(
    conn: &mut SqliteConnection,
    parent: &str,
    links: &[AddressLink],
) -> DbResult<()> {
    for (idx, link) in links.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO address_links (parent, idx, link_doctype, link_name, link_title)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(parent)
        .bind(idx as i64 + 1)
        .bind(&link.link_doctype)
        .bind(&link.link_name)
        .bind(&link.link_title)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use address_core::AddressType;

    async fn repo() -> AddressRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.addresses()
    }

    fn company_address(name: &str, company: &str) -> Address {
        let mut a = Address::new(company, "1 Main St", "Springfield", "United States");
        a.name = name.to_string();
        a.is_your_company_address = true;
        a.links.push(AddressLink::company(company));
        a
    }

    #[tokio::test]
    async fn test_insert_and_get_with_links() {
        let repo = repo().await;
        let mut a = company_address("Acme-Billing", "Acme");
        a.links.push(AddressLink::new("Customer", "Bob"));
        repo.insert(&a).await.unwrap();

        let loaded = repo.get_by_name("Acme-Billing").await.unwrap().unwrap();
        assert_eq!(loaded.address_type, AddressType::Billing);
        assert!(loaded.is_your_company_address);
        assert_eq!(loaded.links.len(), 2);
        assert!(loaded.links[0].is_company());
        assert_eq!(loaded.links[1].link_name, "Bob");

        assert!(repo.get_by_name("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let repo = repo().await;
        let a = company_address("Acme-Billing", "Acme");
        repo.insert(&a).await.unwrap();

        let err = repo.insert(&a).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_replaces_links() {
        let repo = repo().await;
        let mut a = company_address("Acme-Billing", "Acme");
        repo.insert(&a).await.unwrap();

        a.city = "Shelbyville".to_string();
        a.links = vec![AddressLink::company("Globex")];
        repo.update(&a).await.unwrap();

        let loaded = repo.get_by_name("Acme-Billing").await.unwrap().unwrap();
        assert_eq!(loaded.city, "Shelbyville");
        assert_eq!(loaded.links, vec![AddressLink::company("Globex")]);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = repo().await;
        let a = company_address("Nope", "Acme");
        assert!(matches!(
            repo.update(&a).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_next_available_name() {
        let repo = repo().await;
        assert_eq!(repo.next_available_name("Acme-Billing").await.unwrap(), "Acme-Billing");

        repo.insert(&company_address("Acme-Billing", "Acme")).await.unwrap();
        repo.insert(&company_address("Acme-Billing-1", "Acme")).await.unwrap();
        assert_eq!(
            repo.next_available_name("Acme-Billing").await.unwrap(),
            "Acme-Billing-2"
        );
    }

    #[tokio::test]
    async fn test_find_company_address_filters() {
        let repo = repo().await;
        let billing = company_address("Acme-Billing", "Acme");
        let mut shipping = company_address("Acme-Shipping", "Acme");
        shipping.is_shipping_address = true;
        repo.insert(&billing).await.unwrap();
        repo.insert(&shipping).await.unwrap();

        let found = repo.find_company_address("Acme", None, true).await.unwrap().unwrap();
        assert_eq!(found.name, "Acme-Shipping");

        let found = repo
            .find_company_address("Acme", Some("Acme-Billing"), true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "Acme-Billing");

        assert!(repo.find_company_address("Globex", None, true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_preferred_flag() {
        let repo = repo().await;
        let mut old = company_address("Acme-Old", "Acme");
        old.is_shipping_address = true;
        let mut other = company_address("Globex-Ship", "Globex");
        other.is_shipping_address = true;
        repo.insert(&old).await.unwrap();
        repo.insert(&other).await.unwrap();

        let cleared = repo
            .clear_preferred_flag(PreferredFlag::Shipping, "Acme-New", &[AddressLink::company("Acme")])
            .await
            .unwrap();
        assert_eq!(cleared, 1);

        let old = repo.get_by_name("Acme-Old").await.unwrap().unwrap();
        assert!(!old.is_shipping_address);
        let other = repo.get_by_name("Globex-Ship").await.unwrap().unwrap();
        assert!(other.is_shipping_address);
    }

    #[tokio::test]
    async fn test_is_linked_to_and_list_linked() {
        let repo = repo().await;
        repo.insert(&company_address("Acme-Billing", "Acme")).await.unwrap();

        assert!(repo.is_linked_to("Acme-Billing", "Company", "Acme").await.unwrap());
        assert!(!repo.is_linked_to("Acme-Billing", "Company", "Globex").await.unwrap());

        let linked = repo.list_linked("Company", "Acme").await.unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].links.len(), 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
