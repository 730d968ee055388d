//! # Contact Repository
//!
//! Contacts are looked up by email when an address has no links: the
//! contact's own links are copied onto the address its owner created.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use address_core::{AddressLink, Contact};

/// Repository for contact database operations.
#[derive(Debug, Clone)]
pub struct ContactRepository {
    pool: SqlitePool,
}

impl ContactRepository {
    /// Creates a new ContactRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ContactRepository { pool }
    }

    /// Inserts a contact and its links. A blank name gets a generated UUID.
    pub async fn insert(&self, contact: &Contact) -> DbResult<Contact> {
        let mut contact = contact.clone();
        if contact.name.trim().is_empty() {
            contact.name = Uuid::new_v4().to_string();
        }

        debug!(name = %contact.name, email = %contact.email_id, "Inserting contact");

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO contacts (name, email_id) VALUES (?1, ?2)")
            .bind(&contact.name)
            .bind(&contact.email_id)
            .execute(&mut *tx)
            .await?;

        for (idx, link) in contact.links.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO contact_links (parent, idx, link_doctype, link_name, link_title)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&contact.name)
            .bind(idx as i64 + 1)
            .bind(&link.link_doctype)
            .bind(&link.link_name)
            .bind(&link.link_title)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(contact)
    }

    /// Links of the contact with this email, in row order.
    ///
    /// Empty when no contact has the email.
    pub async fn links_for_email(&self, email: &str) -> DbResult<Vec<AddressLink>> {
        let links: Vec<AddressLink> = sqlx::query_as(
            r#"
            SELECT l.link_doctype, l.link_name, l.link_title
            FROM contact_links l
            INNER JOIN contacts c ON c.name = l.parent
            WHERE c.email_id = ?1
            ORDER BY l.idx
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }
}
