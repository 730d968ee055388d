//! # Address Template Repository
//!
//! Per-country address templates. At most one template is the default.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use address_core::display::{address_display, select_template};
use address_core::{Address, AddressTemplate};

/// Repository for address template operations.
#[derive(Debug, Clone)]
pub struct AddressTemplateRepository {
    pool: SqlitePool,
}

impl AddressTemplateRepository {
    /// Creates a new AddressTemplateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AddressTemplateRepository { pool }
    }

    /// Inserts or replaces the template for a country.
    ///
    /// Marking a template as default unmarks the previous default.
    pub async fn upsert(&self, template: &AddressTemplate) -> DbResult<()> {
        debug!(country = %template.country, is_default = template.is_default, "Saving address template");

        let mut tx = self.pool.begin().await?;

        if template.is_default {
            sqlx::query("UPDATE address_templates SET is_default = 0 WHERE country <> ?1")
                .bind(&template.country)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO address_templates (country, template, is_default)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(country) DO UPDATE SET
                template = excluded.template,
                is_default = excluded.is_default
            "#,
        )
        .bind(&template.country)
        .bind(&template.template)
        .bind(template.is_default)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// All configured templates.
    pub async fn list(&self) -> DbResult<Vec<AddressTemplate>> {
        let templates: Vec<AddressTemplate> = sqlx::query_as(
            "SELECT country, template, is_default FROM address_templates ORDER BY country",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    /// Template name and text for an address (country, then default, then built-in).
    pub async fn for_address(&self, address: &Address) -> DbResult<(String, String)> {
        let templates = self.list().await?;
        let (name, template) = select_template(&templates, address);
        Ok((name.to_string(), template.to_string()))
    }

    /// Renders an address with its template.
    pub async fn render(&self, address: &Address) -> DbResult<String> {
        let templates = self.list().await?;
        Ok(address_display(&templates, address))
    }
}
