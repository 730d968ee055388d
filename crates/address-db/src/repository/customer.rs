//! # Customer Repository
//!
//! Database operations for customers and their cached primary address.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use address_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                name, customer_name, email_id, customer_primary_address, primary_address
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.customer_name)
        .bind(&customer.email_id)
        .bind(&customer.customer_primary_address)
        .bind(&customer.primary_address)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &customer.name),
            other => other,
        })?;

        Ok(())
    }

    /// Gets a customer by name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Customer>> {
        let customer: Option<Customer> = sqlx::query_as(
            r#"
            SELECT name, customer_name, email_id, customer_primary_address, primary_address
            FROM customers
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Names of customers whose primary address is `address`.
    pub async fn names_with_primary_address(&self, address: &str) -> DbResult<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT name FROM customers
            WHERE customer_primary_address = ?1
            ORDER BY name
            "#,
        )
        .bind(address)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// Points a customer at a primary address and caches its display text.
    pub async fn set_customer_primary_address(
        &self,
        name: &str,
        address: Option<&str>,
        display: Option<&str>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers SET customer_primary_address = ?2, primary_address = ?3
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .bind(address)
        .bind(display)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", name));
        }

        Ok(())
    }

    /// Overwrites the cached primary address text of one customer.
    pub async fn set_primary_address(&self, name: &str, display: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE customers SET primary_address = ?2 WHERE name = ?1")
            .bind(name)
            .bind(display)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", name));
        }

        Ok(())
    }
}
