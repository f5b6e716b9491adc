//! # Customer Repository
//!
//! Plain single-record storage access; customers carry no cross-entity
//! invariant. Sales reference them optionally.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gasledger_core::validation::validate_name;
use gasledger_core::{Customer, CustomerPatch, Identity, NewCustomer};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

const CUSTOMER_COLUMNS: &str = "id, owner_id, name, phone, address, created_at";

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn get_by_id(&self, identity: &Identity, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(id)
        .bind(&identity.owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists the owner's customers, newest first.
    pub async fn list(&self, identity: &Identity) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE owner_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(&identity.owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn insert(&self, identity: &Identity, new: NewCustomer) -> DbResult<Customer> {
        validate_name(&new.name)?;

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            owner_id: identity.owner_id.clone(),
            name: new.name,
            phone: new.phone,
            address: new.address,
            created_at: Utc::now(),
        };

        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            "INSERT INTO customers (id, owner_id, name, phone, address, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&customer.id)
        .bind(&customer.owner_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Applies a partial-field update. `Some(None)` on phone/address
    /// clears the field.
    pub async fn update(
        &self,
        identity: &Identity,
        id: &str,
        patch: CustomerPatch,
    ) -> DbResult<Customer> {
        let mut customer = self
            .get_by_id(identity, id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        if let Some(name) = patch.name {
            validate_name(&name)?;
            customer.name = name;
        }
        if let Some(phone) = patch.phone {
            customer.phone = phone;
        }
        if let Some(address) = patch.address {
            customer.address = address;
        }

        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            "UPDATE customers SET name = ?3, phone = ?4, address = ?5 \
             WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(&customer.id)
        .bind(&identity.owner_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(customer)
    }

    pub async fn delete(&self, identity: &Identity, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(&identity.owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_customer_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let who = Identity::new("user-1");

        let customer = db
            .customers()
            .insert(
                &who,
                NewCustomer {
                    name: "Asha Traders".to_string(),
                    phone: Some("98765".to_string()),
                    address: None,
                },
            )
            .await
            .unwrap();

        let patch = CustomerPatch {
            phone: Some(None),
            ..Default::default()
        };
        let updated = db.customers().update(&who, &customer.id, patch).await.unwrap();
        assert_eq!(updated.phone, None);
        assert_eq!(updated.name, "Asha Traders");

        db.customers().delete(&who, &customer.id).await.unwrap();
        assert!(db
            .customers()
            .get_by_id(&who, &customer.id)
            .await
            .unwrap()
            .is_none());
    }
}
