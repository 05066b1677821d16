use crate::{
    abstract_trait::order::repository::{
        BoxedOrderTransaction, OrderTransactionTrait, UnitOfWorkTrait,
    },
    domain::requests::order::CreateOrderRecordRequest,
    model::{order::Order as OrderModel, product::Product as ProductModel},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::{Postgres, Transaction};
use std::time::Duration;
use tracing::{error, info};

#[derive(Clone)]
pub struct PgUnitOfWork {
    db: ConnectionPool,
    lock_timeout: Duration,
}

impl PgUnitOfWork {
    /// A zero `lock_timeout` waits for row locks indefinitely.
    pub fn new(db: ConnectionPool, lock_timeout: Duration) -> Self {
        Self { db, lock_timeout }
    }
}

#[async_trait]
impl UnitOfWorkTrait for PgUnitOfWork {
    async fn begin(&self) -> Result<BoxedOrderTransaction, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(|e| {
            error!("❌ Failed to begin transaction: {:?}", e);
            RepositoryError::from(e)
        })?;

        // SET does not accept bind parameters; the value is a plain integer.
        let set_timeout = format!("SET LOCAL lock_timeout = {}", self.lock_timeout.as_millis());
        sqlx::query(&set_timeout)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to set lock timeout: {:?}", e);
                RepositoryError::from(e)
            })?;

        Ok(Box::new(PgOrderTransaction { tx }))
    }
}

/// Dropping the inner sqlx transaction without commit rolls it back.
pub struct PgOrderTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTransactionTrait for PgOrderTransaction {
    async fn find_product_for_update(
        &mut self,
        product_id: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        info!("🔒 Locking product row {product_id}");

        let product = sqlx::query_as::<_, ProductModel>(
            r#"
            SELECT
                product_id,
                name,
                price,
                stock,
                created_at,
                updated_at
            FROM products
            WHERE product_id = $1
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| {
            error!("❌ Failed to lock product {product_id}: {:?}", e);
            RepositoryError::from(e)
        })?;

        Ok(product)
    }

    async fn save_product(&mut self, product: &ProductModel) -> Result<ProductModel, RepositoryError> {
        let saved = sqlx::query_as::<_, ProductModel>(
            r#"
            UPDATE products
            SET name = $2,
                price = $3,
                stock = $4,
                updated_at = current_timestamp
            WHERE product_id = $1
            RETURNING product_id, name, price, stock, created_at, updated_at
            "#,
        )
        .bind(product.product_id)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| {
            error!("❌ Failed to save product {}: {:?}", product.product_id, e);
            RepositoryError::from(e)
        })?
        .ok_or(RepositoryError::NotFound)?;

        Ok(saved)
    }

    async fn insert_order(
        &mut self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError> {
        let order = sqlx::query_as::<_, OrderModel>(
            r#"
            INSERT INTO orders (product_id, quantity, discount_percent, total_price, created_at)
            VALUES ($1, $2, $3, $4, current_timestamp)
            RETURNING order_id, product_id, quantity, discount_percent, total_price, created_at
            "#,
        )
        .bind(req.product_id)
        .bind(req.quantity)
        .bind(req.discount_percent)
        .bind(req.total_price)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            error!(
                "❌ Failed to insert order for product {}: {:?}",
                req.product_id, e
            );
            RepositoryError::from(e)
        })?;

        Ok(order)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await.map_err(|e| {
            error!("❌ Failed to commit transaction: {:?}", e);
            RepositoryError::from(e)
        })
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.rollback().await.map_err(|e| {
            error!("❌ Failed to roll back transaction: {:?}", e);
            RepositoryError::from(e)
        })
    }
}
