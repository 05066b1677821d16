use crate::{
    domain::requests::order::CreateOrderRecordRequest,
    model::{order::Order as OrderModel, product::Product as ProductModel},
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynUnitOfWork = Arc<dyn UnitOfWorkTrait + Send + Sync>;

pub type BoxedOrderTransaction = Box<dyn OrderTransactionTrait + Send>;

/// Opens storage transactions for order placement.
#[async_trait]
pub trait UnitOfWorkTrait {
    async fn begin(&self) -> Result<BoxedOrderTransaction, RepositoryError>;
}

/// Product and order writes scoped to one open transaction.
///
/// Implementations must roll back when dropped without `commit`, so an
/// early return, a panic or a cancelled future never leaves a half-applied
/// order behind.
#[async_trait]
pub trait OrderTransactionTrait {
    /// Reads the product and holds an exclusive lock on its row until the
    /// transaction ends. Concurrent callers for the same id wait here.
    async fn find_product_for_update(
        &mut self,
        product_id: i32,
    ) -> Result<Option<ProductModel>, RepositoryError>;

    /// Writes back a product previously read with `find_product_for_update`.
    async fn save_product(&mut self, product: &ProductModel) -> Result<ProductModel, RepositoryError>;

    async fn insert_order(
        &mut self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}
