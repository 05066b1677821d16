mod common;

use async_trait::async_trait;
use backend::{
    abstract_trait::order::repository::{
        BoxedOrderTransaction, OrderTransactionTrait, UnitOfWorkTrait,
    },
    di::{DependenciesInject, DependenciesInjectDeps},
    domain::requests::order::{CreateOrderRecordRequest, CreateOrderRequest},
    model::{order::Order as OrderModel, product::Product as ProductModel},
    repository::memory::InMemoryStore,
};
use common::{memory_services, memory_store, seed_product, services};
use shared::errors::{RepositoryError, ServiceError};
use std::{sync::Arc, time::Duration};

fn order(product_id: i32, quantity: i32, discount_percent: i32) -> CreateOrderRequest {
    CreateOrderRequest {
        product_id: i64::from(product_id),
        quantity,
        discount_percent,
    }
}

#[tokio::test]
async fn order_decrements_stock_and_prices_with_discount() {
    let store = memory_store();
    let di = memory_services(&store);
    let product = seed_product(&di, "Widget", 10, 100).await;

    let placed = di
        .order_command
        .create_order(&order(product.id, 3, 15))
        .await
        .unwrap();

    assert_eq!(placed.product_id, product.id);
    assert_eq!(placed.quantity, 3);
    assert_eq!(placed.discount_percent, 15);
    assert_eq!(placed.total_price, 255);
    assert_eq!(placed.product.stock, 7);

    assert_eq!(store.product(product.id).unwrap().stock, 7);
    let orders = store.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, placed.id);
    assert_eq!(orders[0].total_price, 255);
}

#[tokio::test]
async fn order_may_take_the_last_unit() {
    let store = memory_store();
    let di = memory_services(&store);
    let product = seed_product(&di, "Single", 1, 50).await;

    let placed = di
        .order_command
        .create_order(&order(product.id, 1, 0))
        .await
        .unwrap();

    assert_eq!(placed.total_price, 50);
    assert_eq!(store.product(product.id).unwrap().stock, 0);
}

#[tokio::test]
async fn unknown_product_changes_nothing() {
    let store = memory_store();
    let di = memory_services(&store);
    let product = seed_product(&di, "Widget", 10, 100).await;

    let err = di
        .order_command
        .create_order(&order(9999, 1, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(store.product(product.id).unwrap().stock, 10);
    assert!(store.orders().is_empty());
}

#[tokio::test]
async fn ids_beyond_the_stored_range_are_not_found() {
    let store = memory_store();
    let di = memory_services(&store);
    seed_product(&di, "Widget", 10, 100).await;

    let req = CreateOrderRequest {
        product_id: i64::from(i32::MAX) + 1,
        quantity: 1,
        discount_percent: 0,
    };
    let err = di.order_command.create_order(&req).await.unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)));
    assert!(store.orders().is_empty());
}

#[tokio::test]
async fn insufficient_stock_changes_nothing() {
    let store = memory_store();
    let di = memory_services(&store);
    let product = seed_product(&di, "Widget", 2, 100).await;

    let err = di
        .order_command
        .create_order(&order(product.id, 5, 0))
        .await
        .unwrap_err();

    match err {
        ServiceError::InsufficientStock {
            product_id,
            requested,
            available,
        } => {
            assert_eq!(product_id, product.id);
            assert_eq!(requested, 5);
            assert_eq!(available, 2);
        }
        other => panic!("expected insufficient stock, got {other:?}"),
    }

    let stored = store.product(product.id).unwrap();
    assert_eq!(stored.stock, 2);
    assert_eq!(stored.updated_at, product.updated_at);
    assert!(store.orders().is_empty());
}

#[tokio::test]
async fn invalid_orders_are_rejected_before_storage() {
    let store = memory_store();
    let di = memory_services(&store);
    let product = seed_product(&di, "Widget", 10, 100).await;

    for req in [
        order(product.id, 0, 0),
        order(product.id, -2, 0),
        order(product.id, 1, -1),
        order(product.id, 1, 101),
        order(0, 1, 0),
    ] {
        let err = di.order_command.create_order(&req).await.unwrap_err();
        assert!(
            matches!(err, ServiceError::Validation(_)),
            "expected validation error for {req:?}, got {err:?}"
        );
    }

    assert_eq!(store.product(product.id).unwrap().stock, 10);
    assert!(store.orders().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_racing_orders_cannot_oversell() {
    let store = memory_store();
    let di = memory_services(&store);
    let product = seed_product(&di, "Widget", 5, 10).await;

    let first = {
        let service = di.order_command.clone();
        let req = order(product.id, 3, 0);
        tokio::spawn(async move { service.create_order(&req).await })
    };
    let second = {
        let service = di.order_command.clone();
        let req = order(product.id, 3, 0);
        tokio::spawn(async move { service.create_order(&req).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(ServiceError::InsufficientStock { .. })))
        .count();

    assert_eq!(succeeded, 1);
    assert_eq!(rejected, 1);
    assert_eq!(store.product(product.id).unwrap().stock, 2);
    assert_eq!(store.orders().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn many_concurrent_orders_sell_exactly_the_stock() {
    let store = memory_store();
    let di = memory_services(&store);
    let product = seed_product(&di, "Widget", 10, 7).await;

    let mut tasks = Vec::new();
    for _ in 0..25 {
        let service = di.order_command.clone();
        let req = order(product.id, 1, 10);
        tasks.push(tokio::spawn(async move { service.create_order(&req).await }));
    }

    let mut succeeded = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 10);
    assert_eq!(store.product(product.id).unwrap().stock, 0);

    let orders = store.orders();
    assert_eq!(orders.len(), 10);
    assert!(orders.iter().all(|o| o.total_price == 7 - 7 * 10 / 100));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn orders_for_different_products_do_not_interfere() {
    let store = memory_store();
    let di = memory_services(&store);
    let a = seed_product(&di, "A", 3, 10).await;
    let b = seed_product(&di, "B", 3, 20).await;

    let mut tasks = Vec::new();
    for id in [a.id, b.id, a.id, b.id] {
        let service = di.order_command.clone();
        let req = order(id, 1, 0);
        tasks.push(tokio::spawn(async move { service.create_order(&req).await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.product(a.id).unwrap().stock, 1);
    assert_eq!(store.product(b.id).unwrap().stock, 1);
    assert_eq!(store.orders().len(), 4);
}

#[tokio::test]
async fn held_row_lock_times_out_without_changes() {
    let store = InMemoryStore::new(Duration::from_millis(50));
    let di = memory_services(&store);
    let product = seed_product(&di, "Widget", 5, 10).await;

    let mut holder = store.begin().await.unwrap();
    holder
        .find_product_for_update(product.id)
        .await
        .unwrap()
        .expect("locked product");

    let err = di
        .order_command
        .create_order(&order(product.id, 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepositoryError::LockTimeout)));

    holder.rollback().await.unwrap();

    di.order_command
        .create_order(&order(product.id, 1, 0))
        .await
        .unwrap();
    assert_eq!(store.product(product.id).unwrap().stock, 4);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FailAt {
    InsertOrder,
    Commit,
    Panic,
    Stall,
}

struct FailingUnitOfWork {
    inner: InMemoryStore,
    fail_at: FailAt,
}

struct FailingTransaction {
    inner: BoxedOrderTransaction,
    fail_at: FailAt,
}

#[async_trait]
impl UnitOfWorkTrait for FailingUnitOfWork {
    async fn begin(&self) -> Result<BoxedOrderTransaction, RepositoryError> {
        Ok(Box::new(FailingTransaction {
            inner: self.inner.begin().await?,
            fail_at: self.fail_at,
        }))
    }
}

#[async_trait]
impl OrderTransactionTrait for FailingTransaction {
    async fn find_product_for_update(
        &mut self,
        product_id: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        self.inner.find_product_for_update(product_id).await
    }

    async fn save_product(&mut self, product: &ProductModel) -> Result<ProductModel, RepositoryError> {
        self.inner.save_product(product).await
    }

    async fn insert_order(
        &mut self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError> {
        match self.fail_at {
            FailAt::InsertOrder => Err(RepositoryError::Custom("injected insert failure".into())),
            FailAt::Panic => panic!("insert_order blew up"),
            FailAt::Stall => std::future::pending().await,
            FailAt::Commit => self.inner.insert_order(req).await,
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        if self.fail_at == FailAt::Commit {
            return Err(RepositoryError::Custom("injected commit failure".into()));
        }
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.inner.rollback().await
    }
}

fn failing_services(store: &InMemoryStore, fail_at: FailAt) -> DependenciesInject {
    let mut deps = DependenciesInjectDeps::in_memory(store.clone());
    deps.unit_of_work = Arc::new(FailingUnitOfWork {
        inner: store.clone(),
        fail_at,
    });
    services(deps)
}

async fn assert_product_untouched_and_unlocked(store: &InMemoryStore, product_id: i32) {
    assert_eq!(store.product(product_id).unwrap().stock, 5);
    assert!(store.orders().is_empty());

    // the row lock was released with the abandoned transaction
    let healthy = memory_services(store);
    tokio::time::timeout(
        Duration::from_secs(1),
        healthy.order_command.create_order(&order(product_id, 2, 0)),
    )
    .await
    .expect("row lock still held")
    .unwrap();
    assert_eq!(store.product(product_id).unwrap().stock, 3);
    assert_eq!(store.orders().len(), 1);
}

async fn assert_failure_leaves_no_trace(fail_at: FailAt) {
    let store = memory_store();
    let di = failing_services(&store, fail_at);
    let product = seed_product(&di, "Widget", 5, 10).await;

    let err = di
        .order_command
        .create_order(&order(product.id, 2, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepositoryError::Custom(_))));

    assert_product_untouched_and_unlocked(&store, product.id).await;
}

#[tokio::test]
async fn failed_order_insert_rolls_back_stock() {
    assert_failure_leaves_no_trace(FailAt::InsertOrder).await;
}

#[tokio::test]
async fn failed_commit_rolls_back_stock() {
    assert_failure_leaves_no_trace(FailAt::Commit).await;
}

#[tokio::test]
async fn panic_inside_the_critical_section_rolls_back() {
    let store = memory_store();
    let di = failing_services(&store, FailAt::Panic);
    let product = seed_product(&di, "Widget", 5, 10).await;

    let service = di.order_command.clone();
    let req = order(product.id, 2, 0);
    let outcome = tokio::spawn(async move { service.create_order(&req).await }).await;

    assert!(outcome.unwrap_err().is_panic());
    assert_product_untouched_and_unlocked(&store, product.id).await;
}

#[tokio::test]
async fn cancelled_order_rolls_back() {
    let store = memory_store();
    let di = failing_services(&store, FailAt::Stall);
    let product = seed_product(&di, "Widget", 5, 10).await;

    // stalls after the stock decrement is staged, with the row lock held
    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        di.order_command.create_order(&order(product.id, 2, 0)),
    )
    .await;

    assert!(abandoned.is_err());
    assert_product_untouched_and_unlocked(&store, product.id).await;
}

#[tokio::test]
async fn order_cancelled_while_waiting_for_the_lock_changes_nothing() {
    let store = memory_store();
    let di = memory_services(&store);
    let product = seed_product(&di, "Widget", 5, 10).await;

    let mut holder = store.begin().await.unwrap();
    holder.find_product_for_update(product.id).await.unwrap();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        di.order_command.create_order(&order(product.id, 1, 0)),
    )
    .await;
    assert!(abandoned.is_err());

    holder.rollback().await.unwrap();
    assert_product_untouched_and_unlocked(&store, product.id).await;
}
