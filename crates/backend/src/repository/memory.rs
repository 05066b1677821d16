use crate::{
    abstract_trait::{
        order::repository::{BoxedOrderTransaction, OrderTransactionTrait, UnitOfWorkTrait},
        product::repository::{ProductCommandRepositoryTrait, ProductQueryRepositoryTrait},
    },
    domain::requests::{order::CreateOrderRecordRequest, product::CreateProductRequest},
    model::{order::Order as OrderModel, product::Product as ProductModel},
};
use async_trait::async_trait;
use chrono::Utc;
use shared::errors::RepositoryError;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::sync::{Mutex as RowLock, OwnedMutexGuard};
use tracing::{info, warn};

#[derive(Default)]
struct Tables {
    products: BTreeMap<i32, ProductModel>,
    orders: Vec<OrderModel>,
    product_seq: i32,
    order_seq: i32,
}

type RowLocks = HashMap<i32, Arc<RowLock<()>>>;

/// Process-local storage with the same locking contract as the Postgres
/// backend: committed rows live behind one mutex and every product row has
/// its own async lock, held by a transaction from `find_product_for_update`
/// until commit or rollback. Readers never wait on row locks.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    row_locks: Arc<Mutex<RowLocks>>,
    lock_timeout: Duration,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl InMemoryStore {
    /// A zero `lock_timeout` waits for row locks indefinitely.
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            row_locks: Arc::new(Mutex::new(HashMap::new())),
            lock_timeout,
        }
    }

    /// Committed state of one product.
    pub fn product(&self, product_id: i32) -> Option<ProductModel> {
        lock_tables(&self.tables)
            .ok()
            .and_then(|tables| tables.products.get(&product_id).cloned())
    }

    /// Committed orders in insertion order.
    pub fn orders(&self) -> Vec<OrderModel> {
        lock_tables(&self.tables)
            .map(|tables| tables.orders.clone())
            .unwrap_or_default()
    }
}

fn lock_tables(tables: &Mutex<Tables>) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
    tables
        .lock()
        .map_err(|_| RepositoryError::Custom("in-memory tables poisoned".into()))
}

fn check_product(product: &ProductModel) -> Result<(), RepositoryError> {
    if product.name.is_empty() {
        return Err(RepositoryError::CheckViolation("products.name must not be empty".into()));
    }
    if product.price <= 0 {
        return Err(RepositoryError::CheckViolation("products.price must be > 0".into()));
    }
    if product.stock < 0 {
        return Err(RepositoryError::CheckViolation("products.stock must be >= 0".into()));
    }
    Ok(())
}

fn check_order(req: &CreateOrderRecordRequest) -> Result<(), RepositoryError> {
    if req.quantity <= 0 {
        return Err(RepositoryError::CheckViolation("orders.quantity must be > 0".into()));
    }
    if !(0..=100).contains(&req.discount_percent) {
        return Err(RepositoryError::CheckViolation(
            "orders.discount_percent must be within 0..=100".into(),
        ));
    }
    if req.total_price < 0 {
        return Err(RepositoryError::CheckViolation("orders.total_price must be >= 0".into()));
    }
    Ok(())
}

#[async_trait]
impl ProductQueryRepositoryTrait for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<ProductModel>, RepositoryError> {
        let tables = lock_tables(&self.tables)?;
        Ok(tables.products.values().rev().cloned().collect())
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for InMemoryStore {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductModel, RepositoryError> {
        let now = Utc::now().naive_utc();
        let mut tables = lock_tables(&self.tables)?;

        let mut product = ProductModel {
            product_id: 0,
            name: req.name.clone(),
            price: req.price,
            stock: req.stock,
            created_at: now,
            updated_at: now,
        };
        check_product(&product)?;

        tables.product_seq += 1;
        product.product_id = tables.product_seq;
        tables.products.insert(product.product_id, product.clone());

        info!("✅ Created product ID {} ('{}')", product.product_id, product.name);
        Ok(product)
    }
}

#[async_trait]
impl UnitOfWorkTrait for InMemoryStore {
    async fn begin(&self) -> Result<BoxedOrderTransaction, RepositoryError> {
        Ok(Box::new(InMemoryTransaction {
            store: self.clone(),
            held: HashMap::new(),
            staged_products: BTreeMap::new(),
            staged_orders: Vec::new(),
        }))
    }
}

pub struct InMemoryTransaction {
    store: InMemoryStore,
    held: HashMap<i32, OwnedMutexGuard<()>>,
    staged_products: BTreeMap<i32, ProductModel>,
    staged_orders: Vec<OrderModel>,
}

impl InMemoryTransaction {
    fn visible_product(&self, product_id: i32) -> Result<Option<ProductModel>, RepositoryError> {
        if let Some(staged) = self.staged_products.get(&product_id) {
            return Ok(Some(staged.clone()));
        }
        let tables = lock_tables(&self.store.tables)?;
        Ok(tables.products.get(&product_id).cloned())
    }

    fn row_lock(&self, product_id: i32) -> Result<Arc<RowLock<()>>, RepositoryError> {
        let mut locks = self
            .store
            .row_locks
            .lock()
            .map_err(|_| RepositoryError::Custom("in-memory row locks poisoned".into()))?;
        Ok(locks.entry(product_id).or_default().clone())
    }
}

#[async_trait]
impl OrderTransactionTrait for InMemoryTransaction {
    async fn find_product_for_update(
        &mut self,
        product_id: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        if self.held.contains_key(&product_id) {
            return self.visible_product(product_id);
        }

        // Products are never deleted, so a row seen here is still there once locked.
        if self.visible_product(product_id)?.is_none() {
            return Ok(None);
        }

        let row_lock = self.row_lock(product_id)?;
        let timeout = self.store.lock_timeout;

        let guard = if timeout.is_zero() {
            row_lock.lock_owned().await
        } else {
            tokio::time::timeout(timeout, row_lock.lock_owned())
                .await
                .map_err(|_| {
                    warn!("⏳ Timed out waiting for lock on product {product_id}");
                    RepositoryError::LockTimeout
                })?
        };
        self.held.insert(product_id, guard);

        self.visible_product(product_id)
    }

    async fn save_product(&mut self, product: &ProductModel) -> Result<ProductModel, RepositoryError> {
        if !self.held.contains_key(&product.product_id) {
            return Err(RepositoryError::Custom(format!(
                "product {} saved without holding its row lock",
                product.product_id
            )));
        }
        check_product(product)?;

        let mut saved = product.clone();
        saved.updated_at = Utc::now().naive_utc();
        self.staged_products.insert(saved.product_id, saved.clone());

        Ok(saved)
    }

    async fn insert_order(
        &mut self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError> {
        check_order(req)?;

        if self.visible_product(req.product_id)?.is_none() {
            return Err(RepositoryError::ForeignKey(format!(
                "orders.product_id {} does not reference a product",
                req.product_id
            )));
        }

        // Like a database sequence, ids consumed by rolled back orders are not reused.
        let order_id = {
            let mut tables = lock_tables(&self.store.tables)?;
            tables.order_seq += 1;
            tables.order_seq
        };

        let order = OrderModel {
            order_id,
            product_id: req.product_id,
            quantity: req.quantity,
            discount_percent: req.discount_percent,
            total_price: req.total_price,
            created_at: Utc::now().naive_utc(),
        };
        self.staged_orders.push(order.clone());

        Ok(order)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let mut this = *self;
        {
            let mut tables = lock_tables(&this.store.tables)?;
            for (id, product) in std::mem::take(&mut this.staged_products) {
                tables.products.insert(id, product);
            }
            tables.orders.append(&mut this.staged_orders);
        }
        // row locks are released only after the new rows are visible
        drop(this);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        drop(self);
        Ok(())
    }
}
