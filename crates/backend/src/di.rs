use crate::{
    abstract_trait::{
        order::{repository::DynUnitOfWork, service::DynOrderCommandService},
        product::{
            repository::{DynProductCommandRepository, DynProductQueryRepository},
            service::{DynProductCommandService, DynProductQueryService},
        },
    },
    repository::{
        memory::InMemoryStore,
        order::PgUnitOfWork,
        product::{ProductCommandRepository, ProductQueryRepository},
    },
    service::{
        order::OrderCommandService,
        product::{ProductCommandService, ProductQueryService},
    },
};
use prometheus_client::registry::Registry;
use shared::config::ConnectionPool;
use std::{fmt, sync::Arc, time::Duration};

#[derive(Clone)]
pub struct DependenciesInject {
    pub product_query: DynProductQueryService,
    pub product_command: DynProductCommandService,
    pub order_command: DynOrderCommandService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("product_query", &"ProductQueryService")
            .field("product_command", &"ProductCommandService")
            .field("order_command", &"OrderCommandService")
            .finish()
    }
}

/// Storage collaborators the services are built on.
#[derive(Clone)]
pub struct DependenciesInjectDeps {
    pub product_query: DynProductQueryRepository,
    pub product_command: DynProductCommandRepository,
    pub unit_of_work: DynUnitOfWork,
}

impl DependenciesInjectDeps {
    pub fn postgres(pool: ConnectionPool, lock_timeout: Duration) -> Self {
        Self {
            product_query: Arc::new(ProductQueryRepository::new(pool.clone())),
            product_command: Arc::new(ProductCommandRepository::new(pool.clone())),
            unit_of_work: Arc::new(PgUnitOfWork::new(pool, lock_timeout)),
        }
    }

    pub fn in_memory(store: InMemoryStore) -> Self {
        Self {
            product_query: Arc::new(store.clone()),
            product_command: Arc::new(store.clone()),
            unit_of_work: Arc::new(store),
        }
    }
}

impl DependenciesInject {
    pub fn new(deps: DependenciesInjectDeps, registry: &mut Registry) -> Self {
        let DependenciesInjectDeps {
            product_query,
            product_command,
            unit_of_work,
        } = deps;

        let product_query =
            Arc::new(ProductQueryService::new(product_query, registry)) as DynProductQueryService;

        let product_command = Arc::new(ProductCommandService::new(product_command, registry))
            as DynProductCommandService;

        let order_command =
            Arc::new(OrderCommandService::new(unit_of_work, registry)) as DynOrderCommandService;

        Self {
            product_query,
            product_command,
            order_command,
        }
    }
}
