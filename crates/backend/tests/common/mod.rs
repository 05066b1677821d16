#![allow(dead_code)]

use backend::{
    di::{DependenciesInject, DependenciesInjectDeps},
    domain::{requests::product::CreateProductRequest, response::product::ProductResponse},
    repository::memory::InMemoryStore,
    state::AppState,
};
use prometheus_client::registry::Registry;
use std::time::Duration;

pub fn memory_store() -> InMemoryStore {
    InMemoryStore::new(Duration::from_secs(5))
}

pub fn services(deps: DependenciesInjectDeps) -> DependenciesInject {
    let mut registry = Registry::default();
    DependenciesInject::new(deps, &mut registry)
}

pub fn memory_services(store: &InMemoryStore) -> DependenciesInject {
    services(DependenciesInjectDeps::in_memory(store.clone()))
}

pub fn memory_state(store: &InMemoryStore) -> AppState {
    AppState::new(DependenciesInjectDeps::in_memory(store.clone()))
}

pub async fn seed_product(
    di: &DependenciesInject,
    name: &str,
    stock: i32,
    price: i64,
) -> ProductResponse {
    di.product_command
        .create_product(&CreateProductRequest {
            name: name.to_string(),
            stock,
            price,
        })
        .await
        .expect("seed product")
}
