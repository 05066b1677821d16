use crate::{
    abstract_trait::product::{
        repository::DynProductQueryRepository, service::ProductQueryServiceTrait,
    },
    domain::response::product::ProductResponse,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::ServiceError,
    utils::{Method, Metrics, TracingContext},
};

const TRACER: &str = "product-query-service";

#[derive(Clone)]
pub struct ProductQueryService {
    query: DynProductQueryRepository,
    metrics: Metrics,
}

impl ProductQueryService {
    pub fn new(query: DynProductQueryRepository, registry: &mut Registry) -> Self {
        let metrics = Metrics::new();
        metrics.register("product_query_service", registry);

        Self { query, metrics }
    }
}

#[async_trait]
impl ProductQueryServiceTrait for ProductQueryService {
    async fn find_all(&self) -> Result<Vec<ProductResponse>, ServiceError> {
        let tracing_ctx = TracingContext::start(
            TRACER,
            "product_find_all",
            Method::Get,
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("operation", "find_all"),
            ],
        );

        match self.query.find_all().await {
            Ok(products) => {
                tracing_ctx.success(
                    &self.metrics,
                    &format!("Retrieved {} products", products.len()),
                );
                Ok(products.into_iter().map(ProductResponse::from).collect())
            }
            Err(e) => {
                tracing_ctx.failure(&self.metrics, &format!("Failed to fetch products: {e:?}"));
                Err(ServiceError::Repo(e))
            }
        }
    }
}
