use crate::{
    abstract_trait::product::{
        repository::DynProductCommandRepository, service::ProductCommandServiceTrait,
    },
    domain::{requests::product::CreateProductRequest, response::product::ProductResponse},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::ServiceError,
    utils::{Method, Metrics, TracingContext},
};
use tracing::info;
use validator::Validate;

const TRACER: &str = "product-command-service";

#[derive(Clone)]
pub struct ProductCommandService {
    command: DynProductCommandRepository,
    metrics: Metrics,
}

impl ProductCommandService {
    pub fn new(command: DynProductCommandRepository, registry: &mut Registry) -> Self {
        let metrics = Metrics::new();
        metrics.register("product_command_service", registry);

        Self { command, metrics }
    }
}

#[async_trait]
impl ProductCommandServiceTrait for ProductCommandService {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        info!("🏗️ Creating product '{}'", req.name);

        let tracing_ctx = TracingContext::start(
            TRACER,
            "create_product",
            Method::Post,
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("operation", "create"),
                KeyValue::new("product.name", req.name.clone()),
            ],
        );

        if let Err(errors) = req.validate() {
            let err = ServiceError::from(errors);
            tracing_ctx.rejected(&self.metrics, &err.to_string());
            return Err(err);
        }

        match self.command.create_product(req).await {
            Ok(product) => {
                tracing_ctx.success(
                    &self.metrics,
                    &format!("Product created with ID {}", product.product_id),
                );
                Ok(ProductResponse::from(product))
            }
            Err(e) => {
                tracing_ctx.failure(&self.metrics, &format!("Failed to create product: {e:?}"));
                Err(ServiceError::Repo(e))
            }
        }
    }
}
