use crate::{
    abstract_trait::order::{
        repository::{DynUnitOfWork, OrderTransactionTrait},
        service::OrderCommandServiceTrait,
    },
    domain::{
        requests::order::{CreateOrderRecordRequest, CreateOrderRequest},
        response::order::OrderResponse,
    },
    model::{order::Order as OrderModel, product::Product as ProductModel},
    service::order::pricing::calculate_total_price,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::ServiceError,
    utils::{Method, Metrics, TracingContext},
};
use tracing::{error, info};
use validator::Validate;

const TRACER: &str = "order-command-service";

#[derive(Clone)]
pub struct OrderCommandService {
    unit_of_work: DynUnitOfWork,
    metrics: Metrics,
}

impl OrderCommandService {
    pub fn new(unit_of_work: DynUnitOfWork, registry: &mut Registry) -> Self {
        let metrics = Metrics::new();
        metrics.register("order_command_service", registry);

        Self {
            unit_of_work,
            metrics,
        }
    }

    /// Steps that run while the product row is locked. Any error leaves the
    /// transaction to be rolled back by the caller.
    async fn reserve_and_record(
        tx: &mut (dyn OrderTransactionTrait + Send),
        req: &CreateOrderRequest,
    ) -> Result<(OrderModel, ProductModel), ServiceError> {
        let not_found = || ServiceError::NotFound("Product not found".to_string());

        let product_id = i32::try_from(req.product_id).map_err(|_| not_found())?;
        let mut product = tx
            .find_product_for_update(product_id)
            .await?
            .ok_or_else(not_found)?;

        if product.stock < req.quantity {
            return Err(ServiceError::InsufficientStock {
                product_id: product.product_id,
                requested: req.quantity,
                available: product.stock,
            });
        }

        let total_price = calculate_total_price(product.price, req.quantity, req.discount_percent)?;

        product.stock -= req.quantity;
        let product = tx.save_product(&product).await?;

        let order = tx
            .insert_order(&CreateOrderRecordRequest {
                product_id: product.product_id,
                quantity: req.quantity,
                discount_percent: req.discount_percent,
                total_price,
            })
            .await?;

        Ok((order, product))
    }
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn create_order(&self, req: &CreateOrderRequest) -> Result<OrderResponse, ServiceError> {
        info!(
            "🏗️ Placing order: product_id={}, quantity={}, discount={}%",
            req.product_id, req.quantity, req.discount_percent
        );

        let tracing_ctx = TracingContext::start(
            TRACER,
            "create_order",
            Method::Post,
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "create"),
                KeyValue::new("order.product_id", req.product_id),
                KeyValue::new("order.quantity", i64::from(req.quantity)),
            ],
        );

        if let Err(errors) = req.validate() {
            let err = ServiceError::from(errors);
            tracing_ctx.rejected(&self.metrics, &err.to_string());
            return Err(err);
        }

        let mut tx = match self.unit_of_work.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                tracing_ctx.failure(&self.metrics, &format!("Failed to begin transaction: {e:?}"));
                return Err(ServiceError::Repo(e));
            }
        };

        // `tx` rolls back on drop, which also covers panics and cancellation
        // while the row lock is held.
        let (order, product) = match Self::reserve_and_record(tx.as_mut(), req).await {
            Ok(placed) => placed,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!("❌ Rollback failed after '{err}': {rollback_err:?}");
                }

                match &err {
                    ServiceError::Repo(_) | ServiceError::Internal(_) => {
                        tracing_ctx.failure(&self.metrics, &err.to_string())
                    }
                    _ => tracing_ctx.rejected(&self.metrics, &err.to_string()),
                }
                return Err(err);
            }
        };

        if let Err(e) = tx.commit().await {
            tracing_ctx.failure(&self.metrics, &format!("Failed to commit order: {e:?}"));
            return Err(ServiceError::Repo(e));
        }

        tracing_ctx.success(
            &self.metrics,
            &format!(
                "Order {} placed: product_id={}, total_price={}, remaining stock={}",
                order.order_id, product.product_id, order.total_price, product.stock
            ),
        );

        Ok(OrderResponse::from((order, product)))
    }
}
