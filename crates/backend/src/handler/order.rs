use crate::{
    abstract_trait::order::service::DynOrderCommandService,
    domain::{requests::order::CreateOrderRequest, response::order::OrderResponse},
    middleware::JsonBody,
    state::AppState,
};
use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse, routing::post};
use shared::errors::{ErrorResponse, HttpError};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    post,
    path = "/order",
    tag = "Order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed and stock decremented", body = OrderResponse),
        (status = 400, description = "Invalid input, unknown product or insufficient stock", body = ErrorResponse),
        (status = 500, description = "Storage failure; nothing was changed", body = ErrorResponse)
    )
)]
pub async fn create_order(
    Extension(service): Extension<DynOrderCommandService>,
    JsonBody(body): JsonBody<CreateOrderRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.create_order(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub fn order_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/order", post(create_order))
        .layer(Extension(app_state.di_container.order_command.clone()))
}
