use crate::{
    domain::response::product::ProductResponse,
    model::{order::Order as OrderModel, product::Product as ProductModel},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub discount_percent: i32,
    pub total_price: i64,
    pub created_at: NaiveDateTime,
    pub product: ProductResponse,
}

// committed order row plus the product as left by the same transaction
impl From<(OrderModel, ProductModel)> for OrderResponse {
    fn from((order, product): (OrderModel, ProductModel)) -> Self {
        OrderResponse {
            id: order.order_id,
            product_id: order.product_id,
            quantity: order.quantity,
            discount_percent: order.discount_percent,
            total_price: order.total_price,
            created_at: order.created_at,
            product: ProductResponse::from(product),
        }
    }
}
