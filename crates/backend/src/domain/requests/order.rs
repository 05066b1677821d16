use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    /// Wider than the stored id so unknown large ids read as not found.
    #[validate(range(min = 1, message = "product_id must be a valid identifier"))]
    pub product_id: i64,

    #[validate(range(min = 1, message = "quantity must be greater than 0"))]
    pub quantity: i32,

    #[validate(range(min = 0, max = 100, message = "discount_percent must be between 0 and 100"))]
    #[serde(default)]
    pub discount_percent: i32,
}

/// Row to append once stock has been reserved and the total computed.
#[derive(Debug, Clone)]
pub struct CreateOrderRecordRequest {
    pub product_id: i32,
    pub quantity: i32,
    pub discount_percent: i32,
    pub total_price: i64,
}
