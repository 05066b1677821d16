use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,

    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i32,

    #[validate(range(min = 1, message = "price must be greater than 0"))]
    pub price: i64,
}
