use crate::model::product::Product as ProductModel;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub stock: i32,
    pub price: i64,
    pub created_at: NaiveDateTime,
    #[serde(rename = "update_at")]
    pub updated_at: NaiveDateTime,
}

// model to response
impl From<ProductModel> for ProductResponse {
    fn from(value: ProductModel) -> Self {
        ProductResponse {
            id: value.product_id,
            name: value.name,
            stock: value.stock,
            price: value.price,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
