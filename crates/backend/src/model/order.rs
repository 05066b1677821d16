use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Append-only: rows are inserted by the order placement transaction and
/// never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub discount_percent: i32,
    pub total_price: i64,
    pub created_at: NaiveDateTime,
}
