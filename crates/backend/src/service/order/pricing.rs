use shared::errors::ServiceError;

/// Amount charged for `quantity` units at `unit_price` with a whole-percent
/// discount. The discount is truncated toward zero before it is subtracted:
/// price=100, quantity=3, discount=15 charges 300 - 45 = 255.
pub fn calculate_total_price(
    unit_price: i64,
    quantity: i32,
    discount_percent: i32,
) -> Result<i64, ServiceError> {
    let raw_total = i128::from(unit_price) * i128::from(quantity);
    let discount_amount = raw_total * i128::from(discount_percent) / 100;
    let total = raw_total - discount_amount;

    i64::try_from(total).map_err(|_| {
        ServiceError::Validation(vec![format!(
            "total_price: {unit_price} x {quantity} exceeds the supported range"
        )])
    })
}
