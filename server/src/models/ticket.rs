use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Largest amount a `NUMERIC(12,2)` column holds: 9999999999.99, i.e. the
/// 96-bit mantissa 999_999_999_999 at scale 2.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, AMOUNT_SCALE);
/// Prices and totals are stored with two decimal places.
pub const AMOUNT_SCALE: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketType {
    pub id: Uuid,
    pub event_id: Uuid,
    pub label: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTicketType {
    pub label: String,
    pub price: Decimal,
}

impl TicketType {
    /// `price × quantity`, or `None` when the total does not fit in [`MAX_AMOUNT`].
    pub fn total_for(&self, quantity: i32) -> Option<Decimal> {
        self.price
            .checked_mul(Decimal::from(quantity))
            .filter(|total| *total <= MAX_AMOUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn ticket(price: Decimal) -> TicketType {
        TicketType {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            label: "General".to_string(),
            price,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn total_is_price_times_quantity() {
        let ticket = ticket(Decimal::from_str("2500.50").unwrap());
        assert_eq!(ticket.total_for(3), Some(Decimal::from_str("7501.50").unwrap()));
    }

    #[test]
    fn max_amount_is_the_numeric_12_2_ceiling() {
        assert_eq!(MAX_AMOUNT, Decimal::from_str("9999999999.99").unwrap());
    }

    #[test]
    fn oversized_totals_are_refused() {
        assert_eq!(ticket(MAX_AMOUNT).total_for(1), Some(MAX_AMOUNT));
        assert_eq!(ticket(MAX_AMOUNT).total_for(2), None);
        assert_eq!(ticket(Decimal::MAX).total_for(2), None);
    }
}
