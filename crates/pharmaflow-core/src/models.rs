//! Domain models.

use serde::{Deserialize, Serialize};

/// A single pharmaceutical order, published whole as one JSON message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: u32,
    pub order_date: String,
    pub order_details: String,
}

impl Order {
    pub fn new(order_id: u32, order_date: impl Into<String>, order_details: impl Into<String>) -> Self {
        Self {
            order_id,
            order_date: order_date.into(),
            order_details: order_details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_serializes_with_camel_case_fields() {
        let order = Order::new(3, "2015/10/3", "Ibuprofen, Acetaminophen");
        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(
            json,
            r#"{"orderId":3,"orderDate":"2015/10/3","orderDetails":"Ibuprofen, Acetaminophen"}"#
        );
    }

    #[test]
    fn order_round_trips() {
        let order = Order::new(1, "2015/10/1", "Ibuprofen");
        let json = serde_json::to_string(&order).unwrap();
        let parsed: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, order);
    }
}
