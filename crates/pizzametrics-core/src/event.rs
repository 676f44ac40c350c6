//! Ingestion event inputs.
//!
//! Request handlers hand these to the aggregator; the aggregator only reads
//! them.

use serde::Deserialize;

/// HTTP methods tracked by a dedicated counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// All tracked methods, in reporting order.
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Put,
    ];

    /// Case-insensitive parse. Unknown methods yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("get") {
            Some(HttpMethod::Get)
        } else if s.eq_ignore_ascii_case("post") {
            Some(HttpMethod::Post)
        } else if s.eq_ignore_ascii_case("put") {
            Some(HttpMethod::Put)
        } else if s.eq_ignore_ascii_case("delete") {
            Some(HttpMethod::Delete)
        } else {
            None
        }
    }

    /// Lowercase tag value used on the wire.
    pub fn as_tag(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
        }
    }
}

/// One priced line item of an order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub menu_id: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
}

impl OrderItem {
    pub fn priced(price: f64) -> Self {
        Self {
            price,
            ..Self::default()
        }
    }
}

/// A pizza order as seen by the order endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub franchise_id: Option<u64>,
    #[serde(default)]
    pub store_id: Option<u64>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Build an order from bare prices.
    pub fn from_prices(prices: impl IntoIterator<Item = f64>) -> Self {
        Self {
            items: prices.into_iter().map(OrderItem::priced).collect(),
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("post"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse("Delete"), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::parse("pUt"), Some(HttpMethod::Put));
        assert_eq!(HttpMethod::parse("PATCH"), None);
        assert_eq!(HttpMethod::parse(""), None);
    }

    #[test]
    fn order_deserializes_from_service_json() {
        let raw = r#"{
            "franchiseId": 1,
            "storeId": 1,
            "items": [
                { "menuId": 1, "description": "Veggie", "price": 0.05 },
                { "menuId": 2, "description": "Pepperoni", "price": 0.0042 }
            ],
            "id": 77
        }"#;
        let order: Order = serde_json::from_str(raw).unwrap();
        assert_eq!(order.franchise_id, Some(1));
        assert_eq!(order.items().len(), 2);
        assert_eq!(order.items()[1].description.as_deref(), Some("Pepperoni"));
        assert_eq!(order.items()[0].price, 0.05);
    }

    #[test]
    fn order_without_items_is_empty() {
        let order: Order = serde_json::from_str("{}").unwrap();
        assert!(order.items().is_empty());
    }
}
