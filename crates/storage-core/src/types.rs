//! # Domain Types
//!
//! The product entity handled by the storage layer.
//!
//! ## Column Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   products table            Product                                     │
//! │   ──────────────            ───────                                     │
//! │   id     INTEGER   ───────► id: i64          (assigned by the store)    │
//! │   name   TEXT      ───────► name: String                                │
//! │   type   TEXT      ───────► product_type: String                        │
//! │   count  INTEGER   ───────► count: i64                                  │
//! │   price  REAL      ───────► price: f64                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every read statement selects `(id, name, type, count, price)` in that
//! order. An `id` of zero means the value has not been stored yet.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Product
// =============================================================================

/// A product kept in stock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Surrogate key assigned by the store. Zero until persisted.
    #[serde(default)]
    pub id: i64,

    /// Display name, also used as a lookup key (not unique).
    pub name: String,

    /// Free-form category label.
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub product_type: String,

    /// Quantity on hand.
    pub count: i64,

    /// Unit price.
    pub price: f64,
}

impl Product {
    /// Creates a product that has not been stored yet.
    ///
    /// ## Example
    /// ```rust
    /// use storage_core::Product;
    ///
    /// let p = Product::new("TV", "Smart", 1, 10.0);
    /// assert_eq!(p.id, 0);
    /// assert_eq!(p.product_type, "Smart");
    /// ```
    pub fn new(
        name: impl Into<String>,
        product_type: impl Into<String>,
        count: i64,
        price: f64,
    ) -> Self {
        Product {
            id: 0,
            name: name.into(),
            product_type: product_type.into(),
            count,
            price,
        }
    }

    /// Returns a copy carrying the given id.
    #[inline]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Whether the store has assigned an id to this product.
    #[inline]
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_persisted() {
        let p = Product::default();
        assert_eq!(p.id, 0);
        assert!(p.name.is_empty());
        assert!(!p.is_persisted());
    }

    #[test]
    fn test_with_id() {
        let p = Product::new("TV", "Smart", 1, 10.0).with_id(6);
        assert!(p.is_persisted());
        assert_eq!(p, Product {
            id: 6,
            name: "TV".to_string(),
            product_type: "Smart".to_string(),
            count: 1,
            price: 10.0,
        });
    }

    #[test]
    fn test_json_uses_type_key() {
        let p = Product::new("PC", "Smart", 1, 30.0).with_id(4);
        let json = serde_json::to_value(&p).unwrap();

        assert_eq!(json["type"], "Smart");
        assert!(json.get("product_type").is_none());
    }

    #[test]
    fn test_json_without_id_deserializes_as_new() {
        let p: Product =
            serde_json::from_str(r#"{"name":"HH","type":"Smart","count":1,"price":20.0}"#)
                .unwrap();

        assert!(!p.is_persisted());
        assert_eq!(p, Product::new("HH", "Smart", 1, 20.0));
    }
}
