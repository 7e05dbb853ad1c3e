//! Shopping cart views.

use rust_decimal::Decimal;
use serde::Serialize;

use coledzh_shop_core::CartItemId;

use super::ProductCard;

/// One line in a cart. Adding the same product twice yields two lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: ProductCard,
}

/// A user's cart with its exact decimal total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
}

impl Cart {
    /// Build a cart from its items, computing the total.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let total = items.iter().map(|item| item.product.price.amount()).sum();
        Self { items, total }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use coledzh_shop_core::{Price, ProductId};

    use super::*;

    fn item(price: &str) -> CartItem {
        CartItem {
            id: CartItemId::generate(),
            product: ProductCard {
                id: ProductId::generate(),
                name: "Mug".to_owned(),
                price: Price::parse(Decimal::from_str(price).unwrap()).unwrap(),
            },
        }
    }

    #[test]
    fn test_total_is_exact() {
        let cart = Cart::from_items(vec![item("0.10"), item("0.20"), item("999999.99")]);
        assert_eq!(cart.total, Decimal::from_str("1000000.29").unwrap());
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        assert_eq!(Cart::from_items(Vec::new()).total, Decimal::ZERO);
    }
}
