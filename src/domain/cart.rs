use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use super::product::{Category, Product};

pub type CartId = Uuid;

/// One product model inside a cart.
///
/// `category` and `price` are copied from the catalog when the line is first
/// created and never follow later catalog changes.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub model: String,
    pub quantity: i32,
    pub category: Category,
    pub price: BigDecimal,
}

impl CartLine {
    pub fn subtotal(&self) -> BigDecimal {
        self.price.clone() * BigDecimal::from(self.quantity)
    }
}

/// Catalog data captured when a model is first added to a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSnapshot {
    pub model: String,
    pub category: Category,
    pub price: BigDecimal,
}

impl From<&Product> for LineSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            model: product.model.clone(),
            category: product.category,
            price: product.selling_price.clone(),
        }
    }
}

/// Outcome of taking one unit of a model out of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRemoval {
    Decremented { remaining: i32 },
    Removed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub customer: String,
    pub paid: bool,
    pub payment_date: Option<NaiveDate>,
    /// Always zero until the cart is checked out.
    pub total: BigDecimal,
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// The cart reported for a customer that has no open cart.
    pub fn empty(customer: &str) -> Self {
        Self::open(customer, Vec::new())
    }

    pub fn open(customer: &str, lines: Vec<CartLine>) -> Self {
        Self {
            customer: customer.to_string(),
            paid: false,
            payment_date: None,
            total: BigDecimal::from(0),
            lines,
        }
    }

    pub fn paid(customer: &str, payment_date: NaiveDate, total: BigDecimal, lines: Vec<CartLine>) -> Self {
        Self {
            customer: customer.to_string(),
            paid: true,
            payment_date: Some(payment_date),
            total,
            lines,
        }
    }
}

pub fn total_of(lines: &[CartLine]) -> BigDecimal {
    lines
        .iter()
        .fold(BigDecimal::from(0), |acc, line| acc + line.subtotal())
}
