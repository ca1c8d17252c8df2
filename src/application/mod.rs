pub mod cart_service;
pub mod checkout;
pub mod inventory_service;

use chrono::{NaiveDate, Utc};

pub use cart_service::CartService;
pub use checkout::CheckoutEngine;
pub use inventory_service::InventoryService;

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    use crate::domain::product::{Category, NewProduct};

    pub(crate) fn decimal(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).expect("valid decimal")
    }

    pub(crate) fn new_product(model: &str, quantity: i32, price: &str) -> NewProduct {
        NewProduct {
            model: model.to_string(),
            category: Category::Smartphone,
            quantity,
            selling_price: decimal(price),
            arrival_date: NaiveDate::from_ymd_opt(2024, 1, 10),
            details: None,
        }
    }
}
