use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Smartphone,
    Laptop,
    Appliance,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Smartphone => "Smartphone",
            Category::Laptop => "Laptop",
            Category::Appliance => "Appliance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Smartphone" => Ok(Category::Smartphone),
            "Laptop" => Ok(Category::Laptop),
            "Appliance" => Ok(Category::Appliance),
            other => Err(DomainError::InvalidInput(format!("unknown category '{other}'"))),
        }
    }
}

/// A catalog entry together with its live stock level.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub model: String,
    pub category: Category,
    pub quantity: i32,
    pub selling_price: BigDecimal,
    pub arrival_date: Option<NaiveDate>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub model: String,
    pub category: Category,
    pub quantity: i32,
    pub selling_price: BigDecimal,
    /// Defaults to the registration day when absent.
    pub arrival_date: Option<NaiveDate>,
    pub details: Option<String>,
}
