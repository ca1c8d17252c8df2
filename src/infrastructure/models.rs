use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartLine};
use crate::domain::errors::DomainError;
use crate::domain::product::{Category, NewProduct, Product};
use crate::schema::{cart_lines, carts, products};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub model: String,
    pub category: String,
    pub quantity: i32,
    pub selling_price: BigDecimal,
    pub arrival_date: Option<NaiveDate>,
    pub details: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub model: String,
    pub category: String,
    pub quantity: i32,
    pub selling_price: BigDecimal,
    pub arrival_date: Option<NaiveDate>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartRow {
    pub id: Uuid,
    pub customer: String,
    pub paid: bool,
    pub payment_date: Option<NaiveDate>,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow {
    pub id: Uuid,
    pub customer: String,
    pub paid: bool,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = cart_lines)]
#[diesel(primary_key(cart_id, product_model))]
#[diesel(belongs_to(CartRow, foreign_key = cart_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartLineRow {
    pub cart_id: Uuid,
    pub product_model: String,
    pub quantity: i32,
    pub category: String,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_lines)]
pub struct NewCartLineRow {
    pub cart_id: Uuid,
    pub product_model: String,
    pub quantity: i32,
    pub category: String,
    pub price: BigDecimal,
}

fn parse_category(raw: &str) -> Result<Category, DomainError> {
    Category::from_str(raw)
        .map_err(|_| DomainError::Internal(format!("stored category '{raw}' is not recognised")))
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            category: parse_category(&row.category)?,
            model: row.model,
            quantity: row.quantity,
            selling_price: row.selling_price,
            arrival_date: row.arrival_date,
            details: row.details,
        })
    }
}

impl From<NewProduct> for NewProductRow {
    fn from(p: NewProduct) -> Self {
        NewProductRow {
            model: p.model,
            category: p.category.to_string(),
            quantity: p.quantity,
            selling_price: p.selling_price,
            arrival_date: p.arrival_date,
            details: p.details,
        }
    }
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = DomainError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        Ok(CartLine {
            category: parse_category(&row.category)?,
            model: row.product_model,
            quantity: row.quantity,
            price: row.price,
        })
    }
}

impl CartRow {
    pub fn into_cart(self, lines: Vec<CartLineRow>) -> Result<Cart, DomainError> {
        let lines = lines
            .into_iter()
            .map(CartLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Cart {
            customer: self.customer,
            paid: self.paid,
            payment_date: self.payment_date,
            total: self.total,
            lines,
        })
    }
}
