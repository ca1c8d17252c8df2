use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use super::today;
use crate::domain::errors::DomainError;
use crate::domain::ports::InventoryRepository;
use crate::domain::product::{NewProduct, Product};
use crate::storage::StorageGateway;

const MAX_PRICE: i64 = 10_000_000_000;

/// Stock-aware operations on catalog products.
#[derive(Clone)]
pub struct InventoryService {
    store: StorageGateway<dyn InventoryRepository>,
}

impl InventoryService {
    pub fn new(repo: Arc<dyn InventoryRepository>) -> Self {
        Self {
            store: StorageGateway::new(repo),
        }
    }

    pub async fn get_product(&self, model: &str) -> Result<Product, DomainError> {
        let model = model.to_string();
        self.store
            .call(move |repo| repo.find(&model))
            .await?
            .ok_or(DomainError::ProductNotFound)
    }

    /// Register a new model. The arrival date defaults to today and may not
    /// lie in the future.
    pub async fn register_product(&self, mut product: NewProduct) -> Result<(), DomainError> {
        if product.model.trim().is_empty() {
            return Err(DomainError::InvalidInput("model must not be empty".to_string()));
        }
        if product.quantity < 0 {
            return Err(DomainError::InvalidInput("quantity must not be negative".to_string()));
        }
        check_price(&product.selling_price)?;

        let today = today();
        match product.arrival_date {
            Some(date) if date > today => {
                return Err(DomainError::InvalidDate(format!("arrival date {date} is in the future")));
            }
            Some(_) => {}
            None => product.arrival_date = Some(today),
        }

        let model = product.model.clone();
        self.store.call(move |repo| repo.insert(product)).await?;
        log::info!("Registered product {}", model);
        Ok(())
    }

    /// Overwrite the stock level of `model` and return it.
    pub async fn set_quantity(
        &self,
        model: &str,
        quantity: i32,
        change_date: Option<NaiveDate>,
    ) -> Result<i32, DomainError> {
        if quantity < 0 {
            return Err(DomainError::InvalidInput("quantity must not be negative".to_string()));
        }
        if let Some(date) = change_date {
            let product = self.get_product(model).await?;
            check_movement_date(date, &product)?;
        }

        let owned = model.to_string();
        let affected = self
            .store
            .execute(move |repo| repo.set_quantity(&owned, quantity))
            .await?;
        if affected == 0 {
            return Err(DomainError::ProductNotFound);
        }

        log::info!("Stock of {} set to {}", model, quantity);
        Ok(quantity)
    }

    /// Sell `amount` units of `model` and return the remaining quantity.
    pub async fn decrement_for_sale(
        &self,
        model: &str,
        amount: i32,
        selling_date: Option<NaiveDate>,
    ) -> Result<i32, DomainError> {
        if amount <= 0 {
            return Err(DomainError::InvalidInput("amount must be positive".to_string()));
        }

        let product = self.get_product(model).await?;
        if let Some(date) = selling_date {
            check_movement_date(date, &product)?;
        }
        check_stock(&product, amount)?;

        // A lost race is retried once when a re-read still shows enough stock.
        for attempt in 0..2 {
            let owned = model.to_string();
            if let Some(remaining) = self
                .store
                .call(move |repo| repo.decrement_if_available(&owned, amount))
                .await?
            {
                log::info!("Sold {} of {}, {} left", amount, model, remaining);
                return Ok(remaining);
            }

            let current = self.get_product(model).await?;
            log::warn!("Sale of {} x{} lost a race for stock (attempt {})", model, amount, attempt + 1);
            check_stock(&current, amount)?;
        }
        Err(DomainError::LowStock)
    }

    pub async fn delete_product(&self, model: &str) -> Result<(), DomainError> {
        let owned = model.to_string();
        let affected = self.store.execute(move |repo| repo.delete(&owned)).await?;
        if affected == 0 {
            return Err(DomainError::ProductNotFound);
        }
        log::info!("Deleted product {}", model);
        Ok(())
    }

    pub async fn delete_all_products(&self) -> Result<(), DomainError> {
        let affected = self.store.execute(|repo| repo.delete_all()).await?;
        log::info!("Deleted {} products", affected);
        Ok(())
    }
}

/// Prices are stored as `NUMERIC(12, 2)`.
fn check_price(price: &BigDecimal) -> Result<(), DomainError> {
    if *price <= BigDecimal::from(0) {
        return Err(DomainError::InvalidInput("selling price must be positive".to_string()));
    }
    if price.with_scale(2) != *price {
        return Err(DomainError::InvalidInput(format!(
            "selling price {price} has more than two decimals"
        )));
    }
    if *price >= BigDecimal::from(MAX_PRICE) {
        return Err(DomainError::InvalidInput(format!(
            "selling price {price} must be below {MAX_PRICE}"
        )));
    }
    Ok(())
}

fn check_stock(product: &Product, amount: i32) -> Result<(), DomainError> {
    if product.quantity == 0 {
        return Err(DomainError::EmptyStock);
    }
    if amount > product.quantity {
        return Err(DomainError::LowStock);
    }
    Ok(())
}

/// Stock movements may not be dated in the future or before the product arrived.
fn check_movement_date(date: NaiveDate, product: &Product) -> Result<(), DomainError> {
    if date > today() {
        return Err(DomainError::InvalidDate(format!("{date} is in the future")));
    }
    if product.arrival_date.is_some_and(|arrived| date < arrived) {
        return Err(DomainError::InvalidDate(format!(
            "{date} is before the arrival of {}",
            product.model
        )));
    }
    Ok(())
}
