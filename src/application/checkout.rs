//! Open → paid transition of a customer's cart.
//!
//! The transition validates availability for every line first and only then
//! commits. The commit itself is a single repository call that re-checks
//! each line with a conditional decrement, so a shortfall discovered there
//! leaves neither the cart nor any product modified.

use std::sync::Arc;

use super::today;
use crate::domain::cart::{total_of, Cart, CartLine};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, InventoryRepository};
use crate::storage::StorageGateway;

#[derive(Clone)]
pub struct CheckoutEngine {
    carts: StorageGateway<dyn CartRepository>,
    inventory: StorageGateway<dyn InventoryRepository>,
}

impl CheckoutEngine {
    pub fn new(carts: Arc<dyn CartRepository>, inventory: Arc<dyn InventoryRepository>) -> Self {
        Self {
            carts: StorageGateway::new(carts),
            inventory: StorageGateway::new(inventory),
        }
    }

    /// Pay for the customer's open cart and return it in its paid state.
    pub async fn checkout(&self, customer: &str) -> Result<Cart, DomainError> {
        let owned = customer.to_string();
        let cart_id = self
            .carts
            .call(move |repo| repo.open_cart_id(&owned))
            .await?
            .ok_or(DomainError::CartNotFound)?;

        let lines = self.carts.query(move |repo| repo.lines(cart_id)).await?;
        if lines.is_empty() {
            log::debug!("Checkout of empty cart {} rejected", cart_id);
            return Err(DomainError::EmptyCart);
        }

        self.ensure_available(&lines).await?;

        let total = total_of(&lines);
        let paid_on = today();
        let (snapshot, amount) = (lines.clone(), total.clone());
        self.carts
            .call(move |repo| repo.commit_checkout(cart_id, &snapshot, &amount, paid_on))
            .await?;

        log::info!(
            "Cart {} of {} paid on {}: {} lines, total {}",
            cart_id,
            customer,
            paid_on,
            lines.len(),
            total
        );
        Ok(Cart::paid(customer, paid_on, total, lines))
    }

    async fn ensure_available(&self, lines: &[CartLine]) -> Result<(), DomainError> {
        for line in lines {
            let model = line.model.clone();
            let product = self
                .inventory
                .call(move |repo| repo.find(&model))
                .await?
                .ok_or(DomainError::ProductNotFound)?;

            if product.quantity < line.quantity {
                log::debug!(
                    "{} has {} in stock, cart needs {}",
                    product.model,
                    product.quantity,
                    line.quantity
                );
                return Err(DomainError::LowStock);
            }
        }
        Ok(())
    }
}
