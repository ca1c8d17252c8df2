use std::sync::Arc;

use super::checkout::CheckoutEngine;
use crate::domain::cart::{Cart, CartId, LineRemoval, LineSnapshot};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, InventoryRepository};
use crate::domain::product::Product;
use crate::storage::StorageGateway;

/// Lifecycle of customers' carts and their lines.
#[derive(Clone)]
pub struct CartService {
    carts: StorageGateway<dyn CartRepository>,
    inventory: StorageGateway<dyn InventoryRepository>,
    engine: CheckoutEngine,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartRepository>, inventory: Arc<dyn InventoryRepository>) -> Self {
        Self {
            engine: CheckoutEngine::new(Arc::clone(&carts), Arc::clone(&inventory)),
            carts: StorageGateway::new(carts),
            inventory: StorageGateway::new(inventory),
        }
    }

    // ── Aggregate operations ─────────────────────────────────────────────────

    pub async fn get_open_cart_id(&self, customer: &str) -> Result<Option<CartId>, DomainError> {
        let customer = customer.to_string();
        self.carts.call(move |repo| repo.open_cart_id(&customer)).await
    }

    /// Insert an unpaid, zero-total cart. Fails with `CartAlreadyOpen` when
    /// the customer already has one.
    pub async fn create_empty_cart(&self, customer: &str) -> Result<CartId, DomainError> {
        let owned = customer.to_string();
        let cart_id = self.carts.call(move |repo| repo.create_empty(&owned)).await?;
        log::info!("Opened cart {} for {}", cart_id, customer);
        Ok(cart_id)
    }

    /// Add one unit of `model`, returning the line quantity afterwards.
    pub async fn add_line(&self, cart_id: CartId, model: &str) -> Result<i32, DomainError> {
        let product = self.stocked_product(model).await?;
        self.add_snapshot(cart_id, LineSnapshot::from(&product)).await
    }

    pub async fn remove_one_unit(&self, cart_id: CartId, model: &str) -> Result<LineRemoval, DomainError> {
        let owned = model.to_string();
        let removal = self
            .carts
            .call(move |repo| repo.remove_unit(cart_id, &owned))
            .await?;
        log::debug!("Removed one {} from cart {}: {:?}", model, cart_id, removal);
        Ok(removal)
    }

    /// Drop every line. The cart itself stays open.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), DomainError> {
        let removed = self.carts.execute(move |repo| repo.clear(cart_id)).await?;
        log::debug!("Cleared {} lines from cart {}", removed, cart_id);
        Ok(())
    }

    // ── Customer-facing operations ───────────────────────────────────────────

    /// Add one unit of `model` to the customer's open cart, opening a cart
    /// first if there is none.
    pub async fn add_to_cart(&self, customer: &str, model: &str) -> Result<(), DomainError> {
        let product = self.stocked_product(model).await?;
        let cart_id = self.open_or_create(customer).await?;
        self.add_snapshot(cart_id, LineSnapshot::from(&product)).await?;
        Ok(())
    }

    /// The customer's open cart, or an empty one when there is none.
    pub async fn get_cart(&self, customer: &str) -> Result<Cart, DomainError> {
        match self.get_open_cart_id(customer).await? {
            Some(cart_id) => {
                let lines = self.carts.query(move |repo| repo.lines(cart_id)).await?;
                Ok(Cart::open(customer, lines))
            }
            None => Ok(Cart::empty(customer)),
        }
    }

    pub async fn checkout(&self, customer: &str) -> Result<Cart, DomainError> {
        self.engine.checkout(customer).await
    }

    pub async fn remove_product(&self, customer: &str, model: &str) -> Result<(), DomainError> {
        let cart_id = self.require_open_cart(customer).await?;

        let owned = model.to_string();
        if self.inventory.call(move |repo| repo.find(&owned)).await?.is_none() {
            return Err(DomainError::ProductNotFound);
        }
        self.remove_one_unit(cart_id, model).await?;
        Ok(())
    }

    pub async fn clear_cart(&self, customer: &str) -> Result<(), DomainError> {
        let cart_id = self.require_open_cart(customer).await?;
        self.clear(cart_id).await
    }

    pub async fn get_paid_carts(&self, customer: &str) -> Result<Vec<Cart>, DomainError> {
        let customer = customer.to_string();
        self.carts.query(move |repo| repo.paid_carts(&customer)).await
    }

    pub async fn admin_delete_all_carts(&self) -> Result<(), DomainError> {
        let removed = self.carts.execute(|repo| repo.delete_all()).await?;
        log::warn!("Deleted all {} carts", removed);
        Ok(())
    }

    pub async fn admin_get_all_carts(&self) -> Result<Vec<Cart>, DomainError> {
        self.carts.query(|repo| repo.all_carts()).await
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    async fn stocked_product(&self, model: &str) -> Result<Product, DomainError> {
        let owned = model.to_string();
        let product = self
            .inventory
            .call(move |repo| repo.find(&owned))
            .await?
            .ok_or(DomainError::ProductNotFound)?;

        if product.quantity == 0 {
            log::debug!("{} is out of stock", model);
            return Err(DomainError::LowStock);
        }
        Ok(product)
    }

    async fn add_snapshot(&self, cart_id: CartId, snapshot: LineSnapshot) -> Result<i32, DomainError> {
        self.carts
            .call(move |repo| repo.add_unit(cart_id, &snapshot))
            .await
    }

    async fn require_open_cart(&self, customer: &str) -> Result<CartId, DomainError> {
        self.get_open_cart_id(customer)
            .await?
            .ok_or(DomainError::CartNotFound)
    }

    async fn open_or_create(&self, customer: &str) -> Result<CartId, DomainError> {
        if let Some(cart_id) = self.get_open_cart_id(customer).await? {
            return Ok(cart_id);
        }

        match self.create_empty_cart(customer).await {
            Ok(cart_id) => Ok(cart_id),
            // Lost the race against a concurrent request of the same customer.
            Err(DomainError::CartAlreadyOpen) => self.require_open_cart(customer).await,
            Err(e) => Err(e),
        }
    }
}
