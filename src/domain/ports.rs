use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use super::cart::{Cart, CartId, CartLine, LineRemoval, LineSnapshot};
use super::errors::DomainError;
use super::product::{NewProduct, Product};

/// Product storage. Every method is a single atomic unit against the store.
pub trait InventoryRepository: Send + Sync + 'static {
    fn find(&self, model: &str) -> Result<Option<Product>, DomainError>;
    /// Fails with `ProductAlreadyExists` on a duplicate model.
    fn insert(&self, product: NewProduct) -> Result<(), DomainError>;
    /// Overwrites the stock level and returns the number of rows affected.
    fn set_quantity(&self, model: &str, quantity: i32) -> Result<usize, DomainError>;
    /// Subtracts `amount` only when at least that much is in stock.
    /// Returns the remaining quantity, or `None` when nothing was changed.
    fn decrement_if_available(&self, model: &str, amount: i32) -> Result<Option<i32>, DomainError>;
    fn delete(&self, model: &str) -> Result<usize, DomainError>;
    fn delete_all(&self) -> Result<usize, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    fn open_cart_id(&self, customer: &str) -> Result<Option<CartId>, DomainError>;
    /// Fails with `CartAlreadyOpen` when the customer already has an unpaid cart.
    fn create_empty(&self, customer: &str) -> Result<CartId, DomainError>;
    fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, DomainError>;
    /// Adds one unit of the snapshot's model, creating the line when needed.
    /// Returns the line quantity afterwards.
    fn add_unit(&self, cart_id: CartId, snapshot: &LineSnapshot) -> Result<i32, DomainError>;
    fn remove_unit(&self, cart_id: CartId, model: &str) -> Result<LineRemoval, DomainError>;
    fn clear(&self, cart_id: CartId) -> Result<usize, DomainError>;
    /// Marks the cart paid and takes every line out of stock, all or nothing.
    ///
    /// `lines` is the snapshot the caller validated; the commit fails with
    /// `CartChanged` if the stored lines no longer match it, and with
    /// `LowStock` if any product can no longer cover its line.
    fn commit_checkout(
        &self,
        cart_id: CartId,
        lines: &[CartLine],
        total: &BigDecimal,
        paid_on: NaiveDate,
    ) -> Result<(), DomainError>;
    fn paid_carts(&self, customer: &str) -> Result<Vec<Cart>, DomainError>;
    fn all_carts(&self) -> Result<Vec<Cart>, DomainError>;
    fn delete_all(&self) -> Result<usize, DomainError>;
}
