//! In-process store implementing both repository ports.
//!
//! Every call holds one lock for its whole duration, which gives each port
//! method the same all-or-nothing behaviour as a database transaction.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartId, CartLine, LineRemoval, LineSnapshot};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, InventoryRepository};
use crate::domain::product::{NewProduct, Product};
use crate::storage::StorageError;

#[derive(Debug)]
struct StoredCart {
    id: CartId,
    customer: String,
    paid: bool,
    payment_date: Option<NaiveDate>,
    total: BigDecimal,
    lines: Vec<CartLine>,
}

impl StoredCart {
    fn to_cart(&self) -> Cart {
        Cart {
            customer: self.customer.clone(),
            paid: self.paid,
            payment_date: self.payment_date,
            total: self.total.clone(),
            lines: self.lines.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<String, Product>,
    // Creation order.
    carts: Vec<StoredCart>,
}

impl State {
    fn open_cart_index(&self, cart_id: CartId) -> Result<usize, DomainError> {
        self.carts
            .iter()
            .position(|c| c.id == cart_id && !c.paid)
            .ok_or(DomainError::CartNotFound)
    }

    fn is_referenced(&self, model: &str) -> bool {
        self.carts
            .iter()
            .any(|c| c.lines.iter().any(|l| l.model == model))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::from(StorageError::Poisoned))
    }
}

impl InventoryRepository for InMemoryStore {
    fn find(&self, model: &str) -> Result<Option<Product>, DomainError> {
        Ok(self.lock()?.products.get(model).cloned())
    }

    fn insert(&self, product: NewProduct) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        if state.products.contains_key(&product.model) {
            return Err(DomainError::ProductAlreadyExists);
        }

        state.products.insert(
            product.model.clone(),
            Product {
                model: product.model,
                category: product.category,
                quantity: product.quantity,
                selling_price: product.selling_price,
                arrival_date: product.arrival_date,
                details: product.details,
            },
        );
        Ok(())
    }

    fn set_quantity(&self, model: &str, quantity: i32) -> Result<usize, DomainError> {
        let mut state = self.lock()?;
        match state.products.get_mut(model) {
            Some(product) => {
                product.quantity = quantity;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn decrement_if_available(&self, model: &str, amount: i32) -> Result<Option<i32>, DomainError> {
        let mut state = self.lock()?;
        Ok(state
            .products
            .get_mut(model)
            .filter(|p| p.quantity >= amount)
            .map(|p| {
                p.quantity -= amount;
                p.quantity
            }))
    }

    fn delete(&self, model: &str) -> Result<usize, DomainError> {
        let mut state = self.lock()?;
        if state.is_referenced(model) {
            return Err(DomainError::ProductInUse);
        }
        Ok(usize::from(state.products.remove(model).is_some()))
    }

    fn delete_all(&self) -> Result<usize, DomainError> {
        let mut state = self.lock()?;
        if state.carts.iter().any(|c| !c.lines.is_empty()) {
            return Err(DomainError::ProductInUse);
        }
        let removed = state.products.len();
        state.products.clear();
        Ok(removed)
    }
}

impl CartRepository for InMemoryStore {
    fn open_cart_id(&self, customer: &str) -> Result<Option<CartId>, DomainError> {
        Ok(self
            .lock()?
            .carts
            .iter()
            .find(|c| c.customer == customer && !c.paid)
            .map(|c| c.id))
    }

    fn create_empty(&self, customer: &str) -> Result<CartId, DomainError> {
        let mut state = self.lock()?;
        if state.carts.iter().any(|c| c.customer == customer && !c.paid) {
            return Err(DomainError::CartAlreadyOpen);
        }

        let id = Uuid::new_v4();
        state.carts.push(StoredCart {
            id,
            customer: customer.to_string(),
            paid: false,
            payment_date: None,
            total: BigDecimal::from(0),
            lines: Vec::new(),
        });
        Ok(id)
    }

    fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, DomainError> {
        Ok(self
            .lock()?
            .carts
            .iter()
            .find(|c| c.id == cart_id)
            .map(|c| c.lines.clone())
            .unwrap_or_default())
    }

    fn add_unit(&self, cart_id: CartId, snapshot: &LineSnapshot) -> Result<i32, DomainError> {
        let mut state = self.lock()?;
        let index = state.open_cart_index(cart_id)?;
        if !state.products.contains_key(&snapshot.model) {
            return Err(DomainError::ProductNotFound);
        }

        let lines = &mut state.carts[index].lines;
        if let Some(line) = lines.iter_mut().find(|l| l.model == snapshot.model) {
            line.quantity += 1;
            return Ok(line.quantity);
        }

        lines.push(CartLine {
            model: snapshot.model.clone(),
            quantity: 1,
            category: snapshot.category,
            price: snapshot.price.clone(),
        });
        Ok(1)
    }

    fn remove_unit(&self, cart_id: CartId, model: &str) -> Result<LineRemoval, DomainError> {
        let mut state = self.lock()?;
        let index = state.open_cart_index(cart_id)?;

        let lines = &mut state.carts[index].lines;
        let position = lines
            .iter()
            .position(|l| l.model == model)
            .ok_or(DomainError::ProductNotInCart)?;

        if lines[position].quantity > 1 {
            lines[position].quantity -= 1;
            Ok(LineRemoval::Decremented {
                remaining: lines[position].quantity,
            })
        } else {
            lines.remove(position);
            Ok(LineRemoval::Removed)
        }
    }

    fn clear(&self, cart_id: CartId) -> Result<usize, DomainError> {
        let mut state = self.lock()?;
        let index = state.open_cart_index(cart_id)?;

        let lines = &mut state.carts[index].lines;
        let removed = lines.len();
        lines.clear();
        Ok(removed)
    }

    fn commit_checkout(
        &self,
        cart_id: CartId,
        lines: &[CartLine],
        total: &BigDecimal,
        paid_on: NaiveDate,
    ) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let index = state.open_cart_index(cart_id)?;
        if state.carts[index].lines != lines {
            return Err(DomainError::CartChanged);
        }

        let covered = lines.iter().all(|line| {
            state
                .products
                .get(&line.model)
                .is_some_and(|p| p.quantity >= line.quantity)
        });
        if !covered {
            return Err(DomainError::LowStock);
        }

        for line in lines {
            if let Some(product) = state.products.get_mut(&line.model) {
                product.quantity -= line.quantity;
            }
        }

        let cart = &mut state.carts[index];
        cart.paid = true;
        cart.payment_date = Some(paid_on);
        cart.total = total.clone();
        Ok(())
    }

    fn paid_carts(&self, customer: &str) -> Result<Vec<Cart>, DomainError> {
        Ok(self
            .lock()?
            .carts
            .iter()
            .filter(|c| c.customer == customer && c.paid)
            .map(StoredCart::to_cart)
            .collect())
    }

    fn all_carts(&self) -> Result<Vec<Cart>, DomainError> {
        Ok(self.lock()?.carts.iter().map(StoredCart::to_cart).collect())
    }

    fn delete_all(&self) -> Result<usize, DomainError> {
        let mut state = self.lock()?;
        let removed = state.carts.len();
        state.carts.clear();
        Ok(removed)
    }
}
