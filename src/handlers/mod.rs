pub mod carts;
pub mod products;

use std::sync::Arc;

use bigdecimal::{BigDecimal, RoundingMode};
use utoipa::OpenApi;

use crate::application::{CartService, InventoryService};
use crate::db::DbPool;
use crate::domain::ports::{CartRepository, InventoryRepository};
use crate::infrastructure::cart_repo::DieselCartRepository;
use crate::infrastructure::memory::InMemoryStore;
use crate::infrastructure::product_repo::DieselInventoryRepository;

/// Services shared by every worker of the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub inventory: InventoryService,
    pub carts: CartService,
}

impl AppState {
    pub fn new(inventory: Arc<dyn InventoryRepository>, carts: Arc<dyn CartRepository>) -> Self {
        Self {
            inventory: InventoryService::new(Arc::clone(&inventory)),
            carts: CartService::new(carts, inventory),
        }
    }

    /// State backed by PostgreSQL through `pool`.
    pub fn from_pool(pool: DbPool) -> Self {
        Self::new(
            Arc::new(DieselInventoryRepository::new(pool.clone())),
            Arc::new(DieselCartRepository::new(pool)),
        )
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(store.clone(), store)
    }
}

/// Amounts go over the wire as strings with two decimals.
pub(crate) fn money(value: &BigDecimal) -> String {
    value.with_scale_round(2, RoundingMode::HalfUp).to_plain_string()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        carts::get_cart,
        carts::add_to_cart,
        carts::checkout,
        carts::get_paid_carts,
        carts::remove_product,
        carts::clear_cart,
        carts::get_all_carts,
        carts::delete_all_carts,
        products::register_product,
        products::get_product,
        products::set_quantity,
        products::sell_product,
        products::delete_product,
        products::delete_all_products,
    ),
    components(schemas(
        carts::AddToCartRequest,
        carts::CartResponse,
        carts::CartProductResponse,
        products::RegisterProductRequest,
        products::ProductResponse,
        products::SetQuantityRequest,
        products::SellRequest,
        products::QuantityResponse,
    )),
    tags(
        (name = "carts", description = "Customer carts and checkout"),
        (name = "products", description = "Catalog and stock"),
    )
)]
pub struct ApiDoc;
