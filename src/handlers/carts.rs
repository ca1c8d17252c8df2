use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{money, AppState};
use crate::domain::cart::{Cart, CartLine};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartProductResponse {
    pub model: String,
    pub category: String,
    /// Price captured when the model was first added, e.g. "9.99"
    pub price: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub customer: String,
    pub paid: bool,
    /// `YYYY-MM-DD`, or an empty string while the cart is open
    pub payment_date: String,
    pub total: String,
    pub products: Vec<CartProductResponse>,
}

impl From<&CartLine> for CartProductResponse {
    fn from(line: &CartLine) -> Self {
        Self {
            model: line.model.clone(),
            category: line.category.to_string(),
            price: money(&line.price),
            quantity: line.quantity,
        }
    }
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            payment_date: cart
                .payment_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            total: money(&cart.total),
            products: cart.lines.iter().map(CartProductResponse::from).collect(),
            customer: cart.customer,
            paid: cart.paid,
        }
    }
}

fn carts_response(carts: Vec<Cart>) -> Vec<CartResponse> {
    carts.into_iter().map(CartResponse::from).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /customers/{customer}/cart
///
/// Returns the open cart, or an empty one when the customer has none.
#[utoipa::path(
    get,
    path = "/customers/{customer}/cart",
    params(("customer" = String, Path, description = "Customer identifier")),
    responses(
        (status = 200, description = "Current cart", body = CartResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn get_cart(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let cart = state.carts.get_cart(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// POST /customers/{customer}/cart
///
/// Adds one unit of a model, opening a cart when needed.
#[utoipa::path(
    post,
    path = "/customers/{customer}/cart",
    params(("customer" = String, Path, description = "Customer identifier")),
    request_body = AddToCartRequest,
    responses(
        (status = 204, description = "Product added"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product out of stock"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn add_to_cart(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    state.carts.add_to_cart(&path.into_inner(), &body.model).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /customers/{customer}/cart
///
/// Pays the open cart and returns it.
#[utoipa::path(
    patch,
    path = "/customers/{customer}/cart",
    params(("customer" = String, Path, description = "Customer identifier")),
    responses(
        (status = 200, description = "Cart paid", body = CartResponse),
        (status = 400, description = "Cart is empty"),
        (status = 404, description = "No open cart or unknown product"),
        (status = 409, description = "Not enough stock"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn checkout(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let cart = state.carts.checkout(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// GET /customers/{customer}/cart/history
#[utoipa::path(
    get,
    path = "/customers/{customer}/cart/history",
    params(("customer" = String, Path, description = "Customer identifier")),
    responses(
        (status = 200, description = "Paid carts, oldest first", body = [CartResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn get_paid_carts(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let carts = state.carts.get_paid_carts(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(carts_response(carts)))
}

/// DELETE /customers/{customer}/cart/products/{model}
///
/// Takes one unit of `model` out of the open cart.
#[utoipa::path(
    delete,
    path = "/customers/{customer}/cart/products/{model}",
    params(
        ("customer" = String, Path, description = "Customer identifier"),
        ("model" = String, Path, description = "Product model"),
    ),
    responses(
        (status = 204, description = "One unit removed"),
        (status = 404, description = "Unknown product, no open cart, or product not in cart"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn remove_product(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (customer, model) = path.into_inner();
    state.carts.remove_product(&customer, &model).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /customers/{customer}/cart/current
#[utoipa::path(
    delete,
    path = "/customers/{customer}/cart/current",
    params(("customer" = String, Path, description = "Customer identifier")),
    responses(
        (status = 204, description = "Cart emptied"),
        (status = 404, description = "No open cart"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn clear_cart(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.carts.clear_cart(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /carts/all
#[utoipa::path(
    get,
    path = "/carts/all",
    responses(
        (status = 200, description = "Every cart, paid or not", body = [CartResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn get_all_carts(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let carts = state.carts.admin_get_all_carts().await?;
    Ok(HttpResponse::Ok().json(carts_response(carts)))
}

/// DELETE /carts
#[utoipa::path(
    delete,
    path = "/carts",
    responses(
        (status = 204, description = "All carts deleted"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn delete_all_carts(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.carts.admin_delete_all_carts().await?;
    Ok(HttpResponse::NoContent().finish())
}
