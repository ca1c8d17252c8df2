use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{money, AppState};
use crate::domain::errors::DomainError;
use crate::domain::product::{Category, NewProduct, Product};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterProductRequest {
    pub model: String,
    /// One of "Smartphone", "Laptop", "Appliance"
    pub category: String,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub selling_price: String,
    /// Defaults to today
    pub arrival_date: Option<NaiveDate>,
    pub details: Option<String>,
}

impl TryFrom<RegisterProductRequest> for NewProduct {
    type Error = DomainError;

    fn try_from(req: RegisterProductRequest) -> Result<Self, Self::Error> {
        let selling_price = BigDecimal::from_str(&req.selling_price).map_err(|e| {
            DomainError::InvalidInput(format!("invalid sellingPrice '{}': {}", req.selling_price, e))
        })?;
        Ok(NewProduct {
            category: req.category.parse::<Category>()?,
            model: req.model,
            quantity: req.quantity,
            selling_price,
            arrival_date: req.arrival_date,
            details: req.details,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub model: String,
    pub category: String,
    pub quantity: i32,
    pub selling_price: String,
    pub arrival_date: Option<NaiveDate>,
    pub details: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            category: p.category.to_string(),
            selling_price: money(&p.selling_price),
            model: p.model,
            quantity: p.quantity,
            arrival_date: p.arrival_date,
            details: p.details,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetQuantityRequest {
    pub quantity: i32,
    pub change_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    pub quantity: i32,
    pub selling_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuantityResponse {
    pub model: String,
    pub quantity: i32,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = RegisterProductRequest,
    responses(
        (status = 201, description = "Product registered"),
        (status = 400, description = "Invalid product or arrival date"),
        (status = 409, description = "Model already registered"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn register_product(
    state: web::Data<AppState>,
    body: web::Json<RegisterProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product = NewProduct::try_from(body.into_inner())?;
    state.inventory.register_product(product).await?;
    Ok(HttpResponse::Created().finish())
}

/// GET /products/{model}
#[utoipa::path(
    get,
    path = "/products/{model}",
    params(("model" = String, Path, description = "Product model")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let product = state.inventory.get_product(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PATCH /products/{model}
///
/// Overwrites the stock level.
#[utoipa::path(
    patch,
    path = "/products/{model}",
    params(("model" = String, Path, description = "Product model")),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Stock updated", body = QuantityResponse),
        (status = 400, description = "Negative quantity or invalid date"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn set_quantity(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SetQuantityRequest>,
) -> Result<HttpResponse, AppError> {
    let model = path.into_inner();
    let quantity = state
        .inventory
        .set_quantity(&model, body.quantity, body.change_date)
        .await?;
    Ok(HttpResponse::Ok().json(QuantityResponse { model, quantity }))
}

/// PATCH /products/{model}/sell
///
/// Sells units directly from stock, outside any cart.
#[utoipa::path(
    patch,
    path = "/products/{model}/sell",
    params(("model" = String, Path, description = "Product model")),
    request_body = SellRequest,
    responses(
        (status = 200, description = "Remaining stock", body = QuantityResponse),
        (status = 400, description = "Non-positive amount or invalid date"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Not enough stock"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn sell_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SellRequest>,
) -> Result<HttpResponse, AppError> {
    let model = path.into_inner();
    let quantity = state
        .inventory
        .decrement_for_sale(&model, body.quantity, body.selling_date)
        .await?;
    Ok(HttpResponse::Ok().json(QuantityResponse { model, quantity }))
}

/// DELETE /products/{model}
#[utoipa::path(
    delete,
    path = "/products/{model}",
    params(("model" = String, Path, description = "Product model")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product is still in a cart"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.inventory.delete_product(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /products
#[utoipa::path(
    delete,
    path = "/products",
    responses(
        (status = 204, description = "All products deleted"),
        (status = 409, description = "Some product is still in a cart"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn delete_all_products(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.inventory.delete_all_products().await?;
    Ok(HttpResponse::NoContent().finish())
}
