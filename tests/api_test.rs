//! HTTP-level tests over the in-memory store; no database required.

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use cart_service::{configure, AppState};
use serde_json::{json, Value};

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::in_memory()))
                .configure(configure),
        )
        .await
    };
}

fn phone(model: &str, quantity: i32, price: &str) -> Value {
    json!({
        "model": model,
        "category": "Smartphone",
        "quantity": quantity,
        "sellingPrice": price,
        "arrivalDate": "2024-01-10"
    })
}

#[actix_web::test]
async fn register_then_get_product() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(phone("Pixel", 4, "599.00"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/products/Pixel").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["quantity"], 4);
    assert_eq!(body["sellingPrice"], "599.00");
}

#[actix_web::test]
async fn registering_a_model_twice_is_a_conflict() {
    let app = app!();
    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/products")
            .set_json(phone("Pixel", 4, "599.00"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), expected);
    }
}

#[actix_web::test]
async fn unknown_product_is_404_with_error_body() {
    let app = app!();

    let req = test::TestRequest::get().uri("/products/ghost").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Product not found" }));
}

#[actix_web::test]
async fn customer_without_cart_sees_an_empty_one() {
    let app = app!();

    let req = test::TestRequest::get().uri("/customers/ann/cart").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        json!({ "customer": "ann", "paid": false, "paymentDate": "", "total": "0.00", "products": [] })
    );
}

#[actix_web::test]
async fn shopping_flow_from_add_to_history() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(phone("Pixel", 10, "5.00"))
        .to_request();
    test::call_service(&app, req).await;

    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/customers/ann/cart")
            .set_json(json!({ "model": "Pixel" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    }

    let req = test::TestRequest::get().uri("/customers/ann/cart").to_request();
    let cart: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cart["products"][0]["quantity"], 3);
    assert_eq!(cart["total"], "0.00");

    let req = test::TestRequest::patch().uri("/customers/ann/cart").to_request();
    let paid: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(paid["paid"], true);
    assert_eq!(paid["total"], "15.00");
    assert_ne!(paid["paymentDate"], "");

    let req = test::TestRequest::get().uri("/products/Pixel").to_request();
    let product: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(product["quantity"], 7);

    let req = test::TestRequest::get().uri("/customers/ann/cart/history").to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
    assert_eq!(history[0], paid);
}

#[actix_web::test]
async fn checkout_error_statuses() {
    let app = app!();

    let req = test::TestRequest::patch().uri("/customers/bob/cart").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(phone("Nokia", 1, "20.00"))
        .to_request();
    test::call_service(&app, req).await;
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/customers/bob/cart")
            .set_json(json!({ "model": "Nokia" }))
            .to_request();
        test::call_service(&app, req).await;
    }
    let req = test::TestRequest::patch().uri("/customers/bob/cart").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::delete().uri("/customers/bob/cart/current").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    let req = test::TestRequest::patch().uri("/customers/bob/cart").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn removing_a_product_not_in_the_cart_is_404() {
    let app = app!();
    for model in ["A", "B"] {
        let req = test::TestRequest::post()
            .uri("/products")
            .set_json(phone(model, 3, "1.00"))
            .to_request();
        test::call_service(&app, req).await;
    }
    let req = test::TestRequest::post()
        .uri("/customers/cy/cart")
        .set_json(json!({ "model": "A" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::delete().uri("/customers/cy/cart/products/B").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Product not in cart");

    let req = test::TestRequest::delete().uri("/customers/cy/cart/products/A").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn selling_more_than_stock_is_a_conflict() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(phone("Moto", 2, "150.00"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::patch()
        .uri("/products/Moto/sell")
        .set_json(json!({ "quantity": 3 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::patch()
        .uri("/products/Moto/sell")
        .set_json(json!({ "quantity": 2, "sellingDate": "2024-02-01" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "model": "Moto", "quantity": 0 }));
}

#[actix_web::test]
async fn admin_endpoints_list_and_wipe_carts() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(phone("Pixel", 5, "5.00"))
        .to_request();
    test::call_service(&app, req).await;
    for customer in ["ann", "bob"] {
        let req = test::TestRequest::post()
            .uri(&format!("/customers/{customer}/cart"))
            .set_json(json!({ "model": "Pixel" }))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get().uri("/carts/all").to_request();
    let all: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    let req = test::TestRequest::delete().uri("/carts").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri("/carts/all").to_request();
    let all: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(all, json!([]));
}

#[actix_web::test]
async fn price_with_sub_cent_precision_is_a_bad_request() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(phone("Pixel", 4, "0.335"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/products/Pixel").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn checkout_total_matches_line_prices() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(phone("Pixel", 5, "0.33"))
        .to_request();
    test::call_service(&app, req).await;
    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/customers/dee/cart")
            .set_json(json!({ "model": "Pixel" }))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::patch().uri("/customers/dee/cart").to_request();
    let paid: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(paid["products"][0]["price"], "0.33");
    assert_eq!(paid["total"], "0.99");
}
