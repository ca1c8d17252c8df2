pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod storage;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::Config;
pub use db::{create_pool, DbPool};
pub use handlers::{ApiDoc, AppState};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migrations", applied.len());
    Ok(())
}

/// Register every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use handlers::{carts, products};

    cfg.service(
        web::scope("/customers/{customer}/cart")
            .route("", web::get().to(carts::get_cart))
            .route("", web::post().to(carts::add_to_cart))
            .route("", web::patch().to(carts::checkout))
            .route("/history", web::get().to(carts::get_paid_carts))
            .route("/current", web::delete().to(carts::clear_cart))
            .route("/products/{model}", web::delete().to(carts::remove_product)),
    )
    .service(
        web::scope("/carts")
            .route("", web::delete().to(carts::delete_all_carts))
            .route("/all", web::get().to(carts::get_all_carts)),
    )
    .service(
        web::scope("/products")
            .route("", web::post().to(products::register_product))
            .route("", web::delete().to(products::delete_all_products))
            .route("/{model}", web::get().to(products::get_product))
            .route("/{model}", web::patch().to(products::set_quantity))
            .route("/{model}", web::delete().to(products::delete_product))
            .route("/{model}/sell", web::patch().to(products::sell_product)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
            .configure(configure)
    })
    .bind((host.to_string(), port))?
    .run())
}
