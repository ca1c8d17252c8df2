use cart_service::{build_server, create_pool, run_migrations, AppState, Config};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let pool = create_pool(&config.database_url, config.db_pool_size)?;
    run_migrations(&pool)?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(AppState::from_pool(pool), &config.host, config.port)?.await?;
    Ok(())
}
