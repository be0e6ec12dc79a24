use actix_web::{
    middleware::{DefaultHeaders, Logger},
    web, App, HttpServer,
};
use anyhow::Context;
use retro_exchange_server::{config::settings, error, http};
use sqlx::postgres::PgPoolOptions;
use std::env;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Configuration
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());

    // Postgres pool, the one shared store; instances hold no other state
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to create Postgres pool")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("running database migrations")?;

    log::info!(
        "instance {} listening on {}",
        settings().instance_id,
        server_addr
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Instance-Id", settings().instance_id.as_str())))
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::JsonConfig::default().error_handler(|err, _| error::input_error(err)))
            .app_data(web::QueryConfig::default().error_handler(|err, _| error::input_error(err)))
            .app_data(web::PathConfig::default().error_handler(|err, _| error::input_error(err)))
            .configure(http::routes::init_routes)
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
