mod config;
mod context;
mod core;
mod database;
mod error;
mod forms;
mod handlers;
mod impls;
mod middlewares;
mod request;
mod response;
mod routes;

use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::impls::hasher::sha256::Sha256Hasher;
use crate::impls::tokener::jwt::JWT;
use crate::impls::uploaders::local_storage::LocalStorage;

#[actix_web::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let manager = PgSqlxManager::new(pool);
    let storage = LocalStorage::new(&config.upload_path);
    let secret = config.jwt_secret.as_bytes().to_vec();
    let upload_path = config.upload_path.clone();
    let bind_address = config.bind_address.clone();
    let config = Data::new(config);
    log::info!("listening on {}", bind_address);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(Data::new(manager.clone()))
            .app_data(Data::new(storage.clone()))
            .app_data(Data::new(Sha256Hasher))
            .app_data(Data::new(JWT::new(secret.clone())))
            .app_data(config.clone())
            .configure(|cfg| routes::config_routes(cfg, secret.clone(), &upload_path))
    })
    .bind(bind_address)?
    .run()
    .await?;
    Ok(())
}
