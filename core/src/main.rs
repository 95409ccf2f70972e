mod cors;

use std::io;
use std::sync::Arc;

use actix_web::{
    App, HttpServer,
    middleware::NormalizePath,
    web::{self},
};
use api_auth::CredentialService;
use common::env_config::Config;
use db::{memory::MemoryDeveloperStore, store::DeveloperStore, store::PgDeveloperStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup(&config.log_file).map_err(|e| io::Error::other(e.to_string()))?;
    }

    // init developer store
    let store: Arc<dyn DeveloperStore> = match &config.database_url {
        Some(database_url) => {
            let pool = db::setup(database_url, config.is_production())
                .await
                .map_err(|e| io::Error::other(format!("Failed to set up database: {}", e)))?;
            Arc::new(PgDeveloperStore::new(pool))
        }
        None => {
            log::warn!("DATABASE_URL not set, developers are kept in memory only");
            Arc::new(MemoryDeveloperStore::new())
        }
    };
    let service = web::Data::new(CredentialService::new(store, config.insert_retry.clone()));

    log::info!(
        "Listening on {}:{} ({})",
        config.server_host,
        config.server_port,
        config.environment
    );

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(web::Data::new(config_data.clone()))
            .wrap(logger::middleware()) // 3rd
            .wrap(cors::middleware(&origin)) // 2nd
            .wrap(NormalizePath::trim()) // 1st
            .service(api_auth::mount_health())
            .service(api_auth::mount_developers())
            .service(api_auth::mount_admin())
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
