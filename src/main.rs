use actix_web::{web, App, HttpServer};
use log::{error, info};

use employee_directory::app::{self, AppState};
use employee_directory::config::Config;
use employee_directory::db;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|err| {
        error!("Invalid configuration: {}", err);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
    })?;

    let store = db::create_store(&config).await.map_err(|err| {
        error!("Failed to open the store: {}", err);
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    })?;

    let state = web::Data::new(AppState::new(store, config.jwt_secret.clone()));

    info!("Starting server at {} ({:?} store)", config.bind_addr, config.backend);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(app::configure)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
