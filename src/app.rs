use std::sync::Arc;

use actix_web::web;

use crate::db::{DirectoryStore, LiveFeed};
use crate::errors::AppError;
use crate::handlers;

pub struct AppState {
    pub store: Arc<dyn DirectoryStore>,
    pub feed: LiveFeed,
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(store: Arc<dyn DirectoryStore>, jwt_secret: impl Into<String>) -> Self {
        AppState {
            feed: LiveFeed::new(store.clone()),
            store,
            jwt_secret: jwt_secret.into(),
        }
    }
}

/// Registers the `/v1/employee` routes. `feed` must come before `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::resource("/v1/employee")
            .route(web::get().to(handlers::employee::get_employees))
            .route(web::post().to(handlers::employee::create_employee)),
    )
    .service(
        web::resource("/v1/employee/feed")
            .route(web::get().to(handlers::feed::employee_feed)),
    )
    .service(
        web::resource("/v1/employee/{id}")
            .route(web::get().to(handlers::employee::get_employee))
            .route(web::patch().to(handlers::employee::update_employee))
            .route(web::delete().to(handlers::employee::delete_employee)),
    )
    .service(
        web::resource("/v1/employee/{id}/history")
            .route(web::get().to(handlers::history::get_history)),
    );
}
