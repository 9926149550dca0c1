pub mod app;
pub mod config;
pub mod db;
pub mod directory;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;
