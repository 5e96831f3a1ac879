pub mod config;
pub mod database;
pub mod errors;
pub mod event;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod utils;

pub use handlers::AppState;
pub use routes::create_app;
