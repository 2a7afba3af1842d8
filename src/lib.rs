pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod images;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod uploads;

pub use routes::app;
pub use state::AppState;
