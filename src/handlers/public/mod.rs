// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Registration/login for token acquisition, plus read-only catalog browsing.

pub mod auth;
pub mod categories;
pub mod health;
pub mod products;
