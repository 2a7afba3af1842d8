pub mod categories;
pub mod manager;
pub mod models;
pub mod notifications;
pub mod products;
pub mod stats;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use users::PgIdentityStore;
