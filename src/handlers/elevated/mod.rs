// handlers/elevated/mod.rs - Elevated handlers (require_auth + require_admin)
//
// Administrative operations. The admin gate runs before any of these, so the
// `Extension<User>` they see always has `is_admin` set.

pub mod categories;
pub mod dashboard;
pub mod notifications;
pub mod products;
pub mod users;
