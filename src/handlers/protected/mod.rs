// handlers/protected/mod.rs - Protected handlers (require_auth)
//
// Every handler here can rely on an `Extension<User>` holding the verified,
// active caller.

pub mod auth;
pub mod notifications;
pub mod products;
pub mod uploads;
