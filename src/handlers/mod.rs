// handlers/mod.rs - Handlers grouped by access tier
//
// Public (no auth) → Protected (require_auth) → Elevated (require_auth + require_admin)
// The tier a handler lives in decides which route_layer stack routes.rs puts in front of it.

pub mod elevated;
pub mod protected;
pub mod public;
