pub mod auth;
pub mod proxy_loop;

pub use auth::require_authorization;
pub use proxy_loop::reject_proxy_loops;
