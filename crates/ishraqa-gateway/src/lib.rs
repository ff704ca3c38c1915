pub mod rate_limiter;
pub mod server;
pub mod types;

pub use rate_limiter::RateLimiter;
pub use server::{create_router, start_server, AppState, SessionDefaults};
