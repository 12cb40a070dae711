//! console_auth_axum - Axum integration for console_auth
//!
//! Exposes the passkey ceremonies and the token endpoints as an axum
//! [`Router`](axum::Router), plus the [`AuthUser`] bearer-token extractor for
//! the host application's own routes.
//!
//! ```no_run
//! use axum::Router;
//! use console_auth_axum::{CONSOLE_AUTH_ROUTE_PREFIX, console_auth_router};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! console_auth_axum::init().await?;
//! let app: Router = Router::new().nest(CONSOLE_AUTH_ROUTE_PREFIX.as_str(), console_auth_router());
//! # Ok(())
//! # }
//! ```

mod error;
mod passkey;
mod router;
mod session;
mod token;

pub use error::{ErrorBody, ErrorResponse, IntoResponseError, status_for};
pub use router::{console_auth_router, console_auth_router_no_trace};
pub use session::AuthUser;

// Re-export the route prefix and initialization function from console_auth crate
pub use console_auth::{CONSOLE_AUTH_ROUTE_PREFIX, init};
