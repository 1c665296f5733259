/// Middleware module
///
/// The authentication guard for protected routes and request logging.

mod auth_guard;
mod request_logger;

pub use auth_guard::AuthGuard;
pub use auth_guard::AuthPrincipal;
pub use request_logger::RequestLogger;
