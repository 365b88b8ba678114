/// HTTP middleware and extractors for yatube-service
///
/// - `auth`: bearer token issuing/validation and the `Viewer` /
///   `AuthenticatedUser` extractors
/// - `admin`: shared-token guard for the operational endpoints
pub mod admin;
pub mod auth;

pub use admin::AdminTokenGuard;
pub use auth::{AuthenticatedUser, Claims, JwtKeys};
