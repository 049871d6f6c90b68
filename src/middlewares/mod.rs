pub mod admin;
pub mod jwt_auth;

pub use admin::require_admin;
pub use jwt_auth::jwt_auth_middleware;
