pub mod auth;
pub mod response;
pub mod session;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult};
pub use session::{
    optional_admin_user, optional_user, require_admin_user, require_user, AdminUser, CurrentUser,
    MaybeUser,
};
