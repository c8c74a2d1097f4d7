//! Authentication module
//!
//! Credential hashing, access token issuance/validation, refresh token
//! lifecycle, Authorization header parsing, and the session orchestration
//! that ties them together.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use bearer::api_key;
pub use bearer::bearer_token;
pub use claims::Claims;
pub use jwt::issue_access_token;
pub use jwt::validate_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::resolve_active_owner;
pub use refresh_token::revoke_refresh_token;
pub use refresh_token::store_refresh_token;
pub use session::{LoginOutcome, RefreshedAccess, SessionManager};
