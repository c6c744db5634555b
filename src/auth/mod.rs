pub mod google;
mod middleware;
mod password;
mod session;

pub use google::{GoogleVerifier, IdTokenVerifier, VerifyError};
pub use middleware::{AuthError, RequireUser};
pub use password::{MIN_PASSWORD_LEN, PasswordHasher, validate_password};
pub use session::{SessionClaims, SessionManager};
