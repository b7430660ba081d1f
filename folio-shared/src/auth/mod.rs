//! Authentication: password hashing, JWT claims, and the session authority.

pub mod jwt;
pub mod password;
pub mod session;

pub use jwt::{create_token, validate_token, Claims, JwtError};
pub use password::{hash_password, random_password, verify_password, PasswordError};
pub use session::{IssuedSession, SessionAuthority, SessionError};
