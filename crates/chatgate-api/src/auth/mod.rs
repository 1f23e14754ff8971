//! Authentication module
//!
//! Session-token based authentication with the following components:
//! - Password hashing with Argon2
//! - Session token issuance and validation (JWT)
//! - Sign-up and sign-in service
//! - Request context resolution from the session cookie

pub mod context;
pub mod jwt;
pub mod password;
pub mod service;

pub use context::{resolve_current_user, RequestContext, AUTH_COOKIE};
pub use jwt::{Claims, JwtConfig, JwtError, JwtIssuer, TokenIssuer};
pub use password::{hash_password, hash_password_with_config, verify_password, PasswordConfig};
pub use service::{AuthService, SignInOutcome, SignInRequest, SignUpRequest};
