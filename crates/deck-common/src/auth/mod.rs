//! Authentication and integrity primitives

mod fingerprint;
mod jwt;
mod password;
mod session_token;
mod signature;

pub use fingerprint::derive_fingerprint;
pub use jwt::{Claims, IssuedToken, TokenKind, TokenService};
pub use password::{hash_password, validate_password, verify_password, PasswordService};
pub use session_token::generate_session_token;
pub use signature::{verify_payment_signature, PaymentSignatureVerifier};
