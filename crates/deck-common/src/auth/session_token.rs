//! Opaque session tokens

use rand::RngCore;

/// Random bytes per token
const SESSION_TOKEN_BYTES: usize = 32;

/// Generate an unguessable session token (256 bits, hex encoded)
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
