//! Token generation and hashing for the credential service.

/// Generate random bytes of the specified length
pub fn generate_random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    use rand::RngCore;
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// URL-safe base64 encoding without padding
pub fn base64_url_encode(data: &[u8]) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    URL_SAFE_NO_PAD.encode(data)
}

/// SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Fresh 128-bit QR token
pub fn generate_token() -> String {
    base64_url_encode(&generate_random_bytes::<16>())
}

/// Short, loggable prefix of a token
pub(crate) fn token_prefix(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(6)
        .map(|(index, _)| index)
        .unwrap_or(token.len());
    &token[..end]
}
