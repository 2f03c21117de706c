//! RocksDB column family definitions.

/// Identity records: identity_id (u32) → Identity
pub const CF_IDENTITIES: &str = "identities";

/// Contact uniqueness index: contact → identity_id
pub const CF_IDENTITIES_BY_CONTACT: &str = "identities_by_contact";

/// Biometric templates: identity_id → BiometricTemplate
pub const CF_BIOMETRIC_TEMPLATES: &str = "biometric_templates";

/// QR credentials: credential_id → Credential
pub const CF_CREDENTIALS: &str = "credentials";

/// Credentials by token hash: sha256(token) → credential_id
pub const CF_CREDENTIALS_BY_TOKEN_HASH: &str = "credentials_by_token_hash";

/// Credentials by identity: (identity_id, credential_id) → (credential_id, token_hash)
pub const CF_CREDENTIALS_BY_IDENTITY: &str = "credentials_by_identity";

/// Access attempts: attempt_id (big-endian) → AccessAttempt
pub const CF_ACCESS_ATTEMPTS: &str = "access_attempts";

/// Get all column family names
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        CF_IDENTITIES,
        CF_IDENTITIES_BY_CONTACT,
        CF_BIOMETRIC_TEMPLATES,
        CF_CREDENTIALS,
        CF_CREDENTIALS_BY_TOKEN_HASH,
        CF_CREDENTIALS_BY_IDENTITY,
        CF_ACCESS_ATTEMPTS,
    ]
}
