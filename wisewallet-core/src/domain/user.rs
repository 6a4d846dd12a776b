//! User and profile domain models

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default Argon2id parameters for password hashing
pub const DEFAULT_TIME_COST: u32 = 3;
pub const DEFAULT_MEMORY_COST: u32 = 19456; // 19 MiB
pub const DEFAULT_PARALLELISM: u32 = 1;
pub const DEFAULT_HASH_LEN: u32 = 32;

/// A signed-up user; also the session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Storage namespace, derived from the email at signup
    pub uid: String,
    pub username: String,
    pub email: String,
    /// ISO 4217 code used for display
    pub currency: String,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        let email = email.into();
        Self {
            uid: Self::uid_for_email(&email),
            username: username.into(),
            email,
            currency: currency.into(),
        }
    }

    /// `user_` + lowercase email with every non `[a-z0-9]` char replaced by `_`
    pub fn uid_for_email(email: &str) -> String {
        let lowered = email.to_lowercase();
        format!("user_{}", uid_sanitizer().replace_all(&lowered, "_"))
    }
}

/// Canonical form of an email: trimmed and lowercased
///
/// Profiles are keyed by this form, so two spellings of one address map to
/// one account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Argon2id parameters used for a stored credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2Params {
    pub time_cost: u32,
    pub memory_cost: u32,
    pub parallelism: u32,
    pub hash_len: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            time_cost: DEFAULT_TIME_COST,
            memory_cost: DEFAULT_MEMORY_COST,
            parallelism: DEFAULT_PARALLELISM,
            hash_len: DEFAULT_HASH_LEN,
        }
    }
}

/// Password hash record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub algorithm: String,
    /// Base64-encoded random salt
    pub salt: String,
    /// Hex-encoded derived hash
    pub hash: String,
    pub params: Argon2Params,
}

/// Profile as persisted in the profiles map (user fields + credential)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfile {
    #[serde(flatten)]
    pub user: User,
    /// Absent for profiles written before passwords were checked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<Credential>,
}

fn uid_sanitizer() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]").unwrap())
}
