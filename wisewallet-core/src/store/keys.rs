//! Storage key derivation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default application id used to namespace every key
pub const DEFAULT_APP_ID: &str = "wise-wallet-v1";

/// Fixed top-level key holding the logged-in user's profile
pub const SESSION_KEY: &str = "wise_wallet_user";

/// Per-user record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Transactions,
    Budgets,
    Savings,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Transactions,
        EntityKind::Budgets,
        EntityKind::Savings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Transactions => "transactions",
            EntityKind::Budgets => "budgets",
            EntityKind::Savings => "savings",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown entity kind: {}", s))
    }
}

/// Key namespace for one application id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    app_id: String,
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_APP_ID)
    }
}

impl KeySpace {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// `artifacts/<app-id>/users/<uid>/<kind>`
    pub fn entity_key(&self, uid: &str, kind: EntityKind) -> String {
        format!("artifacts/{}/users/{}/{}", self.app_id, uid, kind.as_str())
    }

    /// `artifacts/<app-id>/profiles`; not tied to a user
    pub fn profiles_key(&self) -> String {
        format!("artifacts/{}/profiles", self.app_id)
    }

    pub fn session_key(&self) -> &'static str {
        SESSION_KEY
    }

    /// Inverse of `entity_key`: the (uid, kind) a key belongs to
    pub fn parse_entity_key(&self, key: &str) -> Option<(String, EntityKind)> {
        let prefix = format!("artifacts/{}/users/", self.app_id);
        let rest = key.strip_prefix(&prefix)?;
        let (uid, kind) = rest.rsplit_once('/')?;
        if uid.is_empty() {
            return None;
        }
        Some((uid.to_string(), kind.parse().ok()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_keys() {
        let keys = KeySpace::default();
        assert_eq!(
            keys.entity_key("user_a_b_com", EntityKind::Transactions),
            "artifacts/wise-wallet-v1/users/user_a_b_com/transactions"
        );
        assert_eq!(keys.profiles_key(), "artifacts/wise-wallet-v1/profiles");
    }

    #[test]
    fn test_keys_are_unique_per_user_and_kind() {
        let keys = KeySpace::new("app");
        let mut all = Vec::new();
        for uid in ["u1", "u2"] {
            for kind in EntityKind::ALL {
                all.push(keys.entity_key(uid, kind));
            }
        }
        all.push(keys.profiles_key());
        let mut deduped = all.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), all.len());
    }

    #[test]
    fn test_parse_entity_key_round_trip() {
        let keys = KeySpace::default();
        let key = keys.entity_key("user_x", EntityKind::Savings);
        assert_eq!(
            keys.parse_entity_key(&key),
            Some(("user_x".to_string(), EntityKind::Savings))
        );
        assert_eq!(keys.parse_entity_key(&keys.profiles_key()), None);
        assert_eq!(keys.parse_entity_key("artifacts/other/users/u/budgets"), None);
    }
}
