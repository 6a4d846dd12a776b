//! Auth service - local sign-up, login and session restore
//!
//! Profiles live in one JSON object keyed by trimmed, lowercased email under
//! the profiles key. Passwords are stored as Argon2id hashes; a profile written
//! without a credential is claimed by the first successful login.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine;
use rand::Rng;
use serde_json::Value;

use crate::domain::currency::{find_currency, normalize_currency};
use crate::domain::result::{Error, Result};
use crate::domain::{normalize_email, Argon2Params, Credential, StoredProfile, User};
use crate::services::logging::{log_quietly, LogEvent, LoggingService};
use crate::store::{ChangeBus, KeySpace, RecordStore, Subscription};

const ALGORITHM: &str = "argon2id";
const SALT_LEN: usize = 16;

type ProfileMap = BTreeMap<String, Value>;

/// Derive a password hash using Argon2id
fn derive_hash(password: &str, salt: &[u8], params: &Argon2Params) -> Result<Vec<u8>> {
    let argon2_params = argon2::Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(params.hash_len as usize),
    )
    .map_err(|e| Error::Other(format!("Failed to create argon2 params: {:?}", e)))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut hash = vec![0u8; params.hash_len as usize];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut hash)
        .map_err(|e| Error::Other(format!("Failed to hash password: {:?}", e)))?;

    Ok(hash)
}

fn new_credential(password: &str, params: &Argon2Params) -> Result<Credential> {
    let salt: [u8; SALT_LEN] = rand::thread_rng().gen();
    let hash = derive_hash(password, &salt, params)?;

    Ok(Credential {
        algorithm: ALGORITHM.to_string(),
        salt: base64::engine::general_purpose::STANDARD.encode(salt),
        hash: hex::encode(hash),
        params: params.clone(),
    })
}

fn verify_credential(password: &str, credential: &Credential) -> Result<bool> {
    if credential.algorithm != ALGORITHM {
        return Ok(false);
    }
    let salt = base64::engine::general_purpose::STANDARD
        .decode(&credential.salt)
        .map_err(|e| Error::Other(format!("Invalid credential salt: {}", e)))?;
    let hash = derive_hash(password, &salt, &credential.params)?;
    Ok(hex::encode(hash) == credential.hash)
}

/// Auth service for one session
pub struct AuthService {
    store: Arc<RecordStore>,
    bus: Arc<ChangeBus>,
    keys: KeySpace,
    params: Argon2Params,
    logger: Option<Arc<LoggingService>>,
}

impl AuthService {
    pub fn new(store: Arc<RecordStore>, bus: Arc<ChangeBus>, keys: KeySpace) -> Self {
        Self {
            store,
            bus,
            keys,
            params: Argon2Params::default(),
            logger: None,
        }
    }

    /// Hash parameters for new credentials
    pub fn with_params(mut self, params: Argon2Params) -> Self {
        self.params = params;
        self
    }

    pub fn set_params(&mut self, params: Argon2Params) {
        self.params = params;
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    fn load_profiles(&self) -> ProfileMap {
        self.store
            .load_value::<ProfileMap>(&self.keys.profiles_key())
            .unwrap_or_default()
    }

    /// Profile stored for `email`, with the key it is stored under
    ///
    /// Keys are compared in normalized form so profiles written with
    /// mixed-case emails are still found.
    fn find_profile(&self, profiles: &ProfileMap, email: &str) -> Option<(String, StoredProfile)> {
        let email = normalize_email(email);
        let (key, value) = profiles
            .get_key_value(&email)
            .or_else(|| profiles.iter().find(|(k, _)| normalize_email(k) == email))?;
        match serde_json::from_value(value.clone()) {
            Ok(profile) => Some((key.clone(), profile)),
            Err(e) => {
                log_quietly(
                    self.logger.as_deref(),
                    LogEvent::new("invalid_record_dropped")
                        .with_entity("profiles")
                        .with_error(e.to_string()),
                );
                None
            }
        }
    }

    /// Whether any stored profile already owns the storage namespace `uid`
    fn uid_taken(profiles: &ProfileMap, uid: &str) -> bool {
        profiles.iter().any(|(key, value)| {
            User::uid_for_email(key) == uid
                || value.get("uid").and_then(Value::as_str) == Some(uid)
        })
    }

    fn save_profile(
        &self,
        mut profiles: ProfileMap,
        key: String,
        profile: &StoredProfile,
    ) -> Result<()> {
        profiles.insert(key, serde_json::to_value(profile)?);
        let key = self.keys.profiles_key();
        self.store.save_value(&key, &profiles)?;
        self.bus.publish(&key);
        Ok(())
    }

    fn start_session(&self, user: &User) -> Result<()> {
        let key = self.keys.session_key();
        self.store.save_value(key, user)?;
        self.bus.publish(key);
        Ok(())
    }

    /// Profile lookup by email (without credential)
    pub fn get_profile(&self, email: &str) -> Option<User> {
        self.find_profile(&self.load_profiles(), email)
            .map(|(_, p)| p.user)
    }

    /// Create a profile and start a session for it
    pub fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
        currency: &str,
    ) -> Result<User> {
        let email = normalize_email(email);
        let profiles = self.load_profiles();
        if profiles.contains_key(&email)
            || Self::uid_taken(&profiles, &User::uid_for_email(&email))
        {
            return Err(Error::AccountExists);
        }

        let username = username.trim();
        if username.is_empty() {
            return Err(Error::validation("Username is required."));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(Error::validation("A valid email is required."));
        }
        if password.is_empty() {
            return Err(Error::validation("Password is required."));
        }
        let currency = find_currency(currency)
            .map(|c| c.code)
            .ok_or_else(|| {
                Error::validation(format!("Unsupported currency: {}", normalize_currency(currency)))
            })?;

        let user = User::new(username, email.clone(), currency);
        let profile = StoredProfile {
            user: user.clone(),
            credential: Some(new_credential(password, &self.params)?),
        };

        self.save_profile(profiles, email, &profile)?;
        self.start_session(&user)?;
        log_quietly(
            self.logger.as_deref(),
            LogEvent::new("signup").with_entity("profiles"),
        );
        Ok(user)
    }

    /// Check the password against the stored profile and start a session
    pub fn login(&self, email: &str, password: &str) -> Result<User> {
        let profiles = self.load_profiles();
        let (key, profile) = self
            .find_profile(&profiles, email)
            .ok_or(Error::AccountNotFound)?;

        match &profile.credential {
            Some(credential) => {
                if !verify_credential(password, credential)? {
                    log_quietly(
                        self.logger.as_deref(),
                        LogEvent::new("login_failed")
                            .with_entity("profiles")
                            .with_error("invalid credentials"),
                    );
                    return Err(Error::InvalidCredentials);
                }
            }
            None => {
                let claimed = StoredProfile {
                    user: profile.user.clone(),
                    credential: Some(new_credential(password, &self.params)?),
                };
                self.save_profile(profiles, key, &claimed)?;
                log_quietly(
                    self.logger.as_deref(),
                    LogEvent::new("legacy_profile_claimed").with_entity("profiles"),
                );
            }
        }

        self.start_session(&profile.user)?;
        log_quietly(
            self.logger.as_deref(),
            LogEvent::new("login").with_entity("profiles"),
        );
        Ok(profile.user)
    }

    /// End the session
    pub fn logout(&self) -> Result<()> {
        let key = self.keys.session_key();
        self.store.remove(key)?;
        self.bus.publish(key);
        Ok(())
    }

    /// User of the stored session; `None` when absent or unreadable
    pub fn current_user(&self) -> Option<User> {
        self.store.load_value(self.keys.session_key())
    }

    /// Receive the session user now and after every login or logout
    pub fn subscribe_session(
        &self,
        callback: impl Fn(Option<User>) + Send + Sync + 'static,
    ) -> Subscription {
        let store = self.store.clone();
        let key = self.keys.session_key();
        let deliver = move || callback(store.load_value(key));

        deliver();
        self.bus.listen(key, deliver)
    }
}
