//! Toy local user registry and session.
//!
//! Passwords are stored and compared in plaintext. This is a demo sign-in
//! flow with no security contract.

use crate::error::{AssistantError, Result};
use crate::storage::KeyValueStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Key holding the JSON list of all users
pub const USERS_KEY: &str = "smartserve_users";

/// Key holding the JSON current-session user
pub const SESSION_KEY: &str = "smartserve_current_user";

/// Minimum password length, counted in Unicode scalar values (`chars()`), so a
/// character outside the Basic Multilingual Plane counts once rather than as
/// the two UTF-16 units a browser `length` would report.
pub const MIN_PASSWORD_LEN: usize = 6;

pub const MSG_MISSING_FIELDS: &str = "Please fill in all fields.";
pub const MSG_SHORT_PASSWORD: &str = "Password must be at least 6 characters.";
pub const MSG_DUPLICATE_EMAIL: &str = "An account with this email already exists.";
pub const MSG_REGISTERED: &str = "Registration successful!";
pub const MSG_LOGGED_IN: &str = "Login successful!";
pub const MSG_BAD_CREDENTIALS: &str = "Invalid email or password.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    /// Lowercased and trimmed
    pub email: String,
    pub password: String,
    pub name: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

/// Result of a register or login attempt, shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
    pub user: Option<UserRecord>,
}

impl AuthOutcome {
    fn ok(message: &str, user: UserRecord) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            user: Some(user),
        }
    }

    fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            user: None,
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// User list and session over injected key-value persistence.
pub struct AuthStore<S: KeyValueStore> {
    storage: S,
    users: Vec<UserRecord>,
}

impl<S: KeyValueStore> AuthStore<S> {
    /// Starts with an empty in-memory list; persisted users are picked up on login.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            users: Vec::new(),
        }
    }

    /// Create a store whose in-memory list is loaded from storage up front.
    pub fn open(storage: S) -> Result<Self> {
        let mut store = Self::new(storage);
        store.reload_users()?;
        Ok(store)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    fn reload_users(&mut self) -> Result<()> {
        if let Some(raw) = self.storage.get(USERS_KEY)? {
            self.users = serde_json::from_str(&raw).map_err(|e| AssistantError::StorageFormat {
                key: USERS_KEY.to_string(),
                source: e,
            })?;
            debug!("Loaded {} users from storage", self.users.len());
        }
        Ok(())
    }

    fn persist_users(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.users).map_err(|e| AssistantError::StorageFormat {
            key: USERS_KEY.to_string(),
            source: e,
        })?;
        self.storage.set(USERS_KEY, &raw)
    }

    pub fn register(&mut self, email: &str, password: &str, name: &str) -> Result<AuthOutcome> {
        let normalized_email = normalize_email(email);

        if email.is_empty() || password.is_empty() || name.is_empty() {
            return Ok(AuthOutcome::rejected(MSG_MISSING_FIELDS));
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Ok(AuthOutcome::rejected(MSG_SHORT_PASSWORD));
        }

        if self.users.iter().any(|u| u.email == normalized_email) {
            return Ok(AuthOutcome::rejected(MSG_DUPLICATE_EMAIL));
        }

        let now = Utc::now();
        let user = UserRecord {
            id: format!("user_{}", now.timestamp_millis()),
            email: normalized_email,
            password: password.to_string(),
            name: name.trim().to_string(),
            created_at: now.to_rfc3339(),
        };

        self.users.push(user.clone());
        self.persist_users()?;

        info!("Registered user {}", user.email);
        Ok(AuthOutcome::ok(MSG_REGISTERED, user))
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<AuthOutcome> {
        let normalized_email = normalize_email(email);

        self.reload_users()?;

        let found = self
            .users
            .iter()
            .find(|u| u.email == normalized_email && u.password == password);

        match found {
            Some(user) => {
                info!("User {} logged in", user.email);
                Ok(AuthOutcome::ok(MSG_LOGGED_IN, user.clone()))
            }
            None => {
                debug!("Login rejected for {}", normalized_email);
                Ok(AuthOutcome::rejected(MSG_BAD_CREDENTIALS))
            }
        }
    }

    pub fn logout(&self) -> Result<()> {
        self.storage.remove(SESSION_KEY)
    }

    pub fn current_session(&self) -> Result<Option<UserRecord>> {
        match self.storage.get(SESSION_KEY)? {
            Some(raw) => {
                let user = serde_json::from_str(&raw).map_err(|e| AssistantError::StorageFormat {
                    key: SESSION_KEY.to_string(),
                    source: e,
                })?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    pub fn set_current_session(&self, user: &UserRecord) -> Result<()> {
        let raw = serde_json::to_string(user).map_err(|e| AssistantError::StorageFormat {
            key: SESSION_KEY.to_string(),
            source: e,
        })?;
        self.storage.set(SESSION_KEY, &raw)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};

    fn create_test_store() -> AuthStore<MemoryStore> {
        AuthStore::new(MemoryStore::new())
    }

    #[test]
    fn test_register_requires_all_fields() {
        let mut auth = create_test_store();
        for (email, password, name) in [
            ("", "secret1", "Ada"),
            ("ada@example.com", "", "Ada"),
            ("ada@example.com", "secret1", ""),
        ] {
            let outcome = auth.register(email, password, name).unwrap();
            assert!(!outcome.success);
            assert_eq!(outcome.message, MSG_MISSING_FIELDS);
            assert!(outcome.user.is_none());
        }
        assert!(auth.users().is_empty());
    }

    #[test]
    fn test_password_length_boundary() {
        let mut auth = create_test_store();

        let short = auth.register("ada@example.com", "12345", "Ada").unwrap();
        assert!(!short.success);
        assert!(short.message.contains("at least 6 characters"));

        let ok = auth.register("ada@example.com", "123456", "Ada").unwrap();
        assert!(ok.success);
        assert_eq!(ok.message, MSG_REGISTERED);
    }

    #[test]
    fn test_password_length_counts_characters() {
        let mut auth = create_test_store();

        // 5 characters, 6 bytes
        let short = auth.register("ada@example.com", "pässw", "Ada").unwrap();
        assert_eq!(short.message, MSG_SHORT_PASSWORD);

        // 3 astral characters: 6 UTF-16 units but only 3 characters
        let astral = auth.register("ada@example.com", "😀😀😀", "Ada").unwrap();
        assert_eq!(astral.message, MSG_SHORT_PASSWORD);

        let ok = auth.register("ada@example.com", "密码密码密码", "Ada").unwrap();
        assert!(ok.success);
    }

    #[test]
    fn test_register_normalizes_record() {
        let mut auth = create_test_store();
        let outcome = auth
            .register("  Ada@Example.COM ", "secret1", "  Ada Lovelace ")
            .unwrap();
        let user = outcome.user.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.password, "secret1");
        assert!(user.id.starts_with("user_"));
        assert!(chrono::DateTime::parse_from_rfc3339(&user.created_at).is_ok());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let mut auth = create_test_store();
        assert!(auth.register("ada@example.com", "secret1", "Ada").unwrap().success);

        let again = auth.register(" ADA@example.com", "other12", "Ada 2").unwrap();
        assert!(!again.success);
        assert!(again.message.contains("already exists"));
        assert_eq!(auth.users().len(), 1);
    }

    #[test]
    fn test_register_persists_user_list() {
        let mut auth = create_test_store();
        auth.register("ada@example.com", "secret1", "Ada").unwrap();

        let raw = auth.storage().get(USERS_KEY).unwrap().unwrap();
        let stored: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["email"], "ada@example.com");
        assert!(stored[0].get("createdAt").is_some());
    }

    #[test]
    fn test_login_email_case_insensitive_password_exact() {
        let mut auth = create_test_store();
        auth.register("ada@example.com", "Secret1", "Ada").unwrap();

        let ok = auth.login("  ADA@Example.com", "Secret1").unwrap();
        assert!(ok.success);
        assert_eq!(ok.message, MSG_LOGGED_IN);
        assert_eq!(ok.user.unwrap().name, "Ada");

        let wrong_case = auth.login("ada@example.com", "secret1").unwrap();
        assert!(!wrong_case.success);
        assert_eq!(wrong_case.message, MSG_BAD_CREDENTIALS);

        let unknown = auth.login("bob@example.com", "Secret1").unwrap();
        assert!(!unknown.success);
    }

    #[test]
    fn test_session_lifecycle() {
        let mut auth = create_test_store();
        assert_eq!(auth.current_session().unwrap(), None);

        let user = auth
            .register("ada@example.com", "secret1", "Ada")
            .unwrap()
            .user
            .unwrap();
        auth.set_current_session(&user).unwrap();
        assert_eq!(auth.current_session().unwrap(), Some(user));

        auth.logout().unwrap();
        assert_eq!(auth.current_session().unwrap(), None);
        auth.logout().unwrap();
    }

    #[test]
    fn test_state_survives_new_store_over_same_directory() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut auth = AuthStore::new(FileStore::new(dir.path()));
            let user = auth
                .register("ada@example.com", "secret1", "Ada")
                .unwrap()
                .user
                .unwrap();
            auth.set_current_session(&user).unwrap();
        }

        let mut auth = AuthStore::new(FileStore::new(dir.path()));
        assert_eq!(
            auth.current_session().unwrap().map(|u| u.email),
            Some("ada@example.com".to_string())
        );
        assert!(auth.login("ada@example.com", "secret1").unwrap().success);
    }

    #[test]
    fn test_open_loads_users_for_duplicate_check() {
        let storage = MemoryStore::new();
        {
            let mut auth = AuthStore::new(&storage);
            auth.register("ada@example.com", "secret1", "Ada").unwrap();
        }

        let mut auth = AuthStore::open(&storage).unwrap();
        let again = auth.register("ada@example.com", "secret1", "Ada").unwrap();
        assert_eq!(again.message, MSG_DUPLICATE_EMAIL);
    }

    #[test]
    fn test_malformed_user_list_is_storage_error() {
        let storage = MemoryStore::new();
        storage.set(USERS_KEY, "not json").unwrap();
        let mut auth = AuthStore::new(&storage);
        let err = auth.login("ada@example.com", "secret1").unwrap_err();
        assert!(matches!(err, AssistantError::StorageFormat { .. }));
    }
}
