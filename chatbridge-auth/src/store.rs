use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::TwoFactorError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    Guest,
    #[default]
    Regular,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: UserKind,
    #[serde(default)]
    pub two_factor_secret: Option<String>,
    #[serde(default)]
    pub two_factor_enabled: bool,
    #[serde(default)]
    pub backup_codes: Vec<String>,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("kind", &self.kind)
            .field(
                "two_factor_secret",
                &self.two_factor_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("two_factor_enabled", &self.two_factor_enabled)
            .field("backup_codes", &self.backup_codes.len())
            .finish()
    }
}

impl UserRecord {
    pub fn new(id: impl Into<String>, email: impl Into<String>, kind: UserKind) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            kind,
            ..Self::default()
        }
    }
}

/// Persistence for user 2FA state.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<UserRecord>, TwoFactorError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, TwoFactorError>;

    /// Inserts or replaces the record with the same id.
    async fn save(&self, user: UserRecord) -> Result<(), TwoFactorError>;

    /// Removes `code` from the user's backup codes. Returns whether it was present.
    async fn consume_backup_code(&self, id: &str, code: &str) -> Result<bool, TwoFactorError>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, id: &str) -> Result<Option<UserRecord>, TwoFactorError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, TwoFactorError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn save(&self, user: UserRecord) -> Result<(), TwoFactorError> {
        self.users.write().await.insert(user.id.clone(), user);
        Ok(())
    }

    async fn consume_backup_code(&self, id: &str, code: &str) -> Result<bool, TwoFactorError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(id) else {
            return Ok(false);
        };
        match user.backup_codes.iter().position(|stored| stored == code) {
            Some(index) => {
                user.backup_codes.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
