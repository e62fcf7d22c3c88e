use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::backup_codes::{generate_backup_codes, normalize_backup_code};
use crate::store::{UserKind, UserRecord, UserStore};
use crate::totp::{generate_secret, unix_now, Totp};
use crate::TwoFactorError;

pub const DEFAULT_ISSUER: &str = "AI Chatbot";

pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// The signed-in user a request acts for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub kind: UserKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorSetup {
    pub secret: String,
    pub otpauth_url: String,
    pub manual_entry_key: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_codes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub first_time_setup: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub used_backup_code: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginVerification {
    pub used_backup_code: bool,
    pub email: String,
    pub user_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupCodeStatus {
    pub has_backup_codes: bool,
    pub remaining_codes: usize,
}

/// Setup, verification and backup-code management for TOTP 2FA.
#[derive(Clone)]
pub struct TwoFactorService {
    store: Arc<dyn UserStore>,
    issuer: String,
    clock: Clock,
}

impl fmt::Debug for TwoFactorService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwoFactorService")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl TwoFactorService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            issuer: DEFAULT_ISSUER.to_string(),
            clock: Arc::new(unix_now),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Replaces the wall clock, in unix seconds.
    pub fn with_clock(mut self, clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    fn totp_matches(&self, secret: &str, token: &str) -> Result<bool, TwoFactorError> {
        Ok(Totp::from_base32(secret)?.verify_at(token, (self.clock)()))
    }

    /// Stores a new secret for `user` without enabling 2FA. Unknown users
    /// are registered from the session.
    pub async fn setup(&self, user: &SessionUser) -> Result<TwoFactorSetup, TwoFactorError> {
        if user.kind == UserKind::Guest {
            return Err(TwoFactorError::GuestAccount);
        }

        let mut record = self
            .store
            .get(&user.id)
            .await?
            .unwrap_or_else(|| UserRecord::new(&user.id, &user.email, user.kind));
        let secret = generate_secret();
        record.two_factor_secret = Some(secret.clone());
        record.two_factor_enabled = false;
        self.store.save(record).await?;

        let otpauth_url = Totp::for_account(&secret, &self.issuer, &user.email)?.provisioning_url();
        tracing::info!(user_id = %user.id, "two-factor setup started");
        Ok(TwoFactorSetup {
            otpauth_url,
            manual_entry_key: secret.clone(),
            secret,
        })
    }

    /// Checks `token` for a signed-in user. The first valid TOTP enables 2FA
    /// and issues backup codes; a token that is not a valid TOTP may still
    /// be an unused backup code.
    pub async fn verify(&self, user_id: &str, token: &str) -> Result<VerifyOutcome, TwoFactorError> {
        let user = self.store.get(user_id).await?;
        let Some((mut user, secret)) =
            user.and_then(|u| u.two_factor_secret.clone().map(|secret| (u, secret)))
        else {
            return Err(TwoFactorError::NotSetUp);
        };

        if !self.totp_matches(&secret, token)? {
            if self.store.consume_backup_code(user_id, token).await? {
                tracing::info!(user_id, "backup code used");
                return Ok(VerifyOutcome {
                    used_backup_code: true,
                    ..VerifyOutcome::default()
                });
            }
            tracing::debug!(user_id, "two-factor token rejected");
            return Err(TwoFactorError::InvalidToken);
        }

        if user.two_factor_enabled {
            return Ok(VerifyOutcome::default());
        }

        let codes = generate_backup_codes();
        user.two_factor_enabled = true;
        user.backup_codes = codes.clone();
        self.store.save(user).await?;
        tracing::info!(user_id, "two-factor authentication enabled");
        Ok(VerifyOutcome {
            backup_codes: Some(codes),
            first_time_setup: true,
            used_backup_code: false,
        })
    }

    /// Second step of sign-in, before a session exists.
    pub async fn verify_login(
        &self,
        email: &str,
        token: &str,
        is_backup_code: bool,
    ) -> Result<LoginVerification, TwoFactorError> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(TwoFactorError::UserNotFound)?;
        let secret = match (&user.two_factor_secret, user.two_factor_enabled) {
            (Some(secret), true) => secret.clone(),
            _ => return Err(TwoFactorError::NotEnabledForUser),
        };

        let verified = if is_backup_code {
            let code = normalize_backup_code(token);
            self.store.consume_backup_code(&user.id, &code).await?
        } else {
            self.totp_matches(&secret, token)?
        };
        if !verified {
            tracing::debug!(user_id = %user.id, is_backup_code, "login verification rejected");
            return Err(TwoFactorError::InvalidVerificationCode);
        }

        Ok(LoginVerification {
            used_backup_code: is_backup_code,
            email: user.email,
            user_id: user.id,
        })
    }

    /// Replaces all backup codes after checking a current TOTP.
    pub async fn regenerate_backup_codes(
        &self,
        user_id: &str,
        token: &str,
    ) -> Result<Vec<String>, TwoFactorError> {
        let mut user = self.enabled_user(user_id).await?;
        let secret = user
            .two_factor_secret
            .clone()
            .ok_or(TwoFactorError::NotEnabled)?;
        if !self.totp_matches(&secret, token)? {
            return Err(TwoFactorError::InvalidToken);
        }

        let codes = generate_backup_codes();
        user.backup_codes = codes.clone();
        self.store.save(user).await?;
        tracing::info!(user_id, "backup codes regenerated");
        Ok(codes)
    }

    pub async fn backup_code_status(
        &self,
        user_id: &str,
    ) -> Result<BackupCodeStatus, TwoFactorError> {
        let user = self.enabled_user(user_id).await?;
        Ok(BackupCodeStatus {
            has_backup_codes: !user.backup_codes.is_empty(),
            remaining_codes: user.backup_codes.len(),
        })
    }

    pub async fn disable(&self, user_id: &str) -> Result<(), TwoFactorError> {
        let mut user = self
            .store
            .get(user_id)
            .await?
            .ok_or(TwoFactorError::UserNotFound)?;
        user.two_factor_enabled = false;
        user.two_factor_secret = None;
        user.backup_codes.clear();
        self.store.save(user).await?;
        tracing::info!(user_id, "two-factor authentication disabled");
        Ok(())
    }

    async fn enabled_user(&self, user_id: &str) -> Result<UserRecord, TwoFactorError> {
        match self.store.get(user_id).await? {
            Some(user) if user.two_factor_enabled => Ok(user),
            _ => Err(TwoFactorError::NotEnabled),
        }
    }
}
