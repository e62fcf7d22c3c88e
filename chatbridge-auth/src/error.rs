use thiserror::Error;

/// Failures of the two-factor flows. Display strings are the messages
/// returned to API clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TwoFactorError {
    #[error("2FA not available for guest accounts")]
    GuestAccount,
    #[error("User not found")]
    UserNotFound,
    #[error("2FA not set up")]
    NotSetUp,
    #[error("2FA is not enabled")]
    NotEnabled,
    #[error("2FA is not enabled for this user")]
    NotEnabledForUser,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Invalid verification code")]
    InvalidVerificationCode,
    #[error("invalid TOTP secret: {0}")]
    InvalidSecret(String),
    #[error("user store failed: {0}")]
    Store(String),
}
