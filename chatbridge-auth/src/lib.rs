//! TOTP two-factor authentication with single-use backup codes.

mod backup_codes;
mod error;
mod service;
mod store;
pub mod totp;

pub use backup_codes::{
    generate_backup_codes, normalize_backup_code, BACKUP_CODE_COUNT, BACKUP_CODE_LEN,
};
pub use error::TwoFactorError;
pub use service::{
    BackupCodeStatus, Clock, LoginVerification, SessionUser, TwoFactorService, TwoFactorSetup,
    VerifyOutcome, DEFAULT_ISSUER,
};
pub use store::{InMemoryUserStore, UserKind, UserRecord, UserStore};
pub use totp::Totp;
