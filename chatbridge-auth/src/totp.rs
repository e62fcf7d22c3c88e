//! Time-based one-time passwords (RFC 6238): SHA1, six digits, 30 second
//! steps.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;
use totp_rs::{Algorithm, Secret, TOTP};

use crate::TwoFactorError;

pub const SECRET_BYTES: usize = 32;
pub const STEP_SECONDS: u64 = 30;
pub const DIGITS: usize = 6;
pub const DEFAULT_WINDOW: u8 = 1;

/// A fresh random secret, base32 encoded.
pub fn generate_secret() -> String {
    let mut bytes = [0_u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    Secret::Raw(bytes.to_vec()).to_encoded().to_string()
}

/// Raw key bytes of a base32 secret. Case, spaces, dashes and padding are
/// ignored.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>, TwoFactorError> {
    let normalized: String = secret
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '='))
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if normalized.is_empty() {
        return Err(TwoFactorError::InvalidSecret("secret is empty".to_string()));
    }
    Secret::Encoded(normalized)
        .to_bytes()
        .map_err(|err| TwoFactorError::InvalidSecret(err.to_string()))
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[derive(Clone)]
pub struct Totp {
    inner: TOTP,
}

impl std::fmt::Debug for Totp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Totp")
            .field("secret", &"<redacted>")
            .field("issuer", &self.inner.issuer)
            .field("account_name", &self.inner.account_name)
            .field("window", &self.inner.skew)
            .finish()
    }
}

impl Totp {
    pub fn from_base32(secret: &str) -> Result<Self, TwoFactorError> {
        Self::build(secret, None, String::new())
    }

    /// A generator that can also render the provisioning URL for
    /// `account` under `issuer`.
    pub fn for_account(secret: &str, issuer: &str, account: &str) -> Result<Self, TwoFactorError> {
        Self::build(secret, Some(issuer.to_string()), account.to_string())
    }

    fn build(secret: &str, issuer: Option<String>, account: String) -> Result<Self, TwoFactorError> {
        let key = decode_secret(secret)?;
        let inner = TOTP::new(
            Algorithm::SHA1,
            DIGITS,
            DEFAULT_WINDOW,
            STEP_SECONDS,
            key,
            issuer,
            account,
        )
        .map_err(|err| TwoFactorError::InvalidSecret(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Number of steps accepted on either side of the current one.
    pub fn with_window(mut self, window: u8) -> Self {
        self.inner.skew = window;
        self
    }

    /// The code for the step containing `unix_time`.
    pub fn code_at(&self, unix_time: u64) -> String {
        self.inner.generate(unix_time)
    }

    /// Whitespace inside `token` is ignored.
    pub fn verify_at(&self, token: &str, unix_time: u64) -> bool {
        let token: String = token.chars().filter(|c| !c.is_whitespace()).collect();
        if token.len() != DIGITS || !token.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        self.inner.check(&token, unix_time)
    }

    pub fn verify(&self, token: &str) -> bool {
        self.verify_at(token, unix_now())
    }

    /// `otpauth://totp/...` URL understood by authenticator apps.
    pub fn provisioning_url(&self) -> String {
        self.inner.get_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC_SEED: &[u8] = b"12345678901234567890";

    // RFC 6238 appendix B, SHA1 seed, truncated to 6 digits.
    fn rfc_totp() -> Totp {
        let secret = Secret::Raw(RFC_SEED.to_vec()).to_encoded().to_string();
        Totp::from_base32(&secret).unwrap()
    }

    #[test]
    fn matches_rfc6238_vectors() {
        let totp = rfc_totp();
        assert_eq!(totp.code_at(59), "287082");
        assert_eq!(totp.code_at(1_111_111_109), "081804");
        assert_eq!(totp.code_at(1_234_567_890), "005924");
        assert_eq!(totp.code_at(2_000_000_000), "279037");
    }

    #[test]
    fn verification_allows_one_step_of_drift() {
        let totp = rfc_totp();
        let code = totp.code_at(1_111_111_109);
        assert!(totp.verify_at(&code, 1_111_111_109));
        assert!(totp.verify_at(&code, 1_111_111_109 + STEP_SECONDS));
        assert!(totp.verify_at(&code, 1_111_111_109 - STEP_SECONDS));
        assert!(!totp.verify_at(&code, 1_111_111_109 + 3 * STEP_SECONDS));
        assert!(!totp.clone().with_window(0).verify_at(&code, 1_111_111_109 + STEP_SECONDS));
    }

    #[test]
    fn tokens_may_contain_spaces() {
        let totp = rfc_totp();
        assert!(totp.verify_at("081 804", 1_111_111_109));
        assert!(!totp.verify_at("08180", 1_111_111_109));
        assert!(!totp.verify_at("abcdef", 1_111_111_109));
    }

    #[test]
    fn generated_secrets_decode_to_32_bytes() {
        let secret = generate_secret();
        assert_eq!(decode_secret(&secret).unwrap().len(), SECRET_BYTES);
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn secrets_are_read_leniently() {
        // "MZXW6YTBOI" is base32 for "foobar".
        assert_eq!(decode_secret("mzxw 6ytb-oi======").unwrap(), b"foobar");
        assert!(decode_secret("").is_err());
        assert!(decode_secret("not base32!").is_err());
    }

    #[test]
    fn short_secrets_are_rejected() {
        let secret = Secret::Raw(b"short".to_vec()).to_encoded().to_string();
        assert!(matches!(
            Totp::from_base32(&secret),
            Err(TwoFactorError::InvalidSecret(_))
        ));
    }

    #[test]
    fn provisioning_url_names_issuer_and_account() {
        let secret = Secret::Raw(RFC_SEED.to_vec()).to_encoded().to_string();
        let url = Totp::for_account(&secret, "AI Chatbot", "a@b.c")
            .unwrap()
            .provisioning_url();
        assert!(url.starts_with("otpauth://totp/"));
        assert!(url.contains(&format!("secret={secret}")));
        assert!(url.contains("issuer=AI%20Chatbot"));
        assert!(url.contains("a%40b.c"));
    }
}
