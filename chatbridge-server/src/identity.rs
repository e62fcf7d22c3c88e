use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use chatbridge_auth::{SessionUser, UserKind};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_TYPE_HEADER: &str = "x-user-type";

const GUEST_ACCOUNTS_DISABLED: &str = "Guest accounts are disabled";

/// The caller as asserted by the authenticating proxy in front of the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub kind: UserKind,
}

impl Identity {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let id = header(USER_ID_HEADER)?.to_string();
        let kind = match header(USER_TYPE_HEADER) {
            Some("guest") => UserKind::Guest,
            _ => UserKind::Regular,
        };
        Some(Self {
            id,
            email: header(USER_EMAIL_HEADER).unwrap_or_default().to_string(),
            kind,
        })
    }

    /// Guest sessions are issued emails of the form `guest-<digits>`.
    pub fn is_guest_email(&self) -> bool {
        is_guest_email(&self.email)
    }

    pub fn is_guest(&self) -> bool {
        self.kind == UserKind::Guest || self.is_guest_email()
    }

    /// The caller of a model route: signed in, and not a guest unless guest
    /// accounts are enabled.
    pub fn require_member(
        identity: Option<Identity>,
        guest_accounts_enabled: bool,
    ) -> Result<Identity, crate::ServerError> {
        let identity = identity.ok_or(crate::ServerError::Unauthorized)?;
        if identity.is_guest() && !guest_accounts_enabled {
            return Err(crate::ServerError::Forbidden(
                GUEST_ACCOUNTS_DISABLED.to_string(),
            ));
        }
        Ok(identity)
    }

    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            email: self.email.clone(),
            kind: self.kind,
        }
    }
}

pub fn is_guest_email(email: &str) -> bool {
    email
        .strip_prefix("guest-")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Missing identity headers reject the request; use `Option<Identity>` to
/// decide in the handler instead.
#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = crate::ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Identity::from_headers(&parts.headers).ok_or(crate::ServerError::Unauthorized)
    }
}
