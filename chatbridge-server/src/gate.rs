//! Page routing rules: who may see the sign-in pages and who gets sent back
//! to them.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::identity::{is_guest_email, Identity};
use crate::AppState;

pub const AUTH_PAGES: [&str; 4] = ["/", "/login", "/register", "/login/form"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Answer `pong` without touching the rest of the stack.
    Pong,
    Next,
    Redirect(&'static str),
}

/// Decides what happens to a request for `path`. `email` is the signed-in
/// user's email, `None` when there is no session.
pub fn gate(path: &str, email: Option<&str>, guest_accounts_enabled: bool) -> GateDecision {
    if path.starts_with("/ping") {
        return GateDecision::Pong;
    }
    // JSON routes answer 401 themselves.
    if path.starts_with("/api/") || path.starts_with("/_next/") || path.contains('.') {
        return GateDecision::Next;
    }

    let is_auth_page = AUTH_PAGES.contains(&path);
    let Some(email) = email else {
        return if is_auth_page {
            GateDecision::Next
        } else {
            GateDecision::Redirect("/")
        };
    };

    if is_auth_page {
        return GateDecision::Redirect("/chat");
    }
    if is_guest_email(email) && !guest_accounts_enabled && path != "/login" {
        return GateDecision::Redirect("/login");
    }
    GateDecision::Next
}

pub async fn route_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let identity = Identity::from_headers(request.headers());
    let decision = gate(
        request.uri().path(),
        identity.as_ref().map(|identity| identity.email.as_str()),
        state.config.guest_accounts_enabled,
    );

    match decision {
        GateDecision::Pong => (StatusCode::OK, "pong").into_response(),
        GateDecision::Next => next.run(request).await,
        GateDecision::Redirect(to) => {
            tracing::debug!(path = %request.uri().path(), to, "redirecting");
            Redirect::temporary(to).into_response()
        }
    }
}
