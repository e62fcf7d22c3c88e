use std::sync::Arc;

use chatbridge_auth::{
    InMemoryUserStore, SessionUser, Totp, TwoFactorError, TwoFactorService, UserKind, UserRecord,
    UserStore,
};

const NOW: u64 = 1_700_000_000;

fn service() -> (TwoFactorService, Arc<InMemoryUserStore>) {
    let store = Arc::new(InMemoryUserStore::new());
    let service = TwoFactorService::new(store.clone()).with_clock(|| NOW);
    (service, store)
}

fn alice() -> SessionUser {
    SessionUser {
        id: "user-1".into(),
        email: "alice@example.com".into(),
        kind: UserKind::Regular,
    }
}

fn code(secret: &str) -> String {
    Totp::from_base32(secret).expect("secret").code_at(NOW)
}

/// Sets up and enables 2FA, returning the secret and backup codes.
async fn enrolled(service: &TwoFactorService) -> (String, Vec<String>) {
    let setup = service.setup(&alice()).await.expect("setup");
    let outcome = service
        .verify("user-1", &code(&setup.secret))
        .await
        .expect("verify");
    (setup.secret, outcome.backup_codes.expect("codes"))
}

#[tokio::test]
async fn setup_stores_secret_without_enabling() {
    let (service, store) = service();
    let setup = service.setup(&alice()).await.expect("setup");

    assert_eq!(setup.secret, setup.manual_entry_key);
    assert!(setup.otpauth_url.starts_with("otpauth://totp/AI%20Chatbot:alice%40example.com?"));
    assert!(setup.otpauth_url.contains(&format!("secret={}", setup.secret)));
    assert!(setup.otpauth_url.contains("issuer=AI%20Chatbot"));

    let user = store.get("user-1").await.unwrap().expect("user");
    assert_eq!(user.two_factor_secret.as_deref(), Some(setup.secret.as_str()));
    assert!(!user.two_factor_enabled);
}

#[tokio::test]
async fn guests_cannot_set_up() {
    let (service, store) = service();
    let guest = SessionUser {
        kind: UserKind::Guest,
        ..alice()
    };
    assert_eq!(
        service.setup(&guest).await.unwrap_err(),
        TwoFactorError::GuestAccount
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn first_verification_enables_and_issues_codes() {
    let (service, store) = service();
    let setup = service.setup(&alice()).await.expect("setup");

    let outcome = service
        .verify("user-1", &code(&setup.secret))
        .await
        .expect("verify");
    assert!(outcome.first_time_setup);
    assert_eq!(outcome.backup_codes.as_ref().map(Vec::len), Some(8));
    assert!(store.get("user-1").await.unwrap().unwrap().two_factor_enabled);

    let again = service
        .verify("user-1", &code(&setup.secret))
        .await
        .expect("verify");
    assert!(!again.first_time_setup);
    assert!(again.backup_codes.is_none());
}

#[tokio::test]
async fn verify_requires_setup() {
    let (service, _) = service();
    assert_eq!(
        service.verify("user-1", "123456").await.unwrap_err(),
        TwoFactorError::NotSetUp
    );
}

#[tokio::test]
async fn verify_accepts_a_backup_code_once() {
    let (service, _) = service();
    let (_, codes) = enrolled(&service).await;

    let outcome = service.verify("user-1", &codes[0]).await.expect("verify");
    assert!(outcome.used_backup_code);
    assert_eq!(
        service.verify("user-1", &codes[0]).await.unwrap_err(),
        TwoFactorError::InvalidToken
    );

    let status = service.backup_code_status("user-1").await.expect("status");
    assert_eq!(status.remaining_codes, 7);
    assert!(status.has_backup_codes);
}

#[tokio::test]
async fn verify_login_checks_totp_and_backup_codes() {
    let (service, _) = service();
    let (secret, codes) = enrolled(&service).await;

    let login = service
        .verify_login("alice@example.com", &code(&secret), false)
        .await
        .expect("login");
    assert!(!login.used_backup_code);
    assert_eq!(login.user_id, "user-1");

    let login = service
        .verify_login("alice@example.com", &codes[1].to_lowercase(), true)
        .await
        .expect("backup login");
    assert!(login.used_backup_code);

    assert_eq!(
        service
            .verify_login("alice@example.com", &codes[1], true)
            .await
            .unwrap_err(),
        TwoFactorError::InvalidVerificationCode
    );
    assert_eq!(
        service
            .verify_login("nobody@example.com", "123456", false)
            .await
            .unwrap_err(),
        TwoFactorError::UserNotFound
    );
}

#[tokio::test]
async fn verify_login_requires_enabled_2fa() {
    let (service, store) = service();
    store
        .save(UserRecord::new("user-2", "bob@example.com", UserKind::Regular))
        .await
        .unwrap();
    service.setup(&alice()).await.expect("setup");

    for email in ["bob@example.com", "alice@example.com"] {
        assert_eq!(
            service.verify_login(email, "123456", false).await.unwrap_err(),
            TwoFactorError::NotEnabledForUser
        );
    }
}

#[tokio::test]
async fn regenerating_codes_needs_a_valid_totp() {
    let (service, _) = service();
    assert_eq!(
        service
            .regenerate_backup_codes("user-1", "123456")
            .await
            .unwrap_err(),
        TwoFactorError::NotEnabled
    );

    let (secret, old) = enrolled(&service).await;
    let wrong = if code(&secret) == "000000" { "111111" } else { "000000" };
    assert_eq!(
        service
            .regenerate_backup_codes("user-1", wrong)
            .await
            .unwrap_err(),
        TwoFactorError::InvalidToken
    );

    let fresh = service
        .regenerate_backup_codes("user-1", &code(&secret))
        .await
        .expect("regenerate");
    assert_eq!(fresh.len(), 8);
    assert_ne!(fresh, old);
}

#[tokio::test]
async fn disable_clears_secret_and_codes() {
    let (service, store) = service();
    enrolled(&service).await;
    service.disable("user-1").await.expect("disable");

    let user = store.get("user-1").await.unwrap().unwrap();
    assert!(!user.two_factor_enabled);
    assert!(user.two_factor_secret.is_none());
    assert!(user.backup_codes.is_empty());
    assert_eq!(
        service.backup_code_status("user-1").await.unwrap_err(),
        TwoFactorError::NotEnabled
    );
}

#[test]
fn records_serialize_with_client_field_names() {
    let user = UserRecord::new("u", "u@example.com", UserKind::Guest);
    let value = serde_json::to_value(&user).unwrap();
    assert_eq!(value["type"], "guest");
    assert_eq!(value["twoFactorEnabled"], false);
    assert!(!format!("{:?}", UserRecord {
        two_factor_secret: Some("SECRET".into()),
        ..user
    })
    .contains("SECRET"));
}
