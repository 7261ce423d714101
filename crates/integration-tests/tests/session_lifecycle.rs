use std::sync::Arc;

use ag_client::Authenticator;
use ag_core::{AuthApi, AuthSession, ForumError, MockAuthApi, SessionProvider, SessionStore};
use ag_session_local::LocalSession;
use integration_tests::identity;
use secrecy::{ExposeSecret, SecretString};

fn api_returning_session() -> MockAuthApi {
    let mut api = MockAuthApi::new();
    api.expect_login()
        .withf(|c| c.email == "ana@example.com" && c.password.expose_secret() == "hunter22")
        .times(1)
        .returning(|_| {
            Ok(AuthSession {
                token: SecretString::from("jwt-123".to_string()),
                user: identity(),
            })
        });
    api
}

#[tokio::test]
async fn login_persists_across_restarts_until_sign_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agora/session.json");

    let session = Arc::new(LocalSession::init(&path).await.unwrap());
    let api: Arc<dyn AuthApi> = Arc::new(api_returning_session());
    let auth = Authenticator::new(api, session.clone());

    let user = auth
        .login("ana@example.com", SecretString::from("hunter22".to_string()))
        .await
        .unwrap();
    assert_eq!(user.username, "ana");

    let restored = LocalSession::init(&path).await.unwrap();
    assert_eq!(restored.current_identity(), Some(identity()));
    assert_eq!(
        restored.bearer_token().map(|t| t.expose_secret().to_owned()),
        Some("jwt-123".to_string())
    );

    auth.sign_out().await.unwrap();
    assert!(session.current_identity().is_none());
    assert!(LocalSession::init(&path)
        .await
        .unwrap()
        .current_identity()
        .is_none());
}

#[tokio::test]
async fn failed_login_stores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let session = Arc::new(LocalSession::init(&path).await.unwrap());

    let mut api = MockAuthApi::new();
    api.expect_login()
        .times(1)
        .returning(|_| Err(ForumError::Validation("Invalid credentials".into())));
    let auth = Authenticator::new(Arc::new(api), session.clone());

    let result = auth
        .login("ana@example.com", SecretString::from("wrong-pass".to_string()))
        .await;
    assert_eq!(result, Err(ForumError::Validation("Invalid credentials".into())));
    assert!(session.current_identity().is_none());
    assert!(!path.exists());
}

#[tokio::test]
async fn invalid_registration_never_reaches_the_server() {
    let dir = tempfile::tempdir().unwrap();
    let session = Arc::new(LocalSession::signed_out(dir.path().join("session.json")));

    let mut api = MockAuthApi::new();
    api.expect_register().never();
    let auth = Authenticator::new(Arc::new(api), session);

    let short = auth
        .register("ana", "ana@example.com", SecretString::from("short".to_string()))
        .await;
    assert!(matches!(short, Err(ForumError::Validation(_))));

    let no_at = auth
        .register("ana", "ana.example.com", SecretString::from("long-enough".to_string()))
        .await;
    assert!(matches!(no_at, Err(ForumError::Validation(_))));
}
