//! Sign-in, registration and sign-out on top of the `AuthApi` and `SessionStore` ports.

use std::sync::Arc;

use ag_core::{
    AuthApi, AuthSession, Credentials, ForumError, Identity, Registration, Result, SessionStore,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 30;
pub const PASSWORD_MIN: usize = 8;

pub struct Authenticator {
    api: Arc<dyn AuthApi>,
    session: Arc<dyn SessionStore>,
}

impl Authenticator {
    pub fn new(api: Arc<dyn AuthApi>, session: Arc<dyn SessionStore>) -> Self {
        Self { api, session }
    }

    pub async fn login(&self, email: &str, password: SecretString) -> Result<Identity> {
        if email.trim().is_empty() || password.expose_secret().is_empty() {
            return Err(ForumError::Validation(
                "Email and password are required.".into(),
            ));
        }
        let credentials = Credentials {
            email: email.trim().to_string(),
            password,
        };
        let session = self.api.login(&credentials).await?;
        self.store(session).await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: SecretString,
    ) -> Result<Identity> {
        let username = username.trim();
        let len = username.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
            return Err(ForumError::Validation(format!(
                "Username must be {USERNAME_MIN}-{USERNAME_MAX} characters."
            )));
        }
        if !email.contains('@') {
            return Err(ForumError::Validation("A valid email is required.".into()));
        }
        if password.expose_secret().chars().count() < PASSWORD_MIN {
            return Err(ForumError::Validation(format!(
                "Password must be at least {PASSWORD_MIN} characters."
            )));
        }

        let registration = Registration {
            username: username.to_string(),
            email: email.trim().to_string(),
            password,
        };
        let session = self.api.register(&registration).await?;
        self.store(session).await
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.session.clear().await?;
        info!("signed out");
        Ok(())
    }

    async fn store(&self, session: AuthSession) -> Result<Identity> {
        let user = session.user.clone();
        self.session.sign_in(session).await?;
        info!(username = %user.username, "signed in");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::{MockAuthApi, Role, SessionProvider, UserId};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySession(Mutex<Option<Identity>>);

    impl SessionProvider for MemorySession {
        fn current_identity(&self) -> Option<Identity> {
            self.0.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SessionStore for MemorySession {
        fn bearer_token(&self) -> Option<SecretString> {
            None
        }

        async fn sign_in(&self, session: AuthSession) -> Result<()> {
            *self.0.lock().unwrap() = Some(session.user);
            Ok(())
        }

        async fn clear(&self) -> Result<()> {
            *self.0.lock().unwrap() = None;
            Ok(())
        }
    }

    fn auth_session(username: &str) -> AuthSession {
        AuthSession {
            token: SecretString::from("tok-123".to_string()),
            user: Identity {
                id: UserId::from("u1"),
                username: username.into(),
                email: Some("ana@example.com".into()),
                role: Role::User,
            },
        }
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn login_stores_session_and_sign_out_clears_it() {
        let mut api = MockAuthApi::new();
        api.expect_login()
            .withf(|c| c.email == "ana@example.com" && c.password.expose_secret() == "hunter22")
            .times(1)
            .returning(|_| Ok(auth_session("ana")));
        let session = Arc::new(MemorySession::default());
        let auth = Authenticator::new(Arc::new(api), session.clone());

        let user = auth.login(" ana@example.com ", secret("hunter22")).await.unwrap();
        assert_eq!(user.username, "ana");
        assert_eq!(session.current_identity().map(|u| u.username), Some("ana".into()));

        auth.sign_out().await.unwrap();
        assert!(session.current_identity().is_none());
    }

    #[tokio::test]
    async fn failed_login_leaves_session_empty() {
        let mut api = MockAuthApi::new();
        api.expect_login()
            .returning(|_| Err(ForumError::Validation("Invalid credentials".into())));
        let session = Arc::new(MemorySession::default());
        let auth = Authenticator::new(Arc::new(api), session.clone());

        let err = auth.login("ana@example.com", secret("wrong-pass")).await;
        assert_eq!(err, Err(ForumError::Validation("Invalid credentials".into())));
        assert!(session.current_identity().is_none());
    }

    #[tokio::test]
    async fn register_validates_before_calling() {
        let mut api = MockAuthApi::new();
        api.expect_register().never();
        api.expect_login().never();
        let auth = Authenticator::new(Arc::new(api), Arc::new(MemorySession::default()));

        for (username, email, password) in [
            ("ab", "ana@example.com", "long-password"),
            (&*"x".repeat(31), "ana@example.com", "long-password"),
            ("ana", "not-an-email", "long-password"),
            ("ana", "ana@example.com", "short"),
        ] {
            let result = auth.register(username, email, secret(password)).await;
            assert!(matches!(result, Err(ForumError::Validation(_))), "{username}/{email}");
        }
        assert!(auth.login("", secret("whatever")).await.is_err());
    }

    #[tokio::test]
    async fn register_signs_in() {
        let mut api = MockAuthApi::new();
        api.expect_register()
            .withf(|r| r.username == "ana" && r.email == "ana@example.com")
            .times(1)
            .returning(|_| Ok(auth_session("ana")));
        let session = Arc::new(MemorySession::default());
        let auth = Authenticator::new(Arc::new(api), session.clone());

        auth.register(" ana ", "ana@example.com", secret("long-password"))
            .await
            .unwrap();
        assert!(session.current_identity().is_some());
    }
}
