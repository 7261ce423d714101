//! # ag-session-local
//!
//! File-backed implementation of `SessionStore`.
//! The credential and the user record are kept together in one JSON file so
//! a restart picks up where the last run left off.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use ag_core::error::{ForumError, Result};
use ag_core::models::{AuthSession, Identity};
use ag_core::traits::{SessionProvider, SessionStore};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

/// On-disk shape. Both halves must be present for the session to count.
#[derive(Serialize, Deserialize)]
struct SessionFile {
    token: Option<String>,
    user: Option<Identity>,
}

pub struct LocalSession {
    path: PathBuf,
    state: RwLock<Option<AuthSession>>,
}

impl LocalSession {
    /// A signed-out session that will persist to `path` on sign-in.
    pub fn signed_out(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: RwLock::new(None),
        }
    }

    /// Restores a previously stored session.
    ///
    /// A missing, unreadable-as-JSON or half-written file yields a signed-out
    /// session; only I/O failures other than "not found" are errors.
    pub async fn init(path: impl Into<PathBuf>) -> Result<Self> {
        let session = Self::signed_out(path);

        let raw = match fs::read_to_string(&session.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %session.path.display(), "no stored session");
                return Ok(session);
            }
            Err(e) => return Err(storage_error(&session.path, e)),
        };

        match serde_json::from_str::<SessionFile>(&raw) {
            Ok(SessionFile {
                token: Some(token),
                user: Some(user),
            }) if !token.trim().is_empty() => {
                info!(username = %user.username, "restored session");
                session.replace(Some(AuthSession {
                    token: SecretString::from(token),
                    user,
                }));
            }
            Ok(_) => debug!("stored session is incomplete, starting signed out"),
            Err(e) => {
                warn!(path = %session.path.display(), error = %e, "ignoring corrupt session file")
            }
        }
        Ok(session)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replace(&self, next: Option<AuthSession>) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

impl SessionProvider for LocalSession {
    fn current_identity(&self) -> Option<Identity> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.user.clone())
    }
}

#[async_trait]
impl SessionStore for LocalSession {
    fn bearer_token(&self) -> Option<SecretString> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| SecretString::from(s.token.expose_secret().to_owned()))
    }

    /// Persists first, so a failed write leaves the previous state in place.
    async fn sign_in(&self, session: AuthSession) -> Result<()> {
        let file = SessionFile {
            token: Some(session.token.expose_secret().to_owned()),
            user: Some(session.user.clone()),
        };
        let body = serde_json::to_string_pretty(&file)
            .map_err(|e| ForumError::Storage(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, e))?;
        }
        fs::write(&self.path, body)
            .await
            .map_err(|e| storage_error(&self.path, e))?;

        self.replace(Some(session));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.replace(None);
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }
}

fn storage_error(path: &Path, err: std::io::Error) -> ForumError {
    ForumError::Storage(format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::models::{Role, UserId};

    fn auth(username: &str) -> AuthSession {
        AuthSession {
            token: SecretString::from("tok-abc".to_string()),
            user: Identity {
                id: UserId::from("u1"),
                username: username.into(),
                email: None,
                role: Role::Admin,
            },
        }
    }

    #[tokio::test]
    async fn missing_file_starts_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let session = LocalSession::init(dir.path().join("session.json")).await.unwrap();
        assert!(session.current_identity().is_none());
        assert!(session.bearer_token().is_none());
    }

    #[tokio::test]
    async fn sign_in_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/session.json");

        let session = LocalSession::init(&path).await.unwrap();
        session.sign_in(auth("ana")).await.unwrap();
        assert_eq!(
            session.bearer_token().map(|t| t.expose_secret().to_owned()),
            Some("tok-abc".to_string())
        );

        let restored = LocalSession::init(&path).await.unwrap();
        let user = restored.current_identity().unwrap();
        assert_eq!(user.username, "ana");
        assert!(user.role.is_admin());
    }

    #[tokio::test]
    async fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let session = LocalSession::init(&path).await.unwrap();
        session.sign_in(auth("ana")).await.unwrap();

        session.clear().await.unwrap();
        assert!(session.current_identity().is_none());
        assert!(!path.exists());
        // Clearing twice is fine.
        session.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_or_partial_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{not json").unwrap();
        assert!(LocalSession::init(&corrupt)
            .await
            .unwrap()
            .current_identity()
            .is_none());

        let partial = dir.path().join("partial.json");
        std::fs::write(&partial, r#"{"token":"abc","user":null}"#).unwrap();
        assert!(LocalSession::init(&partial)
            .await
            .unwrap()
            .bearer_token()
            .is_none());
    }
}
