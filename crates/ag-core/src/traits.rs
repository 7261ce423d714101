//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be wired into the client.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::Result;
use crate::models::{
    AuthSession, CommentId, Credentials, Identity, NewComment, NewThread, Registration, Thread,
    ThreadDetail, ThreadId,
};

/// Remote contract for reading and mutating a single thread.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ThreadRepo: Send + Sync {
    /// Fetches the thread, its post and the full flat comment list.
    /// Returns `NotFound` when the slug does not resolve.
    async fn fetch_thread(&self, slug: &str) -> Result<ThreadDetail>;

    async fn upvote_post(&self, thread_id: &ThreadId) -> Result<()>;
    async fn upvote_comment(&self, thread_id: &ThreadId, comment_id: &CommentId) -> Result<()>;

    /// The created record is not returned; callers re-fetch to see it.
    async fn create_comment(&self, thread_id: &ThreadId, comment: &NewComment) -> Result<()>;

    /// Creates a thread together with its post.
    async fn publish_thread(&self, draft: &NewThread) -> Result<Thread>;
}

/// Read access to whoever is currently signed in.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SessionProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;
}

/// Owns the credential lifecycle. `init` happens at the composition root.
#[async_trait]
pub trait SessionStore: SessionProvider {
    /// The credential to attach to authenticated requests, if any.
    fn bearer_token(&self) -> Option<SecretString>;

    async fn sign_in(&self, session: AuthSession) -> Result<()>;

    /// Forgets the credential. Called on sign-out and whenever the server answers 401.
    async fn clear(&self) -> Result<()>;
}

/// Remote contract for obtaining a credential.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession>;
    async fn register(&self, registration: &Registration) -> Result<AuthSession>;
}
