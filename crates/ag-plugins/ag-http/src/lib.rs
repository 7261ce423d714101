//! # ag-http Implementation
//!
//! `reqwest` implementation of the `ThreadRepo` and `AuthApi` ports.
//!
//! The bearer credential is read from the injected `SessionStore` on every
//! request. A `401` on an authenticated request clears that store before the
//! caller sees `Unauthenticated`, so the next screen is the sign-in one.

mod wire;

use std::sync::Arc;
use std::time::Duration;

use ag_core::error::{ForumError, Result, GENERIC_SUBMISSION_FAILURE};
use ag_core::models::{
    AuthSession, CommentId, Credentials, NewComment, NewThread, Registration, Thread,
    ThreadDetail, ThreadId,
};
use ag_core::traits::{AuthApi, SessionStore, ThreadRepo};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::wire::{
    AuthEnvelope, CreateCommentBody, CreateThreadBody, ErrorBody, LoginBody, PublishedEnvelope,
    RegisterBody, ThreadEnvelope,
};

const GENERIC_REJECTION: &str = "The request was rejected.";
const LOGIN_REJECTION: &str = "Login failed. Check your credentials.";
const REGISTER_REJECTION: &str = "Registration failed. Try a stronger password.";
const PUBLISH_REJECTION: &str = "Failed to create thread.";

/// Whether a request carries the session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Attach the bearer token; a 401 signs the user out.
    Session,
    /// Sign-in and registration: no token, and a 401 is just a rejection.
    Anonymous,
}

/// One API call as the error mapping sees it.
#[derive(Debug, Clone, Copy)]
struct Call<'a> {
    operation: &'a str,
    resource: &'a str,
    access: Access,
    /// Shown for a rejected request whose body carries no message.
    rejection: &'a str,
}

impl<'a> Call<'a> {
    fn session(operation: &'a str, resource: &'a str) -> Self {
        Self {
            operation,
            resource,
            access: Access::Session,
            rejection: GENERIC_REJECTION,
        }
    }

    fn anonymous(operation: &'a str, resource: &'a str) -> Self {
        Self {
            access: Access::Anonymous,
            ..Self::session(operation, resource)
        }
    }

    fn rejected_as(self, rejection: &'a str) -> Self {
        Self { rejection, ..self }
    }
}

pub struct HttpForumClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl HttpForumClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        user_agent: &str,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ForumError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self::with_client(http, base_url, session))
    }

    /// Uses an already configured `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends the request and turns any non-2xx answer into a `ForumError`.
    async fn send(&self, call: Call<'_>, mut request: RequestBuilder) -> Result<Response> {
        let operation = call.operation;
        if call.access == Access::Session {
            if let Some(token) = self.session.bearer_token() {
                request = request.bearer_auth(token.expose_secret());
            }
        }

        let response = request.send().await.map_err(|e| {
            warn!(operation, error = %e, "request failed");
            ForumError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(operation, %status, "request ok");
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && call.access == Access::Session {
            warn!(operation, "credential rejected, clearing session");
            if let Err(e) = self.session.clear().await {
                warn!(error = %e, "failed to clear session after 401");
            }
            return Err(ForumError::Unauthenticated);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(operation, %status, "request rejected");
        Err(classify_status(status, &body, call.resource, call.rejection))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        call: Call<'_>,
        request: RequestBuilder,
    ) -> Result<T> {
        self.send(call, request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ForumError::Network(format!("failed to decode {}: {e}", call.operation)))
    }
}

/// Maps a non-success status that was not intercepted as a sign-out.
///
/// The body's `message` is kept for every status; `rejection` stands in for
/// a client error that does not explain itself.
fn classify_status(status: StatusCode, body: &str, resource: &str, rejection: &str) -> ForumError {
    if status == StatusCode::NOT_FOUND {
        return ForumError::NotFound(resource.to_string());
    }
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());
    if status.is_client_error() {
        return ForumError::Validation(message.unwrap_or_else(|| rejection.to_string()));
    }
    ForumError::Server {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ThreadRepo for HttpForumClient {
    async fn fetch_thread(&self, slug: &str) -> Result<ThreadDetail> {
        let request = self.http.get(self.url(&format!("threads/{slug}")));
        let resource = format!("thread {slug}");
        let envelope: ThreadEnvelope = self
            .send_json(Call::session("fetch thread", &resource), request)
            .await?;
        Ok(envelope.into())
    }

    async fn upvote_post(&self, thread_id: &ThreadId) -> Result<()> {
        let request = self.http.post(self.url(&format!("threads/{thread_id}/upvote")));
        let resource = format!("thread {thread_id}");
        self.send(Call::session("upvote post", &resource), request).await?;
        Ok(())
    }

    async fn upvote_comment(&self, thread_id: &ThreadId, comment_id: &CommentId) -> Result<()> {
        let request = self.http.post(self.url(&format!(
            "threads/{thread_id}/comments/{comment_id}/upvote"
        )));
        let resource = format!("comment {comment_id}");
        self.send(Call::session("upvote comment", &resource), request).await?;
        Ok(())
    }

    async fn create_comment(&self, thread_id: &ThreadId, comment: &NewComment) -> Result<()> {
        let request = self
            .http
            .post(self.url(&format!("threads/{thread_id}/comments")))
            .json(&CreateCommentBody::from(comment));
        let resource = format!("thread {thread_id}");
        let call =
            Call::session("create comment", &resource).rejected_as(GENERIC_SUBMISSION_FAILURE);
        self.send(call, request).await?;
        Ok(())
    }

    async fn publish_thread(&self, draft: &NewThread) -> Result<Thread> {
        let request = self
            .http
            .post(self.url("threads"))
            .json(&CreateThreadBody::from(draft));
        let call = Call::session("publish thread", "category").rejected_as(PUBLISH_REJECTION);
        let envelope: PublishedEnvelope = self.send_json(call, request).await?;
        Ok(envelope.thread.into())
    }
}

#[async_trait]
impl AuthApi for HttpForumClient {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession> {
        let request = self
            .http
            .post(self.url("auth/login"))
            .json(&LoginBody::new(credentials));
        let call = Call::anonymous("login", "account").rejected_as(LOGIN_REJECTION);
        let envelope: AuthEnvelope = self.send_json(call, request).await?;
        Ok(envelope.into())
    }

    async fn register(&self, registration: &Registration) -> Result<AuthSession> {
        let request = self
            .http
            .post(self.url("auth/register"))
            .json(&RegisterBody::new(registration));
        let call = Call::anonymous("register", "account").rejected_as(REGISTER_REJECTION);
        let envelope: AuthEnvelope = self.send_json(call, request).await?;
        Ok(envelope.into())
    }
}
