//! JSON shapes spoken by the forum API and their mapping onto ag-core models.
//!
//! Thread rows are snake_case, post and comment bodies camelCase. Counters and
//! flags the server leaves out default to zero/false.

use ag_core::models::{
    AuthSession, CategoryId, Comment, CommentId, Identity, NewComment, NewThread, Post, Role,
    Thread, ThreadDetail, ThreadId, UserId,
};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Ids arrive as strings (document ids) or integers (row ids).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Text(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThreadRow {
    id: RawId,
    slug: String,
    title: String,
    #[serde(default)]
    category_id: Option<RawId>,
    #[serde(default)]
    category_name: Option<String>,
    #[serde(default)]
    author_id: Option<RawId>,
    #[serde(default)]
    author_username: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    view_count: Option<u64>,
    #[serde(default)]
    reply_count: Option<u64>,
}

impl From<ThreadRow> for Thread {
    fn from(row: ThreadRow) -> Self {
        Thread {
            id: ThreadId(row.id.into()),
            slug: row.slug,
            title: row.title,
            category_id: row.category_id.map(|id| CategoryId(id.into())),
            category_name: row.category_name,
            author_id: row.author_id.map(|id| UserId(id.into())),
            author_username: row.author_username,
            created_at: row.created_at,
            view_count: row.view_count.unwrap_or(0),
            reply_count: row.reply_count.unwrap_or(0),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostBody {
    #[serde(default)]
    original_post: Option<OriginalPost>,
    #[serde(default)]
    comments: Vec<CommentRow>,
}

#[derive(Debug, Deserialize)]
struct OriginalPost {
    #[serde(default)]
    content: String,
    #[serde(default)]
    upvotes: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentRow {
    #[serde(rename = "_id")]
    id: RawId,
    #[serde(default)]
    parent_comment_id: Option<RawId>,
    #[serde(default)]
    author_username: Option<String>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    upvotes: Option<u64>,
    #[serde(default)]
    is_deleted: Option<bool>,
}

impl CommentRow {
    /// `posted_fallback` stands in for a missing timestamp.
    fn into_comment(self, thread_id: &ThreadId, posted_fallback: DateTime<Utc>) -> Comment {
        Comment {
            id: CommentId(self.id.into()),
            thread_id: thread_id.clone(),
            parent_comment_id: self.parent_comment_id.map(|id| CommentId(id.into())),
            author_username: self.author_username,
            content: self.content,
            created_at: self.created_at.unwrap_or(posted_fallback),
            upvotes: self.upvotes.unwrap_or(0),
            is_deleted: self.is_deleted.unwrap_or(false),
        }
    }
}

/// `GET /threads/{slug}`
#[derive(Debug, Deserialize)]
pub(crate) struct ThreadEnvelope {
    thread: ThreadRow,
    #[serde(default)]
    post: Option<PostBody>,
}

impl From<ThreadEnvelope> for ThreadDetail {
    fn from(envelope: ThreadEnvelope) -> Self {
        let thread: Thread = envelope.thread.into();
        let body = envelope.post.unwrap_or_default();
        let (content, upvotes) = body
            .original_post
            .map(|p| (p.content, p.upvotes.unwrap_or(0)))
            .unwrap_or_default();

        let comments = body
            .comments
            .into_iter()
            .map(|row| row.into_comment(&thread.id, thread.created_at))
            .collect();

        ThreadDetail {
            post: Post {
                thread_id: thread.id.clone(),
                content,
                upvotes,
            },
            thread,
            comments,
        }
    }
}

/// `POST /threads` response.
#[derive(Debug, Deserialize)]
pub(crate) struct PublishedEnvelope {
    pub thread: ThreadRow,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCommentBody<'a> {
    content: &'a str,
    parent_comment_id: Option<&'a str>,
}

impl<'a> From<&'a NewComment> for CreateCommentBody<'a> {
    fn from(comment: &'a NewComment) -> Self {
        Self {
            content: &comment.content,
            parent_comment_id: comment.parent_comment_id.as_ref().map(CommentId::as_str),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateThreadBody<'a> {
    title: &'a str,
    content: &'a str,
    category_id: &'a str,
}

impl<'a> From<&'a NewThread> for CreateThreadBody<'a> {
    fn from(draft: &'a NewThread) -> Self {
        Self {
            title: draft.title.trim(),
            content: &draft.content,
            category_id: draft.category_id.as_str(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserRow {
    id: RawId,
    username: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<Role>,
}

/// `POST /auth/login` and `POST /auth/register` response.
#[derive(Deserialize)]
pub(crate) struct AuthEnvelope {
    token: String,
    user: UserRow,
}

impl From<AuthEnvelope> for AuthSession {
    fn from(envelope: AuthEnvelope) -> Self {
        let user = envelope.user;
        AuthSession {
            token: SecretString::from(envelope.token),
            user: Identity {
                id: UserId(user.id.into()),
                username: user.username,
                email: user.email,
                role: user.role.unwrap_or_default(),
            },
        }
    }
}

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RegisterBody<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> LoginBody<'a> {
    pub fn new(credentials: &'a ag_core::Credentials) -> Self {
        Self {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        }
    }
}

impl<'a> RegisterBody<'a> {
    pub fn new(registration: &'a ag_core::Registration) -> Self {
        Self {
            username: &registration.username,
            email: &registration.email,
            password: registration.password.expose_secret(),
        }
    }
}

/// Error bodies carry an optional human-readable `message`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
