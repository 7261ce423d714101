//! # Domain Models
//!
//! These structs represent the core entities of the Agora client.
//! Identifiers are opaque strings assigned by the forum service.

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Server-assigned thread identifier.
    ThreadId
);
string_id!(
    /// Server-assigned comment identifier, stable for the session once issued.
    CommentId
);
string_id!(UserId);
string_id!(CategoryId);

/// A top-level discussion unit, addressed by its slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    /// URL-safe and immutable once created
    pub slug: String,
    pub title: String,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub author_id: Option<UserId>,
    pub author_username: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Server-owned, only changes through a re-fetch
    pub view_count: u64,
    pub reply_count: u64,
}

/// The root content body of a thread. One per thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub thread_id: ThreadId,
    pub content: String,
    pub upvotes: u64,
}

/// A reply to the post (no parent) or to another comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub thread_id: ThreadId,
    pub parent_comment_id: Option<CommentId>,
    pub author_username: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub upvotes: u64,
    /// Soft-deleted comments are kept so their replies can still be indexed
    pub is_deleted: bool,
}

impl Comment {
    pub fn is_top_level(&self) -> bool {
        self.parent_comment_id.is_none()
    }
}

/// Everything one `fetch_thread` call returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadDetail {
    pub thread: Thread,
    pub post: Post,
    /// Server order, treated as creation order
    pub comments: Vec<Comment>,
}

/// Payload of a create-comment call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
    pub parent_comment_id: Option<CommentId>,
}

/// Payload of a publish-thread call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewThread {
    pub title: String,
    pub content: String,
    pub category_id: CategoryId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    /// Moderators and admins.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }
}

/// The signed-in user as reported by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// A bearer credential together with the identity it belongs to.
#[derive(Debug)]
pub struct AuthSession {
    pub token: SecretString,
    pub user: Identity,
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}
