//! Shared fixtures for the cross-crate tests.
//!
//! `FakeForum` is an in-memory `ThreadRepo` that behaves like a small forum
//! server: accepted comments show up on the next fetch and every call is
//! counted so tests can assert on round trips.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ag_core::{
    Comment, CommentId, ForumError, Identity, NewComment, NewThread, Post, Result, Role,
    SessionProvider, Thread, ThreadDetail, ThreadId, ThreadRepo, UserId,
};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

pub const SLUG: &str = "welcome";

pub fn thread() -> Thread {
    Thread {
        id: ThreadId::from("t1"),
        slug: SLUG.into(),
        title: "Welcome to Agora".into(),
        category_id: None,
        category_name: Some("General".into()),
        author_id: Some(UserId::from("u0")),
        author_username: Some("admin".into()),
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap(),
        view_count: 12,
        reply_count: 0,
    }
}

/// A comment created `minute` minutes after the thread.
pub fn comment(id: &str, parent: Option<&str>, minute: i64) -> Comment {
    Comment {
        id: CommentId::from(id),
        thread_id: ThreadId::from("t1"),
        parent_comment_id: parent.map(CommentId::from),
        author_username: Some("ana".into()),
        content: format!("comment {id}"),
        created_at: thread().created_at + Duration::minutes(minute),
        upvotes: 0,
        is_deleted: false,
    }
}

pub fn detail(comments: Vec<Comment>) -> ThreadDetail {
    ThreadDetail {
        thread: thread(),
        post: Post {
            thread_id: ThreadId::from("t1"),
            content: "Say hello below.".into(),
            upvotes: 3,
        },
        comments,
    }
}

pub fn identity() -> Identity {
    Identity {
        id: UserId::from("u1"),
        username: "ana".into(),
        email: Some("ana@example.com".into()),
        role: Role::User,
    }
}

/// A session that is either always signed in or always signed out.
pub struct FixedSession(pub Option<Identity>);

impl FixedSession {
    pub fn signed_in() -> Arc<dyn SessionProvider> {
        Arc::new(Self(Some(identity())))
    }

    pub fn signed_out() -> Arc<dyn SessionProvider> {
        Arc::new(Self(None))
    }
}

impl SessionProvider for FixedSession {
    fn current_identity(&self) -> Option<Identity> {
        self.0.clone()
    }
}

#[derive(Default)]
pub struct CallCounts {
    pub fetches: AtomicUsize,
    pub votes: AtomicUsize,
    pub creates: AtomicUsize,
}

impl CallCounts {
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn votes(&self) -> usize {
        self.votes.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

pub struct FakeForum {
    state: Mutex<ThreadDetail>,
    next_id: AtomicUsize,
    reject_writes: bool,
    pub calls: CallCounts,
}

impl FakeForum {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self {
            next_id: AtomicUsize::new(comments.len() + 1),
            state: Mutex::new(detail(comments)),
            reject_writes: false,
            calls: CallCounts::default(),
        }
    }

    /// Every vote and comment is refused with a server error.
    pub fn rejecting(comments: Vec<Comment>) -> Self {
        Self {
            reject_writes: true,
            ..Self::new(comments)
        }
    }

    pub fn server_post_upvotes(&self) -> u64 {
        self.state.lock().unwrap().post.upvotes
    }

    fn check_writable(&self) -> Result<()> {
        if self.reject_writes {
            return Err(ForumError::Server {
                status: 500,
                message: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ThreadRepo for FakeForum {
    async fn fetch_thread(&self, slug: &str) -> Result<ThreadDetail> {
        self.calls.fetches.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if state.thread.slug != slug {
            return Err(ForumError::NotFound(slug.to_string()));
        }
        Ok(state.clone())
    }

    async fn upvote_post(&self, _thread_id: &ThreadId) -> Result<()> {
        self.calls.votes.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        self.state.lock().unwrap().post.upvotes += 1;
        Ok(())
    }

    async fn upvote_comment(&self, _thread_id: &ThreadId, comment_id: &CommentId) -> Result<()> {
        self.calls.votes.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        match state.comments.iter_mut().find(|c| &c.id == comment_id) {
            Some(comment) => {
                comment.upvotes += 1;
                Ok(())
            }
            None => Err(ForumError::NotFound(comment_id.to_string())),
        }
    }

    async fn create_comment(&self, thread_id: &ThreadId, new: &NewComment) -> Result<()> {
        self.calls.creates.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let minute = state.comments.len() as i64 + 1;
        let created_at = state.thread.created_at + Duration::minutes(minute);
        state.comments.push(Comment {
            id: CommentId::from(format!("c{id}")),
            thread_id: thread_id.clone(),
            parent_comment_id: new.parent_comment_id.clone(),
            author_username: Some("ana".into()),
            content: new.content.clone(),
            created_at,
            upvotes: 0,
            is_deleted: false,
        });
        state.thread.reply_count += 1;
        Ok(())
    }

    async fn publish_thread(&self, _draft: &NewThread) -> Result<Thread> {
        Err(ForumError::Validation("publishing is not supported here".into()))
    }
}
