//! # Interaction Controller
//!
//! Owns the state of one open thread view and mediates every mutation of it.
//!
//! Upvotes are applied locally only after the server accepted them, one
//! increment per accepted call. Replies are never inserted locally: a
//! successful submission re-fetches the whole thread so ordering, timestamps
//! and ids always come from the server. Whatever resolves last wins.

use std::sync::Arc;

use ag_core::{
    Comment, CommentId, CommentTree, ForumError, Identity, NewComment, Post, Result,
    SessionProvider, Thread, ThreadDetail, ThreadId, ThreadRepo,
};
use tracing::{debug, info, warn};

/// What a pending reply will attach to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReplyTarget {
    /// Reply to the thread's post.
    #[default]
    Post,
    Comment(CommentId),
}

impl ReplyTarget {
    /// The `parent_comment_id` a reply to this target carries.
    pub fn parent_comment_id(&self) -> Option<&CommentId> {
        match self {
            ReplyTarget::Post => None,
            ReplyTarget::Comment(id) => Some(id),
        }
    }
}

impl From<Option<CommentId>> for ReplyTarget {
    fn from(parent: Option<CommentId>) -> Self {
        parent.map_or(ReplyTarget::Post, ReplyTarget::Comment)
    }
}

/// Result of an upvote that passed the sign-in check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The server accepted the vote and the local counter went up by one.
    Applied,
    /// The vote did not go through; local state is unchanged.
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank content; nothing was sent.
    Skipped,
    /// The server accepted the reply. `refreshed` is false when the follow-up
    /// fetch failed and the comment list is stale.
    Posted { refreshed: bool },
}

/// Session state for a single open thread.
pub struct InteractionController {
    repo: Arc<dyn ThreadRepo>,
    session: Arc<dyn SessionProvider>,
    detail: ThreadDetail,
    reply_target: ReplyTarget,
    draft: String,
}

impl InteractionController {
    /// Fetches the thread by slug and takes ownership of the result.
    pub async fn open(
        repo: Arc<dyn ThreadRepo>,
        session: Arc<dyn SessionProvider>,
        slug: &str,
    ) -> Result<Self> {
        let detail = repo.fetch_thread(slug).await?;
        debug!(slug, comments = detail.comments.len(), "thread opened");
        Ok(Self {
            repo,
            session,
            detail,
            reply_target: ReplyTarget::Post,
            draft: String::new(),
        })
    }

    pub fn thread(&self) -> &Thread {
        &self.detail.thread
    }

    pub fn post(&self) -> &Post {
        &self.detail.post
    }

    pub fn comments(&self) -> &[Comment] {
        &self.detail.comments
    }

    /// Every fetched comment, including deleted and deeply nested ones.
    pub fn comment_count(&self) -> usize {
        self.detail.comments.len()
    }

    pub fn tree(&self) -> CommentTree<'_> {
        CommentTree::build(&self.detail.comments)
    }

    pub fn reply_target(&self) -> &ReplyTarget {
        &self.reply_target
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Whether the current draft would be sent by [`Self::submit_draft`].
    pub fn can_submit(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    pub fn select_reply_target(&mut self, target: ReplyTarget) {
        self.reply_target = target;
    }

    /// Replaces the thread, post and comments with a fresh copy from the server.
    pub async fn refresh(&mut self) -> Result<()> {
        let detail = self.repo.fetch_thread(&self.detail.thread.slug).await?;
        self.detail = detail;
        Ok(())
    }

    pub async fn upvote_post(&mut self) -> Result<VoteOutcome> {
        self.require_identity()?;
        let thread_id = self.detail.thread.id.clone();

        match self.repo.upvote_post(&thread_id).await {
            Ok(()) => {
                let post = &mut self.detail.post;
                post.upvotes = post.upvotes.saturating_add(1);
                Ok(VoteOutcome::Applied)
            }
            Err(err) => Self::drop_vote(err, &thread_id, None),
        }
    }

    pub async fn upvote_comment(&mut self, comment_id: &CommentId) -> Result<VoteOutcome> {
        self.require_identity()?;
        let thread_id = self.detail.thread.id.clone();

        if let Err(err) = self.repo.upvote_comment(&thread_id, comment_id).await {
            return Self::drop_vote(err, &thread_id, Some(comment_id));
        }

        match self
            .detail
            .comments
            .iter_mut()
            .find(|c| &c.id == comment_id)
        {
            Some(comment) => {
                comment.upvotes = comment.upvotes.saturating_add(1);
                Ok(VoteOutcome::Applied)
            }
            None => {
                debug!(%comment_id, "upvoted comment is not in the local collection");
                Ok(VoteOutcome::Dropped)
            }
        }
    }

    /// Posts `content` as a reply to `parent` (the post when `None`).
    ///
    /// On success the draft is cleared, the target goes back to the post and
    /// the thread is fetched again. On failure neither is touched.
    pub async fn submit_reply(
        &mut self,
        content: &str,
        parent: Option<CommentId>,
    ) -> Result<SubmitOutcome> {
        if content.trim().is_empty() {
            return Ok(SubmitOutcome::Skipped);
        }
        self.require_identity()?;

        let comment = NewComment {
            content: content.to_string(),
            parent_comment_id: parent,
        };
        self.repo
            .create_comment(&self.detail.thread.id, &comment)
            .await
            .map_err(ForumError::into_submission_failure)?;

        info!(thread = %self.detail.thread.id, "reply posted");
        self.draft.clear();
        self.reply_target = ReplyTarget::Post;

        let refreshed = match self.refresh().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "re-fetch after reply failed");
                false
            }
        };
        Ok(SubmitOutcome::Posted { refreshed })
    }

    /// Submits the current draft against the current reply target.
    pub async fn submit_draft(&mut self) -> Result<SubmitOutcome> {
        let content = self.draft.clone();
        let parent = self.reply_target.parent_comment_id().cloned();
        self.submit_reply(&content, parent).await
    }

    fn require_identity(&self) -> Result<Identity> {
        self.session
            .current_identity()
            .ok_or(ForumError::Unauthenticated)
    }

    fn drop_vote(
        err: ForumError,
        thread_id: &ThreadId,
        comment_id: Option<&CommentId>,
    ) -> Result<VoteOutcome> {
        match err {
            ForumError::Unauthenticated => Err(ForumError::Unauthenticated),
            other => {
                debug!(%thread_id, ?comment_id, error = %other, "upvote dropped");
                Ok(VoteOutcome::Dropped)
            }
        }
    }
}
