//! Publishing a new thread.

use std::sync::Arc;

use ag_core::{ForumError, NewThread, Result, SessionProvider, Thread, ThreadRepo};
use tracing::info;

pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 200;
pub const CONTENT_MIN: usize = 10;

/// Checks a thread draft before anything is sent.
pub fn validate(draft: &NewThread) -> Result<()> {
    let title = draft.title.trim();
    let content = draft.content.trim();
    if title.is_empty() || content.is_empty() || draft.category_id.as_str().trim().is_empty() {
        return Err(ForumError::Validation("Please fill in all fields.".into()));
    }
    let title_len = title.chars().count();
    if !(TITLE_MIN..=TITLE_MAX).contains(&title_len) {
        return Err(ForumError::Validation(format!(
            "Title must be {TITLE_MIN}-{TITLE_MAX} characters."
        )));
    }
    if content.chars().count() < CONTENT_MIN {
        return Err(ForumError::Validation(format!(
            "Content must be at least {CONTENT_MIN} characters."
        )));
    }
    Ok(())
}

/// Creates the thread and its post. The caller navigates to the returned slug.
pub async fn publish_thread(
    repo: &Arc<dyn ThreadRepo>,
    session: &Arc<dyn SessionProvider>,
    draft: &NewThread,
) -> Result<Thread> {
    if session.current_identity().is_none() {
        return Err(ForumError::Unauthenticated);
    }
    validate(draft)?;

    let thread = repo.publish_thread(draft).await?;
    info!(slug = %thread.slug, "thread published");
    Ok(thread)
}
