//! ag-core/src/lib.rs
//!
//! Domain models, port definitions and the comment tree for the Agora client.

pub mod error;
pub mod models;
pub mod traits;
pub mod tree;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;
pub use tree::*;

#[cfg(test)]
mod tests {
    use super::error::*;
    use super::models::*;

    #[test]
    fn test_comment_defaults_to_top_level() {
        let comment = Comment {
            id: CommentId::from("c1"),
            thread_id: ThreadId::from("t1"),
            parent_comment_id: None,
            author_username: Some("ana".to_string()),
            content: "Hello Rust!".to_string(),
            created_at: chrono::Utc::now(),
            upvotes: 0,
            is_deleted: false,
        };
        assert!(comment.is_top_level());
        assert_eq!(comment.id.to_string(), "c1");
    }

    #[test]
    fn test_role_staff() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Moderator.is_staff());
        assert!(!Role::User.is_staff());
        assert!(!Role::Moderator.is_admin());
        let role: Role = serde_json::from_str("\"moderator\"").unwrap();
        assert_eq!(role, Role::Moderator);
    }

    #[test]
    fn test_submission_failure_mapping() {
        assert_eq!(
            ForumError::Validation("Content too long".into()).into_submission_failure(),
            ForumError::SubmissionFailed("Content too long".into())
        );
        assert_eq!(
            ForumError::Network("timeout".into()).into_submission_failure(),
            ForumError::SubmissionFailed(GENERIC_SUBMISSION_FAILURE.into())
        );
        assert_eq!(
            ForumError::Validation("  ".into()).into_submission_failure(),
            ForumError::SubmissionFailed(GENERIC_SUBMISSION_FAILURE.into())
        );
        assert_eq!(
            ForumError::Server {
                status: 500,
                message: Some("Thread is locked".into()),
            }
            .into_submission_failure(),
            ForumError::SubmissionFailed("Thread is locked".into())
        );
        assert_eq!(
            ForumError::Server {
                status: 502,
                message: None,
            }
            .into_submission_failure(),
            ForumError::SubmissionFailed(GENERIC_SUBMISSION_FAILURE.into())
        );
        let locked = ForumError::Server {
            status: 503,
            message: Some("Down for maintenance".into()),
        };
        assert_eq!(locked.to_string(), "server answered 503: Down for maintenance");
        assert_eq!(
            ForumError::Unauthenticated.into_submission_failure(),
            ForumError::Unauthenticated
        );
    }
}
