//! # Comment Tree
//!
//! Turns the flat, parent-pointer comment list returned by the server into
//! the two-level structure the thread view draws.
//!
//! Children are indexed by the `parent_comment_id` value alone, so a reply
//! whose parent was soft-deleted is still listed under that parent's id even
//! though the parent itself never shows up in `top_level`. Replies to replies
//! are indexed the same way but are never reached from `rendered()`.

use std::collections::{HashMap, HashSet};

use crate::models::{Comment, CommentId};

/// Index over a borrowed comment slice. Built in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentTree<'a> {
    comments: &'a [Comment],
    top_level: Vec<usize>,
    replies: HashMap<&'a CommentId, Vec<usize>>,
}

/// One top-level comment with its direct replies.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedComment<'a> {
    pub comment: &'a Comment,
    pub replies: Vec<&'a Comment>,
}

impl<'a> CommentTree<'a> {
    pub fn build(comments: &'a [Comment]) -> Self {
        Self::build_excluding(comments, &HashSet::new())
    }

    /// Like [`CommentTree::build`], but also hides the given ids the same way
    /// soft-deleted comments are hidden.
    pub fn build_excluding(comments: &'a [Comment], excluded: &HashSet<CommentId>) -> Self {
        let mut top_level = Vec::new();
        let mut replies: HashMap<&'a CommentId, Vec<usize>> = HashMap::new();

        for (idx, comment) in comments.iter().enumerate() {
            if comment.is_deleted || excluded.contains(&comment.id) {
                continue;
            }
            match &comment.parent_comment_id {
                None => top_level.push(idx),
                Some(parent) => replies.entry(parent).or_default().push(idx),
            }
        }

        Self {
            comments,
            top_level,
            replies,
        }
    }

    /// Visible comments attached directly to the post, in server order.
    pub fn top_level(&self) -> impl Iterator<Item = &'a Comment> + '_ {
        let comments = self.comments;
        self.top_level.iter().map(move |&idx| &comments[idx])
    }

    /// Visible comments whose parent is `id`, in server order, whether or not
    /// `id` itself is visible.
    pub fn replies_of(&self, id: &CommentId) -> impl Iterator<Item = &'a Comment> + '_ {
        let comments = self.comments;
        self.replies
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&idx| &comments[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty()
    }

    /// The exact two levels the thread view shows.
    pub fn rendered(&self) -> Vec<RenderedComment<'a>> {
        self.top_level()
            .map(|comment| RenderedComment {
                comment,
                replies: self.replies_of(&comment.id).collect(),
            })
            .collect()
    }
}
