//! Who may read a post and who may change a post or a comment.
//!
//! A post belongs to the visible set of a viewer when the viewer wrote it, or
//! when it is public: published, with a publication time that is not in the
//! future, and filed under a published category (or under none). Public
//! visibility is never stored; it is evaluated against the `now` carried by
//! [`VisibilityFilter`], so a scheduled post appears by clock advancement
//! alone.
//!
//! Production queries render the rule as a SQL `WHERE` fragment.
//! [`VisibilityFilter::admits`] is the in-process form of the same rule; the
//! in-memory store is built on it and the Postgres repository tests compare
//! both renderings post by post.

use chrono::{DateTime, Utc};

use super::comment::Comment;
use super::error::DomainError;
use super::post::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Viewer {
    Anonymous,
    Authenticated { user_id: i64 },
}

impl Viewer {
    pub(crate) fn user_id(self) -> Option<i64> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Authenticated { user_id } => Some(user_id),
        }
    }

    pub(crate) fn require_user(self) -> Result<i64, DomainError> {
        self.user_id().ok_or(DomainError::LoginRequired)
    }

    pub(crate) fn is_author_of(self, resource: &impl Authored) -> bool {
        self.user_id() == Some(resource.author_id())
    }
}

/// Resource with an immutable author.
pub(crate) trait Authored {
    fn author_id(&self) -> i64;

    /// Post whose detail view a rejected mutation redirects to.
    fn detail_post_id(&self) -> i64;
}

impl Authored for Post {
    fn author_id(&self) -> i64 {
        self.author_id
    }

    fn detail_post_id(&self) -> i64 {
        self.id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> i64 {
        self.author_id
    }

    fn detail_post_id(&self) -> i64 {
        self.post_id
    }
}

/// Returns the acting user id when `viewer` may edit or delete `resource`.
pub(crate) fn authorize_mutation(
    viewer: Viewer,
    resource: &impl Authored,
) -> Result<i64, DomainError> {
    let user_id = viewer.require_user()?;
    if !viewer.is_author_of(resource) {
        return Err(DomainError::NotAuthor {
            post_id: resource.detail_post_id(),
        });
    }
    Ok(user_id)
}

#[cfg(test)]
pub(crate) fn is_public(post: &Post, now: DateTime<Utc>) -> bool {
    post.is_published
        && post.pub_date <= now
        && post
            .category
            .as_ref()
            .is_none_or(|category| category.is_published)
}

/// A viewer pinned to one instant; every query of a request uses one filter.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VisibilityFilter {
    pub(crate) viewer: Viewer,
    pub(crate) now: DateTime<Utc>,
}

impl VisibilityFilter {
    pub(crate) fn new(viewer: Viewer, now: DateTime<Utc>) -> Self {
        Self { viewer, now }
    }

    pub(crate) fn current(viewer: Viewer) -> Self {
        Self::new(viewer, Utc::now())
    }

    #[cfg(test)]
    pub(crate) fn admits(&self, post: &Post) -> bool {
        self.viewer.is_author_of(post) || is_public(post, self.now)
    }
}
