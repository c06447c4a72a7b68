use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::visibility::VisibilityFilter;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) author_id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) is_published: bool,
    pub(crate) category_id: Option<i64>,
    pub(crate) location_id: Option<i64>,
}

/// Full replacement of the editable post fields.
#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) is_published: bool,
    pub(crate) category_id: Option<i64>,
    pub(crate) location_id: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) page_size: u32,
}

impl Pagination {
    pub(crate) fn limit(self) -> i64 {
        i64::from(self.page_size)
    }

    pub(crate) fn offset(self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * self.limit()
    }
}

/// Which slice of the post table a feed draws from. The visibility filter is
/// applied on top of every scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FeedScope {
    All,
    Category(i64),
    Author(i64),
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;

    /// Unfiltered lookup, used for ownership checks only.
    async fn find_post(&self, id: i64) -> Result<Option<Post>, DomainError>;

    async fn find_visible_post(
        &self,
        id: i64,
        filter: &VisibilityFilter,
    ) -> Result<Option<Post>, DomainError>;

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;

    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError>;

    /// Visible posts in `scope`, newest publication date first.
    async fn list_visible_posts(
        &self,
        scope: FeedScope,
        filter: &VisibilityFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;

    async fn count_visible_posts(
        &self,
        scope: FeedScope,
        filter: &VisibilityFilter,
    ) -> Result<i64, DomainError>;
}

#[async_trait]
impl<T: PostRepository + ?Sized> PostRepository for Arc<T> {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        (**self).create_post(input).await
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        (**self).find_post(id).await
    }

    async fn find_visible_post(
        &self,
        id: i64,
        filter: &VisibilityFilter,
    ) -> Result<Option<Post>, DomainError> {
        (**self).find_visible_post(id, filter).await
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        (**self).update_post_owned(post_id, owner_id, patch).await
    }

    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        (**self).delete_post_owned(post_id, owner_id).await
    }

    async fn list_visible_posts(
        &self,
        scope: FeedScope,
        filter: &VisibilityFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        (**self).list_visible_posts(scope, filter, pagination).await
    }

    async fn count_visible_posts(
        &self,
        scope: FeedScope,
        filter: &VisibilityFilter,
    ) -> Result<i64, DomainError> {
        (**self).count_visible_posts(scope, filter).await
    }
}
