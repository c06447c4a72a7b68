use chrono::Utc;
use tracing::info;

use super::feed::load_feed;
use crate::data::catalog_repository::CatalogRepository;
use crate::data::post_repository::{FeedScope, NewPost, PostPatch, PostRepository};
use crate::domain::catalog::{Category, Location};
use crate::domain::error::DomainError;
use crate::domain::pagination::{POSTS_PER_PAGE, Page, PageRequest};
use crate::domain::post::{Post, PostForm};
use crate::domain::visibility::{Viewer, VisibilityFilter, authorize_mutation};

#[derive(Debug, Clone)]
pub(crate) struct CategoryFeed {
    pub(crate) category: Category,
    pub(crate) posts: Page<Post>,
}

pub(crate) struct BlogService<P: PostRepository, C: CatalogRepository> {
    posts: P,
    catalog: C,
}

impl<P: PostRepository, C: CatalogRepository> BlogService<P, C> {
    pub(crate) fn new(posts: P, catalog: C) -> Self {
        Self { posts, catalog }
    }

    pub(crate) async fn home_feed(
        &self,
        viewer: Viewer,
        page: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        let filter = VisibilityFilter::current(viewer);
        load_feed(&self.posts, FeedScope::All, &filter, page, POSTS_PER_PAGE).await
    }

    pub(crate) async fn category_feed(
        &self,
        viewer: Viewer,
        slug: &str,
        page: PageRequest,
    ) -> Result<CategoryFeed, DomainError> {
        let category = self
            .catalog
            .find_published_category(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("category: {slug}")))?;

        let filter = VisibilityFilter::current(viewer);
        let posts = load_feed(
            &self.posts,
            FeedScope::Category(category.id),
            &filter,
            page,
            POSTS_PER_PAGE,
        )
        .await?;

        Ok(CategoryFeed { category, posts })
    }

    /// Hidden and missing posts are indistinguishable: both are `NotFound`.
    pub(crate) async fn get_post(&self, viewer: Viewer, id: i64) -> Result<Post, DomainError> {
        let filter = VisibilityFilter::current(viewer);
        self.posts
            .find_visible_post(id, &filter)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn create_post(
        &self,
        viewer: Viewer,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        let author_id = viewer.require_user()?;
        let form = form.validate()?;

        let new_post = NewPost {
            author_id,
            title: form.title,
            text: form.text,
            pub_date: form.pub_date.unwrap_or_else(Utc::now),
            is_published: form.is_published.unwrap_or(true),
            category_id: form.category_id,
            location_id: form.location_id,
        };
        let post = self.posts.create_post(new_post).await?;
        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    /// The ownership check runs before the form is validated, so a non-author
    /// is sent back to the post whatever they submitted.
    pub(crate) async fn update_post(
        &self,
        viewer: Viewer,
        post_id: i64,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        let current = self.find_existing(post_id).await?;
        let author_id = self.authorize(viewer, &current)?;
        let form = form.validate()?;

        let patch = PostPatch {
            title: form.title,
            text: form.text,
            pub_date: form.pub_date.unwrap_or(current.pub_date),
            is_published: form.is_published.unwrap_or(current.is_published),
            category_id: form.category_id,
            location_id: form.location_id,
        };
        let post = self
            .posts
            .update_post_owned(post_id, author_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;
        info!(post_id, author_id, "post updated");
        Ok(post)
    }

    /// Ownership check alone, for an edit request whose form could not be
    /// read. Writes nothing.
    pub(crate) async fn ensure_author(&self, viewer: Viewer, post_id: i64) -> Result<(), DomainError> {
        let current = self.find_existing(post_id).await?;
        self.authorize(viewer, &current).map(|_| ())
    }

    /// Returns the deleted post.
    pub(crate) async fn delete_post(&self, viewer: Viewer, post_id: i64) -> Result<Post, DomainError> {
        let current = self.find_existing(post_id).await?;
        let author_id = self.authorize(viewer, &current)?;

        let deleted = self.posts.delete_post_owned(post_id, author_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        info!(post_id, author_id, "post deleted");
        Ok(current)
    }

    pub(crate) async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.catalog.list_published_categories().await
    }

    pub(crate) async fn list_locations(&self) -> Result<Vec<Location>, DomainError> {
        self.catalog.list_published_locations().await
    }

    async fn find_existing(&self, post_id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))
    }

    fn authorize(&self, viewer: Viewer, post: &Post) -> Result<i64, DomainError> {
        authorize_mutation(viewer, post).inspect_err(|err| {
            if matches!(err, DomainError::NotAuthor { .. }) {
                info!(post_id = post.id, viewer = ?viewer, "post mutation by non-author rejected");
            }
        })
    }
}
