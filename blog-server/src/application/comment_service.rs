use tracing::info;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{Comment, CommentForm};
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::visibility::{Viewer, VisibilityFilter, authorize_mutation};

pub(crate) struct CommentService<C: CommentRepository, P: PostRepository> {
    comments: C,
    posts: P,
}

impl<C: CommentRepository, P: PostRepository> CommentService<C, P> {
    pub(crate) fn new(comments: C, posts: P) -> Self {
        Self { comments, posts }
    }

    /// Comments of a post already resolved through the visible set, oldest
    /// first.
    pub(crate) async fn list_comments(&self, post: &Post) -> Result<Vec<Comment>, DomainError> {
        self.comments.list_comments(post.id).await
    }

    pub(crate) async fn add_comment(
        &self,
        viewer: Viewer,
        post_id: i64,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        let author_id = viewer.require_user()?;
        self.visible_post(viewer, post_id).await?;
        let form = form.validate()?;

        let comment = self
            .comments
            .create_comment(NewComment {
                post_id,
                author_id,
                text: form.text,
            })
            .await?;
        info!(post_id, comment_id = comment.id, author_id, "comment added");
        Ok(comment)
    }

    pub(crate) async fn update_comment(
        &self,
        viewer: Viewer,
        post_id: i64,
        comment_id: i64,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        let current = self.find_existing(post_id, comment_id).await?;
        let author_id = self.authorize(viewer, &current)?;
        let form = form.validate()?;

        self.comments
            .update_comment_owned(comment_id, author_id, form.text)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))
    }

    /// Ownership check alone, for a request whose form could not be read.
    pub(crate) async fn ensure_author(
        &self,
        viewer: Viewer,
        post_id: i64,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        let current = self.find_existing(post_id, comment_id).await?;
        self.authorize(viewer, &current).map(|_| ())
    }

    /// Returns the deleted comment.
    pub(crate) async fn delete_comment(
        &self,
        viewer: Viewer,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Comment, DomainError> {
        let current = self.find_existing(post_id, comment_id).await?;
        let author_id = self.authorize(viewer, &current)?;

        if !self
            .comments
            .delete_comment_owned(comment_id, author_id)
            .await?
        {
            return Err(DomainError::NotFound(format!("comment id: {comment_id}")));
        }
        info!(post_id, comment_id, author_id, "comment deleted");
        Ok(current)
    }

    async fn visible_post(&self, viewer: Viewer, post_id: i64) -> Result<Post, DomainError> {
        let filter = VisibilityFilter::current(viewer);
        self.posts
            .find_visible_post(post_id, &filter)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))
    }

    async fn find_existing(&self, post_id: i64, comment_id: i64) -> Result<Comment, DomainError> {
        self.comments
            .find_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))
    }

    fn authorize(&self, viewer: Viewer, comment: &Comment) -> Result<i64, DomainError> {
        authorize_mutation(viewer, comment).inspect_err(|err| {
            if matches!(err, DomainError::NotAuthor { .. }) {
                info!(
                    comment_id = comment.id,
                    viewer = ?viewer,
                    "comment mutation by non-author rejected"
                );
            }
        })
    }
}
