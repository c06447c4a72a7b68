use tracing::info;

use super::feed::load_feed;
use crate::data::post_repository::{FeedScope, PostRepository};
use crate::data::user_repository::{ProfilePatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::{POSTS_PER_PAGE, Page, PageRequest};
use crate::domain::post::Post;
use crate::domain::user::{ProfileForm, User};
use crate::domain::visibility::{Viewer, VisibilityFilter};

#[derive(Debug, Clone)]
pub(crate) struct ProfilePage {
    pub(crate) user: User,
    pub(crate) posts: Page<Post>,
}

pub(crate) struct ProfileService<U: UserRepository, P: PostRepository> {
    users: U,
    posts: P,
}

impl<U: UserRepository, P: PostRepository> ProfileService<U, P> {
    pub(crate) fn new(users: U, posts: P) -> Self {
        Self { users, posts }
    }

    /// The owner sees every post they wrote; everyone else only the public ones.
    pub(crate) async fn profile(
        &self,
        viewer: Viewer,
        username: &str,
        page: PageRequest,
    ) -> Result<ProfilePage, DomainError> {
        let user = self
            .users
            .find_profile(username)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user: {username}")))?;

        let filter = VisibilityFilter::current(viewer);
        let posts = load_feed(
            &self.posts,
            FeedScope::Author(user.id),
            &filter,
            page,
            POSTS_PER_PAGE,
        )
        .await?;

        Ok(ProfilePage { user, posts })
    }

    pub(crate) async fn update_profile(
        &self,
        viewer: Viewer,
        form: ProfileForm,
    ) -> Result<User, DomainError> {
        let user_id = viewer.require_user()?;
        let form = form.validate()?;

        let patch = ProfilePatch {
            username: form.username,
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
        };
        let user = self
            .users
            .update_profile(user_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;
        info!(user_id, username = %user.username, "profile updated");
        Ok(user)
    }
}
