use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::comment_service::CommentService;
use crate::application::profile_service::ProfileService;
use crate::data::catalog_repository::CatalogRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

#[cfg(test)]
mod router_tests;

pub(crate) type SharedUserRepository = Arc<dyn UserRepository>;
pub(crate) type SharedPostRepository = Arc<dyn PostRepository>;
pub(crate) type SharedCommentRepository = Arc<dyn CommentRepository>;
pub(crate) type SharedCatalogRepository = Arc<dyn CatalogRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService<SharedUserRepository>>,
    pub(crate) blog_service: Arc<BlogService<SharedPostRepository, SharedCatalogRepository>>,
    pub(crate) comment_service: Arc<CommentService<SharedCommentRepository, SharedPostRepository>>,
    pub(crate) profile_service: Arc<ProfileService<SharedUserRepository, SharedPostRepository>>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(
        users: SharedUserRepository,
        posts: SharedPostRepository,
        comments: SharedCommentRepository,
        catalog: SharedCatalogRepository,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(users.clone(), jwt.clone())),
            blog_service: Arc::new(BlogService::new(posts.clone(), catalog)),
            comment_service: Arc::new(CommentService::new(comments, posts.clone())),
            profile_service: Arc::new(ProfileService::new(users, posts)),
            jwt,
        }
    }
}
