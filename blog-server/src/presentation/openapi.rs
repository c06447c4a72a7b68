use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::auth::{
    AuthResponseDto, LoginDto, LoginPromptDto, RegisterDto, UserDto,
};
use crate::presentation::handlers::catalog::{CategoryDto, LocationDto};
use crate::presentation::handlers::comments::{CommentDto, CommentFormDto};
use crate::presentation::handlers::posts::{
    CategoryFeedDto, CreatePostDto, FeedDto, PageQuery, PostCategoryDto, PostDetailDto, PostDto,
    PostLocationDto, UpdatePostDto,
};
use crate::presentation::handlers::profile::{ProfileDto, ProfileFormDto, ProfileUserDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::login_prompt,
        crate::presentation::handlers::posts::home_feed,
        crate::presentation::handlers::posts::category_feed,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::comments::add_comment,
        crate::presentation::handlers::comments::update_comment,
        crate::presentation::handlers::comments::delete_comment,
        crate::presentation::handlers::profile::get_profile,
        crate::presentation::handlers::profile::update_profile,
        crate::presentation::handlers::catalog::list_categories,
        crate::presentation::handlers::catalog::list_locations
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            LoginPromptDto,
            AuthResponseDto,
            UserDto,
            CreatePostDto,
            UpdatePostDto,
            PageQuery,
            PostDto,
            PostCategoryDto,
            PostLocationDto,
            FeedDto,
            PostDetailDto,
            CategoryFeedDto,
            CommentDto,
            CommentFormDto,
            ProfileDto,
            ProfileUserDto,
            ProfileFormDto,
            CategoryDto,
            LocationDto
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "posts", description = "Feeds and post authoring"),
        (name = "comments", description = "Comments on posts"),
        (name = "profile", description = "User profiles"),
        (name = "catalog", description = "Categories and locations")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
