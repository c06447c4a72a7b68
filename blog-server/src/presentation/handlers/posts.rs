use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::catalog::CategoryDto;
use super::comments::CommentDto;
use crate::application::blog_service::CategoryFeed;
use crate::domain::catalog::{CategoryRef, LocationRef};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::post::{Post, PostForm};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppError, AppResult, JsonBody};
use crate::presentation::middleware::auth::{AuthenticatedUser, CurrentViewer};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[serde(default)]
    #[validate(length(min = 1, max = 256))]
    pub(crate) title: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub(crate) text: String,
    pub(crate) pub_date: Option<DateTime<Utc>>,
    pub(crate) is_published: Option<bool>,
    pub(crate) category_id: Option<i64>,
    pub(crate) location_id: Option<i64>,
}

/// Checked only after the ownership check, so a non-author is redirected
/// whatever they sent. Missing fields read as empty and fail validation by
/// name.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) text: String,
    pub(crate) pub_date: Option<DateTime<Utc>>,
    pub(crate) is_published: Option<bool>,
    pub(crate) category_id: Option<i64>,
    pub(crate) location_id: Option<i64>,
}

/// `page` stays a string: anything that is not a number means page 1.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<String>,
}

impl PageQuery {
    pub(crate) fn request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostCategoryDto {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) is_published: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostLocationDto {
    pub(crate) id: i64,
    pub(crate) name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) author_id: i64,
    pub(crate) author_username: String,
    pub(crate) category: Option<PostCategoryDto>,
    /// Omitted while the location is unpublished.
    pub(crate) location: Option<PostLocationDto>,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) comment_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FeedDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) page: u32,
    pub(crate) per_page: u32,
    pub(crate) num_pages: u32,
    pub(crate) total: i64,
    pub(crate) has_previous: bool,
    pub(crate) has_next: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    pub(crate) post: PostDto,
    pub(crate) comments: Vec<CommentDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryFeedDto {
    pub(crate) category: CategoryDto,
    pub(crate) feed: FeedDto,
}

impl From<CategoryRef> for PostCategoryDto {
    fn from(category: CategoryRef) -> Self {
        Self {
            id: category.id,
            slug: category.slug,
            title: category.title,
            is_published: category.is_published,
        }
    }
}

impl From<LocationRef> for PostLocationDto {
    fn from(location: LocationRef) -> Self {
        Self {
            id: location.id,
            name: location.name,
        }
    }
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            author_id: post.author_id,
            author_username: post.author_username,
            category: post.category.map(PostCategoryDto::from),
            location: post
                .location
                .filter(|location| location.is_published)
                .map(PostLocationDto::from),
            pub_date: post.pub_date,
            is_published: post.is_published,
            created_at: post.created_at,
            comment_count: post.comment_count,
        }
    }
}

impl From<Page<Post>> for FeedDto {
    fn from(page: Page<Post>) -> Self {
        let has_previous = page.has_previous();
        let has_next = page.has_next();
        Self {
            posts: page.items.into_iter().map(PostDto::from).collect(),
            page: page.number,
            per_page: page.per_page,
            num_pages: page.num_pages,
            total: page.total,
            has_previous,
            has_next,
        }
    }
}

impl From<CategoryFeed> for CategoryFeedDto {
    fn from(feed: CategoryFeed) -> Self {
        Self {
            category: feed.category.into(),
            feed: feed.posts.into(),
        }
    }
}

impl From<CreatePostDto> for PostForm {
    fn from(dto: CreatePostDto) -> Self {
        Self {
            title: dto.title,
            text: dto.text,
            pub_date: dto.pub_date,
            is_published: dto.is_published,
            category_id: dto.category_id,
            location_id: dto.location_id,
        }
    }
}

impl From<UpdatePostDto> for PostForm {
    fn from(dto: UpdatePostDto) -> Self {
        Self {
            title: dto.title,
            text: dto.text,
            pub_date: dto.pub_date,
            is_published: dto.is_published,
            category_id: dto.category_id,
            location_id: dto.location_id,
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "posts",
    params(
        ("page" = Option<String>, Query, description = "Page number, clamped to the available pages")
    ),
    responses(
        (status = 200, description = "Visible posts, newest first", body = FeedDto),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn home_feed(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<FeedDto>> {
    let page = state
        .blog_service
        .home_feed(viewer, query.request())
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/category/{slug}",
    tag = "posts",
    params(
        ("slug" = String, Path, description = "Category slug"),
        ("page" = Option<String>, Query, description = "Page number")
    ),
    responses(
        (status = 200, description = "Visible posts of the category", body = CategoryFeedDto),
        (status = 404, description = "Category missing or unpublished"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn category_feed(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<CategoryFeedDto>> {
    let feed = state
        .blog_service
        .category_feed(viewer, &slug, query.request())
        .await?;
    Ok(Json(feed.into()))
}

#[utoipa::path(
    get,
    path = "/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post with its comments", body = PostDetailDto),
        (status = 404, description = "Post missing or not visible"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDetailDto>> {
    let post = state.blog_service.get_post(viewer, id).await?;
    let comments = state.comment_service.list_comments(&post).await?;

    Ok(Json(PostDetailDto {
        post: post.into(),
        comments: comments.into_iter().map(CommentDto::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/posts/create",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 303, description = "Login required"),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(dto): JsonBody<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;

    let post = state
        .blog_service
        .create_post(auth.viewer(), dto.into())
        .await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

#[utoipa::path(
    post,
    path = "/posts/{id}/edit",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 303, description = "Not the author (to post detail) or login required"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    body: Result<JsonBody<UpdatePostDto>, AppError>,
) -> AppResult<Json<PostDto>> {
    let dto = match body {
        Ok(JsonBody(dto)) => dto,
        Err(rejection) => {
            state.blog_service.ensure_author(auth.viewer(), id).await?;
            return Err(rejection);
        }
    };

    let post = state
        .blog_service
        .update_post(auth.viewer(), id, dto.into())
        .await?;
    Ok(Json(post.into()))
}

#[utoipa::path(
    post,
    path = "/posts/{id}/delete",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 303, description = "Not the author (to post detail) or login required"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.blog_service.delete_post(auth.viewer(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
