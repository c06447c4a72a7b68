use tracing::debug;

use crate::data::post_repository::{FeedScope, Pagination, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::{Page, PageRequest, PageWindow};
use crate::domain::post::Post;
use crate::domain::visibility::VisibilityFilter;

/// Loads one page of the posts in `scope` that `filter` admits.
///
/// Every feed (home, category, profile) goes through here so they share the
/// visibility rule, the ordering and the page clamping.
pub(crate) async fn load_feed<R: PostRepository + ?Sized>(
    repo: &R,
    scope: FeedScope,
    filter: &VisibilityFilter,
    request: PageRequest,
    per_page: u32,
) -> Result<Page<Post>, DomainError> {
    let total = repo.count_visible_posts(scope, filter).await?;
    let window = PageWindow::resolve(request, total, per_page);
    debug!(?scope, total, page = window.number, "loading feed page");

    let pagination = Pagination {
        page: window.number,
        page_size: window.per_page,
    };
    let posts = repo.list_visible_posts(scope, filter, pagination).await?;

    Ok(Page::new(posts, window, total))
}
