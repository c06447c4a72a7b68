use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::FOREIGN_KEY_VIOLATION;
use crate::data::post_repository::{
    FeedScope, NewPost, Pagination, PostPatch, PostRepository,
};
use crate::domain::catalog::{CategoryRef, LocationRef};
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::visibility::VisibilityFilter;

/// Columns of a post row joined with author, category, location and the
/// derived comment count. Expects the post itself aliased as `p`.
const POST_COLUMNS: &str = r#"
    SELECT
        p.id,
        p.author_id,
        u.username AS author_username,
        p.category_id,
        c.slug AS category_slug,
        c.title AS category_title,
        c.is_published AS category_is_published,
        p.location_id,
        l.name AS location_name,
        l.is_published AS location_is_published,
        p.title,
        p.text,
        p.pub_date,
        p.is_published,
        p.created_at,
        (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
"#;

const POST_JOINS: &str = r#"
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    author_id: i64,
    author_username: String,
    category_id: Option<i64>,
    category_slug: Option<String>,
    category_title: Option<String>,
    category_is_published: Option<bool>,
    location_id: Option<i64>,
    location_name: Option<String>,
    location_is_published: Option<bool>,
    title: String,
    text: String,
    pub_date: DateTime<Utc>,
    is_published: bool,
    created_at: DateTime<Utc>,
    comment_count: i64,
}

/// `SELECT ... FROM <source> p JOIN ...`, where `source` is either the table
/// or a data-modifying CTE returning post rows.
fn select_from(source: &str) -> String {
    format!("{POST_COLUMNS} FROM {source} p {POST_JOINS}")
}

/// Appends the visible-set predicate. Must stay equivalent to
/// `VisibilityFilter::admits`.
fn push_visibility(builder: &mut QueryBuilder<'_, Postgres>, filter: &VisibilityFilter) {
    builder.push(" AND (");
    if let Some(viewer_id) = filter.viewer.user_id() {
        builder.push("p.author_id = ").push_bind(viewer_id).push(" OR ");
    }
    builder
        .push("(p.is_published AND p.pub_date <= ")
        .push_bind(filter.now)
        .push(" AND (p.category_id IS NULL OR c.is_published)))");
}

fn push_scope(builder: &mut QueryBuilder<'_, Postgres>, scope: FeedScope) {
    match scope {
        FeedScope::All => {}
        FeedScope::Category(category_id) => {
            builder.push(" AND p.category_id = ").push_bind(category_id);
        }
        FeedScope::Author(author_id) => {
            builder.push(" AND p.author_id = ").push_bind(author_id);
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO posts (author_id, title, text, pub_date, is_published, category_id, location_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            )
            {}
            "#,
            select_from("inserted")
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(input.author_id)
            .bind(input.title)
            .bind(input.text)
            .bind(input.pub_date)
            .bind(input.is_published)
            .bind(input.category_id)
            .bind(input.location_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!("{} WHERE p.id = $1", select_from("posts"));

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn find_visible_post(
        &self,
        id: i64,
        filter: &VisibilityFilter,
    ) -> Result<Option<Post>, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(select_from("posts"));
        builder.push(" WHERE p.id = ").push_bind(id);
        push_visibility(&mut builder, filter);

        let row = builder
            .build_query_as::<PostRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            WITH updated AS (
                UPDATE posts
                SET title = $3,
                    text = $4,
                    pub_date = $5,
                    is_published = $6,
                    category_id = $7,
                    location_id = $8
                WHERE id = $1 AND author_id = $2
                RETURNING *
            )
            {}
            "#,
            select_from("updated")
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .bind(owner_id)
            .bind(patch.title)
            .bind(patch.text)
            .bind(patch.pub_date)
            .bind(patch.is_published)
            .bind(patch.category_id)
            .bind(patch.location_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(post_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_visible_posts(
        &self,
        scope: FeedScope,
        filter: &VisibilityFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(select_from("posts"));
        builder.push(" WHERE TRUE");
        push_scope(&mut builder, scope);
        push_visibility(&mut builder, filter);
        builder
            .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = builder
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_visible_posts(
        &self,
        scope: FeedScope,
        filter: &VisibilityFilter,
    ) -> Result<i64, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT COUNT(*)
            FROM posts p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE TRUE
            "#,
        );
        push_scope(&mut builder, scope);
        push_visibility(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let category = match row.category_id {
        Some(id) => Some(CategoryRef {
            id,
            slug: row.category_slug.ok_or_else(|| missing_join("category"))?,
            title: row.category_title.ok_or_else(|| missing_join("category"))?,
            is_published: row
                .category_is_published
                .ok_or_else(|| missing_join("category"))?,
        }),
        None => None,
    };
    let location = match row.location_id {
        Some(id) => Some(LocationRef {
            id,
            name: row.location_name.ok_or_else(|| missing_join("location"))?,
            is_published: row
                .location_is_published
                .ok_or_else(|| missing_join("location"))?,
        }),
        None => None,
    };

    Ok(Post {
        id: row.id,
        author_id: row.author_id,
        author_username: row.author_username,
        category,
        location,
        title: row.title,
        text: row.text,
        pub_date: row.pub_date,
        is_published: row.is_published,
        created_at: row.created_at,
        comment_count: row.comment_count,
    })
}

fn missing_join(relation: &str) -> DomainError {
    DomainError::Unexpected(format!("post row references missing {relation}"))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
    {
        return match db_err.constraint() {
            Some("posts_category_id_fkey") => DomainError::Validation {
                field: "category_id",
                message: "unknown category",
            },
            Some("posts_location_id_fkey") => DomainError::Validation {
                field: "location_id",
                message: "unknown location",
            },
            _ => DomainError::NotFound("author".to_string()),
        };
    }
    DomainError::Unexpected(err.to_string())
}
