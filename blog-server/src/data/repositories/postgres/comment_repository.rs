use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::FOREIGN_KEY_VIOLATION;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

const COMMENT_COLUMNS: &str = r#"
    SELECT
        cm.id,
        cm.post_id,
        cm.author_id,
        u.username AS author_username,
        cm.text,
        cm.created_at
"#;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    author_username: String,
    text: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_username: row.author_username,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

fn select_from(source: &str) -> String {
    format!("{COMMENT_COLUMNS} FROM {source} cm JOIN users u ON u.id = cm.author_id")
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            {}
            "#,
            select_from("inserted")
        );

        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(input.post_id)
            .bind(input.author_id)
            .bind(input.text)
            .fetch_one(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(row.into())
    }

    async fn find_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Comment>, DomainError> {
        let sql = format!(
            "{} WHERE cm.id = $1 AND cm.post_id = $2",
            select_from("comments")
        );

        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(comment_id)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(row.map(Comment::from))
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let sql = format!(
            "{} WHERE cm.post_id = $1 ORDER BY cm.created_at ASC, cm.id ASC",
            select_from("comments")
        );

        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn update_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
        text: String,
    ) -> Result<Option<Comment>, DomainError> {
        let sql = format!(
            r#"
            WITH updated AS (
                UPDATE comments
                SET text = $3
                WHERE id = $1 AND author_id = $2
                RETURNING *
            )
            {}
            "#,
            select_from("updated")
        );

        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(comment_id)
            .bind(owner_id)
            .bind(text)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(row.map(Comment::from))
    }

    async fn delete_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
    {
        let resource = match db_err.constraint() {
            Some("comments_post_id_fkey") => "post",
            _ => "author",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
