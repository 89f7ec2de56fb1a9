use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{AUTHOR_COLUMNS, AuthorRow};
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::domain::comment::{Comment, CommentWithAuthor};
use crate::domain::error::DomainError;

const COMMENT_COLUMNS: &str = r#"
    c.id,
    c.content,
    c.post_id,
    c.author_id,
    c.parent_id,
    c.created_at
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

#[derive(FromRow)]
struct CommentRow {
    id: i64,
    content: String,
    post_id: i64,
    author_id: i64,
    parent_id: Option<i64>,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CommentWithAuthorRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    #[sqlx(flatten)]
    author: AuthorRow,
}

fn select_joined(source: &str) -> String {
    format!(
        "SELECT {COMMENT_COLUMNS}, {AUTHOR_COLUMNS} FROM {source} c JOIN users u ON u.id = c.author_id"
    )
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<CommentWithAuthor, DomainError> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO comments (content, post_id, author_id, parent_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            {}
            "#,
            select_joined("inserted")
        );

        let row = sqlx::query_as::<_, CommentWithAuthorRow>(&sql)
            .bind(&input.content)
            .bind(input.post_id)
            .bind(input.author_id)
            .bind(input.parent_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(map_joined_row(row))
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.id = $1");
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(row.map(map_row_to_comment))
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>, DomainError> {
        let sql = format!(
            "{} WHERE c.post_id = $1 ORDER BY c.created_at ASC, c.id ASC",
            select_joined("comments")
        );
        let rows = sqlx::query_as::<_, CommentWithAuthorRow>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(rows.into_iter().map(map_joined_row).collect())
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        // ответы отвязываются через `ON DELETE SET NULL` на comments.parent_id
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_row_to_comment(row: CommentRow) -> Comment {
    Comment {
        id: row.id,
        content: row.content,
        post_id: row.post_id,
        author_id: row.author_id,
        parent_id: row.parent_id,
        created_at: row.created_at,
    }
}

fn map_joined_row(row: CommentWithAuthorRow) -> CommentWithAuthor {
    CommentWithAuthor {
        comment: map_row_to_comment(row.comment),
        author: row.author.into(),
    }
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("comments_post_id_fkey") => "post",
            Some("comments_parent_id_fkey") => "comment",
            _ => "author",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
