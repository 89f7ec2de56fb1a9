use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{AUTHOR_COLUMNS, AuthorRow};
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Category, Post, PostWithAuthor};

const POST_COLUMNS: &str = r#"
    p.id,
    p.title,
    p.content,
    p.excerpt,
    p.slug,
    p.category,
    p.cover_image_url,
    p.published,
    p.author_id,
    p.version,
    p.created_at,
    p.updated_at
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

#[derive(FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    excerpt: Option<String>,
    slug: String,
    category: Option<String>,
    cover_image_url: Option<String>,
    published: bool,
    author_id: i64,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct PostWithAuthorRow {
    #[sqlx(flatten)]
    post: PostRow,
    #[sqlx(flatten)]
    author: AuthorRow,
}

fn select_joined(source: &str) -> String {
    format!("SELECT {POST_COLUMNS}, {AUTHOR_COLUMNS} FROM {source} p JOIN users u ON u.id = p.author_id")
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<PostWithAuthor, DomainError> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO posts (
                    title, content, excerpt, slug, category, cover_image_url, published, author_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            {}
            "#,
            select_joined("inserted")
        );

        let row = sqlx::query_as::<_, PostWithAuthorRow>(&sql)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.excerpt.as_deref())
            .bind(&input.slug)
            .bind(input.category.map(Category::as_str))
            .bind(input.cover_image_url.as_deref())
            .bind(input.published)
            .bind(input.author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        map_joined_row(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostWithAuthor>, DomainError> {
        let sql = format!("{} WHERE p.slug = $1", select_joined("posts"));
        let row = sqlx::query_as::<_, PostWithAuthorRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_joined_row).transpose()
    }

    async fn list_published(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
        let sql = format!(
            "{} WHERE p.published ORDER BY p.created_at DESC, p.id DESC",
            select_joined("posts")
        );
        let rows = sqlx::query_as::<_, PostWithAuthorRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_joined_row).collect()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
        expected_version: Option<i64>,
    ) -> Result<Option<PostWithAuthor>, DomainError> {
        let sql = format!(
            r#"
            WITH updated AS (
                UPDATE posts
                SET title = COALESCE($3, title),
                    content = COALESCE($4, content),
                    excerpt = CASE WHEN $5::BOOLEAN THEN $6::TEXT ELSE excerpt END,
                    slug = COALESCE($7, slug),
                    category = CASE WHEN $8::BOOLEAN THEN $9::TEXT ELSE category END,
                    cover_image_url = CASE WHEN $10::BOOLEAN THEN $11::TEXT ELSE cover_image_url END,
                    published = COALESCE($12, published),
                    version = version + 1,
                    updated_at = NOW()
                WHERE id = $1
                  AND author_id = $2
                  AND ($13::BIGINT IS NULL OR version = $13)
                RETURNING *
            )
            {}
            "#,
            select_joined("updated")
        );

        let row = sqlx::query_as::<_, PostWithAuthorRow>(&sql)
            .bind(post_id)
            .bind(owner_id)
            .bind(patch.title.as_deref())
            .bind(patch.content.as_deref())
            .bind(patch.excerpt.is_some())
            .bind(patch.excerpt.flatten())
            .bind(patch.slug.as_deref())
            .bind(patch.category.is_some())
            .bind(patch.category.flatten().map(Category::as_str))
            .bind(patch.cover_image_url.is_some())
            .bind(patch.cover_image_url.flatten())
            .bind(patch.published)
            .bind(expected_version)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_joined_row).transpose()
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let category = row
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;

    Post {
        id: row.id,
        title: row.title,
        content: row.content,
        excerpt: row.excerpt,
        slug: row.slug,
        category,
        cover_image_url: row.cover_image_url,
        published: row.published,
        author_id: row.author_id,
        version: row.version,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
    .validated()
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_joined_row(row: PostWithAuthorRow) -> Result<PostWithAuthor, DomainError> {
    Ok(PostWithAuthor {
        post: map_row_to_post(row.post)?,
        author: row.author.into(),
    })
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") if db_err.constraint() == Some("posts_slug_key") => {
                return DomainError::AlreadyExists("slug".to_string());
            }
            Some("23503") => return DomainError::NotFound("author".to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
