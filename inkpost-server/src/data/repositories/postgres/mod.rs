use sqlx::FromRow;

use crate::domain::user::Author;

pub(crate) mod comment_repository;
pub(crate) mod post_repository;
pub(crate) mod user_repository;

pub(crate) const AUTHOR_COLUMNS: &str = r#"
    u.username AS author_username,
    u.display_name AS author_display_name,
    u.bio AS author_bio,
    u.avatar_url AS author_avatar_url
"#;

#[derive(FromRow)]
struct AuthorRow {
    author_id: i64,
    author_username: String,
    author_display_name: Option<String>,
    author_bio: Option<String>,
    author_avatar_url: Option<String>,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: row.author_id,
            username: row.author_username,
            display_name: row.author_display_name,
            bio: row.author_bio,
            avatar_url: row.author_avatar_url,
        }
    }
}
