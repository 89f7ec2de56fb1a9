use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::user::Author;

pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod health;
pub(crate) mod posts;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) avatar_url: Option<String>,
}

impl AuthorDto {
    pub(crate) fn summary(author: Author) -> Self {
        Self {
            id: author.id,
            username: author.username,
            display_name: author.display_name,
            bio: None,
            avatar_url: None,
        }
    }

    pub(crate) fn profile(author: Author) -> Self {
        Self {
            id: author.id,
            username: author.username,
            display_name: author.display_name,
            bio: author.bio,
            avatar_url: author.avatar_url,
        }
    }

    pub(crate) fn commenter(author: Author) -> Self {
        Self {
            bio: None,
            ..Self::profile(author)
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MessageDto {
    pub(crate) message: &'static str,
}

// отсутствующее поле остаётся None, явный null становится Some(None)
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
