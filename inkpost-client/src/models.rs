use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Автор поста или комментария в том объёме, который отдаёт сервер.
pub struct Author {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Отображаемое имя.
    #[serde(default)]
    pub display_name: Option<String>,
    /// О себе (только в детальном просмотре поста).
    #[serde(default)]
    pub bio: Option<String>,
    /// Ссылка на аватар.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок поста.
    pub title: String,
    /// Содержимое поста.
    pub content: String,
    /// Краткое описание.
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Уникальный slug, по которому пост доступен.
    pub slug: String,
    /// Категория.
    #[serde(default)]
    pub category: Option<String>,
    /// Ссылка на обложку.
    #[serde(default)]
    pub cover_image_url: Option<String>,
    /// Опубликован ли пост.
    pub published: bool,
    /// Версия поста для условного обновления.
    pub version: i64,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Автор.
    pub author: Author,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления поста (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Комментарий к посту.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Текст комментария.
    pub content: String,
    /// Пост, к которому относится комментарий.
    pub post_id: i64,
    /// Родительский комментарий, если это ответ.
    #[serde(default)]
    pub parent_id: Option<i64>,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Автор.
    pub author: Author,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Комментарий верхнего уровня вместе с ответами на него.
pub struct CommentNode {
    /// Сам комментарий.
    #[serde(flatten)]
    pub comment: Comment,
    /// Ответы в порядке создания.
    #[serde(default)]
    pub replies: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize)]
/// Данные для создания поста.
pub struct NewPost {
    /// Заголовок.
    pub title: String,
    /// Содержимое.
    pub content: String,
    /// Краткое описание.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Slug; по умолчанию строится из заголовка через [`crate::slugify`].
    pub slug: String,
    /// Категория.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Ссылка на обложку.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    /// Опубликовать сразу или сохранить черновик.
    pub published: bool,
}

impl NewPost {
    /// Черновик с slug, построенным из заголовка.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            slug: crate::views::slugify(&title),
            title,
            content: content.into(),
            excerpt: None,
            category: None,
            cover_image_url: None,
            published: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
/// Частичное обновление поста.
///
/// `None` оставляет поле без изменений, `Some(None)` очищает его.
pub struct PostChanges {
    /// Новый заголовок.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Новое содержимое.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Новое описание.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<Option<String>>,
    /// Новый slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Новая категория.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    /// Новая обложка.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<Option<String>>,
    /// Статус публикации.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    /// Ожидаемая версия поста; при расхождении сервер вернёт конфликт.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
}

impl PostChanges {
    /// Возвращает `true`, если ни одно поле не меняется.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.excerpt.is_none()
            && self.slug.is_none()
            && self.category.is_none()
            && self.cover_image_url.is_none()
            && self.published.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
/// Данные для нового комментария или ответа.
pub struct NewComment {
    /// Текст комментария.
    pub content: String,
    /// Пост, к которому пишется комментарий.
    pub post_id: i64,
    /// Комментарий верхнего уровня, на который дан ответ.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}
