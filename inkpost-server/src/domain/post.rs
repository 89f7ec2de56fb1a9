use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::user::Author;

const TITLE_MAX_CHARS: usize = 200;
const EXCERPT_MAX_CHARS: usize = 500;
const SLUG_MAX_LEN: usize = 200;
const URL_MAX_LEN: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Category {
    Technology,
    Lifestyle,
    Travel,
    Food,
    Business,
    Health,
    Entertainment,
    Other,
}

impl Category {
    pub(crate) const ALL: [Category; 8] = [
        Category::Technology,
        Category::Lifestyle,
        Category::Travel,
        Category::Food,
        Category::Business,
        Category::Health,
        Category::Entertainment,
        Category::Other,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Lifestyle => "Lifestyle",
            Category::Travel => "Travel",
            Category::Food => "Food",
            Category::Business => "Business",
            Category::Health => "Health",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| {
                DomainError::validation(
                    "category",
                    "must be one of Technology, Lifestyle, Travel, Food, Business, Health, Entertainment, Other",
                )
            })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) slug: String,
    pub(crate) category: Option<Category>,
    pub(crate) cover_image_url: Option<String>,
    pub(crate) published: bool,
    pub(crate) author_id: i64,
    pub(crate) version: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn validated(self) -> Result<Self, DomainError> {
        validate_positive_i64("id", self.id)?;
        validate_positive_i64("author_id", self.author_id)?;
        validate_positive_i64("version", self.version)?;
        normalize_slug(&self.slug)?;
        if self.updated_at < self.created_at {
            return Err(DomainError::validation("updated_at", "must be >= created_at"));
        }
        Ok(self)
    }

    pub(crate) fn is_visible_to(&self, viewer: Option<i64>) -> bool {
        self.published || viewer == Some(self.author_id)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PostWithAuthor {
    pub(crate) post: Post,
    pub(crate) author: Author,
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) slug: String,
    pub(crate) category: Option<Category>,
    pub(crate) cover_image_url: Option<String>,
    pub(crate) published: bool,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
            excerpt: normalize_excerpt(self.excerpt.as_deref())?,
            slug: normalize_slug(&self.slug)?,
            category: self.category,
            cover_image_url: normalize_cover_url(self.cover_image_url.as_deref())?,
            published: self.published,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) excerpt: Option<Option<String>>,
    pub(crate) slug: Option<String>,
    pub(crate) category: Option<Option<Category>>,
    pub(crate) cover_image_url: Option<Option<String>>,
    pub(crate) published: Option<bool>,
    pub(crate) expected_version: Option<i64>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let changes_nothing = self.title.is_none()
            && self.content.is_none()
            && self.excerpt.is_none()
            && self.slug.is_none()
            && self.category.is_none()
            && self.cover_image_url.is_none()
            && self.published.is_none();
        if changes_nothing {
            return Err(DomainError::validation(
                "body",
                "at least one field must be provided",
            ));
        }
        if let Some(version) = self.expected_version {
            validate_positive_i64("expected_version", version)?;
        }

        Ok(Self {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            content: self.content.as_deref().map(normalize_content).transpose()?,
            excerpt: self
                .excerpt
                .map(|excerpt| normalize_excerpt(excerpt.as_deref()))
                .transpose()?,
            slug: self.slug.as_deref().map(normalize_slug).transpose()?,
            category: self.category,
            cover_image_url: self
                .cover_image_url
                .map(|url| normalize_cover_url(url.as_deref()))
                .transpose()?,
            published: self.published,
            expected_version: self.expected_version,
        })
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::validation(field, "must be > 0"));
    }
    Ok(())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::validation("title", "must be 1..200 chars"));
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::validation("content", "must not be empty"));
    }
    Ok(content.to_string())
}

fn normalize_excerpt(excerpt: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(excerpt) = excerpt.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if excerpt.chars().count() > EXCERPT_MAX_CHARS {
        return Err(DomainError::validation("excerpt", "must be at most 500 chars"));
    }
    Ok(Some(excerpt.to_string()))
}

fn normalize_cover_url(url: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(url) = url.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if url.len() > URL_MAX_LEN {
        return Err(DomainError::validation(
            "cover_image_url",
            "must be at most 2048 bytes",
        ));
    }
    Ok(Some(url.to_string()))
}

pub(crate) fn normalize_slug(slug: &str) -> Result<String, DomainError> {
    let slug = slug.trim();
    let well_formed = !slug.is_empty()
        && slug.len() <= SLUG_MAX_LEN
        && slug.split('-').all(|part| {
            !part.is_empty()
                && part
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        });
    if !well_formed {
        return Err(DomainError::validation(
            "slug",
            "must be 1..200 chars of a-z, 0-9 separated by single hyphens",
        ));
    }
    Ok(slug.to_string())
}
