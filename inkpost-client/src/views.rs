//! Локальная композиция данных для представлений: лента, тред, детальная страница.

use std::str::FromStr;

use crate::models::{Comment, CommentNode, Post};

/// Количество постов на одной странице ленты.
pub const POSTS_PER_PAGE: usize = 9;

/// Значение фильтра категории, означающее «без фильтра».
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Порядок постов в ленте по дате создания.
pub enum SortOrder {
    /// Сначала новые.
    #[default]
    Newest,
    /// Сначала старые.
    Oldest,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Параметры фильтрации ленты.
pub struct PostFilter {
    /// Подстрока для поиска в заголовке или описании (без учёта регистра).
    pub search: Option<String>,
    /// Точное имя категории; `None` или [`ALL_CATEGORIES`] отключают фильтр.
    pub category: Option<String>,
    /// Порядок сортировки.
    pub sort: SortOrder,
}

impl PostFilter {
    fn matches(&self, post: &Post) -> bool {
        if let Some(search) = self.search.as_deref() {
            let needle = search.to_lowercase();
            let in_title = post.title.to_lowercase().contains(&needle);
            let in_excerpt = post
                .excerpt
                .as_deref()
                .is_some_and(|excerpt| excerpt.to_lowercase().contains(&needle));
            if !in_title && !in_excerpt {
                return false;
            }
        }

        match self.category.as_deref() {
            None | Some(ALL_CATEGORIES) => true,
            Some(category) => post.category.as_deref() == Some(category),
        }
    }
}

#[derive(Debug)]
/// Одна страница ленты.
pub struct FeedPage<'a> {
    /// Посты страницы.
    pub posts: Vec<&'a Post>,
    /// Номер страницы, начиная с 1, после нормализации.
    pub page: usize,
    /// Всего страниц.
    pub total_pages: usize,
    /// Всего постов после фильтрации.
    pub total: usize,
}

#[derive(Debug, Clone, Default)]
/// Лента опубликованных постов с локальной фильтрацией и пагинацией.
pub struct PostFeed {
    posts: Vec<Post>,
}

impl PostFeed {
    /// Создаёт ленту из списка, полученного от сервера.
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    /// Все посты без фильтров.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Отфильтрованные и отсортированные посты.
    pub fn filtered(&self, filter: &PostFilter) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().filter(|post| filter.matches(post)).collect();
        match filter.sort {
            SortOrder::Newest => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => posts.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        posts
    }

    /// Страница отфильтрованной ленты.
    ///
    /// Номер вне диапазона `1..=total_pages` заменяется на 1.
    pub fn page(&self, filter: &PostFilter, page: usize) -> FeedPage<'_> {
        let posts = self.filtered(filter);
        let total = posts.len();
        let total_pages = total_pages(total);
        let page = if page == 0 || page > total_pages { 1 } else { page };

        let posts = posts
            .into_iter()
            .skip((page - 1) * POSTS_PER_PAGE)
            .take(POSTS_PER_PAGE)
            .collect();

        FeedPage {
            posts,
            page,
            total_pages,
            total,
        }
    }
}

/// Количество страниц для `total` постов.
pub fn total_pages(total: usize) -> usize {
    total.div_ceil(POSTS_PER_PAGE)
}

#[derive(Debug, Clone, Default)]
/// Тред комментариев поста: комментарии верхнего уровня и ответы на них.
pub struct CommentThread {
    nodes: Vec<CommentNode>,
}

impl CommentThread {
    /// Создаёт тред из ответа сервера.
    pub fn new(nodes: Vec<CommentNode>) -> Self {
        Self { nodes }
    }

    /// Комментарии верхнего уровня с ответами.
    pub fn nodes(&self) -> &[CommentNode] {
        &self.nodes
    }

    /// Общее число комментариев, включая ответы.
    pub fn count(&self) -> usize {
        self.nodes.iter().map(|node| 1 + node.replies.len()).sum()
    }

    /// Может ли пользователь удалить комментарий (только автор).
    pub fn can_delete(&self, user_id: Option<i64>, comment: &Comment) -> bool {
        user_id == Some(comment.author_id)
    }
}

#[derive(Debug, Clone)]
/// Детальная страница поста: пост и его тред.
pub struct PostDetailView {
    /// Пост.
    pub post: Post,
    /// Комментарии.
    pub thread: CommentThread,
}

/// Строит slug из заголовка: нижний регистр, последовательности символов
/// вне `[a-z0-9]` заменяются на `-`, крайние `-` отбрасываются.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}
