use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use inkpost_client::{
    BlogClient, BlogClientError, Comment, FeedPage, NewComment, NewPost, Post, PostChanges,
    PostDetailView, PostFilter, Session, SortOrder,
};

const SESSION_FILE: &str = ".inkpost_session";
const DEFAULT_HTTP_SERVER: &str = "http://127.0.0.1:8080";
const SERVER_ENV: &str = "INKPOST_SERVER";

#[derive(Debug, Parser)]
#[command(name = "inkpost-cli", version, about = "CLI клиент для inkpost-server")]
struct Cli {
    /// Адрес сервера; по умолчанию `INKPOST_SERVER` или `http://127.0.0.1:8080`.
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: удаляет сохранённую сессию.
    Logout,
    /// Лента опубликованных постов.
    List {
        /// Поиск по заголовку и описанию.
        #[arg(long)]
        search: Option<String>,
        /// Категория; `All` отключает фильтр.
        #[arg(long)]
        category: Option<String>,
        /// `newest` или `oldest`.
        #[arg(long, default_value = "newest")]
        sort: SortOrder,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Пост по slug вместе с комментариями.
    Show {
        #[arg(long)]
        slug: String,
    },
    /// Создание поста (требует сессию).
    ///
    /// Если `--slug` не указан, он строится из заголовка.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        cover_image_url: Option<String>,
        /// Опубликовать сразу.
        #[arg(long)]
        publish: bool,
    },
    /// Частичное обновление поста (требует сессию).
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long, conflicts_with = "clear_excerpt")]
        excerpt: Option<String>,
        #[arg(long)]
        clear_excerpt: bool,
        #[arg(long, conflicts_with = "clear_category")]
        category: Option<String>,
        #[arg(long)]
        clear_category: bool,
        #[arg(long, conflicts_with = "clear_cover")]
        cover_image_url: Option<String>,
        #[arg(long)]
        clear_cover: bool,
        #[arg(long, conflicts_with = "unpublish")]
        publish: bool,
        #[arg(long)]
        unpublish: bool,
        /// Ожидаемая версия поста.
        #[arg(long)]
        expected_version: Option<i64>,
    },
    /// Удаление поста вместе с комментариями (требует сессию).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Комментарий к посту или ответ на комментарий (требует сессию).
    Comment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        content: String,
        #[arg(long)]
        parent_id: Option<i64>,
    },
    /// Удаление комментария (требует сессию).
    DeleteComment {
        #[arg(long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = resolve_server(cli.server, std::env::var(SERVER_ENV).ok());
    let client = BlogClient::new(server).map_err(map_client_error)?;
    let session = load_session().context("не удалось прочитать .inkpost_session")?;

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let session = client
                .register(&username, &email, &password)
                .await
                .map_err(map_client_error)?;
            persist_session(&session).context("не удалось сохранить сессию")?;
            print_session("Регистрация успешна", &session);
        }
        Command::Login { email, password } => {
            let session = client
                .login(&email, &password)
                .await
                .map_err(map_client_error)?;
            persist_session(&session).context("не удалось сохранить сессию")?;
            print_session("Вход выполнен", &session);
        }
        Command::Logout => {
            clear_session().context("не удалось удалить сессию")?;
            println!("Сессия удалена");
        }
        Command::List {
            search,
            category,
            sort,
            page,
        } => {
            let feed = client.load_feed().await.map_err(map_client_error)?;
            let filter = PostFilter {
                search,
                category,
                sort,
            };
            print_feed(&feed.page(&filter, page));
        }
        Command::Show { slug } => {
            let detail = client
                .load_post_detail(&slug, session.as_ref())
                .await
                .map_err(map_client_error)?;
            print_detail(&detail, session.as_ref().and_then(Session::user_id));
        }
        Command::Create {
            title,
            content,
            slug,
            excerpt,
            category,
            cover_image_url,
            publish,
        } => {
            let session = require_session(session)?;
            let mut post = NewPost::new(title, content);
            if let Some(slug) = slug {
                post.slug = slug;
            }
            post.excerpt = excerpt;
            post.category = category;
            post.cover_image_url = cover_image_url;
            post.published = publish;

            let post = client
                .create_post(&session, &post)
                .await
                .map_err(map_client_error)?;
            print_post("Пост создан", &post);
        }
        Command::Update {
            id,
            title,
            content,
            slug,
            excerpt,
            clear_excerpt,
            category,
            clear_category,
            cover_image_url,
            clear_cover,
            publish,
            unpublish,
            expected_version,
        } => {
            let session = require_session(session)?;
            let changes = PostChanges {
                title,
                content,
                excerpt: clearable(excerpt, clear_excerpt),
                slug,
                category: clearable(category, clear_category),
                cover_image_url: clearable(cover_image_url, clear_cover),
                published: publish_flag(publish, unpublish),
                expected_version,
            };
            if changes.is_empty() {
                return Err(anyhow!("не указано ни одного изменяемого поля"));
            }

            let post = client
                .update_post(&session, id, &changes)
                .await
                .map_err(map_client_error)?;
            print_post("Пост обновлён", &post);
        }
        Command::Delete { id } => {
            let session = require_session(session)?;
            client
                .delete_post(&session, id)
                .await
                .map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::Comment {
            post_id,
            content,
            parent_id,
        } => {
            let session = require_session(session)?;
            let comment = NewComment {
                content,
                post_id,
                parent_id,
            };
            let comment = client
                .create_comment(&session, &comment)
                .await
                .map_err(map_client_error)?;
            println!("Комментарий добавлен: id={}", comment.id);
        }
        Command::DeleteComment { id } => {
            let session = require_session(session)?;
            client
                .delete_comment(&session, id)
                .await
                .map_err(map_client_error)?;
            println!("Комментарий удалён: id={id}");
        }
    }

    Ok(())
}

fn resolve_server(flag: Option<String>, env: Option<String>) -> String {
    let raw = flag
        .or(env)
        .unwrap_or_else(|| DEFAULT_HTTP_SERVER.to_string());
    normalize_server(raw)
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn clearable(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        return Some(None);
    }
    value.map(Some)
}

fn publish_flag(publish: bool, unpublish: bool) -> Option<bool> {
    match (publish, unpublish) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn parse_session_content(raw: &str) -> serde_json::Result<Option<Session>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw).map(Some)
}

fn load_session() -> Result<Option<Session>> {
    if !Path::new(SESSION_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(SESSION_FILE)?;
    Ok(parse_session_content(&raw)?)
}

fn persist_session(session: &Session) -> Result<()> {
    let json = serde_json::to_string_pretty(session)?;
    fs::write(SESSION_FILE, json)?;
    Ok(())
}

fn clear_session() -> io::Result<()> {
    match fs::remove_file(SESSION_FILE) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn require_session(session: Option<Session>) -> Result<Session> {
    session.ok_or_else(|| {
        anyhow!(
            "требуется авторизация: выполните `inkpost-cli login ...` или `inkpost-cli register ...`"
        )
    })
}

fn map_client_error(err: BlogClientError) -> anyhow::Error {
    let message = match err {
        BlogClientError::Unauthorized(message) => format!(
            "требуется авторизация ({message}): выполните `inkpost-cli login ...` или `inkpost-cli register ...`"
        ),
        BlogClientError::Forbidden(message) => format!("доступ запрещён: {message}"),
        BlogClientError::NotFound(message) => format!("ресурс не найден: {message}"),
        BlogClientError::Conflict(message) => format!("конфликт: {message}"),
        BlogClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        BlogClientError::Server(message) => format!("ошибка сервера: {message}"),
        BlogClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow!(message)
}

fn print_session(title: &str, session: &Session) {
    println!("{title}");
    println!("token: {}", session.token);
    if let Some(user) = &session.user {
        println!("user:");
        println!("  id: {}", user.id);
        println!("  username: {}", user.username);
        println!("  email: {}", user.email);
    }
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("slug: {}", post.slug);
    println!("title: {}", post.title);
    if let Some(excerpt) = &post.excerpt {
        println!("excerpt: {excerpt}");
    }
    if let Some(category) = &post.category {
        println!("category: {category}");
    }
    println!("published: {}", post.published);
    println!("version: {}", post.version);
    println!("author: {}", post.author.username);
    println!("created_at: {}", post.created_at);
    println!("updated_at: {}", post.updated_at);
}

fn print_feed(page: &FeedPage<'_>) {
    println!(
        "Постов: {} (страница {}/{}, всего {})",
        page.posts.len(),
        page.page,
        page.total_pages.max(1),
        page.total
    );

    for post in &page.posts {
        println!(
            "- [{}] {} ({}, {})",
            post.id,
            post.title,
            post.slug,
            post.category.as_deref().unwrap_or("без категории")
        );
    }
}

fn print_detail(detail: &PostDetailView, viewer: Option<i64>) {
    print_post("Пост", &detail.post);
    println!();
    println!("{}", detail.post.content);
    println!();
    println!("Комментарии ({}):", detail.thread.count());

    for node in detail.thread.nodes() {
        print_comment(&node.comment, 0, detail.thread.can_delete(viewer, &node.comment));
        for reply in &node.replies {
            print_comment(reply, 1, detail.thread.can_delete(viewer, reply));
        }
    }
}

fn print_comment(comment: &Comment, depth: usize, deletable: bool) {
    let indent = "  ".repeat(depth + 1);
    let mark = if deletable { " *" } else { "" };
    println!(
        "{indent}[{}] {}: {}{mark}",
        comment.id, comment.author.username, comment.content
    );
}
