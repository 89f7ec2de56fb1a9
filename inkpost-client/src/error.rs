use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `inkpost-client`.
///
/// Варианты с сообщением несут текст ошибки сервера без изменений.
pub enum BlogClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация: нет токена, токен недействителен или неверный пароль.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Операция разрешена только автору ресурса.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Запрошенный ресурс не найден.
    #[error("not found: {0}")]
    NotFound(String),

    /// Конфликт: slug или пользователь уже существуют, либо версия поста устарела.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Некорректный запрос или ошибка валидации.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Внутренняя ошибка сервера.
    #[error("server error: {0}")]
    Server(String),
}

/// Результат операций `inkpost-client`.
pub type BlogClientResult<T> = Result<T, BlogClientError>;

impl BlogClientError {
    /// Сначала учитывается машиночитаемый `code` из тела ответа, затем HTTP-статус.
    pub(crate) fn from_response(status: StatusCode, code: Option<&str>, message: String) -> Self {
        match code {
            Some("unauthenticated" | "invalid_credential" | "invalid_credentials") => {
                return Self::Unauthorized(message);
            }
            Some("forbidden") => return Self::Forbidden(message),
            Some("not_found") => return Self::NotFound(message),
            Some("conflict") => return Self::Conflict(message),
            Some("validation") => return Self::InvalidRequest(message),
            Some("internal") => return Self::Server(message),
            _ => {}
        }

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT => Self::Conflict(message),
            status if status.is_server_error() => Self::Server(message),
            _ => Self::InvalidRequest(message),
        }
    }
}
