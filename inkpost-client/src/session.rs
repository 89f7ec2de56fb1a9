use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Данные пользователя, вошедшего в систему.
pub struct SessionUser {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Сессия: JWT-токен и, если известен, пользователь.
///
/// Передаётся явно в каждую защищённую операцию `BlogClient`.
/// Регистрация возвращает только токен, поэтому `user` может отсутствовать.
pub struct Session {
    /// JWT access token.
    pub token: String,
    /// Пользователь, которому выдан токен.
    #[serde(default)]
    pub user: Option<SessionUser>,
}

impl Session {
    /// Создаёт сессию только с токеном.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: None,
        }
    }

    /// Идентификатор пользователя сессии, если он известен.
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|user| user.id)
    }
}
