use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `blog-client`.
pub enum BlogClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/некорректен токен). Сервер отвечает
    /// на это редиректом на страницу входа.
    #[error("unauthorized")]
    Unauthorized,

    /// Изменять пост или комментарий может только автор. Сервер отправляет
    /// на страницу поста `post_id`.
    #[error("only the author may change this resource (post id: {post_id})")]
    NotAuthor {
        /// Пост, на который сервер перенаправил запрос.
        post_id: i64,
    },

    /// Запрошенный ресурс не найден или скрыт от текущего пользователя.
    #[error("not found")]
    NotFound,

    /// Логин или email уже заняты.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Некорректный запрос или бизнес-ошибка валидации.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Результат операций `blog-client`.
pub type BlogClientResult<T> = Result<T, BlogClientError>;

impl BlogClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            reqwest::StatusCode::CONFLICT => {
                Self::Conflict(message.unwrap_or_else(|| format!("http status {status}")))
            }
            _ => {
                let message = message.unwrap_or_else(|| format!("http status {status}"));
                Self::InvalidRequest(message)
            }
        }
    }

    /// Разбирает `Location` ответа-редиректа: вход или страница поста.
    pub(crate) fn from_redirect(location: Option<&str>) -> Self {
        let Some(location) = location else {
            return Self::InvalidRequest("redirect without location".to_string());
        };
        if location.starts_with("/auth/login") {
            return Self::Unauthorized;
        }
        match location
            .strip_prefix("/posts/")
            .and_then(|id| id.parse::<i64>().ok())
        {
            Some(post_id) => Self::NotAuthor { post_id },
            None => Self::InvalidRequest(format!("unexpected redirect to {location}")),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}
