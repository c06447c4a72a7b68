use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Учётная запись в том виде, в котором её видит владелец.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Имя.
    pub first_name: String,
    /// Фамилия.
    pub last_name: String,
    /// Дата и время создания пользователя (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная часть профиля (без email).
pub struct Profile {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Имя.
    pub first_name: String,
    /// Фамилия.
    pub last_name: String,
    /// Дата и время регистрации (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Категория, к которой относится пост.
pub struct PostCategory {
    /// Идентификатор категории.
    pub id: i64,
    /// Slug категории.
    pub slug: String,
    /// Название.
    pub title: String,
    /// Опубликована ли категория.
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Местоположение поста.
pub struct PostLocation {
    /// Идентификатор местоположения.
    pub id: i64,
    /// Название.
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок поста.
    pub title: String,
    /// Текст поста.
    pub text: String,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Логин автора.
    pub author_username: String,
    /// Категория, если задана.
    pub category: Option<PostCategory>,
    /// Местоположение, если задано и опубликовано.
    pub location: Option<PostLocation>,
    /// Дата публикации (UTC). Пост с датой в будущем виден только автору.
    pub pub_date: DateTime<Utc>,
    /// Флаг публикации.
    pub is_published: bool,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
    /// Количество комментариев.
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Комментарий к посту.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Пост, к которому относится комментарий.
    pub post_id: i64,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Логин автора.
    pub author_username: String,
    /// Текст комментария.
    pub text: String,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Страница ленты постов.
pub struct Feed {
    /// Посты текущей страницы, новые сверху.
    pub posts: Vec<Post>,
    /// Номер страницы (после приведения к допустимому диапазону).
    pub page: u32,
    /// Размер страницы.
    pub per_page: u32,
    /// Количество страниц.
    pub num_pages: u32,
    /// Общее количество видимых постов.
    pub total: i64,
    /// Есть ли предыдущая страница.
    pub has_previous: bool,
    /// Есть ли следующая страница.
    pub has_next: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пост вместе с комментариями.
pub struct PostDetail {
    /// Пост.
    pub post: Post,
    /// Комментарии, старые сверху.
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Опубликованная категория.
pub struct Category {
    /// Идентификатор категории.
    pub id: i64,
    /// Slug категории.
    pub slug: String,
    /// Название.
    pub title: String,
    /// Описание.
    pub description: String,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Опубликованное местоположение.
pub struct Location {
    /// Идентификатор местоположения.
    pub id: i64,
    /// Название.
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Лента категории.
pub struct CategoryFeed {
    /// Категория.
    pub category: Category,
    /// Страница ленты.
    pub feed: Feed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Профиль пользователя с его постами.
pub struct ProfilePage {
    /// Публичные данные пользователя.
    pub user: Profile,
    /// Посты пользователя, видимые текущему пользователю.
    pub feed: Feed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ после успешной регистрации или входа.
pub struct AuthResponse {
    /// JWT access token.
    pub access_token: String,
    /// Данные пользователя.
    pub user: User,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Данные формы поста для создания и редактирования.
///
/// Незаданные `pub_date`/`is_published` при создании означают «сейчас» и
/// `true`, при редактировании сохраняют текущие значения.
pub struct PostInput {
    /// Заголовок.
    pub title: String,
    /// Текст.
    pub text: String,
    /// Дата публикации (UTC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<DateTime<Utc>>,
    /// Флаг публикации.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    /// Идентификатор категории.
    pub category_id: Option<i64>,
    /// Идентификатор местоположения.
    pub location_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Новые данные профиля.
pub struct ProfileUpdate {
    /// Логин.
    pub username: String,
    /// Имя.
    pub first_name: String,
    /// Фамилия.
    pub last_name: String,
    /// Email.
    pub email: String,
}
