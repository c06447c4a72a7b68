//! Клиентская библиотека для работы с blog-server по HTTP.
//!
//! `BlogClient` хранит JWT-токен после `register`/`login` и автоматически
//! использует его: в изменяющих операциях токен обязателен, в операциях
//! чтения он необязателен и позволяет видеть собственные черновики и
//! отложенные посты.
//!
//! Отказ сервера в изменении чужого поста или комментария приходит как
//! [`BlogClientError::NotAuthor`], отсутствие входа как
//! [`BlogClientError::Unauthorized`].
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{BlogClientError, BlogClientResult};
pub use http_client::HttpClient;
pub use models::{
    AuthResponse, Category, CategoryFeed, Comment, Feed, Location, Post, PostCategory, PostDetail,
    PostInput, PostLocation, Profile, ProfilePage, ProfileUpdate, User,
};

#[derive(Debug, Clone)]
/// Клиент блог-сервиса.
pub struct BlogClient {
    http: HttpClient,
    token: Option<String>,
}

impl BlogClient {
    /// Создаёт клиент для сервера с базовым URL, например
    /// `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает JWT-токен вручную.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый JWT-токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> BlogClientResult<AuthResponse> {
        let result = self.http.register(username, email, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Выполняет вход пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> BlogClientResult<AuthResponse> {
        let result = self.http.login(username, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Возвращает страницу главной ленты. Номер страницы вне диапазона
    /// сервер приводит к ближайшей существующей.
    pub async fn home_feed(&self, page: u32) -> BlogClientResult<Feed> {
        self.http.home_feed(self.get_token(), page).await
    }

    /// Возвращает страницу ленты категории.
    pub async fn category_feed(&self, slug: &str, page: u32) -> BlogClientResult<CategoryFeed> {
        self.http.category_feed(self.get_token(), slug, page).await
    }

    /// Возвращает профиль пользователя со страницей его постов.
    pub async fn profile(&self, username: &str, page: u32) -> BlogClientResult<ProfilePage> {
        self.http.profile(self.get_token(), username, page).await
    }

    /// Возвращает пост с комментариями.
    pub async fn get_post(&self, id: i64) -> BlogClientResult<PostDetail> {
        self.http.get_post(self.get_token(), id).await
    }

    /// Создаёт новый пост.
    ///
    /// Требует установленный JWT-токен.
    pub async fn create_post(&self, input: &PostInput) -> BlogClientResult<Post> {
        let token = self.require_token()?;
        self.http.create_post(token, input).await
    }

    /// Обновляет пост по идентификатору.
    ///
    /// Требует установленный JWT-токен.
    pub async fn update_post(&self, id: i64, input: &PostInput) -> BlogClientResult<Post> {
        let token = self.require_token()?;
        self.http.update_post(token, id, input).await
    }

    /// Удаляет пост по идентификатору.
    ///
    /// Требует установленный JWT-токен.
    pub async fn delete_post(&self, id: i64) -> BlogClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_post(token, id).await
    }

    /// Добавляет комментарий к посту.
    pub async fn add_comment(&self, post_id: i64, text: &str) -> BlogClientResult<Comment> {
        let token = self.require_token()?;
        self.http.add_comment(token, post_id, text).await
    }

    /// Изменяет текст своего комментария.
    pub async fn update_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        text: &str,
    ) -> BlogClientResult<Comment> {
        let token = self.require_token()?;
        self.http
            .update_comment(token, post_id, comment_id, text)
            .await
    }

    /// Удаляет свой комментарий.
    pub async fn delete_comment(&self, post_id: i64, comment_id: i64) -> BlogClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_comment(token, post_id, comment_id).await
    }

    /// Обновляет профиль текущего пользователя.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> BlogClientResult<User> {
        let token = self.require_token()?;
        self.http.update_profile(token, update).await
    }

    /// Возвращает опубликованные категории.
    pub async fn list_categories(&self) -> BlogClientResult<Vec<Category>> {
        self.http.list_categories().await
    }

    /// Возвращает опубликованные местоположения.
    pub async fn list_locations(&self) -> BlogClientResult<Vec<Location>> {
        self.http.list_locations().await
    }

    fn require_token(&self) -> BlogClientResult<&str> {
        self.token.as_deref().ok_or(BlogClientError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::{BlogClient, BlogClientError, PostInput};

    #[tokio::test]
    async fn mutations_without_token_fail_locally() {
        let client = BlogClient::new("http://127.0.0.1:9").expect("client must build");

        let err = client
            .create_post(&PostInput::default())
            .await
            .expect_err("must require token");
        assert!(matches!(err, BlogClientError::Unauthorized));

        let err = client
            .delete_comment(1, 2)
            .await
            .expect_err("must require token");
        assert!(matches!(err, BlogClientError::Unauthorized));
    }

    #[test]
    fn token_can_be_set_and_cleared() {
        let mut client = BlogClient::new("http://127.0.0.1:8080").expect("client must build");
        assert!(client.get_token().is_none());

        client.set_token("abc");
        assert_eq!(client.get_token(), Some("abc"));

        client.clear_token();
        assert!(client.get_token().is_none());
    }
}
