use reqwest::{Client, Method, RequestBuilder, Response, header, redirect};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{BlogClientError, BlogClientResult};
use crate::models::{
    AuthResponse, Category, CategoryFeed, Comment, Feed, Location, Post, PostDetail, PostInput,
    ProfilePage, ProfileUpdate, User,
};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CommentRequestDto<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Serialize)]
struct PageQuery {
    page: u32,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `blog-server`.
///
/// Редиректы не выполняются автоматически: ответ `303` сервера означает
/// отказ (нужен вход или пользователь не автор) и превращается в ошибку.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode_error(response: Response) -> BlogClientError {
        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok());
            return BlogClientError::from_redirect(location);
        }

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body
                .error
                .unwrap_or_else(|| format!("http status {status}")),
            Err(_) => format!("http status {status}"),
        };
        BlogClientError::from_http_status(status, Some(message))
    }

    async fn send(request: RequestBuilder) -> BlogClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(BlogClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn send_json<TRes: DeserializeOwned>(request: RequestBuilder) -> BlogClientResult<TRes> {
        Self::send(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(BlogClientError::from_reqwest)
    }

    /// Регистрирует пользователя и возвращает JWT + данные пользователя.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> BlogClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
        };
        Self::send_json(self.request(Method::POST, "/auth/register", None).json(&payload)).await
    }

    /// Выполняет авторизацию пользователя и возвращает JWT + данные пользователя.
    pub async fn login(&self, username: &str, password: &str) -> BlogClientResult<AuthResponse> {
        let payload = LoginRequestDto { username, password };
        Self::send_json(self.request(Method::POST, "/auth/login", None).json(&payload)).await
    }

    /// Главная лента. С токеном в ленту попадают и собственные черновики.
    pub async fn home_feed(&self, token: Option<&str>, page: u32) -> BlogClientResult<Feed> {
        Self::send_json(
            self.request(Method::GET, "/", token)
                .query(&PageQuery { page }),
        )
        .await
    }

    /// Лента опубликованной категории.
    pub async fn category_feed(
        &self,
        token: Option<&str>,
        slug: &str,
        page: u32,
    ) -> BlogClientResult<CategoryFeed> {
        Self::send_json(
            self.request(Method::GET, &format!("/category/{slug}"), token)
                .query(&PageQuery { page }),
        )
        .await
    }

    /// Профиль пользователя и его посты.
    pub async fn profile(
        &self,
        token: Option<&str>,
        username: &str,
        page: u32,
    ) -> BlogClientResult<ProfilePage> {
        Self::send_json(
            self.request(Method::GET, &format!("/profile/{username}"), token)
                .query(&PageQuery { page }),
        )
        .await
    }

    /// Получает пост с комментариями по идентификатору.
    pub async fn get_post(&self, token: Option<&str>, id: i64) -> BlogClientResult<PostDetail> {
        Self::send_json(self.request(Method::GET, &format!("/posts/{id}"), token)).await
    }

    /// Создаёт пост от имени авторизованного пользователя.
    pub async fn create_post(&self, token: &str, input: &PostInput) -> BlogClientResult<Post> {
        Self::send_json(
            self.request(Method::POST, "/posts/create", Some(token))
                .json(input),
        )
        .await
    }

    /// Обновляет пост по идентификатору.
    pub async fn update_post(
        &self,
        token: &str,
        id: i64,
        input: &PostInput,
    ) -> BlogClientResult<Post> {
        Self::send_json(
            self.request(Method::POST, &format!("/posts/{id}/edit"), Some(token))
                .json(input),
        )
        .await
    }

    /// Удаляет пост по идентификатору.
    pub async fn delete_post(&self, token: &str, id: i64) -> BlogClientResult<()> {
        Self::send(self.request(Method::POST, &format!("/posts/{id}/delete"), Some(token))).await?;
        Ok(())
    }

    /// Добавляет комментарий к посту.
    pub async fn add_comment(
        &self,
        token: &str,
        post_id: i64,
        text: &str,
    ) -> BlogClientResult<Comment> {
        Self::send_json(
            self.request(Method::POST, &format!("/posts/{post_id}/comment"), Some(token))
                .json(&CommentRequestDto { text }),
        )
        .await
    }

    /// Изменяет текст комментария.
    pub async fn update_comment(
        &self,
        token: &str,
        post_id: i64,
        comment_id: i64,
        text: &str,
    ) -> BlogClientResult<Comment> {
        Self::send_json(
            self.request(
                Method::POST,
                &format!("/posts/{post_id}/edit_comment/{comment_id}"),
                Some(token),
            )
            .json(&CommentRequestDto { text }),
        )
        .await
    }

    /// Удаляет комментарий.
    pub async fn delete_comment(
        &self,
        token: &str,
        post_id: i64,
        comment_id: i64,
    ) -> BlogClientResult<()> {
        Self::send(self.request(
            Method::POST,
            &format!("/posts/{post_id}/delete_comment/{comment_id}"),
            Some(token),
        ))
        .await?;
        Ok(())
    }

    /// Обновляет профиль текущего пользователя.
    pub async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> BlogClientResult<User> {
        Self::send_json(
            self.request(Method::POST, "/profile/edit", Some(token))
                .json(update),
        )
        .await
    }

    /// Список опубликованных категорий.
    pub async fn list_categories(&self) -> BlogClientResult<Vec<Category>> {
        Self::send_json(self.request(Method::GET, "/categories", None)).await
    }

    /// Список опубликованных местоположений.
    pub async fn list_locations(&self) -> BlogClientResult<Vec<Location>> {
        Self::send_json(self.request(Method::GET, "/locations", None)).await
    }
}
