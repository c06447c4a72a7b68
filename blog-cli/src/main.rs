use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use blog_client::{
    AuthResponse, BlogClient, BlogClientError, Comment, Feed, Post, PostDetail, PostInput,
    ProfileUpdate,
};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

const TOKEN_FILE: &str = ".blog_token";
const DEFAULT_HTTP_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "blog-cli", version, about = "CLI клиент для blog-server")]
struct Cli {
    /// Адрес HTTP-сервера.
    #[arg(long, global = true, env = "BLOG_SERVER")]
    server: Option<String>,

    /// Печатать ответ сервера как JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct PostFields {
    /// Дата публикации в формате RFC 3339, например 2024-05-01T12:00:00Z.
    #[arg(long)]
    pub_date: Option<DateTime<Utc>>,
    /// Сохранить как черновик.
    #[arg(long, conflicts_with = "publish")]
    draft: bool,
    /// Опубликовать.
    #[arg(long)]
    publish: bool,
    #[arg(long)]
    category_id: Option<i64>,
    #[arg(long)]
    location_id: Option<i64>,
}

impl PostFields {
    fn is_published(&self) -> Option<bool> {
        match (self.publish, self.draft) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    fn into_input(self, title: String, text: String) -> PostInput {
        PostInput {
            title,
            text,
            pub_date: self.pub_date,
            is_published: self.is_published(),
            category_id: self.category_id,
            location_id: self.location_id,
        }
    }
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
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Удаление сохранённого токена.
    Logout,
    /// Главная лента.
    Feed {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Лента категории.
    Category {
        #[arg(long)]
        slug: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Профиль пользователя и его посты.
    Profile {
        #[arg(long)]
        username: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Получение поста с комментариями по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание поста (требует токен).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
        #[command(flatten)]
        fields: PostFields,
    },
    /// Обновление поста (требует токен).
    ///
    /// Если `--text` не указан, используется текущий текст поста.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: Option<String>,
        #[command(flatten)]
        fields: PostFields,
    },
    /// Удаление поста (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Комментарий к посту (требует токен).
    Comment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        text: String,
    },
    /// Изменение своего комментария (требует токен).
    EditComment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        comment_id: i64,
        #[arg(long)]
        text: String,
    },
    /// Удаление своего комментария (требует токен).
    DeleteComment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        comment_id: i64,
    },
    /// Изменение своего профиля (требует токен).
    EditProfile {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// Опубликованные категории.
    Categories,
    /// Опубликованные местоположения.
    Locations,
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

    let server = resolve_server(cli.server);
    let mut client = BlogClient::new(server).map_err(map_client_error)?;

    if let Some(token) = load_token().context("не удалось прочитать .blog_token")? {
        client.set_token(token);
    }

    let json = cli.json;
    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = client
                .register(&username, &email, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            output(json, &auth, |auth| print_auth("Регистрация успешна", auth))?;
        }
        Command::Login { username, password } => {
            let auth = client
                .login(&username, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            output(json, &auth, |auth| print_auth("Вход выполнен", auth))?;
        }
        Command::Logout => {
            remove_token().context("не удалось удалить .blog_token")?;
            println!("Токен удалён");
        }
        Command::Feed { page } => {
            let feed = client.home_feed(page).await.map_err(map_client_error)?;
            output(json, &feed, |feed| print_feed("Лента", feed))?;
        }
        Command::Category { slug, page } => {
            let category = client
                .category_feed(&slug, page)
                .await
                .map_err(map_client_error)?;
            output(json, &category, |category| {
                print_feed(&format!("Категория «{}»", category.category.title), &category.feed)
            })?;
        }
        Command::Profile { username, page } => {
            let profile = client
                .profile(&username, page)
                .await
                .map_err(map_client_error)?;
            output(json, &profile, |profile| {
                let user = &profile.user;
                let full_name = format!("{} {}", user.first_name, user.last_name);
                println!("Профиль {} ({})", user.username, full_name.trim());
                println!("зарегистрирован: {}", user.created_at);
                print_feed("Посты", &profile.feed);
            })?;
        }
        Command::Get { id } => {
            let detail = client.get_post(id).await.map_err(map_client_error)?;
            output(json, &detail, print_detail)?;
        }
        Command::Create {
            title,
            text,
            fields,
        } => {
            let input = fields.into_input(title, text);
            let post = client
                .create_post(&input)
                .await
                .map_err(map_client_error)?;
            output(json, &post, |post| print_post("Пост создан", post))?;
        }
        Command::Update {
            id,
            title,
            text,
            fields,
        } => {
            // без --text оставляем текущий текст поста
            let text = match text {
                Some(text) => text,
                None => client.get_post(id).await.map_err(map_client_error)?.post.text,
            };

            let input = fields.into_input(title, text);
            let post = client
                .update_post(id, &input)
                .await
                .map_err(map_client_error)?;
            output(json, &post, |post| print_post("Пост обновлён", post))?;
        }
        Command::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::Comment { post_id, text } => {
            let comment = client
                .add_comment(post_id, &text)
                .await
                .map_err(map_client_error)?;
            output(json, &comment, |comment| {
                print_comment("Комментарий добавлен", comment)
            })?;
        }
        Command::EditComment {
            post_id,
            comment_id,
            text,
        } => {
            let comment = client
                .update_comment(post_id, comment_id, &text)
                .await
                .map_err(map_client_error)?;
            output(json, &comment, |comment| {
                print_comment("Комментарий обновлён", comment)
            })?;
        }
        Command::DeleteComment {
            post_id,
            comment_id,
        } => {
            client
                .delete_comment(post_id, comment_id)
                .await
                .map_err(map_client_error)?;
            println!("Комментарий удалён: id={comment_id}");
        }
        Command::EditProfile {
            username,
            email,
            first_name,
            last_name,
        } => {
            let update = ProfileUpdate {
                username,
                first_name,
                last_name,
                email,
            };
            let user = client
                .update_profile(&update)
                .await
                .map_err(map_client_error)?;
            output(json, &user, |user| {
                println!("Профиль обновлён");
                println!("username: {}", user.username);
                println!("email: {}", user.email);
                println!("name: {} {}", user.first_name, user.last_name);
            })?;
        }
        Command::Categories => {
            let categories = client.list_categories().await.map_err(map_client_error)?;
            output(json, &categories, |categories| {
                for category in categories {
                    println!("- {} ({})", category.title, category.slug);
                }
            })?;
        }
        Command::Locations => {
            let locations = client.list_locations().await.map_err(map_client_error)?;
            output(json, &locations, |locations| {
                for location in locations {
                    println!("- [{}] {}", location.id, location.name);
                }
            })?;
        }
    }

    Ok(())
}

fn resolve_server(server: Option<String>) -> String {
    let raw = server.unwrap_or_else(|| DEFAULT_HTTP_SERVER.to_string());
    normalize_server(raw)
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &BlogClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn remove_token() -> io::Result<()> {
    match fs::remove_file(TOKEN_FILE) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

fn map_client_error(err: BlogClientError) -> anyhow::Error {
    let message = match err {
        BlogClientError::Unauthorized => {
            "требуется авторизация: выполните `blog-cli login ...` или `blog-cli register ...`"
                .to_string()
        }
        BlogClientError::NotAuthor { post_id } => {
            format!("изменять можно только свои записи (пост id={post_id})")
        }
        BlogClientError::NotFound => "ресурс не найден".to_string(),
        BlogClientError::Conflict(message) => format!("уже занято: {message}"),
        BlogClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        BlogClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn output<T: Serialize>(json: bool, value: &T, print: impl FnOnce(&T)) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(value).context("не удалось сериализовать ответ")?;
        println!("{rendered}");
    } else {
        print(value);
    }
    Ok(())
}

fn print_auth(title: &str, auth: &AuthResponse) {
    println!("{title}");
    println!("token: {}", auth.access_token);
    println!("user:");
    println!("  id: {}", auth.user.id);
    println!("  username: {}", auth.user.username);
    println!("  email: {}", auth.user.email);
    println!("  created_at: {}", auth.user.created_at);
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("text: {}", post.text);
    println!("author: {} (id={})", post.author_username, post.author_id);
    if let Some(category) = &post.category {
        println!("category: {} ({})", category.title, category.slug);
    }
    if let Some(location) = &post.location {
        println!("location: {}", location.name);
    }
    println!("pub_date: {}", post.pub_date);
    println!("is_published: {}", post.is_published);
    println!("comments: {}", post.comment_count);
}

fn print_comment(title: &str, comment: &Comment) {
    println!("{title}");
    println!("id: {}", comment.id);
    println!("post_id: {}", comment.post_id);
    println!("text: {}", comment.text);
}

fn print_detail(detail: &PostDetail) {
    print_post("Пост", &detail.post);
    for comment in &detail.comments {
        println!(
            "  [{}] {} ({}): {}",
            comment.id, comment.author_username, comment.created_at, comment.text
        );
    }
}

fn print_feed(title: &str, feed: &Feed) {
    println!(
        "{title}: страница {}/{} (всего постов: {})",
        feed.page, feed.num_pages, feed.total
    );

    for post in &feed.posts {
        let marker = if post.is_published { "" } else { " [черновик]" };
        println!(
            "- [{}] {}{} ({}, {}, комментариев: {})",
            post.id, post.title, marker, post.author_username, post.pub_date, post.comment_count
        );
    }
}
