use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::{AppState, http_handlers};
use crate::data::post_repository::{NewPost, PostRepository};
use crate::data::repositories::memory::InMemoryStore;
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::infrastructure::jwt::JwtService;

const SECRET: &str = "0123456789abcdef0123456789abcdef";

struct TestApp {
    router: Router,
    store: InMemoryStore,
    jwt: Arc<JwtService>,
}

impl TestApp {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let jwt = Arc::new(JwtService::new(SECRET, 3600));
        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            jwt.clone(),
        );
        Self {
            router: http_handlers::routes(state),
            store,
            jwt,
        }
    }

    fn token_for(&self, user: &User) -> String {
        self.jwt
            .generate_token(user.id, &user.username)
            .expect("token must encode")
    }

    async fn seed_post(&self, author: &User, title: &str, is_published: bool, hours_ago: i64) -> Post {
        self.store
            .create_post(NewPost {
                author_id: author.id,
                title: title.to_string(),
                text: "body".to_string(),
                pub_date: Utc::now() - Duration::hours(hours_ago),
                is_published,
                category_id: None,
                location_id: None,
            })
            .await
            .expect("post must be created")
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).expect("request must build");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.post_raw(uri, token, body.to_string()).await
    }

    async fn post_raw(&self, uri: &str, token: Option<&str>, body: String) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder
            .body(Body::from(body))
            .expect("request must build");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body must be readable");
    serde_json::from_slice(&bytes).expect("body must be json")
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

fn titles(feed: &Value) -> Vec<String> {
    feed["posts"]
        .as_array()
        .expect("posts must be an array")
        .iter()
        .filter_map(|post| post["title"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = TestApp::new();
    let response = app.get("/healthz", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn draft_is_404_for_anonymous_and_visible_to_author() {
    let app = TestApp::new();
    let author = app.store.add_user("author");
    let draft = app.seed_post(&author, "draft", false, 1).await;
    let uri = format!("/posts/{}", draft.id);

    let response = app.get(&uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let token = app.token_for(&author);
    let response = app.get(&uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["post"]["id"], draft.id);
    assert_eq!(body["comments"], json!([]));
}

#[tokio::test]
async fn invalid_token_on_read_route_is_anonymous() {
    let app = TestApp::new();
    let author = app.store.add_user("author");
    app.seed_post(&author, "public", true, 1).await;
    app.seed_post(&author, "draft", false, 1).await;

    let response = app.get("/", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(titles(&json_body(response).await), vec!["public"]);
}

#[tokio::test]
async fn home_feed_is_ordered_and_clamps_pages() {
    let app = TestApp::new();
    let author = app.store.add_user("author");
    for (title, hours_ago) in [("old", 30), ("new", 1), ("middle", 10)] {
        app.seed_post(&author, title, true, hours_ago).await;
    }

    let feed = json_body(app.get("/", None).await).await;
    assert_eq!(titles(&feed), vec!["new", "middle", "old"]);
    assert_eq!(feed["total"], 3);
    assert_eq!(feed["has_next"], false);

    let feed = json_body(app.get("/?page=abc", None).await).await;
    assert_eq!(feed["page"], 1);

    let feed = json_body(app.get("/?page=99", None).await).await;
    assert_eq!(feed["page"], 1);
    assert_eq!(feed["num_pages"], 1);
}

#[tokio::test]
async fn unauthenticated_create_redirects_to_login_with_next() {
    let app = TestApp::new();

    let response = app
        .post("/posts/create", None, json!({"title": "t", "text": "x"}))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/auth/login?next=/posts/create"));
    assert_eq!(app.store.post_count(), 0);
}

#[tokio::test]
async fn non_author_edit_redirects_to_detail_and_changes_nothing() {
    let app = TestApp::new();
    let author = app.store.add_user("author");
    let stranger = app.store.add_user("stranger");
    let post = app.seed_post(&author, "original", true, 1).await;
    let token = app.token_for(&stranger);

    let response = app
        .post(
            &format!("/posts/{}/edit", post.id),
            Some(&token),
            json!({"title": "hijacked", "text": "nope"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let expected = format!("/posts/{}", post.id);
    assert_eq!(location(&response), Some(expected.as_str()));

    let stored = app
        .store
        .find_post(post.id)
        .await
        .expect("lookup must succeed")
        .expect("post must still exist");
    assert_eq!(stored.title, "original");

    let response = app
        .post(&format!("/posts/{}/delete", post.id), Some(&token), json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.store.post_count(), 1);
}

#[tokio::test]
async fn non_author_edit_redirects_whatever_the_body() {
    let app = TestApp::new();
    let author = app.store.add_user("author");
    let stranger = app.store.add_user("stranger");
    let post = app.seed_post(&author, "original", true, 1).await;
    let token = app.token_for(&stranger);
    let detail = format!("/posts/{}", post.id);
    let edit = format!("/posts/{}/edit", post.id);

    let response = app.post(&edit, Some(&token), json!({"text": "x"})).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some(detail.as_str()));

    let response = app
        .post_raw(&edit, Some(&token), "{not json".to_string())
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some(detail.as_str()));

    let stored = app
        .store
        .find_post(post.id)
        .await
        .expect("lookup must succeed")
        .expect("post must still exist");
    assert_eq!(stored.title, "original");
}

#[tokio::test]
async fn author_edit_with_bad_body_is_400_naming_the_problem() {
    let app = TestApp::new();
    let author = app.store.add_user("author");
    let post = app.seed_post(&author, "original", true, 1).await;
    let token = app.token_for(&author);
    let edit = format!("/posts/{}/edit", post.id);

    let response = app.post(&edit, Some(&token), json!({"text": "x"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().is_some_and(|msg| msg.contains("title")));

    let response = app
        .post_raw(&edit, Some(&token), "{not json".to_string())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());

    let response = app
        .post(&edit, Some(&token), json!({"title": 5, "text": "x"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stored = app
        .store
        .find_post(post.id)
        .await
        .expect("lookup must succeed")
        .expect("post must still exist");
    assert_eq!(stored.title, "original");
}

#[tokio::test]
async fn create_without_title_is_400_naming_the_field() {
    let app = TestApp::new();
    let author = app.store.add_user("author");
    let token = app.token_for(&author);

    let response = app
        .post("/posts/create", Some(&token), json!({"text": "hello"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().is_some_and(|msg| msg.contains("title")));
    assert_eq!(app.store.post_count(), 0);
}

#[tokio::test]
async fn author_creates_edits_and_deletes_post() {
    let app = TestApp::new();
    let author = app.store.add_user("author");
    let token = app.token_for(&author);

    let response = app
        .post(
            "/posts/create",
            Some(&token),
            json!({"title": "first", "text": "hello"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["author_username"], "author");
    assert_eq!(created["is_published"], true);
    let id = created["id"].as_i64().expect("id must be a number");

    let response = app
        .post(
            &format!("/posts/{id}/edit"),
            Some(&token),
            json!({"title": "renamed", "text": "hello again", "is_published": false}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let edited = json_body(response).await;
    assert_eq!(edited["title"], "renamed");
    assert_eq!(edited["is_published"], false);

    let response = app
        .post(&format!("/posts/{id}/delete"), Some(&token), json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.store.post_count(), 0);
}

#[tokio::test]
async fn unknown_category_on_create_is_bad_request() {
    let app = TestApp::new();
    let author = app.store.add_user("author");
    let token = app.token_for(&author);

    let response = app
        .post(
            "/posts/create",
            Some(&token),
            json!({"title": "t", "text": "x", "category_id": 404}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|msg| msg.contains("category_id"))
    );
    assert_eq!(app.store.post_count(), 0);
}

#[tokio::test]
async fn category_feed_hides_unpublished_category() {
    let app = TestApp::new();
    app.store.add_category("travel", true);
    app.store.add_category("secret", false);

    let response = app.get("/category/travel", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["category"]["slug"], "travel");

    let response = app.get("/category/secret", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.get("/category/missing", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_flow_respects_authorship() {
    let app = TestApp::new();
    let author = app.store.add_user("author");
    let reader = app.store.add_user("reader");
    let post = app.seed_post(&author, "post", true, 1).await;
    let reader_token = app.token_for(&reader);
    let author_token = app.token_for(&author);

    let response = app
        .post(
            &format!("/posts/{}/comment", post.id),
            Some(&reader_token),
            json!({"text": "nice"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let comment_id = json_body(response).await["id"]
        .as_i64()
        .expect("id must be a number");

    let response = app
        .post(
            &format!("/posts/{}/delete_comment/{comment_id}", post.id),
            Some(&author_token),
            json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let expected = format!("/posts/{}", post.id);
    assert_eq!(location(&response), Some(expected.as_str()));

    let detail = json_body(app.get(&format!("/posts/{}", post.id), None).await).await;
    assert_eq!(detail["post"]["comment_count"], 1);
    assert_eq!(detail["comments"][0]["text"], "nice");

    let response = app
        .post(
            &format!("/posts/{}/edit_comment/{comment_id}", post.id),
            Some(&reader_token),
            json!({"text": "very nice"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["text"], "very nice");
}

#[tokio::test]
async fn non_author_comment_edit_redirects_whatever_the_body() {
    let app = TestApp::new();
    let author = app.store.add_user("author");
    let reader = app.store.add_user("reader");
    let post = app.seed_post(&author, "post", true, 1).await;
    let reader_token = app.token_for(&reader);
    let author_token = app.token_for(&author);

    let response = app
        .post(
            &format!("/posts/{}/comment", post.id),
            Some(&reader_token),
            json!({"text": "nice"}),
        )
        .await;
    let comment_id = json_body(response).await["id"]
        .as_i64()
        .expect("id must be a number");
    let edit = format!("/posts/{}/edit_comment/{comment_id}", post.id);
    let detail = format!("/posts/{}", post.id);

    let response = app.post(&edit, Some(&author_token), json!({})).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some(detail.as_str()));

    let response = app
        .post_raw(&edit, Some(&author_token), "[".to_string())
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some(detail.as_str()));

    let response = app.post(&edit, Some(&reader_token), json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().is_some_and(|msg| msg.contains("text")));

    let detail = json_body(app.get(&detail, None).await).await;
    assert_eq!(detail["comments"][0]["text"], "nice");
}

#[tokio::test]
async fn login_carries_local_next_path_only() {
    let app = TestApp::new();

    let response = app.get("/auth/login?next=/posts/create", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["next"], "/posts/create");

    let response = app
        .post(
            "/auth/register",
            None,
            json!({"username": "writer", "email": "writer@example.com", "password": "very-secure-password"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .post(
            "/auth/login",
            None,
            json!({"username": "writer", "password": "very-secure-password", "next": "/posts/create"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["next"], "/posts/create");

    let response = app
        .post(
            "/auth/login",
            None,
            json!({"username": "writer", "password": "very-secure-password", "next": "//evil.example"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await.get("next").is_none());

    let response = app
        .post("/auth/register", None, json!({"username": "someone"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_login_and_profile_round_trip() {
    let app = TestApp::new();

    let response = app
        .post(
            "/auth/register",
            None,
            json!({"username": "writer", "email": "writer@example.com", "password": "very-secure-password"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .post(
            "/auth/register",
            None,
            json!({"username": "writer", "email": "other@example.com", "password": "very-secure-password"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .post(
            "/auth/login",
            None,
            json!({"username": "writer", "password": "wrong-password"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post(
            "/auth/login",
            None,
            json!({"username": "writer", "password": "very-secure-password"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = json_body(response).await["access_token"]
        .as_str()
        .expect("token must be a string")
        .to_string();

    let response = app
        .post(
            "/profile/edit",
            Some(&token),
            json!({"username": "writer", "first_name": "Jane", "last_name": "Doe", "email": "writer@example.com"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let profile = json_body(app.get("/profile/writer", None).await).await;
    assert_eq!(profile["user"]["first_name"], "Jane");
    assert!(profile["user"].get("email").is_none());
    assert_eq!(profile["feed"]["total"], 0);

    let response = app.get("/profile/nobody", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_lists_only_published_entries() {
    let app = TestApp::new();
    app.store.add_category("travel", true);
    app.store.add_category("hidden", false);
    app.store.add_location("Paris", true);
    app.store.add_location("Atlantis", false);

    let categories = json_body(app.get("/categories", None).await).await;
    assert_eq!(categories.as_array().map(Vec::len), Some(1));

    let locations = json_body(app.get("/locations", None).await).await;
    assert_eq!(locations[0]["name"], "Paris");
    assert_eq!(locations.as_array().map(Vec::len), Some(1));
}
