//! In-process store backing service and router tests. Feeds go through
//! `VisibilityFilter::admits`, the same rule the SQL predicate encodes.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::catalog_repository::CatalogRepository;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{FeedScope, NewPost, Pagination, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, ProfilePatch, UserCredentials, UserRepository};
use crate::domain::catalog::{Category, CategoryRef, Location, LocationRef};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::domain::visibility::VisibilityFilter;

#[derive(Debug, Clone)]
struct StoredPost {
    id: i64,
    author_id: i64,
    category_id: Option<i64>,
    location_id: Option<i64>,
    title: String,
    text: String,
    pub_date: DateTime<Utc>,
    is_published: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredComment {
    id: i64,
    post_id: i64,
    author_id: i64,
    text: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    users: Vec<UserCredentials>,
    categories: Vec<Category>,
    locations: Vec<Location>,
    posts: Vec<StoredPost>,
    comments: Vec<StoredComment>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: i64) -> Option<&User> {
        self.users
            .iter()
            .map(|creds| &creds.user)
            .find(|user| user.id == id)
    }

    fn check_references(
        &self,
        category_id: Option<i64>,
        location_id: Option<i64>,
    ) -> Result<(), DomainError> {
        if let Some(id) = category_id
            && !self.categories.iter().any(|category| category.id == id)
        {
            return Err(DomainError::Validation {
                field: "category_id",
                message: "unknown category",
            });
        }
        if let Some(id) = location_id
            && !self.locations.iter().any(|location| location.id == id)
        {
            return Err(DomainError::Validation {
                field: "location_id",
                message: "unknown location",
            });
        }
        Ok(())
    }

    fn hydrate_post(&self, stored: &StoredPost) -> Result<Post, DomainError> {
        let author = self
            .user(stored.author_id)
            .ok_or_else(|| DomainError::NotFound("author".to_string()))?;
        let category = stored.category_id.and_then(|id| {
            self.categories
                .iter()
                .find(|category| category.id == id)
                .map(CategoryRef::from)
        });
        let location = stored.location_id.and_then(|id| {
            self.locations
                .iter()
                .find(|location| location.id == id)
                .map(LocationRef::from)
        });
        let comment_count = self
            .comments
            .iter()
            .filter(|comment| comment.post_id == stored.id)
            .count();

        Ok(Post {
            id: stored.id,
            author_id: stored.author_id,
            author_username: author.username.clone(),
            category,
            location,
            title: stored.title.clone(),
            text: stored.text.clone(),
            pub_date: stored.pub_date,
            is_published: stored.is_published,
            created_at: stored.created_at,
            comment_count: comment_count as i64,
        })
    }

    fn hydrate_comment(&self, stored: &StoredComment) -> Result<Comment, DomainError> {
        let author = self
            .user(stored.author_id)
            .ok_or_else(|| DomainError::NotFound("author".to_string()))?;
        Ok(Comment {
            id: stored.id,
            post_id: stored.post_id,
            author_id: stored.author_id,
            author_username: author.username.clone(),
            text: stored.text.clone(),
            created_at: stored.created_at,
        })
    }

    fn visible_posts(
        &self,
        scope: FeedScope,
        filter: &VisibilityFilter,
    ) -> Result<Vec<Post>, DomainError> {
        let mut posts = self
            .posts
            .iter()
            .filter(|post| match scope {
                FeedScope::All => true,
                FeedScope::Category(id) => post.category_id == Some(id),
                FeedScope::Author(id) => post.author_id == id,
            })
            .map(|post| self.hydrate_post(post))
            .collect::<Result<Vec<_>, _>>()?;
        posts.retain(|post| filter.admits(post));
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    fn unique_user(
        &self,
        username: &str,
        email: &str,
        except_id: Option<i64>,
    ) -> Result<(), DomainError> {
        for creds in self
            .users
            .iter()
            .filter(|creds| Some(creds.user.id) != except_id)
        {
            if creds.user.username == username {
                return Err(DomainError::AlreadyExists("username".to_string()));
            }
            if creds.user.email == email {
                return Err(DomainError::AlreadyExists("email".to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store mutex poisoned")
    }

    pub(crate) fn add_user(&self, username: &str) -> User {
        let mut state = self.lock();
        let user = User {
            id: state.next_id(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            created_at: Utc::now(),
        };
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: String::new(),
        });
        user
    }

    pub(crate) fn add_category(&self, slug: &str, is_published: bool) -> Category {
        let mut state = self.lock();
        let category = Category {
            id: state.next_id(),
            title: slug.to_uppercase(),
            description: String::new(),
            slug: slug.to_string(),
            is_published,
            created_at: Utc::now(),
        };
        state.categories.push(category.clone());
        category
    }

    pub(crate) fn add_location(&self, name: &str, is_published: bool) -> Location {
        let mut state = self.lock();
        let location = Location {
            id: state.next_id(),
            name: name.to_string(),
            is_published,
            created_at: Utc::now(),
        };
        state.locations.push(location.clone());
        location
    }

    pub(crate) fn post_count(&self) -> usize {
        self.lock().posts.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.lock();
        state.unique_user(&input.username, &input.email, None)?;
        let user = User {
            id: state.next_id(),
            username: input.username,
            email: input.email,
            first_name: String::new(),
            last_name: String::new(),
            created_at: Utc::now(),
        };
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|creds| creds.user.username == username)
            .cloned())
    }

    async fn find_profile(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|creds| creds.user.username == username)
            .map(|creds| creds.user.clone()))
    }

    async fn update_profile(
        &self,
        user_id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError> {
        let mut state = self.lock();
        state.unique_user(&patch.username, &patch.email, Some(user_id))?;
        let Some(creds) = state.users.iter_mut().find(|creds| creds.user.id == user_id) else {
            return Ok(None);
        };
        creds.user.username = patch.username;
        creds.user.first_name = patch.first_name;
        creds.user.last_name = patch.last_name;
        creds.user.email = patch.email;
        Ok(Some(creds.user.clone()))
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        state.check_references(input.category_id, input.location_id)?;
        if state.user(input.author_id).is_none() {
            return Err(DomainError::NotFound("author".to_string()));
        }
        let stored = StoredPost {
            id: state.next_id(),
            author_id: input.author_id,
            category_id: input.category_id,
            location_id: input.location_id,
            title: input.title,
            text: input.text,
            pub_date: input.pub_date,
            is_published: input.is_published,
            created_at: Utc::now(),
        };
        state.posts.push(stored.clone());
        state.hydrate_post(&stored)
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let state = self.lock();
        state
            .posts
            .iter()
            .find(|post| post.id == id)
            .map(|post| state.hydrate_post(post))
            .transpose()
    }

    async fn find_visible_post(
        &self,
        id: i64,
        filter: &VisibilityFilter,
    ) -> Result<Option<Post>, DomainError> {
        let post = self.find_post(id).await?;
        Ok(post.filter(|post| filter.admits(post)))
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        state.check_references(patch.category_id, patch.location_id)?;
        let Some(stored) = state
            .posts
            .iter_mut()
            .find(|post| post.id == post_id && post.author_id == owner_id)
        else {
            return Ok(None);
        };
        stored.title = patch.title;
        stored.text = patch.text;
        stored.pub_date = patch.pub_date;
        stored.is_published = patch.is_published;
        stored.category_id = patch.category_id;
        stored.location_id = patch.location_id;
        let stored = stored.clone();
        state.hydrate_post(&stored).map(Some)
    }

    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.posts.len();
        state
            .posts
            .retain(|post| !(post.id == post_id && post.author_id == owner_id));
        let deleted = state.posts.len() < before;
        if deleted {
            state.comments.retain(|comment| comment.post_id != post_id);
        }
        Ok(deleted)
    }

    async fn list_visible_posts(
        &self,
        scope: FeedScope,
        filter: &VisibilityFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let posts = self.lock().visible_posts(scope, filter)?;
        Ok(posts
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect())
    }

    async fn count_visible_posts(
        &self,
        scope: FeedScope,
        filter: &VisibilityFilter,
    ) -> Result<i64, DomainError> {
        Ok(self.lock().visible_posts(scope, filter)?.len() as i64)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.lock();
        if !state.posts.iter().any(|post| post.id == input.post_id) {
            return Err(DomainError::NotFound("post".to_string()));
        }
        let stored = StoredComment {
            id: state.next_id(),
            post_id: input.post_id,
            author_id: input.author_id,
            text: input.text,
            created_at: Utc::now(),
        };
        state.comments.push(stored.clone());
        state.hydrate_comment(&stored)
    }

    async fn find_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Comment>, DomainError> {
        let state = self.lock();
        state
            .comments
            .iter()
            .find(|comment| comment.id == comment_id && comment.post_id == post_id)
            .map(|comment| state.hydrate_comment(comment))
            .transpose()
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let state = self.lock();
        let mut comments = state
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .map(|comment| state.hydrate_comment(comment))
            .collect::<Result<Vec<_>, _>>()?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn update_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
        text: String,
    ) -> Result<Option<Comment>, DomainError> {
        let mut state = self.lock();
        let Some(stored) = state
            .comments
            .iter_mut()
            .find(|comment| comment.id == comment_id && comment.author_id == owner_id)
        else {
            return Ok(None);
        };
        stored.text = text;
        let stored = stored.clone();
        state.hydrate_comment(&stored).map(Some)
    }

    async fn delete_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.comments.len();
        state
            .comments
            .retain(|comment| !(comment.id == comment_id && comment.author_id == owner_id));
        Ok(state.comments.len() < before)
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn list_published_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories: Vec<Category> = self
            .lock()
            .categories
            .iter()
            .filter(|category| category.is_published)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn find_published_category(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|category| category.slug == slug && category.is_published)
            .cloned())
    }

    async fn list_published_locations(&self) -> Result<Vec<Location>, DomainError> {
        let mut locations: Vec<Location> = self
            .lock()
            .locations
            .iter()
            .filter(|location| location.is_published)
            .cloned()
            .collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(locations)
    }
}
