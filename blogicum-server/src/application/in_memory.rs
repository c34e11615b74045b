//! In-memory repositories for service tests. Referential rules follow the
//! PostgreSQL implementations.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::location_repository::LocationRepository;
use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::category::{Category, CategoryForm, CategoryRef};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::location::{Location, LocationForm, LocationRef};
use crate::domain::post::{AuthorRef, Post};
use crate::domain::publication::Publication;
use crate::domain::user::{ProfileForm, User};

#[derive(Debug, Clone)]
struct PostRecord {
    id: i64,
    title: String,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    location_id: Option<i64>,
    category_id: Option<i64>,
    image: Option<String>,
    publication: Publication,
}

#[derive(Debug, Clone)]
struct CommentRecord {
    id: i64,
    text: String,
    author_id: i64,
    post_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    users: Vec<UserCredentials>,
    categories: Vec<Category>,
    locations: Vec<Location>,
    posts: Vec<PostRecord>,
    comments: Vec<CommentRecord>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn author(&self, id: i64) -> Option<AuthorRef> {
        self.users.iter().find(|c| c.user.id == id).map(|c| AuthorRef {
            id,
            username: c.user.username.clone(),
        })
    }

    fn hydrate_post(&self, record: &PostRecord) -> Post {
        Post {
            id: record.id,
            title: record.title.clone(),
            text: record.text.clone(),
            pub_date: record.pub_date,
            author: self.author(record.author_id).unwrap_or(AuthorRef {
                id: record.author_id,
                username: String::new(),
            }),
            location: record.location_id.and_then(|id| {
                self.locations.iter().find(|l| l.id == id).map(|l| LocationRef {
                    id: l.id,
                    name: l.name.clone(),
                })
            }),
            category: record.category_id.and_then(|id| {
                self.categories.iter().find(|c| c.id == id).map(|c| CategoryRef {
                    id: c.id,
                    title: c.title.clone(),
                    slug: c.slug.clone(),
                    is_published: c.publication.is_published,
                })
            }),
            image: record.image.clone(),
            comment_count: self
                .comments
                .iter()
                .filter(|c| c.post_id == record.id)
                .count() as i64,
            publication: record.publication,
        }
    }

    fn hydrate_comment(&self, record: &CommentRecord) -> Comment {
        Comment {
            id: record.id,
            text: record.text.clone(),
            author: self.author(record.author_id).unwrap_or(AuthorRef {
                id: record.author_id,
                username: String::new(),
            }),
            post_id: record.post_id,
            created_at: record.created_at,
        }
    }

    fn check_post_refs(
        &self,
        location_id: Option<i64>,
        category_id: Option<i64>,
    ) -> Result<(), DomainError> {
        if let Some(id) = category_id
            && !self.categories.iter().any(|c| c.id == id)
        {
            return Err(DomainError::invalid("category", "does not exist"));
        }
        if let Some(id) = location_id
            && !self.locations.iter().any(|l| l.id == id)
        {
            return Err(DomainError::invalid("location", "does not exist"));
        }
        Ok(())
    }

    fn filtered_posts(&self, filter: &PostFilter) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .map(|record| self.hydrate_post(record))
            .filter(|post| {
                (filter.include_hidden
                    || post.is_publicly_visible(filter.now)
                    || filter.viewer_id == Some(post.author.id))
                    && filter.author_id.is_none_or(|id| id == post.author.id)
                    && filter
                        .category_id
                        .is_none_or(|id| post.category.as_ref().is_some_and(|c| c.id == id))
                    && filter
                        .location_id
                        .is_none_or(|id| post.location.as_ref().is_some_and(|l| l.id == id))
            })
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("in-memory store mutex poisoned")
    }

    pub(crate) fn seed_user(&self, username: &str, is_staff: bool) -> User {
        let mut state = self.lock();
        let user = User {
            id: state.next_id(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            is_staff,
            created_at: Utc::now(),
        };
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: String::new(),
        });
        user
    }

    pub(crate) fn seed_category(&self, slug: &str, is_published: bool) -> Category {
        let mut state = self.lock();
        let category = Category {
            id: state.next_id(),
            title: slug.to_uppercase(),
            description: format!("{slug} posts"),
            slug: slug.to_string(),
            publication: Publication::new(is_published, Utc::now()),
        };
        state.categories.push(category.clone());
        category
    }

    pub(crate) fn seed_location(&self, name: &str, is_published: bool) -> Location {
        let mut state = self.lock();
        let location = Location {
            id: state.next_id(),
            name: name.to_string(),
            publication: Publication::new(is_published, Utc::now()),
        };
        state.locations.push(location.clone());
        location
    }

    pub(crate) fn post_count(&self) -> usize {
        self.lock().posts.len()
    }

    pub(crate) fn comment_count(&self) -> usize {
        self.lock().comments.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.lock();
        if state.users.iter().any(|c| c.user.username == input.username) {
            return Err(DomainError::AlreadyExists("username"));
        }
        if state.users.iter().any(|c| c.user.email == input.email) {
            return Err(DomainError::AlreadyExists("email"));
        }
        let user = User {
            id: state.next_id(),
            username: input.username,
            email: input.email,
            first_name: String::new(),
            last_name: String::new(),
            is_staff: input.is_staff,
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
            .find(|c| c.user.username == username)
            .cloned())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|c| c.user.id == id)
            .map(|c| c.user.clone()))
    }

    async fn update_profile(
        &self,
        id: i64,
        input: ProfileForm,
    ) -> Result<Option<User>, DomainError> {
        let mut state = self.lock();
        if state
            .users
            .iter()
            .any(|c| c.user.id != id && c.user.username == input.username)
        {
            return Err(DomainError::AlreadyExists("username"));
        }
        let Some(creds) = state.users.iter_mut().find(|c| c.user.id == id) else {
            return Ok(None);
        };
        creds.user.first_name = input.first_name;
        creds.user.last_name = input.last_name;
        creds.user.username = input.username;
        creds.user.email = input.email;
        Ok(Some(creds.user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<Option<Vec<String>>, DomainError> {
        let mut state = self.lock();
        if !state.users.iter().any(|c| c.user.id == id) {
            return Ok(None);
        }
        let owned_posts: Vec<i64> = state
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        let images = state
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .filter_map(|p| p.image.clone())
            .collect();
        state
            .comments
            .retain(|c| c.author_id != id && !owned_posts.contains(&c.post_id));
        state.posts.retain(|p| p.author_id != id);
        state.users.retain(|c| c.user.id != id);
        Ok(Some(images))
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn create_category(&self, input: CategoryForm) -> Result<Category, DomainError> {
        let mut state = self.lock();
        if state.categories.iter().any(|c| c.slug == input.slug) {
            return Err(DomainError::invalid("slug", "must be unique"));
        }
        let category = Category {
            id: state.next_id(),
            title: input.title,
            description: input.description,
            slug: input.slug,
            publication: Publication::new(input.is_published, Utc::now()),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn update_category(
        &self,
        id: i64,
        input: CategoryForm,
    ) -> Result<Option<Category>, DomainError> {
        let mut state = self.lock();
        if state
            .categories
            .iter()
            .any(|c| c.id != id && c.slug == input.slug)
        {
            return Err(DomainError::invalid("slug", "must be unique"));
        }
        let Some(category) = state.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        category.title = input.title;
        category.description = input.description;
        category.slug = input.slug;
        category.publication.is_published = input.is_published;
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        for post in state.posts.iter_mut().filter(|p| p.category_id == Some(id)) {
            post.category_id = None;
        }
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        Ok(state.categories.len() < before)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.lock().categories.clone())
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn create_location(&self, input: LocationForm) -> Result<Location, DomainError> {
        let mut state = self.lock();
        let location = Location {
            id: state.next_id(),
            name: input.name,
            publication: Publication::new(input.is_published, Utc::now()),
        };
        state.locations.push(location.clone());
        Ok(location)
    }

    async fn get_location(&self, id: i64) -> Result<Option<Location>, DomainError> {
        Ok(self.lock().locations.iter().find(|l| l.id == id).cloned())
    }

    async fn update_location(
        &self,
        id: i64,
        input: LocationForm,
    ) -> Result<Option<Location>, DomainError> {
        let mut state = self.lock();
        let Some(location) = state.locations.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        location.name = input.name;
        location.publication.is_published = input.is_published;
        Ok(Some(location.clone()))
    }

    async fn delete_location(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        for post in state.posts.iter_mut().filter(|p| p.location_id == Some(id)) {
            post.location_id = None;
        }
        let before = state.locations.len();
        state.locations.retain(|l| l.id != id);
        Ok(state.locations.len() < before)
    }

    async fn list_locations(&self) -> Result<Vec<Location>, DomainError> {
        Ok(self.lock().locations.clone())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        state.check_post_refs(input.location_id, input.category_id)?;
        if state.author(input.author_id).is_none() {
            return Err(DomainError::not_found("author", input.author_id));
        }
        let record = PostRecord {
            id: state.next_id(),
            title: input.title,
            text: input.text,
            pub_date: input.pub_date,
            author_id: input.author_id,
            location_id: input.location_id,
            category_id: input.category_id,
            image: None,
            publication: Publication::new(input.is_published, Utc::now()),
        };
        let post = state.hydrate_post(&record);
        state.posts.push(record);
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let state = self.lock();
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|record| state.hydrate_post(record)))
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        state.check_post_refs(patch.location_id, patch.category_id)?;
        let Some(record) = state.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        record.title = patch.title;
        record.text = patch.text;
        record.pub_date = patch.pub_date;
        record.publication.is_published = patch.is_published;
        record.location_id = patch.location_id;
        record.category_id = patch.category_id;
        let record = record.clone();
        Ok(Some(state.hydrate_post(&record)))
    }

    async fn set_image(
        &self,
        id: i64,
        image: Option<String>,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        let Some(record) = state.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        record.image = image;
        let record = record.clone();
        Ok(Some(state.hydrate_post(&record)))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        state.comments.retain(|c| c.post_id != id);
        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        Ok(state.posts.len() < before)
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        Ok(self
            .lock()
            .filtered_posts(filter)
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect())
    }

    async fn count_posts(&self, filter: &PostFilter) -> Result<i64, DomainError> {
        Ok(self.lock().filtered_posts(filter).len() as i64)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.lock();
        if !state.posts.iter().any(|p| p.id == input.post_id) {
            return Err(DomainError::not_found("post", input.post_id));
        }
        let record = CommentRecord {
            id: state.next_id(),
            text: input.text,
            author_id: input.author_id,
            post_id: input.post_id,
            created_at: Utc::now(),
        };
        let comment = state.hydrate_comment(&record);
        state.comments.push(record);
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let state = self.lock();
        Ok(state
            .comments
            .iter()
            .find(|c| c.id == id)
            .map(|record| state.hydrate_comment(record)))
    }

    async fn update_comment(&self, id: i64, text: String) -> Result<Option<Comment>, DomainError> {
        let mut state = self.lock();
        let Some(record) = state.comments.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        record.text = text;
        let record = record.clone();
        Ok(Some(state.hydrate_comment(&record)))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.comments.len();
        state.comments.retain(|c| c.id != id);
        Ok(state.comments.len() < before)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let state = self.lock();
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|record| state.hydrate_comment(record))
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn list_comments(&self, pagination: Pagination) -> Result<Vec<Comment>, DomainError> {
        let state = self.lock();
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .map(|record| state.hydrate_comment(record))
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect())
    }
}
