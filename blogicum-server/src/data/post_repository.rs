use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostForm};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) is_published: bool,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) author_id: i64,
}

impl NewPost {
    pub(crate) fn from_form(form: PostForm, author_id: i64) -> Self {
        Self {
            title: form.title,
            text: form.text,
            pub_date: form.pub_date,
            is_published: form.is_published,
            location_id: form.location_id,
            category_id: form.category_id,
            author_id,
        }
    }
}

/// Post fields that can change after insert. Author and creation time
/// cannot.
#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) is_published: bool,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
}

impl From<PostForm> for PostPatch {
    fn from(form: PostForm) -> Self {
        Self {
            title: form.title,
            text: form.text,
            pub_date: form.pub_date,
            is_published: form.is_published,
            location_id: form.location_id,
            category_id: form.category_id,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) page_size: u32,
}

impl Pagination {
    pub(crate) fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * self.limit()
    }
}

/// Which posts a listing may return.
///
/// Unless `include_hidden` is set, a post is returned when it is publicly
/// visible at `now` or when it belongs to `viewer_id`.
#[derive(Debug, Clone)]
pub(crate) struct PostFilter {
    pub(crate) now: DateTime<Utc>,
    pub(crate) viewer_id: Option<i64>,
    pub(crate) include_hidden: bool,
    pub(crate) author_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) location_id: Option<i64>,
}

impl PostFilter {
    pub(crate) fn visible_to(viewer_id: Option<i64>, now: DateTime<Utc>) -> Self {
        Self {
            now,
            viewer_id,
            include_hidden: false,
            author_id: None,
            category_id: None,
            location_id: None,
        }
    }

    pub(crate) fn everything(now: DateTime<Utc>) -> Self {
        Self {
            include_hidden: true,
            ..Self::visible_to(None, now)
        }
    }

    pub(crate) fn by_author(self, author_id: i64) -> Self {
        Self {
            author_id: Some(author_id),
            ..self
        }
    }

    pub(crate) fn in_category(self, category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
            ..self
        }
    }

    pub(crate) fn at_location(self, location_id: i64) -> Self {
        Self {
            location_id: Some(location_id),
            ..self
        }
    }
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn set_image(&self, id: i64, image: Option<String>)
    -> Result<Option<Post>, DomainError>;
    /// Removes the post together with its comments.
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_posts(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;
    async fn count_posts(&self, filter: &PostFilter) -> Result<i64, DomainError>;
}
