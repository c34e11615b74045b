use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::CategoryRef;
use super::error::DomainError;
use super::identity::Actor;
use super::location::LocationRef;
use super::publication::{Publication, Publishable};
use super::rules::{TITLE_MAX_CHARS, required_text};

/// Namespace under the media root where post images are stored.
pub(crate) const POST_IMAGES_DIR: &str = "post_images";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AuthorRef {
    pub(crate) id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author: AuthorRef,
    pub(crate) location: Option<LocationRef>,
    pub(crate) category: Option<CategoryRef>,
    pub(crate) image: Option<String>,
    pub(crate) comment_count: i64,
    #[serde(flatten)]
    pub(crate) publication: Publication,
}

impl Publishable for Post {
    fn publication(&self) -> &Publication {
        &self.publication
    }
}

impl Post {
    /// Published, not deferred, and filed under a published category.
    pub(crate) fn is_publicly_visible(&self, now: DateTime<Utc>) -> bool {
        self.is_published()
            && self.pub_date <= now
            && self.category.as_ref().is_some_and(|c| c.is_published)
    }

    /// Authors always see their own posts.
    pub(crate) fn is_visible_to(&self, viewer: Option<&Actor>, now: DateTime<Utc>) -> bool {
        viewer.is_some_and(|actor| actor.is_user(self.author.id)) || self.is_publicly_visible(now)
    }

    pub(crate) fn detail_url(&self) -> String {
        post_detail_url(self.id)
    }
}

/// Canonical location of a post.
pub(crate) fn post_detail_url(post_id: i64) -> String {
    format!("/api/posts/{post_id}")
}

/// Editable post fields. The author is never part of the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PostForm {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) is_published: bool,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
}

impl PostForm {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = required_text("title", &self.title, Some(TITLE_MAX_CHARS))?;
        let text = required_text("text", &self.text, None)?;
        validate_reference("location", self.location_id)?;
        validate_reference("category", self.category_id)?;

        Ok(Self {
            title,
            text,
            ..self
        })
    }
}

fn validate_reference(field: &'static str, id: Option<i64>) -> Result<(), DomainError> {
    match id {
        Some(id) if id <= 0 => Err(DomainError::invalid(field, "must be > 0")),
        _ => Ok(()),
    }
}
