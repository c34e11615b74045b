use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::publication::{Publication, Publishable};
use super::rules::{SLUG_MAX_CHARS, TITLE_MAX_CHARS, is_slug, required_text};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    #[serde(flatten)]
    pub(crate) publication: Publication,
}

impl Publishable for Category {
    fn publication(&self) -> &Publication {
        &self.publication
    }
}

/// Category as embedded in a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CategoryRef {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CategoryForm {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
}

impl CategoryForm {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = required_text("title", &self.title, Some(TITLE_MAX_CHARS))?;
        let description = required_text("description", &self.description, None)?;
        let slug = required_text("slug", &self.slug, Some(SLUG_MAX_CHARS))?;
        if !is_slug(&slug) {
            return Err(DomainError::invalid(
                "slug",
                "only latin letters, digits, hyphen and underscore are allowed",
            ));
        }

        Ok(Self {
            title,
            description,
            slug,
            is_published: self.is_published,
        })
    }
}
