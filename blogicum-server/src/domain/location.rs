use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::publication::{Publication, Publishable};
use super::rules::{LOCATION_NAME_MAX_CHARS, required_text};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Location {
    pub(crate) id: i64,
    pub(crate) name: String,
    #[serde(flatten)]
    pub(crate) publication: Publication,
}

impl Publishable for Location {
    fn publication(&self) -> &Publication {
        &self.publication
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LocationRef {
    pub(crate) id: i64,
    pub(crate) name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LocationForm {
    pub(crate) name: String,
    pub(crate) is_published: bool,
}

impl LocationForm {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            name: required_text("name", &self.name, Some(LOCATION_NAME_MAX_CHARS))?,
            is_published: self.is_published,
        })
    }
}
