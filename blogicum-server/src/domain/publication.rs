use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication status and creation time shared by categories, locations
/// and posts. `created_at` is assigned by the store on insert and is never
/// part of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Publication {
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl Publication {
    pub(crate) fn new(is_published: bool, created_at: DateTime<Utc>) -> Self {
        Self {
            is_published,
            created_at,
        }
    }
}

pub(crate) trait Publishable {
    fn publication(&self) -> &Publication;

    fn is_published(&self) -> bool {
        self.publication().is_published
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.publication().created_at
    }
}

/// Serde default for `is_published` on input forms.
pub(crate) const fn published_by_default() -> bool {
    true
}
