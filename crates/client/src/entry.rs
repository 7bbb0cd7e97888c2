//! Results of single-resource operations.

use chrono::{DateTime, FixedOffset};
use helios_fhir::model::{Tag, relation};
use http::StatusCode;

use crate::identity::ResourceIdentity;

/// A resource as the server returned it, with what the response headers said
/// about it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry<T> {
    /// `None` when the server answered without a body.
    pub resource: Option<T>,
    /// Logical identity, without version.
    pub id: Option<ResourceIdentity>,
    /// Version-specific identity.
    pub self_link: Option<ResourceIdentity>,
    pub last_updated: Option<DateTime<FixedOffset>>,
    pub tags: Vec<Tag>,
}

impl<T> ResourceEntry<T> {
    /// An entry for a resource not yet known to any server.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Some(resource),
            id: None,
            self_link: None,
            last_updated: None,
            tags: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: ResourceIdentity) -> Self {
        if id.is_version_specific() {
            self.self_link = Some(id.clone());
        }
        self.id = Some(id.without_version());
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    /// The identity to address the newest knowledge of this entry: the self
    /// link if there is one, the logical id otherwise.
    pub fn location(&self) -> Option<&ResourceIdentity> {
        self.self_link.as_ref().or(self.id.as_ref())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResourceEntry<U> {
        ResourceEntry {
            resource: self.resource.map(f),
            id: self.id,
            self_link: self.self_link,
            last_updated: self.last_updated,
            tags: self.tags,
        }
    }
}

/// The normal results of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The resource existed and is now deleted.
    Deleted,
    /// Nothing to delete; the server answered with this status (404 or 410).
    AlreadyGone(StatusCode),
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }
}

/// Which navigation link of a bundle to follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageDirection {
    First,
    Previous,
    #[default]
    Next,
    Last,
}

impl PageDirection {
    /// The link relation naming this direction.
    pub fn relation(&self) -> &'static str {
        match self {
            PageDirection::First => relation::FIRST,
            PageDirection::Previous => relation::PREVIOUS,
            PageDirection::Next => relation::NEXT,
            PageDirection::Last => relation::LAST,
        }
    }
}
