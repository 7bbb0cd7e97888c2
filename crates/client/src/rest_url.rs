//! Builder for the urls of the REST interactions.
//!
//! | Interaction | Url |
//! |-------------|-----|
//! | create, type search | `[base]/[collection]` |
//! | search | `[base]/[collection]/_search`, whole system `[base]` |
//! | history | `[base]/_history`, `[base]/[collection]/_history`, `[base]/[collection]/[id]/_history` |
//! | tags | `[base]/_tags`, `[base]/[collection]/_tags`, `[base]/[collection]/[id](/_history/[vid])/_tags` |
//! | tag removal | `[base]/[collection]/[id](/_history/[vid])/_tags/_delete` |
//! | validation | `[base]/[collection]/_validate(/[id])` |
//! | conformance | `[base]/metadata` |
//! | document, mailbox | `[base]/Document`, `[base]/Mailbox` |

use url::Url;

use crate::identity::{Endpoint, HISTORY_SEGMENT};

/// Query parameter names.
pub mod params {
    pub const ID: &str = "_id";
    pub const COUNT: &str = "_count";
    pub const SINCE: &str = "_since";
    pub const SORT: &str = "_sort";
    pub const INCLUDE: &str = "_include";
    pub const FORMAT: &str = "_format";
}

const SEARCH_SEGMENT: &str = "_search";
const TAGS_SEGMENT: &str = "_tags";
const DELETE_SEGMENT: &str = "_delete";
const VALIDATE_SEGMENT: &str = "_validate";
const METADATA_SEGMENT: &str = "metadata";
const DOCUMENT_SEGMENT: &str = "Document";
const MAILBOX_SEGMENT: &str = "Mailbox";

/// A url under an endpoint plus its query parameters in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestUrl {
    url: Url,
    params: Vec<(String, String)>,
}

impl RestUrl {
    fn on(endpoint: &Endpoint, segments: &[&str]) -> Self {
        Self {
            url: endpoint.join(segments),
            params: Vec::new(),
        }
    }

    /// Starts from an existing url, keeping its query.
    pub fn from_url(url: Url) -> Self {
        Self {
            url,
            params: Vec::new(),
        }
    }

    pub fn endpoint(endpoint: &Endpoint) -> Self {
        Self::from_url(endpoint.url().clone())
    }

    pub fn for_collection(endpoint: &Endpoint, collection: &str) -> Self {
        Self::on(endpoint, &[collection])
    }

    pub fn search(endpoint: &Endpoint, collection: &str) -> Self {
        Self::on(endpoint, &[collection, SEARCH_SEGMENT])
    }

    pub fn server_history(endpoint: &Endpoint) -> Self {
        Self::on(endpoint, &[HISTORY_SEGMENT])
    }

    pub fn collection_history(endpoint: &Endpoint, collection: &str) -> Self {
        Self::on(endpoint, &[collection, HISTORY_SEGMENT])
    }

    pub fn resource_history(endpoint: &Endpoint, collection: &str, id: &str) -> Self {
        Self::on(endpoint, &[collection, id, HISTORY_SEGMENT])
    }

    pub fn server_tags(endpoint: &Endpoint) -> Self {
        Self::on(endpoint, &[TAGS_SEGMENT])
    }

    pub fn collection_tags(endpoint: &Endpoint, collection: &str) -> Self {
        Self::on(endpoint, &[collection, TAGS_SEGMENT])
    }

    pub fn resource_tags(
        endpoint: &Endpoint,
        collection: &str,
        id: &str,
        version_id: Option<&str>,
    ) -> Self {
        let mut segments = vec![collection, id];
        if let Some(version) = version_id {
            segments.extend([HISTORY_SEGMENT, version]);
        }
        segments.push(TAGS_SEGMENT);
        Self::on(endpoint, &segments)
    }

    pub fn delete_resource_tags(
        endpoint: &Endpoint,
        collection: &str,
        id: &str,
        version_id: Option<&str>,
    ) -> Self {
        let mut url = Self::resource_tags(endpoint, collection, id, version_id);
        if let Ok(mut path) = url.url.path_segments_mut() {
            path.push(DELETE_SEGMENT);
        }
        url
    }

    pub fn validate(endpoint: &Endpoint, collection: &str, id: Option<&str>) -> Self {
        match id {
            Some(id) => Self::on(endpoint, &[collection, VALIDATE_SEGMENT, id]),
            None => Self::on(endpoint, &[collection, VALIDATE_SEGMENT]),
        }
    }

    pub fn metadata(endpoint: &Endpoint) -> Self {
        Self::on(endpoint, &[METADATA_SEGMENT])
    }

    pub fn document(endpoint: &Endpoint) -> Self {
        Self::on(endpoint, &[DOCUMENT_SEGMENT])
    }

    pub fn mailbox(endpoint: &Endpoint) -> Self {
        Self::on(endpoint, &[MAILBOX_SEGMENT])
    }

    /// Appends a parameter. Repeating a name adds another pair.
    pub fn add_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn push_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.push((name.into(), value.into()));
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn into_url(self) -> Url {
        let mut url = self.url;
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter());
        }
        url
    }
}
