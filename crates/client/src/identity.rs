//! Resource identity: where a resource instance (or one of its versions)
//! lives on a FHIR server.
//!
//! A resource url has the shape
//!
//! ```text
//! [endpoint]/[collection]/[id]/_history/[version]
//! ```
//!
//! where everything after the collection is optional. Endpoints are kept with
//! a trailing slash so that joining never drops the last path segment of the
//! base; resource urls are built without one.

use std::fmt;

use helios_fhir::ModelInspector;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{ClientError, Result};

/// Path segment separating a logical id from a version id.
pub const HISTORY_SEGMENT: &str = "_history";

/// The base url of a FHIR server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Parses an absolute base url. Query and fragment are dropped.
    pub fn parse(endpoint: &str) -> Result<Self> {
        let url = Url::parse(endpoint).map_err(|source| ClientError::InvalidUrl {
            url: endpoint.to_string(),
            source,
        })?;
        Self::from_url(url)
    }

    pub fn from_url(mut url: Url) -> Result<Self> {
        if url.cannot_be_a_base() {
            return Err(ClientError::invalid_argument(
                "endpoint",
                format!("'{}' cannot be used as a base url", url),
            ));
        }
        url.set_query(None);
        url.set_fragment(None);
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether `candidate` lies on this endpoint: same scheme, host and port,
    /// and a path at or below the endpoint's path.
    pub fn is_endpoint_for(&self, candidate: &Url) -> bool {
        if candidate.scheme() != self.url.scheme()
            || candidate.host_str() != self.url.host_str()
            || candidate.port_or_known_default() != self.url.port_or_known_default()
        {
            return false;
        }
        let path = candidate.path();
        path.starts_with(self.url.path()) || format!("{}/", path) == self.url.path()
    }

    /// The endpoint url extended by `segments`.
    pub fn join<S: AsRef<str>>(&self, segments: &[S]) -> Url {
        let mut url = self.url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        url
    }

    /// Resolves a possibly relative location against the endpoint and checks
    /// that the result lies on it.
    pub fn resolve(&self, location: &str) -> Result<Url> {
        let url = match Url::parse(location) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.url.join(location).map_err(|source| ClientError::InvalidUrl {
                    url: location.to_string(),
                    source,
                })?
            }
            Err(source) => {
                return Err(ClientError::InvalidUrl {
                    url: location.to_string(),
                    source,
                });
            }
        };
        if !self.is_endpoint_for(&url) {
            return Err(ClientError::EndpointMismatch {
                url: url.to_string(),
                endpoint: self.to_string(),
            });
        }
        Ok(url)
    }

    /// Path segments of `url` below this endpoint, without empty segments.
    fn relative_segments(&self, url: &Url) -> Vec<String> {
        let base_len = self
            .url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).count())
            .unwrap_or(0);
        url.path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .skip(base_len)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Address of a resource collection, instance or instance version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentity {
    endpoint: Endpoint,
    collection: String,
    id: Option<String>,
    version_id: Option<String>,
}

impl ResourceIdentity {
    /// Identity of a resource instance, optionally a specific version.
    pub fn new(
        endpoint: &Endpoint,
        collection: impl Into<String>,
        id: impl Into<String>,
        version_id: Option<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.clone(),
            collection: collection.into(),
            id: Some(id.into()),
            version_id,
        }
    }

    /// Url of `[endpoint]/[collection]/[id]/_history/[version]`.
    pub fn build(endpoint: &Endpoint, collection: &str, id: &str, version_id: Option<&str>) -> Url {
        Self::new(endpoint, collection, id, version_id.map(str::to_string)).to_url()
    }

    /// Parses an absolute resource url on its own, recognizing the resources
    /// of the bundled model. See [`parse_known`](Self::parse_known).
    pub fn parse(url: &str) -> Result<Self> {
        Self::parse_known(url, &ModelInspector::with_default_model())
    }

    /// Parses an absolute resource url without a known endpoint.
    ///
    /// The layout is recognized from the end of the path: a `_history` segment
    /// marks `[collection]/[id]/_history/[version]`, otherwise the collection
    /// is the second to last segment, or the last one, whichever names a
    /// resource registered with `inspector`.
    pub fn parse_known(url: &str, inspector: &ModelInspector) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|source| ClientError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let (base_len, collection, id, version_id) =
            match segments.iter().rposition(|s| *s == HISTORY_SEGMENT) {
                Some(history) if history >= 2 && history + 2 == segments.len() => (
                    history - 2,
                    segments[history - 2],
                    Some(segments[history - 1]),
                    Some(segments[history + 1]),
                ),
                Some(_) => {
                    return Err(ClientError::not_a_resource_url(url, "misplaced _history segment"));
                }
                None => match segments.as_slice() {
                    [.., collection, id] if inspector.is_registered(collection) => {
                        (segments.len() - 2, *collection, Some(*id), None)
                    }
                    [.., collection] if inspector.is_registered(collection) => {
                        (segments.len() - 1, *collection, None, None)
                    }
                    _ => {
                        return Err(ClientError::not_a_resource_url(
                            url,
                            "no segment names a known resource",
                        ));
                    }
                },
            };

        let mut base = parsed.clone();
        base.set_path(&format!("/{}", segments[..base_len].join("/")));
        Ok(Self {
            endpoint: Endpoint::from_url(base)?,
            collection: decode_segment(collection),
            id: id.map(decode_segment),
            version_id: version_id.map(decode_segment),
        })
    }

    /// Parses a location relative to a known endpoint. The location must lie
    /// on the endpoint.
    pub fn parse_on(endpoint: &Endpoint, location: &str) -> Result<Self> {
        let url = endpoint.resolve(location)?;
        let segments = endpoint.relative_segments(&url);

        let (collection, id, version_id) = match segments.as_slice() {
            [collection] => (collection, None, None),
            [collection, id] => (collection, Some(id), None),
            [collection, id, history, version] if history == HISTORY_SEGMENT => {
                (collection, Some(id), Some(version))
            }
            [] => return Err(ClientError::not_a_resource_url(location, "no collection segment")),
            _ => {
                return Err(ClientError::not_a_resource_url(
                    location,
                    "expected [collection]/[id]/_history/[version]",
                ));
            }
        };

        Ok(Self {
            endpoint: endpoint.clone(),
            collection: decode_segment(collection),
            id: id.map(|s| decode_segment(s)),
            version_id: version_id.map(|s| decode_segment(s)),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }

    /// The logical id, failing for a collection-only identity.
    pub fn require_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| ClientError::not_a_resource_url(self.to_string(), "no logical id"))
    }

    /// The same identity with the version cleared.
    pub fn without_version(&self) -> Self {
        Self {
            version_id: None,
            ..self.clone()
        }
    }

    pub fn with_version(&self, version_id: impl Into<String>) -> Self {
        Self {
            version_id: Some(version_id.into()),
            ..self.clone()
        }
    }

    pub fn is_version_specific(&self) -> bool {
        self.version_id.is_some()
    }

    pub fn is_endpoint_for(&self, candidate: &Url) -> bool {
        self.endpoint.is_endpoint_for(candidate)
    }

    pub fn to_url(&self) -> Url {
        let mut segments = vec![self.collection.as_str()];
        if let Some(id) = &self.id {
            segments.push(id);
            if let Some(version) = &self.version_id {
                segments.push(HISTORY_SEGMENT);
                segments.push(version);
            }
        }
        self.endpoint.join(&segments)
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_url().as_str())
    }
}

fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}
