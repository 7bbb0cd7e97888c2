//! The protocol orchestrator.
//!
//! Every operation follows the same path:
//!
//! ```text
//! Building ──> Sent ──┬──> Accepted ──> Decoded
//!                     └──> Rejected ──┬──> OutcomeRecovered
//!                                     └──> OutcomeUnavailable
//! ```
//!
//! The accepted status codes are fixed per operation. A rejection becomes
//! [`ClientError::OperationRejected`] carrying whatever outcome the body
//! yields. Nothing is retried here.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use helios_fhir::model::{Bundle, BundleKind, Conformance, OperationOutcome, Tag, TagList};
use helios_fhir::{FhirCode, FhirObject, FhirResource, FhirType, ModelInspector, Primitive, Resource};
use helios_serde::{EncodedBody, ResourceFormat, SerializationError};
use http::{HeaderValue, Method, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::entry::{DeleteOutcome, PageDirection, ResourceEntry};
use crate::error::{ClientError, Result};
use crate::headers::{
    self, ACCEPT, CATEGORY, CONTENT_LOCATION, CONTENT_TYPE, LAST_MODIFIED, LOCATION,
};
use crate::identity::{Endpoint, ResourceIdentity};
use crate::rest_url::{RestUrl, params};
use crate::search::SearchParams;
use crate::tags::{build_category_header, parse_category_header};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

const OK: &[StatusCode] = &[StatusCode::OK];
const OK_OR_CREATED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];
const CREATED: &[StatusCode] = &[StatusCode::CREATED];
const NO_CONTENT: &[StatusCode] = &[StatusCode::NO_CONTENT];
const DELETE_ACCEPTED: &[StatusCode] = &[StatusCode::NO_CONTENT, StatusCode::NOT_FOUND, StatusCode::GONE];

/// A blocking client for one FHIR server endpoint.
///
/// The client holds no per-call state; it can be shared between threads and
/// every call is one request/response exchange on the transport.
#[derive(Clone)]
pub struct FhirClient {
    endpoint: Endpoint,
    transport: Arc<dyn HttpTransport>,
    inspector: Arc<ModelInspector>,
    preferred_format: ResourceFormat,
    use_format_param: bool,
}

impl std::fmt::Debug for FhirClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FhirClient")
            .field("endpoint", &self.endpoint)
            .field("preferred_format", &self.preferred_format)
            .field("use_format_param", &self.use_format_param)
            .finish_non_exhaustive()
    }
}

impl FhirClient {
    /// Creates a client for `endpoint`, which must be an absolute url.
    pub fn new(endpoint: &str, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::parse(endpoint)?,
            transport,
            inspector: Arc::new(ModelInspector::with_default_model()),
            preferred_format: ResourceFormat::default(),
            use_format_param: false,
        })
    }

    /// Creates a client talking through a [`ReqwestTransport`](crate::ReqwestTransport)
    /// configured from `config`.
    #[cfg(feature = "reqwest-transport")]
    pub fn with_config(config: &crate::config::ClientConfig) -> Result<Self> {
        let format = config.preferred_format().ok_or_else(|| {
            ClientError::invalid_argument("format", format!("unknown format '{}'", config.format))
        })?;
        let transport = crate::transport::ReqwestTransport::from_config(config)?;
        Ok(Self::new(&config.base_url, Arc::new(transport))?
            .with_preferred_format(format)
            .with_format_param(config.use_format_param))
    }

    /// Uses a shared metadata cache instead of a private one.
    pub fn with_inspector(mut self, inspector: Arc<ModelInspector>) -> Self {
        self.inspector = inspector;
        self
    }

    /// Format of request bodies and of the `Accept` header.
    pub fn with_preferred_format(mut self, format: ResourceFormat) -> Self {
        self.preferred_format = format;
        self
    }

    /// Also ask for the preferred format through the `_format` parameter.
    pub fn with_format_param(mut self, use_format_param: bool) -> Self {
        self.use_format_param = use_format_param;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn preferred_format(&self) -> ResourceFormat {
        self.preferred_format
    }

    pub fn inspector(&self) -> &ModelInspector {
        &self.inspector
    }

    // ---------------------------------------------------------------------
    // Conformance and reads
    // ---------------------------------------------------------------------

    /// Fetches the server's conformance statement, from `[base]/metadata` or
    /// with `OPTIONS [base]`.
    pub fn conformance(&self, use_options_verb: bool) -> Result<Conformance> {
        let request = if use_options_verb {
            self.request(Method::OPTIONS, RestUrl::endpoint(&self.endpoint))
        } else {
            self.request(Method::GET, RestUrl::metadata(&self.endpoint))
        };
        let response = self.execute("conformance", request, OK)?;
        self.decode_required(&response)
    }

    /// Reads a resource instance or one of its versions.
    ///
    /// `location` may be relative to the endpoint; absolute locations must
    /// lie on it.
    pub fn read<T: FhirResource>(&self, location: &str) -> Result<ResourceEntry<T>> {
        let identity = self.instance_identity(location)?;
        let response = self.execute("read", self.get(identity.to_url()), OK)?;
        let resource = self.decode_required::<T>(&response)?;
        self.entry_from_response(&response, Some(resource), Some(identity))
    }

    /// Reads a resource whose type is only known from the location.
    pub fn read_resource(&self, location: &str) -> Result<ResourceEntry<Resource>> {
        let identity = self.instance_identity(location)?;
        let response = self.execute("read", self.get(identity.to_url()), OK)?;
        let body = Self::response_body(&response)?.ok_or_else(|| self.empty_body())?;
        let resource = helios_serde::deserialize_resource(&body, &self.inspector)?;
        self.entry_from_response(&response, Some(resource), Some(identity))
    }

    /// Reads the current version of the entry's resource.
    pub fn refresh<T: FhirResource>(&self, entry: &ResourceEntry<T>) -> Result<ResourceEntry<T>> {
        let id = entry
            .id
            .as_ref()
            .ok_or_else(|| ClientError::invalid_argument("entry", "the entry has no id"))?;
        self.read(id.to_url().as_str())
    }

    /// Reads exactly the version the server just reported.
    fn refresh_version<T: FhirResource>(&self, entry: &ResourceEntry<T>) -> Result<ResourceEntry<T>> {
        let location = entry.location().ok_or_else(|| {
            ClientError::invalid_argument("refresh", "the server returned no location to refresh from")
        })?;
        self.read(location.to_url().as_str())
    }

    // ---------------------------------------------------------------------
    // Create, update, delete
    // ---------------------------------------------------------------------

    /// Creates a resource with a server assigned id.
    ///
    /// With `refresh`, the stored version is read back from the location the
    /// server reported.
    pub fn create<T: FhirResource>(
        &self,
        resource: &T,
        tags: &[Tag],
        refresh: bool,
    ) -> Result<ResourceEntry<T>> {
        let mut request = self.request(
            Method::POST,
            RestUrl::for_collection(&self.endpoint, T::collection_name()),
        );
        self.set_body(&mut request, resource)?;
        Self::set_tags(&mut request, tags)?;

        let response = self.execute("create", request, OK_OR_CREATED)?;
        self.finish_write(&response, resource, refresh)
    }

    /// Creates a resource under a client assigned id.
    pub fn create_with_id<T: FhirResource>(
        &self,
        resource: &T,
        id: &str,
        tags: &[Tag],
        refresh: bool,
    ) -> Result<ResourceEntry<T>> {
        if id.is_empty() {
            return Err(ClientError::invalid_argument("id", "the id is empty"));
        }
        let url = ResourceIdentity::build(&self.endpoint, T::collection_name(), id, None);
        let mut request = self.request(Method::PUT, RestUrl::from_url(url));
        self.set_body(&mut request, resource)?;
        Self::set_tags(&mut request, tags)?;

        let response = self.execute("create", request, CREATED)?;
        self.finish_write(&response, resource, refresh)
    }

    /// Stores a new version of the entry's resource.
    ///
    /// When the entry carries a self link it is sent as `Content-Location`,
    /// letting the server reject the update if a newer version exists.
    pub fn update<T: FhirResource>(
        &self,
        entry: &ResourceEntry<T>,
        refresh: bool,
    ) -> Result<ResourceEntry<T>> {
        let id = entry
            .id
            .as_ref()
            .ok_or_else(|| ClientError::invalid_argument("entry", "the entry has no id"))?;
        id.require_id()?;
        let resource = entry
            .resource
            .as_ref()
            .ok_or_else(|| ClientError::invalid_argument("entry", "the entry has no resource"))?;

        let mut request = self.request(Method::PUT, RestUrl::from_url(id.without_version().to_url()));
        self.set_body(&mut request, resource)?;
        Self::set_tags(&mut request, &entry.tags)?;
        if let Some(self_link) = &entry.self_link {
            request.set_header(CONTENT_LOCATION, Self::header_value("self link", self_link.to_url().as_str())?);
        }

        let response = self.execute("update", request, OK_OR_CREATED)?;
        self.finish_write(&response, resource, refresh)
    }

    /// Deletes a resource.
    ///
    /// A resource that is already deleted or never existed is not an error:
    /// the server's 404 or 410 comes back as [`DeleteOutcome::AlreadyGone`].
    pub fn delete(&self, location: &str) -> Result<DeleteOutcome> {
        let identity = self.instance_identity(location)?;
        let request = self.request(Method::DELETE, RestUrl::from_url(identity.to_url()));
        let response = self.execute("delete", request, DELETE_ACCEPTED)?;

        if response.status == StatusCode::NO_CONTENT {
            Ok(DeleteOutcome::Deleted)
        } else {
            debug!(location = %identity, status = %response.status, "Resource already gone");
            Ok(DeleteOutcome::AlreadyGone(response.status))
        }
    }

    pub fn delete_entry<T>(&self, entry: &ResourceEntry<T>) -> Result<DeleteOutcome> {
        let id = entry
            .id
            .as_ref()
            .ok_or_else(|| ClientError::invalid_argument("entry", "the entry has no id"))?;
        self.delete(id.to_url().as_str())
    }

    // ---------------------------------------------------------------------
    // History and search
    // ---------------------------------------------------------------------

    /// History of every resource of type `T`.
    pub fn type_history<T: FhirResource>(
        &self,
        since: Option<DateTime<FixedOffset>>,
        count: Option<u32>,
    ) -> Result<Bundle> {
        let url = RestUrl::collection_history(&self.endpoint, T::collection_name());
        self.history_request(url, since, count)
    }

    /// History of one resource instance.
    pub fn history(
        &self,
        location: &str,
        since: Option<DateTime<FixedOffset>>,
        count: Option<u32>,
    ) -> Result<Bundle> {
        let identity = self.instance_identity(location)?;
        let url = RestUrl::resource_history(&self.endpoint, identity.collection(), identity.require_id()?);
        self.history_request(url, since, count)
    }

    /// History of everything on the server.
    pub fn whole_system_history(
        &self,
        since: Option<DateTime<FixedOffset>>,
        count: Option<u32>,
    ) -> Result<Bundle> {
        self.history_request(RestUrl::server_history(&self.endpoint), since, count)
    }

    fn history_request(
        &self,
        mut url: RestUrl,
        since: Option<DateTime<FixedOffset>>,
        count: Option<u32>,
    ) -> Result<Bundle> {
        if let Some(since) = since {
            url.push_param(params::SINCE, Primitive::Instant(since).to_lexical());
        }
        if let Some(count) = count {
            url.push_param(params::COUNT, count.to_string());
        }
        let response = self.execute("history", self.request(Method::GET, url), OK)?;
        self.decode_required(&response)
    }

    /// Searches the resources of type `T`.
    pub fn search<T: FhirResource>(&self, search: &SearchParams) -> Result<Bundle> {
        self.search_collection(T::collection_name(), search)
    }

    /// Searches a collection given by name.
    pub fn search_collection(&self, collection: &str, search: &SearchParams) -> Result<Bundle> {
        if collection.is_empty() {
            return Err(ClientError::invalid_argument("collection", "the collection is empty"));
        }
        self.search_request(RestUrl::search(&self.endpoint, collection), search)
    }

    /// Searches across all resource types.
    pub fn whole_system_search(&self, search: &SearchParams) -> Result<Bundle> {
        self.search_request(RestUrl::endpoint(&self.endpoint), search)
    }

    /// Searches for the resource of type `T` with logical id `id`, plus the
    /// resources reached through `includes`.
    pub fn search_by_id<T: FhirResource>(&self, id: &str, includes: &[&str]) -> Result<Bundle> {
        if id.is_empty() {
            return Err(ClientError::invalid_argument("id", "the id is empty"));
        }
        let search = SearchParams::new()
            .criterion(params::ID, id)
            .includes(includes.iter().copied());
        self.search::<T>(&search)
    }

    fn search_request(&self, url: RestUrl, search: &SearchParams) -> Result<Bundle> {
        let request = self.request(Method::GET, search.apply(url));
        let response = self.execute("search", request, OK)?;
        self.decode_required(&response)
    }

    /// Fetches the page `direction` points to, `None` when the bundle has no
    /// such link.
    pub fn continue_bundle(&self, bundle: &Bundle, direction: PageDirection) -> Result<Option<Bundle>> {
        let Some(link) = bundle.link(direction.relation()) else {
            debug!(relation = direction.relation(), "Bundle has no link to continue with");
            return Ok(None);
        };
        let url = self.endpoint.resolve(link)?;
        let response = self.execute("continue", self.request_to(Method::GET, url), OK)?;
        self.decode_required(&response).map(Some)
    }

    // ---------------------------------------------------------------------
    // Bundle submission
    // ---------------------------------------------------------------------

    /// Submits a collection bundle as a transaction; returns the server's
    /// response bundle.
    pub fn transaction(&self, bundle: &Bundle) -> Result<Bundle> {
        Self::require_bundle_kind("transaction", bundle, &[BundleKind::Collection])?;
        let mut request = self.request(Method::POST, RestUrl::endpoint(&self.endpoint));
        self.set_body(&mut request, bundle)?;
        let response = self.execute("transaction", request, OK)?;
        self.decode_required(&response)
    }

    /// Submits a document bundle to `[base]/Document`.
    pub fn document(&self, bundle: &Bundle) -> Result<()> {
        Self::require_bundle_kind("document", bundle, &[BundleKind::Document])?;
        let mut request = self.request(Method::POST, RestUrl::document(&self.endpoint));
        self.set_body(&mut request, bundle)?;
        self.execute("document", request, NO_CONTENT)?;
        Ok(())
    }

    /// Delivers a document or message bundle to `[base]/Mailbox`.
    pub fn deliver_to_mailbox(&self, bundle: &Bundle) -> Result<Bundle> {
        Self::require_bundle_kind("mailbox", bundle, &[BundleKind::Document, BundleKind::Message])?;
        let mut request = self.request(Method::POST, RestUrl::mailbox(&self.endpoint));
        self.set_body(&mut request, bundle)?;
        let response = self.execute("mailbox", request, OK)?;
        self.decode_required(&response)
    }

    fn require_bundle_kind(operation: &'static str, bundle: &Bundle, allowed: &[BundleKind]) -> Result<()> {
        let kind = bundle.kind();
        if allowed.contains(&kind) {
            return Ok(());
        }
        Err(ClientError::InvalidBundleKind {
            operation,
            expected: allowed
                .iter()
                .map(|k| k.as_code())
                .collect::<Vec<_>>()
                .join(" or "),
            found: kind.as_code().to_string(),
        })
    }

    // ---------------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------------

    /// Asks the server whether `resource` could be created.
    ///
    /// `None` means valid. A rejected validation returns the server's
    /// outcome; only a rejection without any outcome is an error.
    pub fn validate_create<T: FhirResource>(
        &self,
        resource: &T,
        tags: &[Tag],
    ) -> Result<Option<OperationOutcome>> {
        let url = RestUrl::validate(&self.endpoint, T::collection_name(), None);
        let mut request = self.request(Method::POST, url);
        self.set_body(&mut request, resource)?;
        Self::set_tags(&mut request, tags)?;
        self.validation_request(request)
    }

    /// Asks the server whether the entry's resource could be stored as its
    /// next version.
    pub fn validate_update<T: FhirResource>(
        &self,
        entry: &ResourceEntry<T>,
    ) -> Result<Option<OperationOutcome>> {
        let id = entry
            .id
            .as_ref()
            .ok_or_else(|| ClientError::invalid_argument("entry", "the entry has no id"))?;
        let resource = entry
            .resource
            .as_ref()
            .ok_or_else(|| ClientError::invalid_argument("entry", "the entry has no resource"))?;

        let url = RestUrl::validate(&self.endpoint, id.collection(), Some(id.require_id()?));
        let mut request = self.request(Method::POST, url);
        self.set_body(&mut request, resource)?;
        Self::set_tags(&mut request, &entry.tags)?;
        if let Some(self_link) = &entry.self_link {
            request.set_header(CONTENT_LOCATION, Self::header_value("self link", self_link.to_url().as_str())?);
        }
        self.validation_request(request)
    }

    fn validation_request(&self, request: HttpRequest) -> Result<Option<OperationOutcome>> {
        match self.execute("validate", request, OK) {
            Ok(_) => Ok(None),
            Err(ClientError::OperationRejected {
                outcome: Some(outcome),
                ..
            }) => Ok(Some(outcome)),
            Err(e) => Err(e),
        }
    }

    // ---------------------------------------------------------------------
    // Tags
    // ---------------------------------------------------------------------

    /// Every tag in use on the server.
    pub fn whole_system_tags(&self) -> Result<Vec<Tag>> {
        self.tags_request(RestUrl::server_tags(&self.endpoint))
    }

    /// Every tag in use on resources of type `T`.
    pub fn type_tags<T: FhirResource>(&self) -> Result<Vec<Tag>> {
        self.collection_tags(T::collection_name())
    }

    pub fn collection_tags(&self, collection: &str) -> Result<Vec<Tag>> {
        if collection.is_empty() {
            return Err(ClientError::invalid_argument("collection", "the collection is empty"));
        }
        self.tags_request(RestUrl::collection_tags(&self.endpoint, collection))
    }

    /// Tags of a resource instance, or of one version when `location` is
    /// version specific.
    pub fn tags(&self, location: &str) -> Result<Vec<Tag>> {
        self.tags_request(self.resource_tags_url(location, false)?)
    }

    /// Adds tags to a resource instance or version. This does not create a
    /// new version.
    pub fn affix_tags(&self, location: &str, tags: &[Tag]) -> Result<()> {
        let url = self.resource_tags_url(location, false)?;
        self.post_tag_list("affix tags", url, tags)
    }

    /// Removes tags from a resource instance or version. This does not create
    /// a new version.
    pub fn delete_tags(&self, location: &str, tags: &[Tag]) -> Result<()> {
        let url = self.resource_tags_url(location, true)?;
        self.post_tag_list("delete tags", url, tags)
    }

    fn resource_tags_url(&self, location: &str, delete: bool) -> Result<RestUrl> {
        let identity = self.instance_identity(location)?;
        let id = identity.require_id()?;
        let build = if delete {
            RestUrl::delete_resource_tags
        } else {
            RestUrl::resource_tags
        };
        Ok(build(&self.endpoint, identity.collection(), id, identity.version_id()))
    }

    fn tags_request(&self, url: RestUrl) -> Result<Vec<Tag>> {
        let response = self.execute("tags", self.request(Method::GET, url), OK)?;
        let list: TagList = self.decode_required(&response)?;
        Ok(list.category)
    }

    fn post_tag_list(&self, operation: &'static str, url: RestUrl, tags: &[Tag]) -> Result<()> {
        let mut request = self.request(Method::POST, url);
        self.set_body(&mut request, &TagList::new(tags.to_vec()))?;
        self.execute(operation, request, OK)?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Requests
    // ---------------------------------------------------------------------

    /// Identity of `location`, which must name a resource instance.
    fn instance_identity(&self, location: &str) -> Result<ResourceIdentity> {
        let identity = ResourceIdentity::parse_on(&self.endpoint, location)?;
        identity.require_id()?;
        Ok(identity)
    }

    fn request(&self, method: Method, mut url: RestUrl) -> HttpRequest {
        if self.use_format_param {
            url.push_param(params::FORMAT, self.preferred_format.format_param());
        }
        self.request_to(method, url.into_url())
    }

    fn get(&self, url: Url) -> HttpRequest {
        self.request(Method::GET, RestUrl::from_url(url))
    }

    /// A request against a url taken as is.
    fn request_to(&self, method: Method, url: Url) -> HttpRequest {
        let mut request = HttpRequest::new(method, url);
        request.set_header(ACCEPT, headers::accept(self.preferred_format));
        request
    }

    fn set_body(&self, request: &mut HttpRequest, object: &dyn FhirObject) -> Result<()> {
        let body = helios_serde::serialize(object, self.preferred_format, &self.inspector)?;
        request.set_header(CONTENT_TYPE, headers::content_type(body.format()));
        request.body = Some(body.into_bytes());
        Ok(())
    }

    fn set_tags(request: &mut HttpRequest, tags: &[Tag]) -> Result<()> {
        if tags.is_empty() {
            return Ok(());
        }
        let header = build_category_header(tags)?;
        request.set_header(CATEGORY, Self::header_value("tags", &header)?);
        Ok(())
    }

    fn header_value(name: &'static str, value: &str) -> Result<HeaderValue> {
        HeaderValue::from_str(value).map_err(|e| ClientError::invalid_argument(name, e.to_string()))
    }

    /// Sends the request and checks the status against `accepted`.
    fn execute(
        &self,
        operation: &'static str,
        request: HttpRequest,
        accepted: &[StatusCode],
    ) -> Result<HttpResponse> {
        debug!(
            operation = operation,
            method = %request.method,
            url = %request.url,
            "Sending request"
        );

        let response = self.transport.send(&request).map_err(|e| {
            warn!(operation = operation, url = %request.url, error = %e, "Transport failure");
            ClientError::Transport(e)
        })?;

        if accepted.contains(&response.status) {
            debug!(operation = operation, status = %response.status, "Request accepted");
            return Ok(response);
        }

        let outcome = self.recover_outcome(&response);
        warn!(
            operation = operation,
            status = %response.status,
            outcome_recovered = outcome.is_some(),
            "Request rejected"
        );
        Err(ClientError::OperationRejected {
            status: response.status,
            outcome,
        })
    }

    /// The outcome of a rejected request: the decoded body if it is an
    /// `OperationOutcome`, otherwise the raw body text as a message.
    fn recover_outcome(&self, response: &HttpResponse) -> Option<OperationOutcome> {
        match Self::response_body(response) {
            Ok(Some(body)) => {
                match helios_serde::deserialize::<OperationOutcome>(&body, &self.inspector) {
                    Ok(outcome) => return Some(outcome),
                    Err(e) => debug!(error = %e, "Rejection body is not an OperationOutcome"),
                }
            }
            Ok(None) => return None,
            Err(e) => debug!(error = %e, "Rejection body has no usable content type"),
        }

        let text = response.body_text();
        (!text.is_empty()).then(|| OperationOutcome::for_message(text))
    }

    // ---------------------------------------------------------------------
    // Responses
    // ---------------------------------------------------------------------

    /// The response body tagged with the format its `Content-Type` names.
    fn response_body(response: &HttpResponse) -> Result<Option<EncodedBody>> {
        let Some(bytes) = &response.body else {
            return Ok(None);
        };
        let content_type = response.content_type().unwrap_or_default();
        let format = ResourceFormat::from_content_type(content_type).ok_or_else(|| {
            SerializationError::UnsupportedFormat(if content_type.is_empty() {
                "response has no content type".to_string()
            } else {
                content_type.to_string()
            })
        })?;
        Ok(Some(EncodedBody::new(format, bytes.clone())))
    }

    fn decode<T: FhirType>(&self, response: &HttpResponse) -> Result<Option<T>> {
        match Self::response_body(response)? {
            Some(body) => Ok(Some(helios_serde::deserialize(&body, &self.inspector)?)),
            None => Ok(None),
        }
    }

    fn decode_required<T: FhirType>(&self, response: &HttpResponse) -> Result<T> {
        self.decode(response)?.ok_or_else(|| self.empty_body())
    }

    fn empty_body(&self) -> ClientError {
        SerializationError::malformed(self.preferred_format, "the response has no body").into()
    }

    /// Reads identity, modification time and tags from the response headers.
    ///
    /// `Location` (or else `Content-Location`) wins over `requested`, and
    /// must lie on the endpoint.
    fn entry_from_response<T>(
        &self,
        response: &HttpResponse,
        resource: Option<T>,
        requested: Option<ResourceIdentity>,
    ) -> Result<ResourceEntry<T>> {
        let location = response
            .header(LOCATION)
            .or_else(|| response.header(CONTENT_LOCATION));
        let identity = match location {
            Some(location) => Some(ResourceIdentity::parse_on(&self.endpoint, location)?),
            None => requested,
        };

        let tags = match response.header(CATEGORY) {
            Some(value) => parse_category_header(value)?,
            None => Vec::new(),
        };

        let mut entry = ResourceEntry {
            resource,
            id: None,
            self_link: None,
            last_updated: response.header(LAST_MODIFIED).and_then(headers::parse_last_modified),
            tags,
        };
        if let Some(identity) = identity {
            entry = entry.with_id(identity);
        }
        Ok(entry)
    }

    /// Builds the result of a create or update, optionally re-reading the
    /// stored version.
    fn finish_write<T: FhirResource>(
        &self,
        response: &HttpResponse,
        submitted: &T,
        refresh: bool,
    ) -> Result<ResourceEntry<T>> {
        let resource = self.decode::<T>(response)?.unwrap_or_else(|| submitted.clone());
        let entry = self.entry_from_response(response, Some(resource), None)?;
        if entry.id.is_none() {
            warn!("Server did not report the location of the stored resource");
        }

        if refresh {
            self.refresh_version(&entry)
        } else {
            Ok(entry)
        }
    }
}
