//! # helios-fhir-client - Blocking FHIR REST client
//!
//! A client for the FHIR RESTful API on top of the metadata-driven
//! serialization in [`helios_serde`]. Each operation builds a url, encodes
//! the body if there is one, sends the request through an [`HttpTransport`]
//! and checks the status code against the set that operation accepts.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use helios_fhir::model::Patient;
//! use helios_fhir_client::{ClientConfig, FhirClient};
//!
//! let client = FhirClient::with_config(&ClientConfig::from_env())?;
//!
//! let created = client.create(&Patient::default(), &[], false)?;
//! let location = created.location().expect("server reported a location");
//! let entry = client.read::<Patient>(location.to_url().as_str())?;
//! ```
//!
//! ## Interactions
//!
//! | Operation | HTTP Method | Url | Accepted |
//! |-----------|-------------|-----|----------|
//! | conformance | GET / OPTIONS | `[base]/metadata` / `[base]` | 200 |
//! | read | GET | `[base]/[type]/[id](/_history/[vid])` | 200 |
//! | create | POST | `[base]/[type]` | 200, 201 |
//! | create with id | PUT | `[base]/[type]/[id]` | 201 |
//! | update | PUT | `[base]/[type]/[id]` | 200, 201 |
//! | delete | DELETE | `[base]/[type]/[id]` | 204, 404, 410 |
//! | history | GET | `[base](/[type](/[id]))/_history` | 200 |
//! | search | GET | `[base]/[type]/_search`, `[base]` | 200 |
//! | transaction | POST | `[base]` | 200 |
//! | document | POST | `[base]/Document` | 204 |
//! | mailbox | POST | `[base]/Mailbox` | 200 |
//! | validate | POST | `[base]/[type]/_validate(/[id])` | 200 |
//! | tags | GET | `[base](/[type](/[id](/_history/[vid])))/_tags` | 200 |
//! | affix / delete tags | POST | `.../_tags`, `.../_tags/_delete` | 200 |
//!
//! ## HTTP Headers
//!
//! - `Accept` / `Content-Type` - the preferred [`ResourceFormat`](helios_serde::ResourceFormat)
//! - `Location` / `Content-Location` - identity of the stored resource, and
//!   the version an update is based on
//! - `Last-Modified` - modification time of the returned resource
//! - `Category` - tags, see [`tags`]
//!
//! ## Error Handling
//!
//! Defects (bad urls, unusable bodies, wrong bundle kinds) and server
//! rejections are both [`ClientError`]s; [`ClientError::is_rejection`] tells
//! them apart, and a rejection carries the server's `OperationOutcome` when
//! one could be recovered.
//!
//! ## Features
//!
//! - `reqwest-transport` (default): [`ReqwestTransport`], a blocking
//!   transport built on `reqwest`
//! - `xml` (default): XML bodies

pub mod client;
pub mod config;
pub mod entry;
pub mod error;
pub mod headers;
pub mod identity;
pub mod rest_url;
pub mod search;
pub mod tags;
pub mod transport;

pub use client::FhirClient;
pub use config::ClientConfig;
pub use entry::{DeleteOutcome, PageDirection, ResourceEntry};
pub use error::{ClientError, Result, TagError};
pub use identity::{Endpoint, ResourceIdentity};
pub use rest_url::RestUrl;
pub use search::SearchParams;
pub use tags::{build_category_header, parse_category_header};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

#[cfg(feature = "reqwest-transport")]
pub use transport::ReqwestTransport;

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over `level`.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("helios_fhir_client={},helios_serde={}", level, level))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
