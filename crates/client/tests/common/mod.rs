//! Shared test utilities for the client tests.
//!
//! [`MockTransport`] replays scripted responses in order and records every
//! request it receives, so tests can assert on both sides of an exchange
//! without a server.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use helios_fhir::model::{HumanName, Patient};
use helios_fhir::{FhirObject, ModelInspector};
use helios_fhir_client::{FhirClient, HttpRequest, HttpResponse, HttpTransport, TransportError};
use helios_serde::{ResourceFormat, serialize};
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::StatusCode;
use parking_lot::Mutex;

pub const BASE: &str = "https://example.org/fhir";

/// A transport that answers from a script.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().push_back(Ok(response));
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted response left".to_string())))
    }
}

/// A client on [`BASE`] talking to `transport`.
pub fn client(transport: &Arc<MockTransport>) -> FhirClient {
    FhirClient::new(BASE, transport.clone()).expect("valid base url")
}

/// Builds scripted responses.
pub struct ResponseBuilder {
    response: HttpResponse,
}

impl ResponseBuilder {
    pub fn status(status: StatusCode) -> Self {
        Self {
            response: HttpResponse::new(status),
        }
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.response.headers.append(
            HeaderName::from_static(name),
            HeaderValue::from_str(value).expect("valid header value"),
        );
        self
    }

    /// Encodes `object` as the body, with the matching content type.
    pub fn resource(self, object: &dyn FhirObject, format: ResourceFormat) -> Self {
        let body = serialize(object, format, &ModelInspector::with_default_model())
            .expect("fixture encodes");
        self.raw_body(format.mime_type(), body.into_bytes())
    }

    pub fn raw_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.response.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(content_type).expect("valid content type"),
        );
        self.response.body = Some(body.into());
        self
    }

    pub fn build(self) -> HttpResponse {
        self.response
    }
}

pub fn sample_patient() -> Patient {
    Patient {
        name: vec![HumanName::new("Chalmers", "Peter")],
        birth_date: Some("1974-12-25".to_string()),
        active: Some(true),
        ..Default::default()
    }
}
