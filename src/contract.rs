#![allow(unused)]

//! # contract: collaborator interfaces for the query builder
//!
//! The builder never talks to the network or to the model layer directly.
//! It reaches both through the two traits defined here:
//!
//! - [`Application`] validates a model identifier and hands back its
//!   [`ModelDescriptor`] (resource location plus capabilities).
//! - [`Transport`] sends a rendered [`Request`] and returns a [`Response`]
//!   holding the raw element records.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`; `MockApplication` and
//!   `MockTransport` are exported under the default `test-export-mocks`
//!   feature so downstream crates can use them in their own tests.

use async_trait::async_trait;
use mockall::{automock, predicate::*};
use serde::Serialize;

use crate::error::{QueryError, TransportError};
use crate::model::ModelDescriptor;

/// One element record of a response: field name to raw JSON value.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// A GET request rendered from a query, ready for a transport to send.
///
/// Parameters and headers keep insertion order; setting an existing name
/// replaces its value in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    pub method: &'static str,
    pub resource_uri: String,
    pub api_stem: String,
    pub parameters: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub const METHOD_GET: &'static str = "GET";

    /// A GET request against the resource the descriptor points at.
    pub fn get(descriptor: &ModelDescriptor) -> Self {
        Self {
            method: Self::METHOD_GET,
            resource_uri: descriptor.resource_uri.clone(),
            api_stem: descriptor.api_stem.clone(),
            parameters: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn set_parameter(&mut self, name: &str, value: impl ToString) -> &mut Self {
        upsert(&mut self.parameters, name, value.to_string());
        self
    }

    pub fn set_header(&mut self, name: &str, value: impl ToString) -> &mut Self {
        upsert(&mut self.headers, name, value.to_string());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        lookup(&self.parameters, name)
    }

    /// Header names compare case-insensitively, as in HTTP.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn upsert(pairs: &mut Vec<(String, String)>, name: &str, value: String) {
    match pairs.iter_mut().find(|(key, _)| key == name) {
        Some(slot) => slot.1 = value,
        None => pairs.push((name.to_string(), value)),
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// What a transport hands back after a successful send.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub elements: Vec<FieldMap>,
}

impl Response {
    pub fn new(elements: Vec<FieldMap>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[FieldMap] {
        &self.elements
    }
}

/// Application/session context the builder is bound to.
///
/// Only used to validate model identifiers; the builder never mutates it.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Application: Send + Sync {
    /// Resolve an identifier (e.g. `Contact` or `Accounting\Contact`) to the
    /// descriptor of the model it names.
    fn validate_model_class(&self, identifier: &str) -> Result<ModelDescriptor, QueryError>;
}

/// Sends rendered requests to the remote API.
///
/// Implementors own URL construction, authentication, timeouts and body
/// parsing. Errors are returned as-is to the caller of `Query::execute`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}
