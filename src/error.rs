//! Error types for query building and execution.

use thiserror::Error;

/// Errors raised by the builder itself or propagated from its collaborators.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The application context rejected the requested model identifier
    #[error("{identifier} is not a valid model class")]
    InvalidModel { identifier: String },

    /// The bound model does not support the requested operation
    #[error("{model} does not support {operation}.")]
    UnsupportedOperation {
        model: String,
        operation: &'static str,
    },

    /// An operation that needs a bound model was called before `from`
    #[error("no model bound to the query; call from() first")]
    NoModel,

    /// A response element could not be turned into the requested model type
    #[error("could not build {model} from response element: {message}")]
    Mapping { model: String, message: String },

    /// Failure reported by the transport, passed through untouched
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failures inside a [`crate::contract::Transport`] implementation.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request never produced an HTTP response
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// The remote API answered with a non-success status
    #[error("{url} responded with HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The response body could not be read as a list of elements
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}
