#![doc = "xero-query-core: query builder core for the Xero accounting API."]

//! This crate turns chained filter calls into the `where`/`order`/paging
//! parameters of a GET request and maps the returned elements into a typed
//! collection. Transport, URL construction and authentication live behind the
//! [`contract::Transport`] trait; model validation lives behind
//! [`contract::Application`].
//!
//! # Usage
//! ```ignore
//! let mut query = Query::new(&registry, &transport);
//! query
//!     .from("Contact")?
//!     .where_equals("ContactStatus", "ACTIVE")
//!     .order_by("Name", Direction::Asc)
//!     .page(1)?;
//! let contacts: Collection<Record> = query.execute().await?;
//! ```

pub mod clause;
pub mod config;
pub mod contract;
pub mod error;
pub mod model;
pub mod query;
pub mod registry;

pub use clause::WhereValue;
pub use contract::{Application, FieldMap, Request, Response, Transport};
pub use error::{QueryError, TransportError};
pub use model::{Collection, Model, ModelDescriptor, Record};
pub use query::{Direction, Query};
pub use registry::ModelRegistry;
