//! Fluent query builder: accumulates filter state, renders it into a
//! [`Request`], sends it through a [`Transport`] and maps the elements.
//!
//! # Lifecycle
//! - Construct with [`Query::new`], bound to an [`Application`] and a [`Transport`]
//! - Chain setters; the fallible ones (`from`, `page`) return `Result<&mut Self, _>`
//! - Call [`Query::execute`]; state is kept, so the same query may run again
//!
//! Every optional setting is an `Option`: a parameter is sent only when its
//! setter was called, never with a default value.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use tracing::{debug, error, info};

use crate::clause::{self, WhereValue};
use crate::contract::{Application, Request, Transport};
use crate::error::QueryError;
use crate::model::{Collection, Model, ModelDescriptor};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_OFFSET: u32 = 0;
pub const DEFAULT_STANDARD_LAYOUT: &str = "true";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Sort direction of an `order` clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("ASC"),
            Direction::Desc => f.write_str("DESC"),
        }
    }
}

pub struct Query<'a, A: ?Sized, T: ?Sized> {
    app: &'a A,
    transport: &'a T,
    from: Option<ModelDescriptor>,
    wheres: Vec<String>,
    order: Option<String>,
    modified_after: Option<String>,
    page: Option<u32>,
    offset: Option<u32>,
    from_date: Option<String>,
    to_date: Option<String>,
    date: Option<String>,
    standard_layout: Option<String>,
}

impl<'a, A, T> Query<'a, A, T>
where
    A: Application + ?Sized,
    T: Transport + ?Sized,
{
    pub fn new(app: &'a A, transport: &'a T) -> Self {
        Self {
            app,
            transport,
            from: None,
            wheres: Vec::new(),
            order: None,
            modified_after: None,
            page: None,
            offset: None,
            from_date: None,
            to_date: None,
            date: None,
            standard_layout: None,
        }
    }

    /// Bind the model to query, validated by the application context.
    pub fn from(&mut self, identifier: &str) -> Result<&mut Self, QueryError> {
        match self.app.validate_model_class(identifier) {
            Ok(descriptor) => {
                debug!(
                    identifier,
                    model = %descriptor.name,
                    resource_uri = %descriptor.resource_uri,
                    "Bound query to model"
                );
                self.from = Some(descriptor);
                Ok(self)
            }
            Err(e) => {
                error!(error = ?e, identifier, "Model validation rejected identifier");
                Err(e)
            }
        }
    }

    /// Append an already formatted expression fragment verbatim.
    pub fn where_raw(&mut self, expression: impl Into<String>) -> &mut Self {
        let expression = expression.into();
        debug!(clause = %expression, "Added raw where clause");
        self.wheres.push(expression);
        self
    }

    /// Append a `field <op> value` clause rendered by [`clause::render`].
    pub fn where_equals(&mut self, field: &str, value: impl Into<WhereValue>) -> &mut Self {
        let rendered = clause::render(field, &value.into());
        debug!(clause = %rendered, "Added where clause");
        self.wheres.push(rendered);
        self
    }

    /// All clauses joined with ` AND `; empty when there are none.
    pub fn get_where(&self) -> String {
        clause::conjunction(&self.wheres)
    }

    /// Replace the order clause.
    pub fn order_by(&mut self, field: &str, direction: Direction) -> &mut Self {
        self.order = Some(format!("{field} {direction}"));
        self
    }

    pub fn get_order(&self) -> Option<&str> {
        self.order.as_deref()
    }

    /// Only return objects modified after `since`; `None` means since the epoch.
    pub fn modified_after(&mut self, since: Option<DateTime<FixedOffset>>) -> &mut Self {
        let since = since.unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH.fixed_offset());
        self.modified_after = Some(since.to_rfc3339_opts(SecondsFormat::Secs, false));
        self
    }

    pub fn get_modified_after(&self) -> Option<&str> {
        self.modified_after.as_deref()
    }

    pub fn from_date(&mut self, date: NaiveDate) -> &mut Self {
        self.from_date = Some(date.format(DATE_FORMAT).to_string());
        self
    }

    pub fn to_date(&mut self, date: NaiveDate) -> &mut Self {
        self.to_date = Some(date.format(DATE_FORMAT).to_string());
        self
    }

    pub fn date(&mut self, date: NaiveDate) -> &mut Self {
        self.date = Some(date.format(DATE_FORMAT).to_string());
        self
    }

    /// Pass a layout flag through to the API; see [`DEFAULT_STANDARD_LAYOUT`].
    pub fn standard_layout(&mut self, value: impl Into<String>) -> &mut Self {
        self.standard_layout = Some(value.into());
        self
    }

    /// Request one page of results. The bound model must be pageable.
    pub fn page(&mut self, page: u32) -> Result<&mut Self, QueryError> {
        let Some(descriptor) = &self.from else {
            error!(page, "page() called before a model was bound");
            return Err(QueryError::NoModel);
        };
        if !descriptor.is_pageable() {
            error!(model = %descriptor.name, page, "Model does not support paging");
            return Err(QueryError::UnsupportedOperation {
                model: descriptor.name.clone(),
                operation: "paging",
            });
        }
        self.page = Some(page);
        Ok(self)
    }

    pub fn offset(&mut self, offset: u32) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn get_from(&self) -> Option<&ModelDescriptor> {
        self.from.as_ref()
    }

    /// Render the current state into a request without sending it.
    pub fn request(&self) -> Result<Request, QueryError> {
        let descriptor = self.from.as_ref().ok_or(QueryError::NoModel)?;
        let mut request = Request::get(descriptor);

        let wheres = self.get_where();
        if !wheres.is_empty() {
            request.set_parameter("where", wheres);
        }
        if let Some(order) = &self.order {
            request.set_parameter("order", order);
        }
        if let Some(since) = &self.modified_after {
            request.set_header("If-Modified-Since", since);
        }
        if let Some(from_date) = &self.from_date {
            request.set_parameter("fromDate", from_date);
        }
        if let Some(to_date) = &self.to_date {
            request.set_parameter("toDate", to_date);
        }
        if let Some(date) = &self.date {
            request.set_parameter("date", date);
        }
        if let Some(page) = self.page {
            request.set_parameter("page", page);
        }
        if let Some(offset) = self.offset {
            request.set_parameter("offset", offset);
        }
        if let Some(layout) = &self.standard_layout {
            request.set_parameter("standardLayout", layout);
        }

        Ok(request)
    }

    /// Send the query and build one `M` per returned element, in response order.
    pub async fn execute<M: Model>(&self) -> Result<Collection<M>, QueryError> {
        let request = self.request()?;
        let descriptor = self.from.as_ref().ok_or(QueryError::NoModel)?;

        info!(
            model = %descriptor.name,
            resource_uri = %request.resource_uri,
            parameters = request.parameters.len(),
            "Sending query"
        );
        let response = self.transport.send(request).await.map_err(|e| {
            error!(error = ?e, model = %descriptor.name, "Query transport failed");
            QueryError::from(e)
        })?;

        let elements = response
            .elements
            .into_iter()
            .map(|fields| M::from_field_map(descriptor, fields))
            .collect::<Result<Collection<M>, QueryError>>()?;

        info!(model = %descriptor.name, count = elements.len(), "Mapped query results");
        Ok(elements)
    }
}
