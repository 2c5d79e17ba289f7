use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::contract::FieldMap;
use crate::error::QueryError;

/// Capability set of a queryable model type: where it lives and what it supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model name, e.g. `Contact`.
    pub name: String,
    /// Resource path relative to the API stem, e.g. `Contacts`.
    pub resource_uri: String,
    /// API namespace the resource lives under, e.g. `api.xro/2.0`.
    pub api_stem: String,
    /// Whether the remote endpoint accepts a `page` parameter.
    #[serde(default)]
    pub pageable: bool,
}

impl ModelDescriptor {
    pub fn new(
        name: impl Into<String>,
        resource_uri: impl Into<String>,
        api_stem: impl Into<String>,
        pageable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            resource_uri: resource_uri.into(),
            api_stem: api_stem.into(),
            pageable,
        }
    }

    pub fn is_pageable(&self) -> bool {
        self.pageable
    }

    pub fn resource_uri(&self) -> &str {
        &self.resource_uri
    }

    pub fn api_stem(&self) -> &str {
        &self.api_stem
    }
}

/// A type that can be instantiated from one response element.
pub trait Model: Sized {
    fn from_field_map(descriptor: &ModelDescriptor, fields: FieldMap) -> Result<Self, QueryError>;
}

/// Untyped model object: the bound model's name plus its raw fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub model: String,
    pub fields: FieldMap,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(serde_json::Value::as_str)
    }

    /// Convert the raw fields into a concrete serde type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, QueryError> {
        serde_json::from_value(serde_json::Value::Object(self.fields.clone())).map_err(|e| {
            QueryError::Mapping {
                model: self.model.clone(),
                message: e.to_string(),
            }
        })
    }
}

impl Model for Record {
    fn from_field_map(descriptor: &ModelDescriptor, fields: FieldMap) -> Result<Self, QueryError> {
        Ok(Record {
            model: descriptor.name.clone(),
            fields,
        })
    }
}

/// Ordered results of an executed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Collection<M> {
    items: Vec<M>,
}

impl<M> Collection<M> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn append(&mut self, item: M) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&M> {
        self.items.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<M> {
        self.items
    }
}

impl<M> Default for Collection<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> IntoIterator for Collection<M> {
    type Item = M;
    type IntoIter = std::vec::IntoIter<M>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, M> IntoIterator for &'a Collection<M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<M> FromIterator<M> for Collection<M> {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
