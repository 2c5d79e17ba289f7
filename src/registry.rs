//! In-memory [`Application`] that validates identifiers against a table of
//! known model descriptors.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::contract::Application;
use crate::error::QueryError;
use crate::model::ModelDescriptor;

pub const ACCOUNTING_API_STEM: &str = "api.xro/2.0";

/// (name, resource, pageable) of the accounting models known out of the box.
const ACCOUNTING_MODELS: &[(&str, &str, bool)] = &[
    ("Account", "Accounts", false),
    ("BankTransaction", "BankTransactions", true),
    ("Contact", "Contacts", true),
    ("CreditNote", "CreditNotes", true),
    ("Currency", "Currencies", false),
    ("Invoice", "Invoices", true),
    ("Item", "Items", false),
    ("ManualJournal", "ManualJournals", true),
    ("Organisation", "Organisation", false),
    ("Payment", "Payments", true),
    ("PurchaseOrder", "PurchaseOrders", true),
    ("Quote", "Quotes", true),
    ("TaxRate", "TaxRates", false),
    ("TrackingCategory", "TrackingCategories", false),
    ("User", "Users", false),
];

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelDescriptor>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with the accounting API's common models.
    pub fn with_accounting_defaults() -> Self {
        let mut registry = Self::new();
        for (name, resource_uri, pageable) in ACCOUNTING_MODELS {
            registry.register(ModelDescriptor::new(
                *name,
                *resource_uri,
                ACCOUNTING_API_STEM,
                *pageable,
            ));
        }
        registry
    }

    /// Add a descriptor, replacing any previous one with the same name.
    pub fn register(&mut self, descriptor: ModelDescriptor) -> &mut Self {
        if self.models.contains_key(&descriptor.name) {
            debug!(model = %descriptor.name, "Overriding registered model");
        }
        self.models.insert(descriptor.name.clone(), descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.get(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl FromIterator<ModelDescriptor> for ModelRegistry {
    fn from_iter<I: IntoIterator<Item = ModelDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        for descriptor in iter {
            registry.register(descriptor);
        }
        registry
    }
}

impl Application for ModelRegistry {
    fn validate_model_class(&self, identifier: &str) -> Result<ModelDescriptor, QueryError> {
        // `Accounting\Contact` resolves like `Contact`.
        let name = identifier.rsplit('\\').next().unwrap_or(identifier);
        match self.models.get(name) {
            Some(descriptor) => Ok(descriptor.clone()),
            None => {
                warn!(identifier, "Unknown model identifier");
                Err(QueryError::InvalidModel {
                    identifier: identifier.to_string(),
                })
            }
        }
    }
}
