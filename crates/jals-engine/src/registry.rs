//! Transformer registry: names to transformer units.

use std::collections::btree_map::IterMut;
use std::collections::BTreeMap;

use jals_types::{Record, TransformerKey};
use tracing::warn;

use crate::error::{AmplifyError, AmplifyResult};
use crate::transformer::Transformer;

/// Holds registered transformers keyed by name.
///
/// Names are unique; inserting under an existing name replaces the
/// previous transformer.
#[derive(Default)]
pub struct TransformerRegistry {
    transformers: BTreeMap<String, Box<dyn Transformer>>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a transformer, returning the one it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        transformer: Box<dyn Transformer>,
    ) -> Option<Box<dyn Transformer>> {
        let name = name.into();
        let replaced = self.transformers.insert(name.clone(), transformer);
        if let Some(previous) = &replaced {
            warn!(name = %name, previous = previous.name(), "transformer replaced");
        }
        replaced
    }

    pub fn get(&self, name: &str) -> Option<&dyn Transformer> {
        self.transformers.get(name).map(|t| t.as_ref())
    }

    /// Look up the transformer registered under a derived key.
    pub fn resolve(&self, key: &TransformerKey) -> AmplifyResult<&dyn Transformer> {
        self.get(&key.name())
            .ok_or_else(|| AmplifyError::NotFound(key.clone()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transformers.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.transformers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// Configurations of every transformer that exposes one.
    ///
    /// Transformers without the capability are omitted, not defaulted.
    pub fn configs(&self) -> BTreeMap<String, Record> {
        self.transformers
            .iter()
            .filter_map(|(name, t)| t.config().map(|cfg| (name.clone(), cfg)))
            .collect()
    }

    pub(crate) fn entries_mut(&mut self) -> IterMut<'_, String, Box<dyn Transformer>> {
        self.transformers.iter_mut()
    }
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("names", &self.names())
            .finish()
    }
}
