//! Validation Context
//!
//! Explicit per-session state handed to every keyed validation call: the
//! vocabulary table (once loaded) and the unit system. Nothing here is global,
//! so independent sessions and tests can hold different vocabularies.

use crate::validation::{UnitRegistry, UnitSystem, ValidationError, Vocabulary};
use std::sync::Arc;

/// Vocabulary and unit system for one session
#[derive(Clone)]
pub struct ValidationContext {
    vocabulary: Option<Arc<Vocabulary>>,
    units: Arc<dyn UnitSystem>,
}

impl std::fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("vocabulary_keys", &self.vocabulary.as_ref().map(|v| v.len()))
            .finish()
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::detached()
    }
}

impl ValidationContext {
    /// Context without a vocabulary; keyed validation fails with `SessionRequired`
    pub fn detached() -> Self {
        Self {
            vocabulary: None,
            units: Arc::new(UnitRegistry::new()),
        }
    }

    /// Context with a loaded vocabulary and the built-in unit registry
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary: Some(Arc::new(vocabulary)),
            units: Arc::new(UnitRegistry::new()),
        }
    }

    /// Replace the unit system
    pub fn with_units(mut self, units: Arc<dyn UnitSystem>) -> Self {
        self.units = units;
        self
    }

    /// The loaded vocabulary
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::SessionRequired` when no vocabulary was loaded.
    pub fn vocabulary(&self) -> Result<&Vocabulary, ValidationError> {
        self.vocabulary
            .as_deref()
            .ok_or(ValidationError::SessionRequired)
    }

    /// Whether a vocabulary has been loaded
    pub fn has_vocabulary(&self) -> bool {
        self.vocabulary.is_some()
    }

    /// The unit system
    pub fn units(&self) -> &dyn UnitSystem {
        self.units.as_ref()
    }
}
