//! Declarative provider section model.
//!
//! A "providers section" is the configuration fragment a repository loads
//! from: an ordered list of provider declarations plus an optional default
//! provider name. How sections are stored on disk is the concern of a
//! section source (for example `plugboard-toml`); this crate only models
//! their shape.

use serde::{Deserialize, Serialize};

use crate::params::ProviderParams;

/// One declared provider inside a providers section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDecl {
    /// Instance name, unique within the section. May be omitted; an empty
    /// name is resolved to the implementation kind at initialization time.
    #[serde(default)]
    pub name: String,
    /// Implementation identifier, resolved through the factory catalog.
    pub kind: String,
    /// Initialization parameters in declaration order.
    #[serde(default)]
    pub params: ProviderParams,
}

impl ProviderDecl {
    /// Create a declaration with no parameters.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            params: ProviderParams::new(),
        }
    }

    /// Add one initialization parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key, value);
        self
    }
}

/// A providers section: zero or more declarations plus an optional default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSection {
    /// Name of the provider to treat as the section default.
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Provider declarations in document order.
    #[serde(default)]
    pub providers: Vec<ProviderDecl>,
}

impl ProviderSection {
    /// The explicitly declared default name, if one is meaningfully set.
    ///
    /// An empty string counts as absent, which is how host configuration
    /// files usually spell "no default".
    pub fn declared_default(&self) -> Option<&str> {
        match self.default_provider.as_deref() {
            Some("") | None => None,
            Some(name) => Some(name),
        }
    }
}
