//! TOML-backed section source for Plugboard.
//!
//! A `TomlSource` parses one TOML document in which every top-level table
//! is a providers section:
//!
//! ```toml
//! [geo]
//! default_provider = "maxmind"
//!
//! [[geo.providers]]
//! name = "maxmind"
//! kind = "maxmind-db"
//! params = { path = "/var/db/geo.mmdb" }
//! ```
//!
//! Parsing is eager: read and parse failures surface when the source is
//! built, so `SectionSource` lookups stay infallible. Parameter values must
//! be TOML strings; anything else is a parse error.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use plugboard_core::source::SectionSource;
use plugboard_types::section::ProviderSection;

/// Errors building a [`TomlSource`].
#[derive(Debug, Error)]
pub enum TomlConfigError {
    #[error("failed to read provider configuration: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse provider configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Section source backed by a single TOML document.
#[derive(Debug, Clone, Default)]
pub struct TomlSource {
    sections: HashMap<String, ProviderSection>,
}

impl TomlSource {
    /// Parse a TOML document into a section source.
    ///
    /// # Errors
    ///
    /// `Parse` when the document is not valid TOML or a section does not
    /// match the expected shape.
    pub fn parse(document: &str) -> Result<Self, TomlConfigError> {
        let sections: HashMap<String, ProviderSection> = toml::from_str(document)?;
        tracing::debug!(sections = sections.len(), "Parsed provider configuration");
        Ok(Self { sections })
    }

    /// Read and parse a TOML file into a section source.
    ///
    /// # Errors
    ///
    /// `Read` when the file cannot be read, `Parse` when its contents are
    /// rejected.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TomlConfigError> {
        let document = std::fs::read_to_string(path)?;
        Self::parse(&document)
    }

    /// Names of all parsed sections, for diagnostics.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.keys().map(|s| s.as_str()).collect()
    }

    /// Whether the document contained no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl SectionSource for TomlSource {
    /// Case-sensitive lookup, matching TOML table-name semantics.
    fn section(&self, name: &str) -> Option<ProviderSection> {
        self.sections.get(name).cloned()
    }
}
