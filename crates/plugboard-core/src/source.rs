//! Configuration boundary for provider sections.
//!
//! Concrete backends (TOML files, environment layers, in-process maps in
//! tests) implement `SectionSource`; repositories only ever see this trait.

use plugboard_types::section::ProviderSection;

/// Lookup of named provider sections in some host configuration.
///
/// Absent and unreadable sections both come back as `None`; implementations
/// surface their parse failures at construction time instead, so lookups
/// stay infallible.
pub trait SectionSource: Send + Sync {
    /// The section registered under `name`, if any.
    fn section(&self, name: &str) -> Option<ProviderSection>;
}
