//! Provider trait definition.
//!
//! A provider is a named, configurable implementation of some service
//! capability. Capability traits (cache backends, geo lookups, ...) extend
//! `Provider`; concrete implementations embed a `ProviderCore` for the
//! shared identity and initialization bookkeeping instead of inheriting it.

use plugboard_types::error::ProviderError;
use plugboard_types::params::ProviderParams;

/// Identity and initialization state shared by every provider.
///
/// Implementations embed one of these and hand it out through
/// [`Provider::core`] / [`Provider::core_mut`]; the `Provider` trait then
/// supplies `name`, `params`, `is_initialized`, and `initialize` for free.
#[derive(Debug, Clone, Default)]
pub struct ProviderCore {
    name: String,
    params: ProviderParams,
    initialized: bool,
}

impl ProviderCore {
    /// Core with no preset name; `initialize` resolves one.
    pub fn new() -> Self {
        Self::default()
    }

    /// Core with a preset instance name, used by hosts that construct
    /// providers directly instead of declaring them in configuration.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: ProviderParams::new(),
            initialized: false,
        }
    }

    /// The resolved instance name; empty until initialization unless preset.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters captured at initialization.
    pub fn params(&self) -> &ProviderParams {
        &self.params
    }

    /// Whether `initialize` has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // Stores identity and parameters. Runs at most once; name resolution is
    // explicit argument, then preset name, then the implementation kind.
    fn apply(
        &mut self,
        kind: &'static str,
        name: &str,
        params: ProviderParams,
    ) -> Result<(), ProviderError> {
        if self.initialized {
            return Err(ProviderError::AlreadyInitialized(self.name.clone()));
        }
        if !name.is_empty() {
            self.name = name.to_string();
        } else if self.name.is_empty() {
            self.name = kind.to_string();
        }
        self.params = params;
        self.initialized = true;
        Ok(())
    }
}

/// Trait for named, one-time-initialized service implementations.
///
/// Capability traits extend this (`trait CacheProvider: Provider`), which
/// keeps registries and repositories generic over `dyn CapabilityTrait`
/// while the shared lifecycle lives here.
pub trait Provider: Send + Sync {
    /// Stable implementation identifier, as used in declarations
    /// (e.g., "maxmind-db", "in-memory"). Doubles as the name fallback for
    /// providers declared without one.
    fn kind(&self) -> &'static str;

    /// Shared identity and initialization state.
    fn core(&self) -> &ProviderCore;

    /// Mutable access to the shared state, used by `initialize`.
    fn core_mut(&mut self) -> &mut ProviderCore;

    /// Hook run once by `initialize`, after the name and parameters are
    /// stored. Implementations validate and absorb their parameters here.
    fn on_initialize(&mut self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// The instance name. Falls back to `kind()` before initialization so
    /// the name is never empty.
    fn name(&self) -> &str {
        let name = self.core().name();
        if name.is_empty() { self.kind() } else { name }
    }

    /// Parameters captured at initialization.
    fn params(&self) -> &ProviderParams {
        self.core().params()
    }

    /// Whether this provider has been initialized.
    fn is_initialized(&self) -> bool {
        self.core().is_initialized()
    }

    /// Initialize this provider with an instance name and parameters.
    ///
    /// An empty `name` falls back to the preset core name, then to
    /// `kind()`. Taking `params` by value is the defensive copy: the stored
    /// parameters cannot be touched through anything the caller kept.
    ///
    /// # Errors
    ///
    /// `AlreadyInitialized` on a second call; whatever `on_initialize`
    /// returns when the parameters are rejected.
    fn initialize(&mut self, name: &str, params: ProviderParams) -> Result<(), ProviderError> {
        let kind = self.kind();
        self.core_mut().apply(kind, name, params)?;
        self.on_initialize()
    }
}
