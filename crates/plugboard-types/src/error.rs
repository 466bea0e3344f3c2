use thiserror::Error;

/// Errors raised while resolving, initializing, and loading providers.
///
/// `Clone` because a repository settles its load outcome exactly once and
/// re-raises the stored error on every later access.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("unknown provider kind '{kind}' (available: {})", .available.join(", "))]
    UnknownKind { kind: String, available: Vec<String> },

    #[error("provider kind '{kind}' does not implement '{expected}' (registered for '{actual}')")]
    CapabilityMismatch {
        kind: String,
        expected: String,
        actual: String,
    },

    #[error("unable to load configuration section '{0}'")]
    SectionNotFound(String),

    #[error("unable to load a default provider for section '{0}'")]
    NoDefaultProvider(String),

    #[error("provider name '{0}' is already registered")]
    DuplicateName(String),

    #[error("provider '{0}' is already initialized")]
    AlreadyInitialized(String),

    #[error("provider '{name}' failed to initialize: {message}")]
    Initialization { name: String, message: String },
}
