//! Turns provider declarations into initialized provider instances.
//!
//! The loader is the bridge between a parsed section and a live registry:
//! resolve each declared kind through the catalog, construct the instance,
//! initialize it with the declared name and parameters, and collect the
//! results in declaration order. Any failure aborts the whole load, so a
//! partially built registry is never observable.

use plugboard_types::error::ProviderError;
use plugboard_types::section::ProviderDecl;

use crate::catalog::FactoryCatalog;
use crate::provider::Provider;
use crate::registry::ProviderRegistry;

/// Construct and initialize a single provider from its declaration.
///
/// # Errors
///
/// `UnknownKind` or `CapabilityMismatch` from catalog resolution; any error
/// the provider's initialization raises.
pub fn instantiate_provider<P>(
    catalog: &FactoryCatalog,
    decl: &ProviderDecl,
) -> Result<Box<P>, ProviderError>
where
    P: Provider + ?Sized + 'static,
{
    let factory = catalog.resolve::<P>(&decl.kind)?;
    let mut provider = factory();
    provider.initialize(&decl.name, decl.params.clone())?;
    tracing::debug!(provider = %provider.name(), kind = %decl.kind, "Instantiated provider");
    Ok(provider)
}

/// Construct, initialize, and register every declared provider.
///
/// Declaration order is preserved in the returned registry. The first
/// failure aborts the load and the partial registry is dropped.
pub fn instantiate_providers<P>(
    catalog: &FactoryCatalog,
    decls: &[ProviderDecl],
) -> Result<ProviderRegistry<P>, ProviderError>
where
    P: Provider + ?Sized + 'static,
{
    let mut registry = ProviderRegistry::new();
    for decl in decls {
        let provider = instantiate_provider::<P>(catalog, decl)?;
        registry.add(provider)?;
    }
    Ok(registry)
}
