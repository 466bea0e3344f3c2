//! Core provider-model logic for Plugboard.
//!
//! This crate defines the `Provider` trait and the machinery that turns
//! declarative configuration into live provider instances: the factory
//! catalog (kind -> constructor), the loader, the ordered name-indexed
//! registry, and the lazily loading `ProviderRepository`. It depends only
//! on `plugboard-types` -- concrete configuration backends such as
//! `plugboard-toml` live in their own crates and plug in through the
//! `SectionSource` trait.

pub mod catalog;
pub mod loader;
pub mod provider;
pub mod registry;
pub mod repository;
pub mod source;
