//! Shared declaration types for Plugboard.
//!
//! This crate contains the configuration-facing types of the provider model:
//! provider declarations, the section model they live in, the ordered
//! parameter bag handed to providers at initialization, and the shared
//! error type.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod error;
pub mod params;
pub mod section;
