//! Protocol implementations for domain lookups.
//!
//! RDAP for registration status, and the Registro.br search page for
//! ownership enrichment.

/// RDAP (Registration Data Access Protocol) implementation
pub mod rdap;

/// Registry profiles and suffix routing
pub mod registry;

/// Ownership enrichment from the search page
pub mod enrichment;

// Re-export commonly used functions and types
pub use enrichment::{extract_owner, OwnerEnricher};
pub use rdap::{extract_registration, RdapClient};
pub use registry::{select_source, RegistryProfile};
