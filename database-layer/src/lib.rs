//! Persistence of identity-provider configuration.
//!
//! The gateway stores one row per `(tenant, provider)` in the
//! `identity_providers` table. Secrets are stored already encrypted; this
//! crate only moves bytes. [`ProviderStore`] is the seam the rest of the
//! workspace depends on, with a PostgreSQL implementation
//! ([`ProviderRepository`]) and an in-memory one for tests.

pub mod connection;
pub mod error;
pub mod memory;
pub mod models;
pub mod repository;

pub use connection::{DatabasePool, PoolSettings};
pub use error::*;
pub use memory::InMemoryProviderStore;
pub use models::{NewProviderRecord, ProviderRecord};
pub use repository::{ProviderRepository, ProviderStore};
