//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_identity_provider;
mod in_memory_event_repository;
mod in_memory_image_store;
mod postgres_event_repository;

pub use http_identity_provider::{HttpIdentityProvider, IdentityProviderConfig};
pub use in_memory_event_repository::InMemoryEventRepository;
pub use in_memory_image_store::InMemoryImageStore;
pub use postgres_event_repository::PostgresEventRepository;
