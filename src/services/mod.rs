//! Store clients consumed by the request handlers.
//!
//! Both stores are constructed once per process and cloned into each
//! handler invocation; tests construct them per-case against a temp
//! directory and an in-memory database.

pub mod metadata_store;
pub mod object_store;

use metadata_store::MetadataStore;
use object_store::ObjectStore;

/// Explicit dependency bundle handed to every handler.
#[derive(Clone)]
pub struct StoreClients {
    pub objects: ObjectStore,
    pub metadata: MetadataStore,
}
