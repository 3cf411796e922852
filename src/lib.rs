//! Curio Store is a lightweight, in-memory record store backing a
//! create/list/view/delete catalog of user-submitted items.
//!
//! Records live for the lifetime of the hosting process; the only durable
//! collaborator is an external asset store holding the binary (image) each
//! record references by URL.
//!
//! ## Core Components
//! - [`engine`]: The in-memory store and the filesystem asset backend.
//! - [`item`]: The record entity and its construction.
//! - [`sdk`]: Client libraries for both embedded and remote (TCP) modes.
//! - [`server`]: TCP daemon implementation.

pub mod engine;
pub mod item;
pub mod sdk;
pub mod server;

use async_trait::async_trait;
use thiserror::Error;

pub use item::{Item, ItemDraft};

/// Errors returned by the Curio Store.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested item does not exist.
    #[error("item not found")]
    NotFound,
    /// An item with this id already exists. Indicates a broken id
    /// generator, not a recoverable condition.
    #[error("duplicate item id {0}")]
    DuplicateId(String),
    /// The caller-supplied input failed boundary validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The external asset store failed to store or delete a binary.
    #[error("asset storage error: {0}")]
    Asset(String),
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
    /// An I/O error occurred during network communication or asset storage.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized Result type for Curio Store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines read operations over the catalog.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Retrieves a single item by id.
    async fn get(&self, id: &str) -> Result<Item>;
    /// Lists all live items, newest first.
    async fn list(&self) -> Result<Vec<Item>>;
}

/// Defines write operations over the catalog.
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    /// Mints a new item from a pre-validated draft and makes it visible to
    /// subsequent reads.
    async fn create(&self, draft: ItemDraft) -> Result<Item>;
    /// Removes an item by id. Returns `true` iff something was removed;
    /// removing an absent id is a no-op, not an error.
    async fn remove(&self, id: &str) -> Result<bool>;
}

/// The primary interface for interacting with the catalog, implemented by
/// both the embedded engine and the remote client.
pub trait Catalog: CatalogReader + CatalogWriter {}

impl<T: CatalogReader + CatalogWriter> Catalog for T {}

/// Defines the external binary asset collaborator.
///
/// The record store treats asset URLs as opaque values; only implementors
/// of this trait know how to resolve them.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Stores a binary payload and returns an opaque URL for it.
    async fn put(&self, name: &str, content_type: &str, data: &[u8]) -> Result<String>;
    /// Deletes a previously stored binary by its URL.
    async fn delete(&self, url: &str) -> Result<()>;
}
