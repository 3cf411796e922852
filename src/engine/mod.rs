pub mod assets;
pub mod memstore;

pub use assets::FsAssetStore;
pub use memstore::MemStore;
