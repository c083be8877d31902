pub mod http;

use crate::errors::MenuError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a binary object store.
///
/// This trait defines a common interface for uploading, addressing, and
/// removing image assets, independent of the concrete store behind it.
/// Paths are namespaced by cafe id to avoid collisions across tenants.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug + DynClone {
    /// The bucket that holds menu images. Stored URLs embed this as a
    /// marker segment, which is how asset paths are derived back out.
    fn bucket(&self) -> &str;

    /// Uploads `bytes` under `path`, returning the stored path.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, MenuError>;

    /// Returns the stable public retrieval URL for a stored path.
    fn public_url(&self, path: &str) -> String;

    /// Removes the assets at `paths`. Missing paths are not an error.
    async fn remove(&self, paths: &[String]) -> Result<(), MenuError>;
}

dyn_clone::clone_trait_object!(ObjectStore);
