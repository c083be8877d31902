use anyhow::Result;
use async_trait::async_trait;
use qrmenu::errors::MenuError;
use qrmenu::providers::db::sqlite::SqliteProvider;
use qrmenu::providers::object::ObjectStore;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use turso::Database;

// --- Test Setup ---

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub provider: SqliteProvider,
    pub db: Database,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database and initializes the schema.
    pub async fn new() -> Result<Self> {
        let provider = SqliteProvider::new(":memory:").await?;
        provider.initialize_schema().await?;
        let db = provider.db.clone();
        Ok(Self { provider, db })
    }
}

// --- Mock Object Store ---

/// An in-memory object store that records uploads and removals.
///
/// Failure modes can be toggled per test to exercise the best-effort and
/// compensating paths of the image lifecycle flows.
#[derive(Clone, Debug)]
pub struct MockObjectStore {
    bucket: String,
    assets: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    removed: Arc<Mutex<Vec<String>>>,
    fail_uploads: Arc<Mutex<bool>>,
    fail_removals: Arc<Mutex<bool>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            bucket: "menu-images".to_string(),
            assets: Arc::new(Mutex::new(HashMap::new())),
            removed: Arc::new(Mutex::new(Vec::new())),
            fail_uploads: Arc::new(Mutex::new(false)),
            fail_removals: Arc::new(Mutex::new(false)),
        }
    }

    /// Makes subsequent uploads fail with an API error.
    pub fn fail_uploads(&self, fail: bool) {
        *self.fail_uploads.lock().unwrap() = fail;
    }

    /// Makes subsequent removals fail with an API error.
    pub fn fail_removals(&self, fail: bool) {
        *self.fail_removals.lock().unwrap() = fail;
    }

    /// Whether an asset currently exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.assets.lock().unwrap().contains_key(path)
    }

    /// The number of assets currently stored.
    pub fn asset_count(&self) -> usize {
        self.assets.lock().unwrap().len()
    }

    /// The paths stored right now, in no particular order.
    pub fn stored_paths(&self) -> Vec<String> {
        self.assets.lock().unwrap().keys().cloned().collect()
    }

    /// Every path a removal was requested for, in request order.
    pub fn removal_log(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, MenuError> {
        if *self.fail_uploads.lock().unwrap() {
            return Err(MenuError::AssetApi {
                status: 503,
                body: "MockObjectStore: uploads disabled".to_string(),
            });
        }
        self.assets
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes);
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://objects.test/object/public/{}/{path}", self.bucket)
    }

    async fn remove(&self, paths: &[String]) -> Result<(), MenuError> {
        if *self.fail_removals.lock().unwrap() {
            return Err(MenuError::AssetApi {
                status: 503,
                body: "MockObjectStore: removals disabled".to_string(),
            });
        }
        let mut assets = self.assets.lock().unwrap();
        let mut removed = self.removed.lock().unwrap();
        for path in paths {
            assets.remove(path);
            removed.push(path.clone());
        }
        Ok(())
    }
}
