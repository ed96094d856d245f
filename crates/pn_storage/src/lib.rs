use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use pn_core::{ArticleStorage, Error, Result};
use tracing::info;

pub mod backends;
pub mod query;

pub use backends::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Json,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "json" | "file" => Ok(StorageKind::Json),
            other => Err(Error::Config(format!(
                "Unknown storage backend: {} (expected memory or json)",
                other
            ))),
        }
    }
}

/// Builds the storage backend named by `kind`. `data_dir` is only used by the JSON backend.
pub async fn create_storage(
    kind: StorageKind,
    data_dir: &Path,
    max_page_size: usize,
) -> Result<Arc<dyn ArticleStorage>> {
    let storage: Arc<dyn ArticleStorage> = match kind {
        StorageKind::Memory => Arc::new(MemoryStorage::new().with_max_page_size(max_page_size)),
        StorageKind::Json => Arc::new(
            JsonFileStorage::new(data_dir)
                .await?
                .with_max_page_size(max_page_size),
        ),
    };
    info!(backend = ?kind, "Storage backend ready");
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageKind};
}

#[cfg(test)]
mod tests {
    use super::*;
    use pn_core::ArticleQuery;

    #[test]
    fn test_storage_kind() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!("JSON".parse::<StorageKind>().unwrap(), StorageKind::Json);
        assert!(matches!("qdrant".parse::<StorageKind>(), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_create_storage() {
        let dir = tempfile::tempdir().unwrap();
        for kind in [StorageKind::Memory, StorageKind::Json] {
            let storage = create_storage(kind, dir.path(), 50).await.unwrap();
            let page = storage.query_articles(&ArticleQuery::default()).await.unwrap();
            assert_eq!(page.total_pages, 1);
        }
    }
}
