use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::StorageConfig;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
const RESUME_PREFIX: &str = "resumes";

/// Persists uploaded resumes and returns the URL they are served from.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn upload(&self, body: Bytes, content_type: Option<&str>) -> Result<String, ResumeStorageError>;

    /// Remove a previously uploaded resume. URLs this store did not issue are ignored.
    async fn discard(&self, url: &str) -> Result<(), ResumeStorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ResumeStorageError {
    #[error("file is empty")]
    Empty,
    #[error("only PDF files are allowed, got {0}")]
    UnsupportedType(String),
    #[error("failed to store resume: {0}")]
    Store(#[from] object_store::Error),
}

/// [`ResumeStore`] writing `resumes/<uuid>.pdf` objects through `object_store`.
pub struct ObjectStoreResumeStore {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
}

impl ObjectStoreResumeStore {
    pub fn new(store: Arc<dyn ObjectStore>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            store,
            public_base_url,
        }
    }

    pub fn in_memory(public_base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(InMemory::new()), public_base_url)
    }

    /// Store resumes below `dir`, creating it when missing.
    pub fn local(dir: &Path, public_base_url: impl Into<String>) -> Result<Self, object_store::Error> {
        std::fs::create_dir_all(dir).map_err(|source| object_store::Error::Generic {
            store: "LocalFileSystem",
            source: Box::new(source),
        })?;
        let store = LocalFileSystem::new_with_prefix(dir)?;
        Ok(Self::new(Arc::new(store), public_base_url))
    }

    /// Local directory when configured, otherwise process memory.
    pub fn from_config(config: &StorageConfig) -> Result<Self, object_store::Error> {
        match &config.resume_dir {
            Some(dir) => Self::local(dir, config.public_base_url.clone()),
            None => Ok(Self::in_memory(config.public_base_url.clone())),
        }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Read back a stored resume by its key below the public base URL.
    ///
    /// `None` for missing objects and for keys outside `resumes/`.
    pub async fn fetch(&self, key: &str) -> Result<Option<Bytes>, ResumeStorageError> {
        let Ok(path) = ObjectPath::parse(key) else {
            return Ok(None);
        };
        if !path.prefix_matches(&ObjectPath::from(RESUME_PREFIX)) {
            return Ok(None);
        }
        match self.store.get(&path).await {
            Ok(object) => Ok(Some(object.bytes().await?)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn key_of<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.public_base_url.as_str())?
            .strip_prefix('/')
    }
}

#[async_trait]
impl ResumeStore for ObjectStoreResumeStore {
    async fn upload(&self, body: Bytes, content_type: Option<&str>) -> Result<String, ResumeStorageError> {
        if body.is_empty() {
            return Err(ResumeStorageError::Empty);
        }
        let content_type = content_type.unwrap_or("unknown");
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if essence != PDF_CONTENT_TYPE {
            return Err(ResumeStorageError::UnsupportedType(content_type.to_string()));
        }

        let key = format!("{RESUME_PREFIX}/{}.pdf", Uuid::new_v4());
        let size_bytes = body.len();
        self.store
            .put(&ObjectPath::from(key.as_str()), body.into())
            .await
            .map_err(|err| {
                error!(error = %err, %key, "resume upload failed");
                ResumeStorageError::Store(err)
            })?;

        let url = format!("{}/{key}", self.public_base_url);
        info!(%url, size_bytes, "resume stored");
        Ok(url)
    }

    async fn discard(&self, url: &str) -> Result<(), ResumeStorageError> {
        let Some(key) = self.key_of(url) else {
            return Ok(());
        };
        match self.store.delete(&ObjectPath::from(key)).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
