use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{PersistError, StoreError, StoreResult};
use crate::models::CatalogDocument;

/// The single JSON file backing a persistent catalog.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document. `Ok(None)` when the file does not exist yet.
    pub async fn load(&self) -> StoreResult<Option<CatalogDocument>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::persistence(&self.path, e)),
        };
        let document =
            serde_json::from_slice(&raw).map_err(|e| StoreError::persistence(&self.path, e))?;
        Ok(Some(document))
    }

    /// Rewrites the whole file: temp file next to the target, then rename.
    pub async fn save(&self, document: &CatalogDocument) -> StoreResult<()> {
        let bytes = encode(document).map_err(|e| StoreError::persistence(&self.path, e))?;
        let tmp = self.tmp_path();

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::persistence(&self.path, e))?;
        }
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::persistence(&self.path, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::persistence(&self.path, e));
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "Catalog flushed");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "catalog".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// UTF-8, two-space indentation, trailing newline.
pub fn encode(document: &CatalogDocument) -> Result<Vec<u8>, PersistError> {
    let mut buf = Vec::with_capacity(4096);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}
