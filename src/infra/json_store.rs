use std::path::{Path, PathBuf};

use crate::domain::repository::{CorruptDocument, Document, DocumentStore, Listed};

#[derive(Debug, thiserror::Error)]
pub enum JsonStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid name '{0}': only alphanumeric, '-' and '_' allowed")]
    InvalidName(String),
}

/// JSONファイルによるDocumentStore実装。
/// `<root>/<collection>/<key>.json` に1ドキュメント = 1ファイルで保存する。
pub struct JsonDocumentStore {
    root: PathBuf,
}

impl JsonDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf, JsonStoreError> {
        validate_name(collection)?;
        Ok(self.root.join(collection))
    }

    fn document_path(&self, collection: &str, key: &str) -> Result<PathBuf, JsonStoreError> {
        validate_name(key)?;
        Ok(self.collection_dir(collection)?.join(format!("{key}.json")))
    }
}

fn listed_key(listed: &Listed) -> &str {
    match listed {
        Ok(doc) => &doc.key,
        Err(corrupt) => &corrupt.key,
    }
}

/// コレクション名・キーがファイル名として安全か検証する。
fn validate_name(name: &str) -> Result<(), JsonStoreError> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(JsonStoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl DocumentStore for JsonDocumentStore {
    type Error = JsonStoreError;

    fn list_all(&self, collection: &str) -> Result<Vec<Listed>, Self::Error> {
        let dir = self.collection_dir(collection)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };
            let content = std::fs::read_to_string(&path)?;
            let listed = match serde_json::from_str(&content) {
                Ok(data) => Ok(Document { key, data }),
                Err(source) => {
                    tracing::debug!(path = %path.display(), error = %source, "unparsable document");
                    Err(CorruptDocument { key, source })
                }
            };
            documents.push(listed);
        }
        documents.sort_by(|a, b| listed_key(a).cmp(listed_key(b)));

        tracing::debug!(collection, count = documents.len(), "listed documents");
        Ok(documents)
    }

    fn upsert(
        &self,
        collection: &str,
        key: &str,
        data: &serde_json::Value,
    ) -> Result<(), Self::Error> {
        let path = self.document_path(collection, key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(data).map_err(|source| JsonStoreError::Json {
            path: path.clone(),
            source,
        })?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, &content)?;
        std::fs::rename(&tmp, &path)?;

        tracing::debug!(collection, key, "upserted document");
        Ok(())
    }

    fn delete(&self, collection: &str, key: &str) -> Result<(), Self::Error> {
        let path = self.document_path(collection, key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(collection, key, "deleted document");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
