use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;
use unicode_normalization::UnicodeNormalization;

/// Reduce a client-supplied file name to something safe to join onto the
/// upload directory: ASCII letters, digits, `.`, `_` and `-`, whitespace
/// turned into `_`, path separators dropped, no leading dots or underscores.
/// Accented letters are decomposed first so they keep their base letter.
pub fn secure_filename(name: &str) -> String {
    let decomposed: String = name.nfkd().collect();
    let flattened = decomposed.replace(['/', '\\'], " ");

    let joined = flattened
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Stores uploaded files under one directory, keyed by sanitized name.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `bytes` as `<dir>/<secure name>`, replacing any earlier upload
    /// of the same name.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let safe = secure_filename(filename);
        if safe.is_empty() {
            anyhow::bail!("Invalid upload file name: {:?}", filename);
        }

        let path = self.dir.join(&safe);
        fs::write(&path, bytes)
            .await
            .context(format!("Failed to save upload to {:?}", path))?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Saved upload");
        Ok(path)
    }
}
