use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tokio::fs;

use crate::error::{Error, Result};

/// Public URL prefix the uploads directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Cv,
}

impl UploadKind {
    /// Maps a multipart field name to the kind of file it carries.
    pub fn for_field(name: &str) -> Option<Self> {
        match name {
            "photo" | "avatar" | "logo" => Some(UploadKind::Image),
            "cv" => Some(UploadKind::Cv),
            _ => None,
        }
    }

    fn subdir(&self) -> &'static str {
        match self {
            UploadKind::Image => "photos",
            UploadKind::Cv => "cvs",
        }
    }

    fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Image => &["jpg", "jpeg", "png", "webp"],
            UploadKind::Cv => &["pdf", "doc", "docx", "txt", "rtf"],
        }
    }
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn check_signature(ext: &str, data: &[u8]) -> Result<()> {
    let ok = match ext {
        "pdf" => data.starts_with(b"%PDF"),
        "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8]),
        "png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        "webp" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
        "docx" => data.starts_with(b"PK\x03\x04"),
        "doc" => data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]),
        "rtf" => data.starts_with(b"{\\rtf"),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(Error::BadRequest(format!(
            "Invalid {} file content",
            ext.to_ascii_uppercase()
        )))
    }
}

#[derive(Clone, Debug)]
pub struct UploadService {
    root: PathBuf,
}

impl UploadService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates and writes the file, returning its public path
    /// (`/uploads/<subdir>/<name>`).
    pub async fn save(&self, kind: UploadKind, filename: &str, data: &Bytes) -> Result<String> {
        let ext = extension_of(filename).ok_or_else(|| {
            Error::BadRequest(format!("File '{}' has no extension", filename))
        })?;
        if !kind.allowed_extensions().contains(&ext.as_str()) {
            return Err(Error::BadRequest(format!(
                "File type .{} is not allowed",
                ext
            )));
        }
        check_signature(&ext, data)?;

        let dir = self.root.join(kind.subdir());
        fs::create_dir_all(&dir).await?;

        let stored_name = format!(
            "{}-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple(),
            ext
        );
        fs::write(dir.join(&stored_name), data).await.map_err(|e| {
            tracing::error!(error = %e, file = %stored_name, "failed to write upload");
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        tracing::info!(file = %stored_name, bytes = data.len(), "stored upload");
        Ok(format!("{}/{}/{}", PUBLIC_PREFIX, kind.subdir(), stored_name))
    }

    /// Resolves a public upload path back to a file under the uploads root.
    /// Paths that would escape the root resolve to `None`.
    pub fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let relative = public_path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        let relative = Path::new(relative);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || relative.as_os_str().is_empty() {
            return None;
        }
        Some(self.root.join(relative))
    }

    /// Best-effort delete; a missing file is not an error.
    pub async fn remove(&self, public_path: &str) {
        let Some(path) = self.resolve(public_path) else {
            tracing::warn!(path = %public_path, "refusing to remove path outside uploads");
            return;
        };
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, path = %path.display(), "failed to remove upload");
            }
        }
    }
}
