use crate::domain::ports::Attachment;
use crate::utils::error::{LinkerError, Result};
use base64::Engine;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "gif", "pdf"];

/// A receipt or statement document on disk. The base64 payload is read on
/// first use and cached.
#[derive(Debug)]
pub struct FileInput {
    path: PathBuf,
    b64: OnceCell<String>,
}

impl FileInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            b64: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }

    pub fn mime_type(&self) -> Result<&'static str> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("png") => Ok("image/png"),
            Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
            Some("webp") => Ok("image/webp"),
            Some("gif") => Ok("image/gif"),
            Some("pdf") => Ok("application/pdf"),
            _ => Err(LinkerError::ValidationError {
                message: format!(
                    "Unsupported input file {}. Allowed extensions: {}",
                    self.display_name(),
                    SUPPORTED_EXTENSIONS.join(", ")
                ),
            }),
        }
    }

    pub async fn b64(&self) -> Result<&str> {
        let encoded = self
            .b64
            .get_or_try_init(|| async {
                let bytes = tokio::fs::read(&self.path).await?;
                tracing::debug!("Read {} bytes from {}", bytes.len(), self.display_name());
                Ok::<_, LinkerError>(base64::engine::general_purpose::STANDARD.encode(bytes))
            })
            .await?;
        Ok(encoded.as_str())
    }

    pub async fn attachment(&self) -> Result<Attachment> {
        let mime_type = self.mime_type()?;
        Ok(Attachment {
            mime_type: mime_type.to_string(),
            base64_data: self.b64().await?.to_string(),
        })
    }
}
