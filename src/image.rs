//! Opaque image payloads carried by messages: inline data URIs or plain URLs.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Shown in place of an image whenever generation fails.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://placehold.co/400x300/CCCCCC/FFFFFF?text=Image+Failed";

/// Largest file accepted by `/upload`.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// An image reference: either `data:<mime>;base64,<data>` or a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePayload(String);

/// Borrowed view of the inline part of a data URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineData<'a> {
    pub mime_type: &'a str,
    pub data: &'a str,
}

impl ImagePayload {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self::from_base64(mime_type, &BASE64.encode(bytes))
    }

    pub fn from_base64(mime_type: &str, encoded: &str) -> Self {
        Self(format!("data:{mime_type};base64,{encoded}"))
    }

    pub fn placeholder() -> Self {
        Self(PLACEHOLDER_IMAGE_URL.to_string())
    }

    /// Read an image file from disk and encode it as a data URI
    pub fn from_path(path: &Path) -> Result<Self> {
        let size = fs::metadata(path)
            .with_context(|| format!("failed reading {}", path.display()))?
            .len();
        if size > MAX_UPLOAD_BYTES {
            anyhow::bail!(
                "{} is {} bytes; images larger than {} bytes are not accepted",
                path.display(),
                size,
                MAX_UPLOAD_BYTES
            );
        }

        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            anyhow::bail!("{} does not look like an image ({})", path.display(), mime);
        }

        let bytes = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
        Ok(Self::from_bytes(mime.essence_str(), &bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER_IMAGE_URL
    }

    /// Split a base64 data URI into its MIME type and payload
    pub fn inline_data(&self) -> Option<InlineData<'_>> {
        let rest = self.0.strip_prefix("data:")?;
        let (mime_type, data) = rest.split_once(";base64,")?;
        if mime_type.is_empty() || data.is_empty() {
            return None;
        }
        Some(InlineData { mime_type, data })
    }

    /// Decode the inline bytes, if this payload is a data URI
    pub fn decode(&self) -> Result<Vec<u8>> {
        let inline = self
            .inline_data()
            .context("image is not an inline data URI")?;
        BASE64
            .decode(inline.data.as_bytes())
            .context("image base64 decode failed")
    }

    /// Approximate decoded size in bytes
    pub fn approx_size(&self) -> Option<usize> {
        self.inline_data().map(|inline| inline.data.len() / 4 * 3)
    }

    /// Short human-readable description used by the history view
    pub fn summary(&self) -> String {
        match self.inline_data() {
            Some(inline) => {
                let kib = self.approx_size().unwrap_or_default().div_ceil(1024);
                format!("{} · {} KiB", inline.mime_type, kib)
            }
            None if self.is_placeholder() => format!("image unavailable ({})", self.0),
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
