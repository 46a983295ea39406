// siftlock-core/src/extract.rs
//! Document extraction seam.
//!
//! Format extraction runs in a sandboxed external process in production;
//! the core only knows the contract: (bytes, declared file type) in,
//! (text, structural metadata) out, within a bounded timeout or treated as
//! failed. `PlainTextExtractor` handles txt/csv in-process so the pipeline
//! runs end-to-end without the sandbox.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::CoreError;

/// Supported document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Pptx,
    Csv,
    Txt,
}

impl FileType {
    pub const ALLOWED_EXTENSIONS: &'static [&'static str] = &[".pdf", ".pptx", ".csv", ".txt"];

    /// Maps a filename extension to a type; unsupported extensions are a
    /// validation failure, rejected before any core processing.
    pub fn from_filename(filename: &str) -> Result<Self, CoreError> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(FileType::Pdf),
            "pptx" => Ok(FileType::Pptx),
            "csv" => Ok(FileType::Csv),
            "txt" => Ok(FileType::Txt),
            _ => Err(CoreError::Validation(format!(
                "file type '.{}' not allowed; allowed: {}",
                ext,
                Self::ALLOWED_EXTENSIONS.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FileType::Pdf => "pdf",
            FileType::Pptx => "pptx",
            FileType::Csv => "csv",
            FileType::Txt => "txt",
        };
        write!(f, "{}", s)
    }
}

/// Structural metadata reported by an extractor. Counts only; no content
/// beyond CSV headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractMetadata {
    pub file_type: Option<FileType>,
    pub char_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
}

impl ExtractMetadata {
    /// Baseline metadata for a plain-text extract.
    pub fn for_text(file_type: FileType, text: &str) -> Self {
        Self {
            file_type: Some(file_type),
            char_count: text.chars().count(),
            line_count: Some(text.lines().count()),
            ..Default::default()
        }
    }
}

/// The parsed view of a document: plain text plus structural metadata.
/// Ephemeral; evicted when the owning document reaches `Sanitized`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawExtract {
    pub text: String,
    pub metadata: ExtractMetadata,
}

/// Contract for the sandboxed extraction capability.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, content: &[u8], file_type: FileType) -> Result<RawExtract>;
}

/// In-process extractor for the plain-text formats.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_csv(text: &str) -> RawExtract {
        let mut lines = text.lines();
        let headers: Vec<String> = lines
            .next()
            .map(|h| h.split(',').map(|c| c.trim().to_string()).collect())
            .unwrap_or_default();
        let row_count = lines.count();
        let metadata = ExtractMetadata {
            file_type: Some(FileType::Csv),
            char_count: text.chars().count(),
            line_count: Some(text.lines().count()),
            row_count: Some(row_count),
            column_count: Some(headers.len()),
            headers: Some(headers),
            ..Default::default()
        };
        RawExtract {
            text: text.to_string(),
            metadata,
        }
    }
}

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, content: &[u8], file_type: FileType) -> Result<RawExtract> {
        let text = std::str::from_utf8(content)
            .map_err(|e| anyhow!("document is not valid UTF-8: {}", e))?;
        match file_type {
            FileType::Txt => Ok(RawExtract {
                metadata: ExtractMetadata::for_text(FileType::Txt, text),
                text: text.to_string(),
            }),
            FileType::Csv => Ok(Self::extract_csv(text)),
            FileType::Pdf | FileType::Pptx => Err(anyhow!(
                "{} extraction requires the sandboxed parser process",
                file_type
            )),
        }
    }
}

/// Runs an extraction on a worker thread under the bounded timeout. A run
/// that exceeds the bound is treated as failed; the worker is detached and
/// its eventual result discarded.
pub fn extract_with_timeout(
    extractor: Arc<dyn DocumentExtractor>,
    content: Vec<u8>,
    file_type: FileType,
    timeout: Duration,
) -> Result<RawExtract, CoreError> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let result = extractor.extract(&content, file_type);
        // Receiver may be gone after a timeout; nothing to do then.
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(extract)) => Ok(extract),
        Ok(Err(e)) => Err(CoreError::Extraction(e.to_string())),
        Err(_) => {
            warn!("extraction exceeded {:?} bound, treating as failed", timeout);
            Err(CoreError::ExtractionTimeout(timeout))
        }
    }
}
