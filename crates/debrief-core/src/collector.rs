//! Upload & session collector.
//!
//! Holds whatever the user has supplied so far (free text plus uploaded
//! files) until an analysis is requested. Nothing here rejects input: size and
//! count limits are advisory and only produce messages for display.

use crate::error::{DebriefError, Result};
use crate::request::AnalysisInput;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// One uploaded file, already converted to a data-URI payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Original file name as the user selected it.
    pub name: String,
    /// Declared media type, e.g. "application/pdf".
    #[serde(default)]
    pub media_type: String,
    /// `data:<media>;base64,<data>`
    pub payload: String,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            payload: payload.into(),
        }
    }

    /// Encode raw file contents as a data-URI payload.
    pub fn from_bytes(name: impl Into<String>, media_type: impl Into<String>, bytes: &[u8]) -> Self {
        let media_type = media_type.into();
        let prefix_type = if media_type.is_empty() {
            DEFAULT_MEDIA_TYPE
        } else {
            media_type.as_str()
        };
        let payload = format!("data:{};base64,{}", prefix_type, BASE64.encode(bytes));
        Self {
            name: name.into(),
            media_type,
            payload,
        }
    }

    /// Read a file from disk, guessing its media type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let bytes = std::fs::read(path).map_err(|e| DebriefError::InvalidUpload {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_bytes(name, guess_media_type(path), &bytes))
    }

    /// Size of the decoded contents, estimated from the base64 length.
    pub fn approx_size_bytes(&self) -> usize {
        let data = strip_data_uri_prefix(&self.payload).trim_end_matches('=');
        data.len() * 3 / 4
    }
}

/// Everything after the first comma of a `data:` URI. Anything else is
/// returned unchanged.
pub fn strip_data_uri_prefix(payload: &str) -> &str {
    if !payload.starts_with("data:") {
        return payload;
    }
    match payload.find(',') {
        Some(idx) => &payload[idx + 1..],
        None => payload,
    }
}

/// The media type embedded in a `data:` URI, if there is one.
pub fn data_uri_media_type(payload: &str) -> Option<&str> {
    let rest = payload.strip_prefix("data:")?;
    let header = &rest[..rest.find(',')?];
    let media = header.split(';').next().unwrap_or("");
    if media.is_empty() {
        None
    } else {
        Some(media)
    }
}

/// Media type for common meeting-material extensions.
pub fn guess_media_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "ppt" => "application/vnd.ms-powerpoint",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => DEFAULT_MEDIA_TYPE,
    }
}

/// Display-only upload limits.
#[derive(Debug, Clone, Copy)]
pub struct AdvisoryLimits {
    pub max_files: usize,
    pub max_file_bytes: usize,
}

impl Default for AdvisoryLimits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_bytes: 20 * 1024 * 1024, // 20MB
        }
    }
}

/// Accumulates notes, slide text, context and files for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionCollector {
    notes: String,
    slides_text: String,
    context: String,
    files: Vec<UploadedFile>,
}

impl SessionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn set_slides_text(&mut self, slides_text: impl Into<String>) {
        self.slides_text = slides_text.into();
    }

    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = context.into();
    }

    pub fn add_file(&mut self, file: UploadedFile) {
        self.files.push(file);
    }

    pub fn add_bytes(&mut self, name: impl Into<String>, media_type: impl Into<String>, bytes: &[u8]) {
        self.files.push(UploadedFile::from_bytes(name, media_type, bytes));
    }

    /// Remove the file at `index`. Returns `None` when out of range.
    pub fn remove_file(&mut self, index: usize) -> Option<UploadedFile> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn is_empty(&self) -> bool {
        self.notes.trim().is_empty()
            && self.slides_text.trim().is_empty()
            && self.context.trim().is_empty()
            && self.files.is_empty()
    }

    /// Messages for any advisory limit the current input exceeds.
    pub fn advisories(&self, limits: &AdvisoryLimits) -> Vec<String> {
        let mut out = Vec::new();
        if self.files.len() > limits.max_files {
            out.push(format!(
                "{} files selected; more than {} may slow the analysis",
                self.files.len(),
                limits.max_files
            ));
        }
        for f in &self.files {
            let size = f.approx_size_bytes();
            if size > limits.max_file_bytes {
                out.push(format!(
                    "{} is about {} MB; files over {} MB may be rejected by the service",
                    f.name,
                    size / (1024 * 1024),
                    limits.max_file_bytes / (1024 * 1024)
                ));
            }
        }
        out
    }

    /// Copy of the current input, leaving the collector untouched.
    pub fn snapshot(&self) -> AnalysisInput {
        AnalysisInput {
            notes: self.notes.clone(),
            slides_text: self.slides_text.clone(),
            context: self.context.clone(),
            files: self.files.clone(),
        }
    }

    /// Hand the input over and reset the collector.
    pub fn take(&mut self) -> AnalysisInput {
        let taken = std::mem::take(self);
        AnalysisInput {
            notes: taken.notes,
            slides_text: taken.slides_text,
            context: taken.context,
            files: taken.files,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
