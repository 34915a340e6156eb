//! Scan submissions.
//!
//! A [`ScanSubmission`] pairs the content to scan with its metadata. The
//! content may come from a file on disk, from memory, or be absent when the
//! service is asked to identify content by hash alone.
//!
//! File content is never read up front. [`ScanSubmission::prepare`] checks
//! that the file can be opened and records its length; the transport opens
//! it again and streams it while the request body is sent.

use crate::core::error::{Result, ScanError};
use crate::core::metadata::{ContentMetadata, ScanMetadata};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Content of a submission.
#[derive(Clone)]
pub enum SubmissionContent {
    /// A file on disk, streamed when the submission is uploaded.
    Path(PathBuf),

    /// In-memory bytes.
    Bytes {
        /// The content.
        data: Arc<[u8]>,
        /// Filename reported in the upload.
        filename: String,
    },

    /// No content; the metadata identifies it.
    None,
}

impl std::fmt::Debug for SubmissionContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes { data, filename } => f
                .debug_struct("Bytes")
                .field("data_len", &data.len())
                .field("filename", filename)
                .finish(),
            Self::None => f.write_str("None"),
        }
    }
}

/// Where the bytes of an upload come from.
///
/// Cloning is cheap: a file is referenced by path and in-memory content is
/// shared.
#[derive(Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// A file, opened afresh for every attempt to send it.
    File {
        /// Path of the file.
        path: PathBuf,
        /// Length in bytes when the submission was prepared.
        len: u64,
    },
    /// Shared in-memory content.
    Memory(Arc<[u8]>),
}

impl UploadSource {
    /// Returns the content length in bytes.
    pub fn len(&self) -> u64 {
        match self {
            Self::File { len, .. } => *len,
            Self::Memory(data) => data.len() as u64,
        }
    }

    /// Returns `true` if there is no content.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Opens the file behind a `File` source.
    pub async fn open_file(path: &Path) -> Result<tokio::fs::File> {
        tokio::fs::File::open(path)
            .await
            .map_err(|e| ScanError::io(path.display().to_string(), e))
    }
}

impl std::fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File { path, len } => f
                .debug_struct("File")
                .field("path", path)
                .field("len", len)
                .finish(),
            Self::Memory(data) => f.debug_struct("Memory").field("len", &data.len()).finish(),
        }
    }
}

/// A file part ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Filename reported in the upload.
    pub filename: String,
    /// Source of the content.
    pub source: UploadSource,
}

/// One scan request: the content and its metadata.
///
/// # Examples
///
/// ```rust
/// use atlant_scan::core::{ScanMetadata, ScanSettings, ScanSubmission};
///
/// let submission = ScanSubmission::from_path("/tmp/sample.bin")
///     .with_metadata(ScanMetadata::new().with_scan_settings(
///         ScanSettings::new().with_scan_archives(true),
///     ));
/// assert_eq!(submission.filename(), Some("sample.bin"));
/// ```
#[derive(Debug, Clone)]
pub struct ScanSubmission {
    /// The content to scan.
    pub content: SubmissionContent,
    /// Metadata sent with the content.
    pub metadata: ScanMetadata,
}

impl ScanSubmission {
    /// Creates a submission for a file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            content: SubmissionContent::Path(path.into()),
            metadata: ScanMetadata::default(),
        }
    }

    /// Creates a submission for in-memory content.
    pub fn from_bytes(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let data: Vec<u8> = data.into();
        Self {
            content: SubmissionContent::Bytes {
                data: Arc::from(data),
                filename: filename.into(),
            },
            metadata: ScanMetadata::default(),
        }
    }

    /// Creates a submission that identifies the content by its SHA-1 only.
    ///
    /// If the returned verdict reports `need_content`, the content has to be
    /// submitted in full.
    pub fn hash_lookup(sha1: impl Into<String>) -> Self {
        Self {
            content: SubmissionContent::None,
            metadata: ScanMetadata::new().with_content_meta(ContentMetadata::from_sha1(sha1)),
        }
    }

    /// Replaces the metadata.
    pub fn with_metadata(mut self, metadata: ScanMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the filename that will be reported in the upload.
    pub fn filename(&self) -> Option<&str> {
        match &self.content {
            SubmissionContent::Path(path) => path.file_name().and_then(|n| n.to_str()),
            SubmissionContent::Bytes { filename, .. } => Some(filename),
            SubmissionContent::None => None,
        }
    }

    /// Resolves the file part without reading the content.
    ///
    /// A file is opened once to make sure it is readable and to take its
    /// length, then closed again. Returns `None` for metadata-only
    /// submissions.
    pub async fn prepare(&self) -> Result<Option<FilePart>> {
        match &self.content {
            SubmissionContent::Path(path) => {
                let file = UploadSource::open_file(path).await?;
                let metadata = file
                    .metadata()
                    .await
                    .map_err(|e| ScanError::io(path.display().to_string(), e))?;
                if !metadata.is_file() {
                    return Err(ScanError::io(
                        path.display().to_string(),
                        std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
                    ));
                }
                Ok(Some(FilePart {
                    filename: filename_of(path),
                    source: UploadSource::File {
                        path: path.clone(),
                        len: metadata.len(),
                    },
                }))
            }
            SubmissionContent::Bytes { data, filename } => Ok(Some(FilePart {
                filename: filename.clone(),
                source: UploadSource::Memory(Arc::clone(data)),
            })),
            SubmissionContent::None => Ok(None),
        }
    }
}

fn filename_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string())
}
