//! Prescription upload.
//!
//! Uploading happens in two steps. [`capture`] reads the chosen file, then
//! [`PrescriptionStore::commit`] stores it against a product. [`UploadModal`]
//! tracks the dialog between the two so a submission never races the read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use medicare_core::ProductId;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::error::ValidationErrors;
use crate::models::{Prescription, PrescriptionFile};
use crate::storage::{Repository, RepositoryError, keys};

/// Shown when a prescription is submitted without a file.
pub const MISSING_FILE_MESSAGE: &str = "Please choose a prescription file before submitting.";

/// Shown after a prescription is stored.
pub const UPLOADED_MESSAGE: &str = "Prescription uploaded successfully.";

/// Errors reading a prescription file.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not a file")]
    NotAFile(PathBuf),
}

/// Errors storing a prescription.
#[derive(Debug, Error)]
pub enum PrescriptionError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

// =============================================================================
// Capture
// =============================================================================

/// Media type for the file extensions the upload dialog accepts.
fn media_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        _ => return None,
    })
}

/// Read a prescription file.
///
/// Images are loaded into a `data:` URL preview; any other file only
/// contributes its name.
///
/// # Errors
///
/// Returns [`CaptureError`] if the path is not a readable file.
#[instrument]
pub async fn capture(path: &Path) -> Result<PrescriptionFile, CaptureError> {
    let io_err = |source| CaptureError::Io {
        path: path.to_path_buf(),
        source,
    };

    let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
    if !metadata.is_file() {
        return Err(CaptureError::NotAFile(path.to_path_buf()));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CaptureError::NotAFile(path.to_path_buf()))?;
    let media_type = media_type(path);

    let mut file = PrescriptionFile {
        file_name,
        media_type,
        data_url: None,
    };

    if file.is_image() {
        let bytes = tokio::fs::read(path).await.map_err(io_err)?;
        debug!(bytes = bytes.len(), "Encoding image preview");
        file.data_url = media_type.map(|m| format!("data:{m};base64,{}", STANDARD.encode(&bytes)));
    }

    Ok(file)
}

// =============================================================================
// Upload dialog
// =============================================================================

/// Where the upload dialog is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadPhase {
    #[default]
    Closed,
    /// Open, no file chosen.
    Idle,
    /// A file is being read.
    Reading { file_name: String },
    /// A file has been read and can be submitted.
    Ready(PrescriptionFile),
}

/// State of the prescription upload dialog for one product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadModal {
    product_id: Option<ProductId>,
    phase: UploadPhase,
}

impl UploadModal {
    /// Open the dialog for `product_id`, discarding any earlier selection.
    pub fn open(&mut self, product_id: ProductId) {
        self.product_id = Some(product_id);
        self.phase = UploadPhase::Idle;
    }

    /// Close the dialog without submitting.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// Product the dialog is open for.
    #[must_use]
    pub const fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    #[must_use]
    pub const fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.phase, UploadPhase::Closed)
    }

    /// Mark a file as being read. Returns `false` if the dialog is closed.
    pub fn begin_read(&mut self, file_name: impl Into<String>) -> bool {
        if !self.is_open() {
            return false;
        }
        self.phase = UploadPhase::Reading {
            file_name: file_name.into(),
        };
        true
    }

    /// Record a finished read. Ignored unless that file is being read.
    pub fn finish_read(&mut self, file: PrescriptionFile) -> bool {
        match &self.phase {
            UploadPhase::Reading { file_name } if *file_name == file.file_name => {
                self.phase = UploadPhase::Ready(file);
                true
            }
            _ => false,
        }
    }

    /// Return to the idle phase after a failed read.
    pub fn fail_read(&mut self) {
        if self.is_open() {
            self.phase = UploadPhase::Idle;
        }
    }

    /// Whether a read is still in progress.
    #[must_use]
    pub const fn is_reading(&self) -> bool {
        matches!(self.phase, UploadPhase::Reading { .. })
    }

    /// The file ready for submission, if any.
    #[must_use]
    pub const fn ready_file(&self) -> Option<&PrescriptionFile> {
        match &self.phase {
            UploadPhase::Ready(file) => Some(file),
            _ => None,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Stored prescriptions keyed by product.
#[derive(Debug, Clone)]
pub struct PrescriptionStore {
    repo: Repository,
}

impl PrescriptionStore {
    #[must_use]
    pub const fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Store a prescription for `product_id`, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`PrescriptionError::Invalid`] if no file name is given, or
    /// [`PrescriptionError::Storage`] if the map cannot be written.
    #[instrument(skip(self, data_url), fields(product_id = %product_id))]
    pub fn commit(
        &self,
        product_id: ProductId,
        file_name: Option<&str>,
        data_url: Option<String>,
    ) -> Result<Prescription, PrescriptionError> {
        let file_name = file_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ValidationErrors::single("prescription", MISSING_FILE_MESSAGE))?;

        let prescription = Prescription {
            file_name: file_name.to_string(),
            data_url: data_url.filter(|d| !d.is_empty()),
            uploaded_at: Utc::now(),
        };

        let mut all = self.all();
        all.insert(product_id, prescription.clone());
        self.repo.save(keys::PRESCRIPTIONS, &all)?;

        info!(file_name = %prescription.file_name, "Prescription stored");
        Ok(prescription)
    }

    /// The prescription stored for `product_id`.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<Prescription> {
        self.all().remove(&product_id)
    }

    /// Every stored prescription.
    #[must_use]
    pub fn all(&self) -> BTreeMap<ProductId, Prescription> {
        self.repo.load_or_default(keys::PRESCRIPTIONS)
    }
}
