use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure classes for document generation.
///
/// `Image` failures are recovered close to where they occur (placeholder
/// text or a skipped grid cell) and never abort a build on their own.
/// `DocumentBuild` aborts the whole request; `PdfBuild` is tolerated by the
/// orchestrator and only logged.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to load image {path}: {detail}")]
    Image { path: PathBuf, detail: String },

    #[error("failed to build document: {0}")]
    DocumentBuild(String),

    #[error("failed to build pdf: {0}")]
    PdfBuild(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    pub fn image(path: &Path, detail: impl ToString) -> Self {
        Self::Image {
            path: path.to_path_buf(),
            detail: detail.to_string(),
        }
    }
}

pub type BuildResult<T> = Result<T, BuildError>;
