//! Upload/output directories and filename hygiene.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::settings::Settings;

const ALLOWED_IMG: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Keep ASCII alphanumerics plus `.`, `-` and `_`; everything else becomes an
/// underscore. Falls back to `file` for empty input.
pub fn sanitize_filename(value: &str) -> String {
    let mut out = String::new();
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    let out = out.trim_matches('.').to_string();
    if out.is_empty() { "file".to_string() } else { out }
}

/// Uploads are restricted to common raster image extensions.
pub fn allowed_image(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_IMG.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// The on-disk namespace of one deployment: where uploads land and where
/// generated artifacts go. Both directories are created up front; names are
/// sanitized, and identically named files overwrite each other.
#[derive(Debug, Clone)]
pub struct Workspace {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl Workspace {
    pub fn new(settings: &Settings) -> Result<Self> {
        let upload_dir = PathBuf::from(&settings.upload_dir);
        let output_dir = PathBuf::from(&settings.output_dir);
        fs::create_dir_all(&upload_dir)
            .with_context(|| format!("failed to create upload dir: {}", upload_dir.display()))?;
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;
        Ok(Self {
            upload_dir,
            output_dir,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Persist an uploaded file under its sanitized original name and return
    /// the stored path.
    pub fn save_upload(&self, original_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.upload_dir.join(sanitize_filename(original_name));
        fs::write(&path, bytes)
            .with_context(|| format!("failed to save upload: {}", path.display()))?;
        Ok(path)
    }

    /// `<outputs>/<base>.<ext>` for a generated artifact.
    pub fn output_path(&self, base: &str, ext: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", base, ext))
    }
}
