//! One generation request: derive the output names, build the canonical DOCX
//! (fatal on failure), then the PDF (tolerated on failure).

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::BuildResult;
use crate::paths::Workspace;
use crate::record::EventRecord;
use crate::settings::Settings;
use crate::{docx, pdf};

/// What one request produced. `pdf` is `None` when that build failed; the
/// download surface then reports the format as unavailable.
#[derive(Debug, Clone)]
pub struct GeneratedArtifacts {
    pub base_name: String,
    pub docx: PathBuf,
    pub pdf: Option<PathBuf>,
}

pub fn generate_documents(
    record: &EventRecord,
    invitation: Option<&Path>,
    photos: &[PathBuf],
    settings: &Settings,
    workspace: &Workspace,
) -> BuildResult<GeneratedArtifacts> {
    let base_name = record.base_name();
    let docx_path = workspace.output_path(&base_name, "docx");
    let pdf_path = workspace.output_path(&base_name, "pdf");

    let docx = docx::render_docx(record, invitation, photos, settings, &docx_path)?;
    info!("wrote {}", docx.display());

    let pdf = match pdf::render_pdf(record, invitation, photos, settings, &pdf_path) {
        Ok(path) => {
            info!("wrote {}", path.display());
            Some(path)
        }
        Err(err) => {
            // The DOCX is canonical; a failed PDF leaves its download
            // reporting "not available" instead of failing the request.
            warn!("pdf build skipped: {}", err);
            None
        }
    };

    Ok(GeneratedArtifacts {
        base_name,
        docx,
        pdf,
    })
}
