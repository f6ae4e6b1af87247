use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Multipart, Path as UrlPath, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tera::{Context as TeraContext, Tera};

use crate::generate::{GeneratedArtifacts, generate_documents};
use crate::paths::{Workspace, allowed_image, sanitize_filename};
use crate::record::EventRecord;
use crate::settings::Settings;

use super::models::ErrorResponse;
use super::state::ServerState;

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PDF_MIME: &str = "application/pdf";

const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

const FORM_TEMPLATE: &str = include_str!("templates/form.html.tera");
const PREVIEW_TEMPLATE: &str = include_str!("templates/preview.html.tera");

pub async fn run_server(settings: Settings, addr: String) -> Result<()> {
    let workspace = Workspace::new(&settings)?;
    let state = Arc::new(ServerState {
        settings,
        workspace,
    });
    let app = Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/download/:fmt/:filename", get(download))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| "failed to bind server address")?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index(
    State(state): State<Arc<ServerState>>,
) -> Result<Html<String>, (StatusCode, Json<ErrorResponse>)> {
    let mut context = TeraContext::new();
    context.insert("institution", &state.settings.institution);
    let html = Tera::one_off(FORM_TEMPLATE, &context, true).map_err(internal)?;
    Ok(Html(html))
}

/// Multipart form submission: text fields fill the record, `invitation` and
/// `photos` files are persisted through the workspace, then both documents
/// are generated off the async runtime.
async fn generate(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Result<Html<String>, (StatusCode, Json<ErrorResponse>)> {
    let mut record = EventRecord::default();
    let mut invitation: Option<PathBuf> = None;
    let mut photos: Vec<PathBuf> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "invitation" | "photos" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_request)?;
                if file_name.is_empty() || bytes.is_empty() || !allowed_image(&file_name) {
                    continue;
                }
                let saved = state
                    .workspace
                    .save_upload(&file_name, &bytes)
                    .map_err(internal)?;
                if name == "invitation" {
                    invitation = Some(saved);
                } else {
                    photos.push(saved);
                }
            }
            _ => {
                let value = field.text().await.map_err(bad_request)?;
                record.set_field(&name, value);
            }
        }
    }

    let worker_state = state.clone();
    let worker_record = record.clone();
    let result = tokio::task::spawn_blocking(move || {
        generate_documents(
            &worker_record,
            invitation.as_deref(),
            &photos,
            &worker_state.settings,
            &worker_state.workspace,
        )
    })
    .await
    .map_err(internal)?;

    match result {
        Ok(artifacts) => {
            let html = render_preview(&state, &record, &artifacts).map_err(internal)?;
            Ok(Html(html))
        }
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Error creating DOCX: {}", err),
            }),
        )),
    }
}

fn render_preview(
    state: &ServerState,
    record: &EventRecord,
    artifacts: &GeneratedArtifacts,
) -> tera::Result<String> {
    let mut context = TeraContext::new();
    context.insert("institution", &state.settings.institution);
    context.insert("data", record);
    context.insert("docx", &format!("{}.docx", artifacts.base_name));
    context.insert(
        "pdf",
        &artifacts
            .pdf
            .as_ref()
            .map(|_| format!("{}.pdf", artifacts.base_name)),
    );
    Tera::one_off(PREVIEW_TEMPLATE, &context, true)
}

/// Serve a generated artifact as an attachment. Filenames are sanitized and
/// resolved strictly inside the outputs directory.
async fn download(
    State(state): State<Arc<ServerState>>,
    UrlPath((fmt, filename)): UrlPath<(String, String)>,
) -> Response {
    let mime = match fmt.as_str() {
        "docx" => DOCX_MIME,
        "pdf" => PDF_MIME,
        _ => return (StatusCode::NOT_FOUND, "File not found").into_response(),
    };
    let missing: (StatusCode, &str) = if fmt == "pdf" {
        (StatusCode::NOT_FOUND, "PDF not available")
    } else {
        (StatusCode::NOT_FOUND, "File not found")
    };

    let output_dir = state.workspace.output_dir().to_path_buf();
    let path = output_dir.join(sanitize_filename(&filename));
    let canonical_dir = std::fs::canonicalize(&output_dir).unwrap_or(output_dir);
    let canonical = match std::fs::canonicalize(&path) {
        Ok(value) => value,
        Err(_) => return missing.into_response(),
    };
    if !canonical.starts_with(&canonical_dir) {
        return (StatusCode::FORBIDDEN, "File path is not allowed").into_response();
    }

    match tokio::fs::read(&canonical).await {
        Ok(bytes) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                sanitize_filename(&filename)
            );
            (
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(_) => missing.into_response(),
    }
}

fn bad_request(err: impl std::fmt::Display) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn internal(err: impl std::fmt::Display) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
