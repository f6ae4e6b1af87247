//! Word-processor output: the 3-page circular/report/photographs document,
//! assembled as a flow document and packed to disk.

use std::fs;
use std::path::{Path, PathBuf};

use docx_rs::{
    AlignmentType, BreakType, Docx, Header, Paragraph, Pic, Run, Style, StyleType, Table,
    TableCell, TableRow,
};
use image::GenericImageView;
use tracing::warn;

use crate::error::{BuildError, BuildResult};
use crate::record::EventRecord;
use crate::settings::Settings;

const EMU_PER_INCH: f32 = 914_400.0;

/// Build the DOCX artifact and write it to `out`. Image failures degrade to
/// text notices; only an unwritable destination or a packing failure is
/// fatal.
pub fn render_docx(
    record: &EventRecord,
    invitation: Option<&Path>,
    photos: &[PathBuf],
    settings: &Settings,
    out: &Path,
) -> BuildResult<PathBuf> {
    let mut docx = register_styles(Docx::new()).header(document_header(settings));

    docx = circular_page(docx, record, invitation, settings);
    docx = report_page(docx, record);
    docx = photos_page(docx, photos, settings);

    let mut buffer = Vec::new();
    docx.build()
        .pack(&mut std::io::Cursor::new(&mut buffer))
        .map_err(|err| BuildError::DocumentBuild(format!("failed to pack docx: {}", err)))?;
    fs::write(out, buffer).map_err(|err| {
        BuildError::DocumentBuild(format!("failed to write {}: {}", out.display(), err))
    })?;
    Ok(out.to_path_buf())
}

fn heading_style(name: &str, display_name: &str, size: usize) -> Style {
    Style::new(name, StyleType::Paragraph)
        .name(display_name)
        .size(size)
        .bold()
}

fn register_styles(docx: Docx) -> Docx {
    docx.add_style(heading_style("Title", "Title", 56))
        .add_style(heading_style("Heading1", "Heading 1", 32))
        .add_style(heading_style("Heading2", "Heading 2", 28))
        .add_style(heading_style("Heading3", "Heading 3", 26))
        .add_style(
            Style::new("IntenseQuote", StyleType::Paragraph)
                .name("Intense Quote")
                .align(AlignmentType::Center)
                .bold()
                .size(28),
        )
}

/// Centered logo plus institution name, repeated on every page.
fn document_header(settings: &Settings) -> Header {
    let mut para = Paragraph::new().align(AlignmentType::Center);
    if let Some(logo) = settings.logo_path.as_deref() {
        match picture_run(Path::new(logo), settings.layout.logo_width_in) {
            Ok(run) => para = para.add_run(run),
            Err(err) => warn!("header logo skipped: {}", err),
        }
    }
    para = para.add_run(
        Run::new()
            .add_break(BreakType::TextWrapping)
            .add_text(settings.institution.as_str())
            .bold(),
    );
    Header::new().add_paragraph(para)
}

/// Load an image and wrap it in a run at a fixed display width, preserving
/// aspect ratio. The full decode up front keeps undecodable bytes out of the
/// package.
fn picture_run(path: &Path, width_in: f32) -> BuildResult<Run> {
    let bytes = fs::read(path).map_err(|err| BuildError::image(path, err))?;
    let decoded = image::load_from_memory(&bytes).map_err(|err| BuildError::image(path, err))?;
    let (px_w, px_h) = decoded.dimensions();
    let width_emu = (width_in * EMU_PER_INCH) as u32;
    let height_emu = scaled_height_emu(width_emu, px_w, px_h);
    Ok(Run::new().add_image(Pic::new(&bytes).size(width_emu, height_emu)))
}

fn scaled_height_emu(width_emu: u32, px_w: u32, px_h: u32) -> u32 {
    (width_emu as f32 * px_h as f32 / px_w.max(1) as f32) as u32
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn page_break() -> Paragraph {
    Paragraph::new().add_run(Run::new().add_break(BreakType::Page))
}

fn circular_page(
    mut docx: Docx,
    record: &EventRecord,
    invitation: Option<&Path>,
    settings: &Settings,
) -> Docx {
    docx = docx.add_paragraph(Paragraph::new());
    docx = docx.add_paragraph(
        Paragraph::new().add_run(
            Run::new()
                .add_text(format!("Ref: {}", record.ref_no))
                .add_tab()
                .add_tab()
                .add_tab()
                .add_text(format!("Date: {}", record.date_ref))
                .bold(),
        ),
    );
    docx = docx.add_paragraph(
        Paragraph::new()
            .style("IntenseQuote")
            .add_run(Run::new().add_text("CIRCULAR")),
    );

    // Invitation image scaled to a fixed width; fall back to the free-text
    // circular body when the image is absent or undecodable.
    match invitation {
        Some(path) => match picture_run(path, settings.layout.invitation_width_in) {
            Ok(run) => docx = docx.add_paragraph(Paragraph::new().add_run(run)),
            Err(err) => {
                warn!("invitation image unusable, falling back to text: {}", err);
                docx = docx.add_paragraph(text_paragraph(&record.circular_text));
            }
        },
        None => {
            docx = docx.add_paragraph(text_paragraph(&record.circular_text));
        }
    }

    docx = docx.add_paragraph(Paragraph::new());
    docx = docx.add_paragraph(
        Paragraph::new().add_run(
            Run::new()
                .add_text("HoD")
                .add_tab()
                .add_tab()
                .add_tab()
                .add_tab()
                .add_text("PRINCIPAL"),
        ),
    );
    docx = docx.add_paragraph(
        Paragraph::new().add_run(
            Run::new()
                .add_text("Copy to")
                .add_break(BreakType::TextWrapping)
                .add_text("All HoD's")
                .add_break(BreakType::TextWrapping)
                .add_text("Notice board")
                .add_break(BreakType::TextWrapping)
                .add_text("To be read in all class rooms"),
        ),
    );
    docx.add_paragraph(page_break())
}

fn key_value_row(key: &str, value: &str) -> TableRow {
    TableRow::new(vec![
        TableCell::new().add_paragraph(text_paragraph(key)),
        TableCell::new().add_paragraph(text_paragraph(value)),
    ])
}

fn report_page(mut docx: Docx, record: &EventRecord) -> Docx {
    docx = docx.add_paragraph(
        Paragraph::new()
            .style("Title")
            .add_run(Run::new().add_text(format!("DEPARTMENT OF {}", record.department))),
    );
    docx = docx.add_paragraph(
        Paragraph::new()
            .style("Heading1")
            .add_run(Run::new().add_text("REPORT OF THE EVENT")),
    );

    docx = docx.add_table(Table::new(vec![
        key_value_row("Name of the activity", &record.title),
        key_value_row("Department", &record.department),
        key_value_row("Academic year", &record.academic_year),
        key_value_row("Date of activity conducted", &record.date_activity),
        key_value_row("Organized by", &record.organized_by),
    ]));

    docx = docx.add_paragraph(Paragraph::new());
    docx = docx.add_paragraph(
        Paragraph::new()
            .style("Heading2")
            .add_run(Run::new().add_text("Workshop Overview")),
    );
    docx = docx.add_paragraph(text_paragraph(&record.overview));

    if !record.day1.is_empty() {
        docx = docx.add_paragraph(
            Paragraph::new()
                .style("Heading3")
                .add_run(Run::new().add_text("Day 1: Fundamentals and Demonstrations")),
        );
        docx = docx.add_paragraph(text_paragraph(&record.day1));
    }
    if !record.day2.is_empty() {
        docx = docx.add_paragraph(
            Paragraph::new()
                .style("Heading3")
                .add_run(Run::new().add_text("Day 2: Advanced Troubleshooting and Maintenance")),
        );
        docx = docx.add_paragraph(text_paragraph(&record.day2));
    }
    if !record.learning_outcomes.is_empty() {
        docx = docx.add_paragraph(
            Paragraph::new()
                .style("Heading2")
                .add_run(Run::new().add_text("Learning Outcomes")),
        );
        docx = docx.add_paragraph(text_paragraph(&record.learning_outcomes));
    }

    docx = docx.add_paragraph(
        Paragraph::new()
            .style("Heading2")
            .add_run(Run::new().add_text("Conclusion")),
    );
    docx = docx.add_paragraph(text_paragraph(&record.conclusion));
    docx = docx.add_paragraph(text_paragraph(
        "Function was inaugurated by our resource person",
    ));

    docx = docx.add_table(Table::new(vec![TableRow::new(vec![
        TableCell::new().add_paragraph(text_paragraph("HoD")),
        TableCell::new().add_paragraph(text_paragraph("PRINCIPAL")),
    ])]));

    docx.add_paragraph(page_break())
}

fn photo_cell(path: &Path, settings: &Settings) -> TableCell {
    match picture_run(path, settings.layout.photo_width_in) {
        Ok(run) => TableCell::new().add_paragraph(Paragraph::new().add_run(run)),
        Err(err) => {
            warn!("photo skipped in docx grid: {}", err);
            let name = path
                .file_name()
                .map(|value| value.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            TableCell::new().add_paragraph(text_paragraph(&format!(
                "(Unable to add image: {})",
                name
            )))
        }
    }
}

fn photos_page(mut docx: Docx, photos: &[PathBuf], settings: &Settings) -> Docx {
    docx = docx.add_paragraph(
        Paragraph::new()
            .style("Heading1")
            .add_run(Run::new().add_text("Event Photographs")),
    );
    if photos.is_empty() {
        return docx.add_paragraph(text_paragraph("No photos uploaded."));
    }

    // Two photos per row, one single-row table per pair; an odd trailing
    // photo leaves the second cell empty.
    for pair in photos.chunks(2) {
        let mut cells = vec![photo_cell(&pair[0], settings)];
        if let Some(second) = pair.get(1) {
            cells.push(photo_cell(second, settings));
        } else {
            cells.push(TableCell::new().add_paragraph(Paragraph::new()));
        }
        docx = docx.add_table(Table::new(vec![TableRow::new(cells)]));
    }
    docx
}
