//! Paginated PDF output: the same three logical pages as the DOCX, painted
//! with absolute coordinates and a manually tracked vertical cursor.

mod canvas;

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::BuildResult;
use crate::images;
use crate::record::EventRecord;
use crate::settings::{Layout, Settings};
use crate::wrap::wrap;

use canvas::{Canvas, PAGE_HEIGHT_PT, PAGE_WIDTH_PT};

const HEADER_FONT: f32 = 12.0;
const TITLE_FONT: f32 = 13.0;
const SUBTITLE_FONT: f32 = 12.0;
const SECTION_FONT: f32 = 11.0;
const BODY_FONT: f32 = 10.0;

/// Logo bottom edge and institution-name baseline, measured down from the
/// page top.
const HEADER_LOGO_DROP: f32 = 80.0;
const HEADER_NAME_DROP: f32 = 95.0;

const PAGE1_SIGNATURE_Y: f32 = 120.0;
const PAGE2_SIGNATURE_Y: f32 = 100.0;

/// Build the PDF artifact and write it to `out`. Missing or undecodable
/// images degrade (text fallback on page 1, blank grid cells on page 3);
/// only an unwritable destination or a document-level failure is an error.
pub fn render_pdf(
    record: &EventRecord,
    invitation: Option<&Path>,
    photos: &[PathBuf],
    settings: &Settings,
    out: &Path,
) -> BuildResult<PathBuf> {
    let mut painter = Painter::new(record, settings)?;
    painter.circular_page(record, invitation);
    painter.start_page();
    painter.report_page(record);
    painter.start_page();
    painter.photos_page(photos);
    painter.finish(out)
}

struct Painter<'a> {
    canvas: Canvas,
    layout: &'a Layout,
    settings: &'a Settings,
    /// Vertical cursor in points from the page bottom.
    y: f32,
}

impl<'a> Painter<'a> {
    fn new(record: &EventRecord, settings: &'a Settings) -> BuildResult<Self> {
        let canvas = Canvas::new(&record.base_name())?;
        Ok(Self {
            canvas,
            layout: &settings.layout,
            settings,
            y: PAGE_HEIGHT_PT - settings.layout.content_top,
        })
    }

    fn finish(self, out: &Path) -> BuildResult<PathBuf> {
        self.canvas.save(out)
    }

    /// Centered logo and institution name, repeated at the top of every page.
    fn draw_header(&mut self) {
        if let Some(logo) = self.settings.logo_path.as_deref() {
            let path = Path::new(logo);
            match images::inspect(path) {
                Ok((px_w, px_h)) => {
                    let (w, h) =
                        images::scale_to_width(px_w, px_h, self.layout.header_logo_width);
                    let x = PAGE_WIDTH_PT / 2.0 - w / 2.0;
                    let y = PAGE_HEIGHT_PT - HEADER_LOGO_DROP;
                    if let Err(err) = self.canvas.image(path, x, y, w, h) {
                        warn!("header logo skipped: {}", err);
                    }
                }
                Err(err) => warn!("header logo skipped: {}", err),
            }
        }
        self.canvas.text_centred(
            &self.settings.institution,
            HEADER_FONT,
            PAGE_WIDTH_PT / 2.0,
            PAGE_HEIGHT_PT - HEADER_NAME_DROP,
            true,
        );
    }

    /// New page with the header redrawn and the cursor reset to the top of
    /// the content area.
    fn start_page(&mut self) {
        self.canvas.new_page();
        self.draw_header();
        self.y = PAGE_HEIGHT_PT - self.layout.content_top;
    }

    /// Emit wrapped body lines, breaking the page whenever the cursor has
    /// fallen below the bottom margin.
    fn body_lines(&mut self, text: &str) {
        for line in wrap(text, self.layout.wrap_width) {
            if self.y < self.layout.bottom_margin {
                self.start_page();
            }
            self.canvas
                .text(&line, BODY_FONT, self.layout.margin, self.y, false);
            self.y -= self.layout.line_height;
        }
    }

    /// Bold heading plus wrapped body; the page-break check runs per line.
    fn section(&mut self, title: &str, body: &str) {
        self.y -= self.layout.section_gap;
        self.canvas
            .text(title, SECTION_FONT, self.layout.margin, self.y, true);
        self.y -= self.layout.detail_line_height;
        self.body_lines(body);
    }

    fn optional_section(&mut self, title: &str, body: &str) {
        if body.is_empty() {
            return;
        }
        self.section(title, body);
    }

    fn circular_page(&mut self, record: &EventRecord, invitation: Option<&Path>) {
        let margin = self.layout.margin;
        let ref_y = PAGE_HEIGHT_PT - self.layout.content_top;
        self.draw_header();
        self.canvas.text(
            &format!("Ref: {}", record.ref_no),
            SECTION_FONT,
            margin,
            ref_y,
            true,
        );
        self.canvas.text_right(
            &format!("Date: {}", record.date_ref),
            SECTION_FONT,
            PAGE_WIDTH_PT - margin,
            ref_y,
            true,
        );
        self.canvas
            .text("CIRCULAR", TITLE_FONT, margin, ref_y - 30.0, true);

        self.y = ref_y - 60.0;
        let mut drew_invitation = false;
        if let Some(path) = invitation {
            match self.draw_invitation(path) {
                Ok(()) => drew_invitation = true,
                Err(err) => warn!("invitation image unusable, falling back to text: {}", err),
            }
        }
        if !drew_invitation {
            self.body_lines(&record.circular_text);
        }

        self.canvas
            .text("HoD", BODY_FONT, margin, PAGE1_SIGNATURE_Y, false);
        self.canvas.text_right(
            "PRINCIPAL",
            BODY_FONT,
            PAGE_WIDTH_PT - margin,
            PAGE1_SIGNATURE_Y,
            false,
        );
    }

    /// Invitation scaled to the full content width, preserving aspect ratio.
    fn draw_invitation(&mut self, path: &Path) -> BuildResult<()> {
        let (px_w, px_h) = images::inspect(path)?;
        let max_w = PAGE_WIDTH_PT - 2.0 * self.layout.margin;
        let (w, h) = images::scale_to_width(px_w, px_h, max_w);
        self.canvas
            .image(path, self.layout.margin, self.y - h - 10.0, w, h)?;
        self.y -= h + 40.0;
        Ok(())
    }

    fn report_page(&mut self, record: &EventRecord) {
        let margin = self.layout.margin;
        let top = PAGE_HEIGHT_PT - self.layout.content_top;
        self.canvas.text_centred(
            &format!("DEPARTMENT OF {}", record.department),
            TITLE_FONT,
            PAGE_WIDTH_PT / 2.0,
            top,
            true,
        );
        self.canvas.text_centred(
            "REPORT OF THE EVENT",
            SUBTITLE_FONT,
            PAGE_WIDTH_PT / 2.0,
            top - 20.0,
            true,
        );

        self.y = top - 50.0;
        let details = [
            format!("Name of the activity: {}", record.title),
            format!("Department: {}", record.department),
            format!("Academic year: {}", record.academic_year),
            format!("Date of activity conducted: {}", record.date_activity),
            format!("Organized by: {}", record.organized_by),
        ];
        for line in &details {
            self.canvas.text(line, BODY_FONT, margin, self.y, false);
            self.y -= self.layout.detail_line_height;
        }

        self.section("Workshop Overview:", &record.overview);
        self.optional_section("Day 1: Fundamentals and Demonstrations", &record.day1);
        self.optional_section(
            "Day 2: Advanced Troubleshooting and Maintenance",
            &record.day2,
        );
        self.optional_section("Learning Outcomes:", &record.learning_outcomes);
        self.optional_section("Conclusion:", &record.conclusion);

        self.canvas
            .text("HoD", BODY_FONT, margin, PAGE2_SIGNATURE_Y, false);
        self.canvas.text_right(
            "PRINCIPAL",
            BODY_FONT,
            PAGE_WIDTH_PT - margin,
            PAGE2_SIGNATURE_Y,
            false,
        );
    }

    /// Two-column photo grid; column and row indices are the only pagination
    /// state. Undecodable photos leave their cell blank.
    fn photos_page(&mut self, photos: &[PathBuf]) {
        let layout = self.layout;
        self.canvas.text_centred(
            "Event Photographs",
            TITLE_FONT,
            PAGE_WIDTH_PT / 2.0,
            PAGE_HEIGHT_PT - layout.content_top,
            true,
        );

        let col_w = (PAGE_WIDTH_PT - 2.0 * layout.margin - layout.photo_gutter) / 2.0;
        let x_positions = [layout.margin, layout.margin + col_w + layout.photo_gutter];
        let y_start = PAGE_HEIGHT_PT - layout.photo_top;

        if photos.is_empty() {
            self.canvas
                .text("No photos uploaded.", BODY_FONT, layout.margin, y_start, false);
            return;
        }

        let mut col = 0usize;
        let mut row = 0usize;
        for path in photos {
            if col == 0 && !row_fits(row, y_start, layout) {
                self.canvas.new_page();
                self.draw_header();
                row = 0;
            }
            match images::inspect(path) {
                Ok((px_w, px_h)) => {
                    let (w, h) =
                        images::fit_within(px_w, px_h, col_w, layout.photo_row_height);
                    let x = x_positions[col] + (col_w - w) / 2.0;
                    let row_top =
                        y_start - row as f32 * (layout.photo_row_height + layout.photo_row_gap);
                    if let Err(err) = self.canvas.image(path, x, row_top - h, w, h) {
                        warn!("photo skipped in pdf grid: {}", err);
                    }
                }
                Err(err) => warn!("photo skipped in pdf grid: {}", err),
            }
            col += 1;
            if col > 1 {
                col = 0;
                row += 1;
            }
        }
    }
}

/// Whether row `row` still fits above the bottom margin on the current page.
fn row_fits(row: usize, y_start: f32, layout: &Layout) -> bool {
    let row_top = y_start - row as f32 * (layout.photo_row_height + layout.photo_row_gap);
    row_top - layout.photo_row_height >= layout.bottom_margin
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> EventRecord {
        EventRecord {
            ref_no: "SEC/2024/17".to_string(),
            date_ref: "12-03-2024".to_string(),
            title: "Robotics Workshop".to_string(),
            department: "MECHATRONICS".to_string(),
            academic_year: "2023-2024".to_string(),
            date_activity: "10-03-2024".to_string(),
            organized_by: "Dept. of Mechatronics".to_string(),
            overview: "An intensive two day workshop. ".repeat(40),
            conclusion: "The event concluded successfully.".to_string(),
            circular_text: "All students are invited.".to_string(),
            ..Default::default()
        }
    }

    fn settings_without_logo() -> Settings {
        Settings {
            logo_path: None,
            ..Default::default()
        }
    }

    #[test]
    fn default_grid_fits_four_rows_per_page() {
        let layout = Layout::default();
        let y_start = PAGE_HEIGHT_PT - layout.photo_top;
        assert!(row_fits(0, y_start, &layout));
        assert!(row_fits(3, y_start, &layout));
        assert!(!row_fits(4, y_start, &layout));
    }

    #[test]
    fn render_writes_a_pdf_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("event.pdf");
        let settings = settings_without_logo();
        render_pdf(&sample_record(), None, &[], &settings, &out).expect("render pdf");
        let bytes = std::fs::read(&out).expect("read pdf");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn undecodable_photos_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let broken = dir.path().join("broken.jpg");
        std::fs::write(&broken, b"not a jpeg").expect("write file");
        let good = dir.path().join("good.png");
        image::RgbImage::new(40, 30).save(&good).expect("write png");

        let out = dir.path().join("event.pdf");
        let settings = settings_without_logo();
        render_pdf(
            &sample_record(),
            None,
            &[broken, good],
            &settings,
            &out,
        )
        .expect("render pdf");
        assert!(out.exists());
    }

    #[test]
    fn unwritable_destination_is_a_pdf_build_error() {
        let settings = settings_without_logo();
        let out = Path::new("/nonexistent-dir/event.pdf");
        let err = render_pdf(&sample_record(), None, &[], &settings, out).unwrap_err();
        assert!(matches!(err, crate::error::BuildError::PdfBuild(_)));
    }
}
