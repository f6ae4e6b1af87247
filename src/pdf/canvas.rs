//! Thin canvas wrapper over printpdf: point coordinates, builtin Helvetica,
//! page management and image placement.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerIndex, PdfLayerReference, PdfPageIndex,
};

use crate::error::{BuildError, BuildResult};

/// A4 in points.
pub(crate) const PAGE_WIDTH_PT: f32 = 595.28;
pub(crate) const PAGE_HEIGHT_PT: f32 = 841.89;

const PT_TO_MM: f32 = 25.4 / 72.0;
/// Average Helvetica glyph advance as a fraction of the font size; good
/// enough for centring and right-alignment of short header strings.
const CHAR_WIDTH_RATIO: f32 = 0.6;

pub(crate) fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * CHAR_WIDTH_RATIO
}

/// One A4 PDF document under construction. Coordinates are points from the
/// bottom-left corner, converted to millimetres at the draw call.
pub(crate) struct Canvas {
    doc: PdfDocumentReference,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Canvas {
    pub(crate) fn new(title: &str) -> BuildResult<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_PT * PT_TO_MM),
            Mm(PAGE_HEIGHT_PT * PT_TO_MM),
            "Layer 1",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| BuildError::PdfBuild(err.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| BuildError::PdfBuild(err.to_string()))?;
        Ok(Self {
            doc,
            page,
            layer,
            regular,
            bold,
        })
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc.get_page(self.page).get_layer(self.layer)
    }

    pub(crate) fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_PT * PT_TO_MM),
            Mm(PAGE_HEIGHT_PT * PT_TO_MM),
            "Layer 1",
        );
        self.page = page;
        self.layer = layer;
    }

    pub(crate) fn text(&self, text: &str, size: f32, x_pt: f32, y_pt: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer()
            .use_text(text, size, Mm(x_pt * PT_TO_MM), Mm(y_pt * PT_TO_MM), font);
    }

    pub(crate) fn text_centred(&self, text: &str, size: f32, cx_pt: f32, y_pt: f32, bold: bool) {
        let x = cx_pt - text_width(text, size) / 2.0;
        self.text(text, size, x, y_pt, bold);
    }

    pub(crate) fn text_right(&self, text: &str, size: f32, right_pt: f32, y_pt: f32, bold: bool) {
        let x = right_pt - text_width(text, size);
        self.text(text, size, x, y_pt, bold);
    }

    /// Place an image file with its bottom-left corner at `(x, y)`, scaled to
    /// `w x h` points. Fails on unreadable/undecodable files; callers decide
    /// whether that skips or falls back.
    pub(crate) fn image(&self, path: &Path, x_pt: f32, y_pt: f32, w_pt: f32, h_pt: f32)
    -> BuildResult<()> {
        let bytes = fs::read(path).map_err(|err| BuildError::image(path, err))?;
        let decoded = printpdf::image_crate::load_from_memory(&bytes)
            .map_err(|err| BuildError::image(path, err))?;
        // Alpha channels are flattened; printpdf embeds plain RGB.
        let rgb = decoded.to_rgb8();
        let (px_w, px_h) = rgb.dimensions();
        let (px_w, px_h) = (px_w.max(1), px_h.max(1));
        let image = Image::from_dynamic_image(&printpdf::image_crate::DynamicImage::ImageRgb8(rgb));
        // At 72 dpi one pixel is one point, so the scale factors below map
        // pixel extents straight onto the requested point size.
        image.add_to_layer(
            self.layer(),
            ImageTransform {
                translate_x: Some(Mm(x_pt * PT_TO_MM)),
                translate_y: Some(Mm(y_pt * PT_TO_MM)),
                scale_x: Some(w_pt / px_w as f32),
                scale_y: Some(h_pt / px_h as f32),
                dpi: Some(72.0),
                ..Default::default()
            },
        );
        Ok(())
    }

    pub(crate) fn save(self, out: &Path) -> BuildResult<PathBuf> {
        let file = fs::File::create(out).map_err(|err| {
            BuildError::PdfBuild(format!("failed to create {}: {}", out.display(), err))
        })?;
        let mut writer = BufWriter::new(file);
        self.doc
            .save(&mut writer)
            .map_err(|err| BuildError::PdfBuild(err.to_string()))?;
        Ok(out.to_path_buf())
    }
}
