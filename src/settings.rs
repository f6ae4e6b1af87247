use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

/// Resolved configuration: server address, storage directories, branding and
/// the layout constants both builders share.
#[derive(Debug, Clone)]
pub struct Settings {
    pub addr: String,
    pub upload_dir: String,
    pub output_dir: String,
    pub institution: String,
    pub logo_path: Option<String>,
    pub layout: Layout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:5000".to_string(),
            upload_dir: "uploads".to_string(),
            output_dir: "outputs".to_string(),
            institution: "SURYA ENGINEERING COLLEGE, ERODE".to_string(),
            logo_path: Some("static/sec_logo.png".to_string()),
            layout: Layout::default(),
        }
    }
}

/// Page geometry and image sizing, in points unless suffixed otherwise.
/// Defaults reproduce the sample-matched layouts; override via `[layout]`.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Left/right content margin.
    pub margin: f32,
    /// Cursor floor; crossing it forces a page break.
    pub bottom_margin: f32,
    /// Distance from the page top to the cursor after a break.
    pub content_top: f32,
    /// Per wrapped body line.
    pub line_height: f32,
    /// Per key/value detail line on the report page.
    pub detail_line_height: f32,
    /// Extra gap before a section heading.
    pub section_gap: f32,
    /// Body wrap width in characters.
    pub wrap_width: usize,
    /// Header logo display width.
    pub header_logo_width: f32,
    /// Distance from the page top to the first photo row.
    pub photo_top: f32,
    pub photo_row_height: f32,
    pub photo_gutter: f32,
    pub photo_row_gap: f32,
    /// DOCX image display widths, in inches.
    pub logo_width_in: f32,
    pub invitation_width_in: f32,
    pub photo_width_in: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            margin: 50.0,
            bottom_margin: 120.0,
            content_top: 120.0,
            line_height: 14.0,
            detail_line_height: 16.0,
            section_gap: 8.0,
            wrap_width: 100,
            header_logo_width: 120.0,
            photo_top: 160.0,
            photo_row_height: 120.0,
            photo_gutter: 20.0,
            photo_row_gap: 20.0,
            logo_width_in: 1.6,
            invitation_width_in: 6.0,
            photo_width_in: 3.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    server: Option<ServerSection>,
    storage: Option<StorageSection>,
    branding: Option<BrandingSection>,
    layout: Option<LayoutSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    addr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageSection {
    upload_dir: Option<String>,
    output_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BrandingSection {
    institution: Option<String>,
    logo_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutSection {
    margin: Option<f32>,
    bottom_margin: Option<f32>,
    content_top: Option<f32>,
    line_height: Option<f32>,
    detail_line_height: Option<f32>,
    section_gap: Option<f32>,
    wrap_width: Option<usize>,
    header_logo_width: Option<f32>,
    photo_top: Option<f32>,
    photo_row_height: Option<f32>,
    photo_gutter: Option<f32>,
    photo_row_gap: Option<f32>,
    logo_width_in: Option<f32>,
    invitation_width_in: Option<f32>,
    photo_width_in: Option<f32>,
}

/// Load defaults, then merge `settings.toml`, `settings.local.toml` and an
/// optional explicit file, in that order.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(server) = incoming.server {
            if let Some(addr) = server.addr {
                if !addr.trim().is_empty() {
                    self.addr = addr;
                }
            }
        }
        if let Some(storage) = incoming.storage {
            if let Some(dir) = storage.upload_dir {
                if !dir.trim().is_empty() {
                    self.upload_dir = dir;
                }
            }
            if let Some(dir) = storage.output_dir {
                if !dir.trim().is_empty() {
                    self.output_dir = dir;
                }
            }
        }
        if let Some(branding) = incoming.branding {
            if let Some(name) = branding.institution {
                if !name.trim().is_empty() {
                    self.institution = name;
                }
            }
            if let Some(path) = branding.logo_path {
                // An explicitly blank path turns the logo off.
                if path.trim().is_empty() {
                    self.logo_path = None;
                } else {
                    self.logo_path = Some(path);
                }
            }
        }
        if let Some(layout) = incoming.layout {
            self.layout.merge(layout);
        }
    }
}

impl Layout {
    fn merge(&mut self, incoming: LayoutSection) {
        fn set_positive(slot: &mut f32, value: Option<f32>) {
            if let Some(value) = value {
                if value > 0.0 {
                    *slot = value;
                }
            }
        }
        set_positive(&mut self.margin, incoming.margin);
        set_positive(&mut self.bottom_margin, incoming.bottom_margin);
        set_positive(&mut self.content_top, incoming.content_top);
        set_positive(&mut self.line_height, incoming.line_height);
        set_positive(&mut self.detail_line_height, incoming.detail_line_height);
        set_positive(&mut self.section_gap, incoming.section_gap);
        set_positive(&mut self.header_logo_width, incoming.header_logo_width);
        set_positive(&mut self.photo_top, incoming.photo_top);
        set_positive(&mut self.photo_row_height, incoming.photo_row_height);
        set_positive(&mut self.photo_gutter, incoming.photo_gutter);
        set_positive(&mut self.photo_row_gap, incoming.photo_row_gap);
        set_positive(&mut self.logo_width_in, incoming.logo_width_in);
        set_positive(&mut self.invitation_width_in, incoming.invitation_width_in);
        set_positive(&mut self.photo_width_in, incoming.photo_width_in);
        if let Some(width) = incoming.wrap_width {
            if width > 0 {
                self.wrap_width = width;
            }
        }
    }
}
