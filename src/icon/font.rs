//! Label font selection
//!
//! Prefers a scalable TrueType font sized to a quarter of the canvas edge and
//! falls back to the built-in bitmap font, so a usable font always exists.

use std::error::Error;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use super::bitmap::BitmapFont;
use crate::logger;

/// Font files tried in order; the Liberation and DejaVu faces stand in for
/// Arial on systems that do not ship it
const FONT_FILES: &[&str] = &[
    "arial.ttf",
    "Arial.ttf",
    "LiberationSans-Regular.ttf",
    "DejaVuSans.ttf",
];

/// How deep to descend into font directories (e.g. `/usr/share/fonts/truetype/dejavu`)
const MAX_SEARCH_DEPTH: usize = 4;

/// Font used to draw the icon label
pub enum LabelFont {
    Scalable { font: FontVec, scale: PxScale },
    Bitmap(BitmapFont),
}

impl LabelFont {
    /// Best available font for a canvas of `canvas_size` pixels. Never fails.
    pub fn load(canvas_size: u32) -> Self {
        let candidates: Vec<PathBuf> = FONT_FILES
            .iter()
            .filter_map(|name| find_font_file(name))
            .collect();
        Self::from_candidates(canvas_size, &candidates)
    }

    /// First candidate that loads, or the bitmap fallback
    pub fn from_candidates(canvas_size: u32, candidates: &[PathBuf]) -> Self {
        for path in candidates {
            match Self::from_file(path, canvas_size) {
                Ok(font) => return font,
                Err(e) => logger::log_warning(&format!(
                    "Skipping font '{}': {e}",
                    path.display()
                )),
            }
        }
        logger::log_info("No scalable font found, using built-in bitmap font");
        Self::Bitmap(BitmapFont::default())
    }

    /// Load a TrueType/OpenType file with an em size of `canvas_size / 4` pixels
    pub fn from_file(path: &Path, canvas_size: u32) -> Result<Self, Box<dyn Error>> {
        let data = std::fs::read(path)?;
        let font = FontVec::try_from_vec(data)?;
        let scale = em_scale(&font, label_em_size(canvas_size));
        Ok(Self::Scalable { font, scale })
    }

    pub const fn is_scalable(&self) -> bool {
        matches!(self, Self::Scalable { .. })
    }

    /// Width and height of `text` as rendered
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            Self::Scalable { font, scale } => text_size(*scale, font, text),
            Self::Bitmap(bitmap) => bitmap.measure(text),
        }
    }

    pub fn draw(&self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str) {
        match self {
            Self::Scalable { font, scale } => draw_text_mut(canvas, color, x, y, *scale, font, text),
            Self::Bitmap(bitmap) => bitmap.draw(canvas, color, x, y, text),
        }
    }
}

/// Quarter of the canvas edge, floor division
#[allow(clippy::cast_precision_loss)]
fn label_em_size(canvas_size: u32) -> f32 {
    (canvas_size / 4) as f32
}

/// `PxScale` is the ascent-to-descent height, so convert from an em size
fn em_scale(font: &FontVec, em_px: f32) -> PxScale {
    match font.units_per_em() {
        Some(units) if units > 0.0 => PxScale::from(em_px * font.height_unscaled() / units),
        _ => PxScale::from(em_px),
    }
}

/// Look for `name` directly in the working directory, then anywhere under the
/// platform font directories
fn find_font_file(name: &str) -> Option<PathBuf> {
    find_in_dir(Path::new("."), name, 0).or_else(|| {
        system_font_dirs()
            .iter()
            .find_map(|dir| find_in_dir(dir, name, MAX_SEARCH_DEPTH))
    })
}

fn find_in_dir(dir: &Path, name: &str, depth: usize) -> Option<PathBuf> {
    let candidate = dir.join(name);
    if candidate.is_file() {
        return Some(candidate);
    }
    if depth == 0 {
        return None;
    }

    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();
    subdirs
        .iter()
        .find_map(|sub| find_in_dir(sub, name, depth - 1))
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let home = std::env::var_os("HOME").map(PathBuf::from);

    if cfg!(windows) {
        if let Some(windir) = std::env::var_os("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        }
    } else if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/Library/Fonts"));
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        if let Some(home) = home {
            dirs.push(home.join("Library/Fonts"));
        }
    } else {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        if let Some(home) = home {
            dirs.push(home.join(".local/share/fonts"));
            dirs.push(home.join(".fonts"));
        }
    }
    dirs
}
