//! Icon generation
//!
//! Renders square PNG app icons: a solid background with the centered label
//! `SC`. Used by the `generate-icons` binary.

pub mod bitmap;
pub mod font;

use std::path::{Path, PathBuf};

use image::error::{ParameterError, ParameterErrorKind};
use image::{ImageError, ImageFormat, Rgba, RgbaImage};

pub use bitmap::BitmapFont;
pub use font::LabelFont;

use crate::logger;

pub const ICON_LABEL: &str = "SC";

/// Medium indigo, fully opaque
pub const INDIGO: Rgba<u8> = Rgba([99, 102, 241, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// One icon to render and where to write it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSpec {
    pub size: u32,
    pub background: Rgba<u8>,
    pub foreground: Rgba<u8>,
    pub path: PathBuf,
}

impl IconSpec {
    /// Indigo background with a white label, the palette every app icon uses
    pub fn indigo(size: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            size,
            background: INDIGO,
            foreground: WHITE,
            path: path.into(),
        }
    }
}

/// Top-left corner that centers a `(w, h)` box on a `size`-pixel square.
/// Negative when the box is larger than the canvas.
pub fn centered_origin(size: u32, (width, height): (u32, u32)) -> (i32, i32) {
    let offset = |extent: u32| {
        let diff = (i64::from(size) - i64::from(extent)).div_euclid(2);
        i32::try_from(diff).unwrap_or(if diff < 0 { i32::MIN } else { i32::MAX })
    };
    (offset(width), offset(height))
}

pub fn render_icon(
    size: u32,
    background: Rgba<u8>,
    foreground: Rgba<u8>,
    font: &LabelFont,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(size, size, background);
    let (x, y) = centered_origin(size, font.measure(ICON_LABEL));
    font.draw(&mut canvas, foreground, x, y, ICON_LABEL);
    canvas
}

/// Render `spec` with the best available font and write it as PNG
pub fn create_icon(spec: &IconSpec) -> Result<PathBuf, ImageError> {
    let font = LabelFont::load(spec.size);
    create_icon_with_font(spec, &font)
}

pub fn create_icon_with_font(spec: &IconSpec, font: &LabelFont) -> Result<PathBuf, ImageError> {
    if spec.size == 0 {
        return Err(ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        )));
    }

    let canvas = render_icon(spec.size, spec.background, spec.foreground, font);
    canvas.save_with_format(&spec.path, ImageFormat::Png)?;
    logger::log_info(&format!("Created icon at {}", spec.path.display()));
    Ok(spec.path.clone())
}

/// The 192px and 512px icons a web app manifest references
pub fn default_icon_specs(dir: &Path) -> [IconSpec; 2] {
    [192, 512].map(|size| IconSpec::indigo(size, dir.join(format!("icon-{size}x{size}.png"))))
}

/// Write both default icons into `dir`, stopping at the first failure
pub fn generate_default_icons(dir: &Path) -> Result<Vec<PathBuf>, ImageError> {
    default_icon_specs(dir).iter().map(create_icon).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap() -> LabelFont {
        LabelFont::Bitmap(BitmapFont::default())
    }

    fn lit_bounds(img: &RgbaImage, color: Rgba<u8>) -> (u32, u32, u32, u32) {
        let lit: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == color)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty(), "label was not drawn");
        (
            lit.iter().map(|p| p.0).min().unwrap(),
            lit.iter().map(|p| p.1).min().unwrap(),
            lit.iter().map(|p| p.0).max().unwrap(),
            lit.iter().map(|p| p.1).max().unwrap(),
        )
    }

    #[test]
    fn test_centered_origin() {
        assert_eq!(centered_origin(192, (22, 14)), (85, 89));
        assert_eq!(centered_origin(10, (3, 3)), (3, 3));
        assert_eq!(centered_origin(4, (7, 4)), (-2, 0));
    }

    #[test]
    fn test_render_centers_label() {
        let img = render_icon(192, INDIGO, WHITE, &bitmap());
        assert_eq!(img.dimensions(), (192, 192));
        assert_eq!(*img.get_pixel(0, 0), INDIGO);
        assert_eq!(*img.get_pixel(191, 191), INDIGO);

        let (min_x, min_y, max_x, max_y) = lit_bounds(&img, WHITE);
        let (w, h) = bitmap().measure(ICON_LABEL);
        assert!(min_x.abs_diff((192 - w) / 2) <= 1);
        assert!(min_y.abs_diff((192 - h) / 2) <= 1);
        assert_eq!((max_x - min_x + 1, max_y - min_y + 1), (w, h));
    }

    #[test]
    fn test_render_centers_scalable_label() {
        let font = LabelFont::load(192);
        if !font.is_scalable() {
            eprintln!("no scalable font installed, skipping");
            return;
        }

        let (w, h) = font.measure(ICON_LABEL);
        assert!(w > 0 && w < 192 && h > 0 && h < 192);
        let (x, y) = centered_origin(192, (w, h));

        // Anti-aliased edges blend, so count anything that is not background
        let img = render_icon(192, INDIGO, WHITE, &font);
        let (min_x, min_y, max_x, max_y) = {
            let ink: Vec<(u32, u32)> = img
                .enumerate_pixels()
                .filter(|(_, _, p)| **p != INDIGO)
                .map(|(x, y, _)| (x, y))
                .collect();
            assert!(!ink.is_empty(), "label was not drawn");
            (
                ink.iter().map(|p| p.0).min().unwrap(),
                ink.iter().map(|p| p.1).min().unwrap(),
                ink.iter().map(|p| p.0).max().unwrap(),
                ink.iter().map(|p| p.1).max().unwrap(),
            )
        };

        let (x, y) = (x.unsigned_abs(), y.unsigned_abs());
        assert!(min_x + 1 >= x && max_x <= x + w + 1, "x ink {min_x}..{max_x} outside {x}+{w}");
        assert!(min_y + 1 >= y && max_y <= y + h + 1, "y ink {min_y}..{max_y} outside {y}+{h}");
        // Ink is balanced around the canvas center horizontally
        assert!((min_x + max_x).abs_diff(191) <= w / 4 + 2);
    }

    #[test]
    fn test_create_icon_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let spec = IconSpec::indigo(192, dir.path().join("icon.png"));
        let path = create_icon_with_font(&spec, &bitmap()).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (192, 192));
        assert_eq!(*decoded.get_pixel(0, 0), INDIGO);
        assert_eq!(decoded, render_icon(192, INDIGO, WHITE, &bitmap()));
    }

    #[test]
    fn test_unusable_font_still_produces_icon() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("arial.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();

        let font = LabelFont::from_candidates(512, &[bogus]);
        let spec = IconSpec::indigo(512, dir.path().join("icon-512x512.png"));
        create_icon_with_font(&spec, &font).unwrap();

        let decoded = image::open(&spec.path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (512, 512));
    }

    #[test]
    fn test_default_icons() {
        let dir = tempfile::tempdir().unwrap();
        let paths = generate_default_icons(dir.path()).unwrap();
        assert_eq!(
            paths,
            vec![
                dir.path().join("icon-192x192.png"),
                dir.path().join("icon-512x512.png"),
            ]
        );
        for (path, size) in paths.iter().zip([192, 512]) {
            let decoded = image::open(path).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (size, size));
        }
    }

    #[test]
    fn test_zero_size_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let spec = IconSpec::indigo(0, dir.path().join("empty.png"));
        assert!(create_icon_with_font(&spec, &bitmap()).is_err());
        assert!(!spec.path.exists());
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let spec = IconSpec::indigo(192, dir.path().join("missing/icon.png"));
        assert!(create_icon(&spec).is_err());
    }
}
