//! Built-in bitmap font
//!
//! A fixed 5×7 glyph table (A–Z, 0–9) that is always available, used when no
//! scalable font can be loaded. Lowercase letters render as uppercase; any
//! other character renders as a blank cell.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

/// Each row is 5 bits wide, most significant bit on the left
type Glyph = [u8; GLYPH_HEIGHT as usize];

const BLANK: Glyph = [0; 7];

#[rustfmt::skip]
const LETTERS: [Glyph; 26] = [
    [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // M
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
];

#[rustfmt::skip]
const DIGITS: [Glyph; 10] = [
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // 0
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // 1
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // 2
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // 3
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // 4
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // 5
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // 6
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // 7
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // 8
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // 9
];

#[allow(clippy::cast_possible_truncation)]
fn glyph(c: char) -> &'static Glyph {
    let c = c.to_ascii_uppercase();
    match c {
        'A'..='Z' => &LETTERS[(c as u8 - b'A') as usize],
        '0'..='9' => &DIGITS[(c as u8 - b'0') as usize],
        _ => &BLANK,
    }
}

/// Fixed-size bitmap font; each glyph pixel is drawn as a `pixel_size` square
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapFont {
    pixel_size: u32,
}

impl Default for BitmapFont {
    fn default() -> Self {
        Self { pixel_size: 2 }
    }
}

impl BitmapFont {
    /// Bounding box of `text`: glyph cells separated by one blank column
    pub fn measure(self, text: &str) -> (u32, u32) {
        let count = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        if count == 0 {
            return (0, 0);
        }
        let columns = count * GLYPH_WIDTH + (count - 1);
        (columns * self.pixel_size, GLYPH_HEIGHT * self.pixel_size)
    }

    /// Draw `text` with its top-left corner at `(x, y)`; pixels outside the canvas are clipped
    #[allow(clippy::cast_possible_wrap)]
    pub fn draw(self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str) {
        let step = i32::try_from(self.pixel_size).unwrap_or(i32::MAX);
        let advance = step * (GLYPH_WIDTH as i32 + 1);

        for (index, c) in (0_i32..).zip(text.chars()) {
            let origin_x = x + index * advance;
            for (row, bits) in (0_i32..).zip(glyph(c)) {
                for col in 0..GLYPH_WIDTH as i32 {
                    if bits & (0x10 >> col) != 0 {
                        let rect = Rect::at(origin_x + col * step, y + row * step)
                            .of_size(self.pixel_size, self.pixel_size);
                        draw_filled_rect_mut(canvas, rect, color);
                    }
                }
            }
        }
    }
}
