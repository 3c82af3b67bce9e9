//! A tiny 5x7 bitmap face for the caption on branded downloads.

use image::RgbaImage;

use crate::color::Color;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const ADVANCE: u32 = GLYPH_WIDTH + 1;
const MAX_SCALE: u32 = 3;

/// Rows top to bottom, most significant of the low five bits is the left column.
fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c {
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'a' => [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
        'd' => [0b00001, 0b00001, 0b01101, 0b10011, 0b10001, 0b10001, 0b01111],
        'e' => [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
        'i' => [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110],
        'm' => [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001],
        'n' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        'o' => [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        'p' => [0b00000, 0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000],
        'r' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000],
        'u' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101],
        ' ' => [0; 7],
        _ => return None,
    };
    Some(rows)
}

/// Pixel width of `text` at `scale`, unknown characters included as blanks.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let count = text.chars().count() as u32;
    if count == 0 {
        return 0;
    }
    (count * ADVANCE - 1) * scale
}

/// Draws `text` horizontally centered inside the band `[top, top + height)`,
/// shrinking the scale until it fits the canvas width.
pub fn draw_centered(canvas: &mut RgbaImage, text: &str, top: u32, height: u32, color: Color) {
    let scale = (1..=MAX_SCALE)
        .rev()
        .find(|&scale| text_width(text, scale) <= canvas.width() && GLYPH_HEIGHT * scale <= height)
        .unwrap_or(1);

    let left = canvas.width().saturating_sub(text_width(text, scale)) / 2;
    let top = top + height.saturating_sub(GLYPH_HEIGHT * scale) / 2;
    let pixel = color.into();

    for (index, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else {
            log::debug!("no caption glyph for {c:?}");
            continue;
        };
        let origin = left + index as u32 * ADVANCE * scale;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let x = origin + col * scale + sx;
                        let y = top + row as u32 * scale + sy;
                        if x < canvas.width() && y < canvas.height() {
                            canvas.put_pixel(x, y, pixel);
                        }
                    }
                }
            }
        }
    }
}

/// One-pixel horizontal rule from `left` to `right` (exclusive).
pub fn draw_rule(canvas: &mut RgbaImage, left: u32, right: u32, y: u32, color: Color) {
    if y >= canvas.height() {
        return;
    }
    let pixel = color.into();
    for x in left..right.min(canvas.width()) {
        canvas.put_pixel(x, y, pixel);
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn caption_characters_all_have_glyphs() {
        assert!(crate::render::CAPTION.chars().all(|c| glyph(c).is_some()));
    }

    #[test]
    fn width_accounts_for_spacing() {
        assert_eq!(text_width("", 3), 0);
        assert_eq!(text_width("a", 1), 5);
        assert_eq!(text_width("ab", 2), 22);
    }

    #[test]
    fn text_is_drawn_inside_the_band() {
        let background = Rgba([255, 255, 255, 255]);
        let mut canvas = RgbaImage::from_pixel(120, 60, background);
        draw_centered(&mut canvas, "Lumi", 20, 40, Color::BLACK);

        let inked: Vec<(u32, u32)> = canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != background)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|&(_, y)| (20..60).contains(&y)));
    }

    #[test]
    fn wide_text_shrinks_to_fit() {
        let background = Rgba([0, 0, 0, 255]);
        let mut canvas = RgbaImage::from_pixel(110, 20, background);
        draw_centered(&mut canvas, "Generado por Lumi", 0, 20, Color::WHITE);
        // 17 glyphs at scale 1 are 101 px wide, so the last column stays clear.
        assert!((0..20).all(|y| *canvas.get_pixel(109, y) == background));
    }
}
