//! Color parsing and WCAG contrast math.

use image::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RGB`, `#RRGGBB`, `#AARRGGBB` (the `#` is optional) or a basic CSS color name.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(named) = Self::named(input) {
            return Some(named);
        }

        let hex = input.strip_prefix('#').unwrap_or(input);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        match hex.len() {
            3 => {
                let nibble = |i: usize| byte(i..i + 1).map(|v| v * 17);
                Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Some(Self::rgb(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
            8 => Some(Self {
                a: byte(0..2)?,
                r: byte(2..4)?,
                g: byte(4..6)?,
                b: byte(6..8)?,
            }),
            _ => None,
        }
    }

    fn named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" | "negro" => Self::BLACK,
            "white" | "blanco" => Self::WHITE,
            "red" | "rojo" => Self::rgb(255, 0, 0),
            "green" | "verde" => Self::rgb(0, 128, 0),
            "blue" | "azul" => Self::rgb(0, 0, 255),
            "yellow" | "amarillo" => Self::rgb(255, 255, 0),
            "purple" | "morado" => Self::rgb(128, 0, 128),
            "orange" | "naranja" => Self::rgb(255, 165, 0),
            "gray" | "grey" | "gris" => Self::rgb(128, 128, 128),
            _ => return None,
        };
        Some(color)
    }

    pub fn parse_or(input: &str, fallback: Self) -> Self {
        Self::parse(input).unwrap_or_else(|| {
            log::debug!("Unparsable color {input:?}, using fallback");
            fallback
        })
    }

    /// WCAG 2.x relative luminance in `0.0..=1.0`.
    pub fn relative_luminance(self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let c = f64::from(channel) / 255.0;
            if c <= 0.039_28 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// WCAG contrast ratio in `1.0..=21.0`, independent of argument order.
    pub fn contrast_ratio(self, other: Self) -> f64 {
        let a = self.relative_luminance();
        let b = other.relative_luminance();
        let (lighter, darker) = if a >= b { (a, b) } else { (b, a) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// Linear interpolation towards `other`; `t` is clamped to `0.0..=1.0`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |from: u8, to: u8| {
            let value = f32::from(from) + (f32::from(to) - f32::from(from)) * t;
            value.round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        Self([color.r, color.g, color.b, color.a])
    }
}

/// Frame background for a downloaded code: white or black, whichever contrasts more with `fill`.
pub fn frame_background_for(fill: Color) -> Color {
    if fill.contrast_ratio(Color::WHITE) >= fill.contrast_ratio(Color::BLACK) {
        Color::WHITE
    } else {
        Color::BLACK
    }
}

/// Muted caption color readable on a white or black frame.
pub fn caption_color_for(background: Color) -> Color {
    if background == Color::BLACK {
        Color::rgb(0xCC, 0xCC, 0xCC)
    } else {
        Color::rgb(0x66, 0x66, 0x66)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Color::parse("#FF8800"), Some(Color::rgb(255, 136, 0)));
        assert_eq!(Color::parse("ff8800"), Some(Color::rgb(255, 136, 0)));
        assert_eq!(Color::parse("#F80"), Some(Color::rgb(255, 136, 0)));
        assert_eq!(
            Color::parse("#80FF8800"),
            Some(Color {
                r: 255,
                g: 136,
                b: 0,
                a: 128
            })
        );
        assert_eq!(Color::parse("Azul"), Some(Color::rgb(0, 0, 255)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("#GGGGGG"), None);
        assert_eq!(Color::parse("#ÀÀÀ"), None);
        assert_eq!(Color::parse(""), None);
        assert_eq!(Color::parse_or("nope", Color::WHITE), Color::WHITE);
    }

    #[test]
    fn contrast_extremes() {
        let ratio = Color::BLACK.contrast_ratio(Color::WHITE);
        assert!((ratio - 21.0).abs() < 1e-9, "black on white is 21:1, got {ratio}");
        assert!((Color::WHITE.contrast_ratio(Color::WHITE) - 1.0).abs() < 1e-9);
        assert!(
            (Color::BLACK.contrast_ratio(Color::WHITE) - Color::WHITE.contrast_ratio(Color::BLACK))
                .abs()
                < 1e-12
        );
    }

    #[test]
    fn frame_background_contrasts_with_fill() {
        assert_eq!(frame_background_for(Color::BLACK), Color::WHITE);
        assert_eq!(frame_background_for(Color::rgb(0, 0, 139)), Color::WHITE);
        assert_eq!(frame_background_for(Color::WHITE), Color::BLACK);
        assert_eq!(frame_background_for(Color::rgb(255, 255, 0)), Color::BLACK);
    }

    #[test]
    fn caption_follows_background() {
        assert_eq!(caption_color_for(Color::WHITE).to_hex(), "#666666");
        assert_eq!(caption_color_for(Color::BLACK).to_hex(), "#CCCCCC");
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        assert_eq!(red.lerp(blue, 0.0), red);
        assert_eq!(red.lerp(blue, 1.0), blue);
        assert_eq!(red.lerp(blue, 0.5), Color::rgb(128, 0, 128));
        assert_eq!(red.lerp(blue, 7.0), blue);
    }
}
