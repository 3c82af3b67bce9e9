//! Rendering QR payloads into styled raster images.
//!
//! The module matrix comes from the `qrcode` crate; this module only paints it:
//! module shapes, solid or gradient fill, background, and the branded frame
//! used for downloads.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use qrcode::render::unicode::Dense1x2;
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};

use crate::color::{Color, caption_color_for, frame_background_for};
use crate::glyphs;
use crate::qr_spec::{ErrorCorrection, FillKind, ModuleStyle, QrContentSpec};

/// Padding around the code in the downloaded image.
pub const FRAME_PADDING: u32 = 40;
/// Height of the caption band below the code.
pub const CAPTION_HEIGHT: u32 = 40;
pub const CAPTION: &str = "Generado por Lumi";

const FINDER_SIZE: usize = 7;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Content is too long for a QR code at correction level {0}")]
    DataTooLong(ErrorCorrection),
    #[error("QR encoding failed: {0}")]
    Encode(String),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Paints QR codes at a fixed scale.
#[derive(Debug, Clone, Copy)]
pub struct QrRenderer {
    module_size: u32,
    quiet_zone: u32,
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self {
            module_size: 10,
            quiet_zone: 4,
        }
    }
}

impl QrRenderer {
    /// `module_size` is in pixels per module, `quiet_zone` in modules.
    pub fn new(module_size: u32, quiet_zone: u32) -> Self {
        Self {
            module_size: module_size.max(1),
            quiet_zone,
        }
    }

    pub fn render(&self, payload: &str, spec: &QrContentSpec) -> Result<RenderedQr, RenderError> {
        let code = encode(payload, spec.error_correction)?;
        let width = code.width();
        let dark: Vec<bool> = code
            .to_colors()
            .into_iter()
            .map(|color| color == qrcode::Color::Dark)
            .collect();

        let ms = self.module_size;
        let side = (width as u32 + 2 * self.quiet_zone) * ms;
        let background = Color::parse_or(&spec.colors.background, Color::WHITE);
        let paint = Paint::new(spec, side);
        let mut image = RgbaImage::from_pixel(side, side, background.into());

        for y in 0..width {
            for x in 0..width {
                if !dark[y * width + x] {
                    continue;
                }
                let shape = if is_finder(x, y, width) {
                    ModuleStyle::Square
                } else {
                    spec.style
                };
                let left = (x as u32 + self.quiet_zone) * ms;
                let top = (y as u32 + self.quiet_zone) * ms;
                for dy in 0..ms {
                    for dx in 0..ms {
                        if covers(shape, dx, dy, ms) {
                            let (px, py) = (left + dx, top + dy);
                            image.put_pixel(px, py, paint.at(px, py).into());
                        }
                    }
                }
            }
        }

        Ok(RenderedQr {
            image,
            fill: paint.primary(),
        })
    }
}

fn encode(payload: &str, level: ErrorCorrection) -> Result<QrCode, RenderError> {
    QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::from(level)).map_err(
        |err| match err {
            QrError::DataTooLong => RenderError::DataTooLong(level),
            other => RenderError::Encode(other.to_string()),
        },
    )
}

/// Finder patterns stay square so detectors can lock on regardless of style.
fn is_finder(x: usize, y: usize, width: usize) -> bool {
    let near_start = |v: usize| v < FINDER_SIZE;
    let near_end = |v: usize| v + FINDER_SIZE >= width;
    (near_start(x) && near_start(y)) || (near_end(x) && near_start(y)) || (near_start(x) && near_end(y))
}

/// Whether pixel `(dx, dy)` of a `size`-pixel cell is painted for `shape`.
fn covers(shape: ModuleStyle, dx: u32, dy: u32, size: u32) -> bool {
    let size = size as f32;
    let (cx, cy) = (dx as f32 + 0.5, dy as f32 + 0.5);
    match shape {
        ModuleStyle::Square => true,
        ModuleStyle::Dots => {
            let center = size / 2.0;
            let radius = size * 0.45;
            (cx - center).powi(2) + (cy - center).powi(2) <= radius * radius
        }
        ModuleStyle::Rounded => {
            let radius = size * 0.35;
            let nearest_x = cx.clamp(radius, size - radius);
            let nearest_y = cy.clamp(radius, size - radius);
            (cx - nearest_x).powi(2) + (cy - nearest_y).powi(2) <= radius * radius
        }
    }
}

/// Fill color lookup for solid and diagonal gradient fills.
struct Paint {
    stops: Vec<Color>,
    gradient: bool,
    span: f32,
}

impl Paint {
    fn new(spec: &QrContentSpec, side: u32) -> Self {
        let fill = &spec.colors.fill;
        let mut stops: Vec<Color> = fill
            .values
            .iter()
            .map(|value| Color::parse_or(value, Color::BLACK))
            .collect();
        if stops.is_empty() {
            stops.push(Color::BLACK);
        }
        Self {
            gradient: fill.kind == FillKind::Gradient && stops.len() > 1,
            stops,
            span: (2 * side.saturating_sub(1)).max(1) as f32,
        }
    }

    fn primary(&self) -> Color {
        self.stops.first().copied().unwrap_or(Color::BLACK)
    }

    /// Top-left to bottom-right interpolation across all stops.
    fn at(&self, x: u32, y: u32) -> Color {
        if !self.gradient {
            return self.primary();
        }
        let t = (x + y) as f32 / self.span;
        let segments = (self.stops.len() - 1) as f32;
        let position = t * segments;
        let index = (position.floor() as usize).min(self.stops.len() - 2);
        self.stops[index].lerp(self.stops[index + 1], position - index as f32)
    }
}

/// A rendered code plus the primary fill color used to pick the frame.
#[derive(Debug, Clone)]
pub struct RenderedQr {
    image: RgbaImage,
    fill: Color,
}

impl RenderedQr {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    /// The code on a contrasting frame with the caption underneath.
    pub fn branded(&self) -> RgbaImage {
        let background = frame_background_for(self.fill);
        let caption = caption_color_for(background);
        let width = self.image.width() + 2 * FRAME_PADDING;
        let height = self.image.height() + 2 * FRAME_PADDING + CAPTION_HEIGHT;

        let mut canvas = RgbaImage::from_pixel(width, height, background.into());
        imageops::overlay(
            &mut canvas,
            &self.image,
            i64::from(FRAME_PADDING),
            i64::from(FRAME_PADDING),
        );

        let rule_y = FRAME_PADDING + self.image.height() + FRAME_PADDING / 2;
        glyphs::draw_rule(
            &mut canvas,
            FRAME_PADDING,
            FRAME_PADDING + self.image.width(),
            rule_y,
            caption,
        );
        let band_top = 2 * FRAME_PADDING + self.image.height();
        glyphs::draw_centered(&mut canvas, CAPTION, band_top, CAPTION_HEIGHT, caption);
        canvas
    }

    pub fn to_png_bytes(&self) -> Result<Vec<u8>, RenderError> {
        encode_png(&self.image)
    }

    pub fn branded_png_bytes(&self) -> Result<Vec<u8>, RenderError> {
        encode_png(&self.branded())
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image.clone()).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Half-block text rendering of `payload` for terminals.
pub fn terminal_preview(payload: &str, level: ErrorCorrection) -> Result<String, RenderError> {
    let code = encode(payload, level)?;
    Ok(code
        .render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .quiet_zone(true)
        .build())
}
