//! Placeholder preview frame for a slideshow: a gradient card with a caption.

use anyhow::Context;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use std::io::Cursor;
use std::path::PathBuf;

use crate::{config::PreviewConfig, errors::Result, models::PreviewSettings};

pub const WIDTH: u32 = 1280;
pub const HEIGHT: u32 = 720;

const GRADIENT: [[u8; 3]; 3] = [[155, 135, 245], [217, 70, 239], [249, 115, 22]];
const OVERLAY_ALPHA: u32 = 153;
const TITLE_SCALE: f32 = 40.0;
const INFO_SCALE: f32 = 28.0;
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    font_path: PathBuf,
}

impl PreviewRenderer {
    pub fn new(config: &PreviewConfig) -> Self {
        Self {
            font_path: PathBuf::from(&config.font_path),
        }
    }

    /// Renders the PNG. Captions are best effort: if they cannot be drawn
    /// the plain background is returned and a warning logged.
    pub fn render(&self, photo_count: usize, settings: &PreviewSettings) -> Result<Vec<u8>> {
        let mut canvas = background();

        let title = caption_title(photo_count);
        let info = caption_info(settings);
        if let Err(e) = self.draw_captions(&mut canvas, &title, &info) {
            tracing::warn!("Preview rendered without captions: {:#}", e);
        }

        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(canvas)
            .write_to(&mut Cursor::new(&mut buffer), ImageOutputFormat::Png)?;
        Ok(buffer)
    }

    fn draw_captions(&self, canvas: &mut RgbImage, title: &str, info: &str) -> anyhow::Result<()> {
        let bytes = std::fs::read(&self.font_path)
            .with_context(|| format!("reading font {}", self.font_path.display()))?;
        let font = Font::try_from_vec(bytes)
            .with_context(|| format!("parsing font {}", self.font_path.display()))?;

        let center_y = (HEIGHT / 2) as i32;
        draw_centered(canvas, &font, Scale::uniform(TITLE_SCALE), center_y - 40, title);
        draw_centered(canvas, &font, Scale::uniform(INFO_SCALE), center_y + 20, info);
        Ok(())
    }
}

pub fn caption_title(photo_count: usize) -> String {
    if photo_count == 1 {
        "Video from 1 photo".to_string()
    } else {
        format!("Video from {} photos", photo_count)
    }
}

pub fn caption_info(settings: &PreviewSettings) -> String {
    format!(
        "{}s · {} · {}",
        settings.duration, settings.animation_type, settings.transition
    )
}

fn draw_centered(canvas: &mut RgbImage, font: &Font<'_>, scale: Scale, y: i32, text: &str) {
    let (text_width, _) = text_size(scale, font, text);
    let x = (WIDTH as i32 - text_width) / 2;
    draw_text_mut(canvas, WHITE, x, y, scale, font, text);
}

/// Three-stop vertical gradient darkened by a translucent black overlay.
pub fn background() -> RgbImage {
    let mut canvas = RgbImage::new(WIDTH, HEIGHT);

    for y in 0..HEIGHT {
        let color = darken(gradient_row(y));
        for x in 0..WIDTH {
            canvas.put_pixel(x, y, Rgb(color));
        }
    }

    canvas
}

fn gradient_row(y: u32) -> [u8; 3] {
    let ratio = y as f64 / HEIGHT as f64;
    let (from, to, t) = if ratio < 0.5 {
        (GRADIENT[0], GRADIENT[1], ratio * 2.0)
    } else {
        (GRADIENT[1], GRADIENT[2], (ratio - 0.5) * 2.0)
    };

    let mut color = [0u8; 3];
    for channel in 0..3 {
        let start = from[channel] as f64;
        let end = to[channel] as f64;
        color[channel] = (start + (end - start) * t) as u8;
    }
    color
}

fn darken(color: [u8; 3]) -> [u8; 3] {
    let keep = 255 - OVERLAY_ALPHA;
    color.map(|channel| ((channel as u32 * keep + 127) / 255) as u8)
}
