// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Draws detection boxes and labels onto a copy of the input image

use ab_glyph::{FontArc, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::{error, info, warn};

use super::detection::DetectionResult;
use super::image_utils::encode_jpeg_base64;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const BOX_THICKNESS: i32 = 2;
const LABEL_FONT_SIZE: f32 = 16.0;
/// Height of the label text when no font is loaded
const LABEL_TEXT_HEIGHT: i32 = 12;
/// Average glyph width used to size the label background without a font
const LABEL_CHAR_WIDTH: f32 = 7.0;
/// Gap between the label text and the top edge of the box
const LABEL_BASELINE_GAP: i32 = 5;
/// Vertical room reserved above the text inside the label background
const LABEL_PADDING: i32 = 10;

pub const ANNOTATION_JPEG_QUALITY: u8 = 90;

/// Renders detection results; holds the optional label font
#[derive(Clone, Default)]
pub struct Annotator {
    font: Option<FontArc>,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl Annotator {
    pub fn new(font: Option<FontArc>) -> Self {
        Self { font }
    }

    /// Load the label font from `path`
    ///
    /// A missing or unreadable font is logged and labels are drawn without
    /// text.
    pub fn from_font_path(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            warn!("ANNOTATION_FONT_PATH not set; annotations will omit label text");
            return Self::default();
        };

        let font = std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| FontArc::try_from_vec(bytes).map_err(|e| e.to_string()));

        match font {
            Ok(font) => {
                info!("Loaded annotation font from {}", path.display());
                Self::new(Some(font))
            }
            Err(e) => {
                warn!(
                    "Failed to load annotation font {}: {}; annotations will omit label text",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw every result onto an RGB copy of `image`
    pub fn annotate(&self, image: &DynamicImage, results: &[DetectionResult]) -> RgbImage {
        let mut canvas = image.to_rgb8();
        for result in results {
            self.draw_result(&mut canvas, result);
        }
        canvas
    }

    /// Annotate and encode as base64 JPEG; an empty string if encoding fails
    pub fn annotate_to_base64(&self, image: &DynamicImage, results: &[DetectionResult]) -> String {
        let canvas = self.annotate(image, results);
        match encode_jpeg_base64(&canvas, ANNOTATION_JPEG_QUALITY) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Failed to encode annotated image: {}", e);
                String::new()
            }
        }
    }

    fn draw_result(&self, canvas: &mut RgbImage, result: &DetectionResult) {
        let [x1, y1, x2, y2] = result.bbox;
        if x2 <= x1 || y2 <= y1 {
            return;
        }

        for inset in 0..BOX_THICKNESS {
            let width = x2 - x1 - 2 * inset;
            let height = y2 - y1 - 2 * inset;
            if width <= 0 || height <= 0 {
                break;
            }
            let rect = Rect::at(x1 + inset, y1 + inset).of_size(width as u32, height as u32);
            draw_hollow_rect_mut(canvas, rect, BOX_COLOR);
        }

        let label = result.label();
        let scale = PxScale::from(LABEL_FONT_SIZE);
        let (text_w, text_h) = match &self.font {
            Some(font) => {
                let (w, h) = text_size(scale, font, &label);
                (w as i32, h as i32)
            }
            None => (
                (label.len() as f32 * LABEL_CHAR_WIDTH) as i32,
                LABEL_TEXT_HEIGHT,
            ),
        };

        // Label background spans (x1, y1 - h - 10) .. (x1 + w, y1), clipped to the image
        let bg_top = (y1 - text_h - LABEL_PADDING).max(0);
        let bg_height = y1 - bg_top;
        if text_w > 0 && bg_height > 0 {
            let rect = Rect::at(x1, bg_top).of_size(text_w as u32, bg_height as u32);
            draw_filled_rect_mut(canvas, rect, BOX_COLOR);
        }

        if let Some(font) = &self.font {
            let text_top = (y1 - LABEL_BASELINE_GAP - text_h).max(0);
            draw_text_mut(canvas, TEXT_COLOR, x1, text_top, scale, font, &label);
        }
    }
}
