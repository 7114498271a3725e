// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox preprocessing for YOLOv8

use image::{imageops::FilterType, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Gray used for letterbox padding
pub const PAD_VALUE: u8 = 114;

/// Geometry needed to map model-space boxes back to the original image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxInfo {
    /// Original-to-model scale factor
    pub scale: f32,
    /// Horizontal padding (left) in model pixels
    pub pad_x: f32,
    /// Vertical padding (top) in model pixels
    pub pad_y: f32,
    pub orig_width: u32,
    pub orig_height: u32,
}

impl LetterboxInfo {
    /// Map a model-space point back to original-image coordinates
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.pad_x) / self.scale,
            (y - self.pad_y) / self.scale,
        )
    }
}

/// Resize preserving aspect ratio and center on a `target_size` square
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, LetterboxInfo) {
    let (orig_w, orig_h) = image.dimensions();
    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));

    if orig_w == 0 || orig_h == 0 {
        let info = LetterboxInfo {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            orig_width: orig_w,
            orig_height: orig_h,
        };
        return (canvas, info);
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = image
        .resize_exact(new_w, new_h, FilterType::Triangle)
        .to_rgb8();

    let offset_x = (target_size - new_w) / 2;
    let offset_y = (target_size - new_h) / 2;
    image::imageops::replace(&mut canvas, &resized, offset_x as i64, offset_y as i64);

    let info = LetterboxInfo {
        scale,
        pad_x: offset_x as f32,
        pad_y: offset_y as f32,
        orig_width: orig_w,
        orig_height: orig_h,
    };
    (canvas, info)
}

/// Letterbox and convert to a `[1, 3, S, S]` RGB tensor scaled to `[0, 1]`
pub fn preprocess(image: &DynamicImage, target_size: u32) -> (Array4<f32>, LetterboxInfo) {
    let (canvas, info) = letterbox(image, target_size);
    let size = target_size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));

    for (x, y, pixel) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, info)
}
