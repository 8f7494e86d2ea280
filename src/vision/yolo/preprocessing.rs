// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLO detection

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::Array4;

/// Square input size of the exported detection model
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Gray level used for letterbox padding
pub const PAD_VALUE: u8 = 114;

/// How an original image was placed inside the model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Original-to-input scale factor
    pub scale: f32,
    /// Horizontal padding (input pixels)
    pub pad_x: f32,
    /// Vertical padding (input pixels)
    pub pad_y: f32,
    pub orig_width: u32,
    pub orig_height: u32,
}

impl Letterbox {
    /// Map a point from model-input space back to original image space,
    /// clamped to the image bounds
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let ox = (x - self.pad_x) / self.scale;
        let oy = (y - self.pad_y) / self.scale;
        (
            ox.clamp(0.0, self.orig_width as f32),
            oy.clamp(0.0, self.orig_height as f32),
        )
    }
}

/// Preprocess an image for YOLO detection
///
/// Steps:
/// 1. Resize with aspect ratio preservation to fit `target_size`
/// 2. Centre on a square canvas padded with gray (114)
/// 3. Scale pixel values to [0, 1]
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (Array4<f32>, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();
    let size = target_size as usize;
    let pad = PAD_VALUE as f32 / 255.0;
    let mut tensor = Array4::from_elem((1, 3, size, size), pad);

    if orig_w == 0 || orig_h == 0 {
        let info = Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            orig_width: orig_w,
            orig_height: orig_h,
        };
        return (tensor, info);
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = image
        .resize_exact(new_w, new_h, FilterType::Triangle)
        .to_rgb8();

    let offset_x = (target_size - new_w) / 2;
    let offset_y = (target_size - new_h) / 2;

    for (x, y, pixel) in resized.enumerate_pixels() {
        let tx = (x + offset_x) as usize;
        let ty = (y + offset_y) as usize;
        for c in 0..3 {
            tensor[[0, c, ty, tx]] = pixel[c] as f32 / 255.0;
        }
    }

    let info = Letterbox {
        scale,
        pad_x: offset_x as f32,
        pad_y: offset_y as f32,
        orig_width: orig_w,
        orig_height: orig_h,
    };

    (tensor, info)
}
