// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Annotated-image rendering
//!
//! Draws the main object's box and label onto a copy of the upload and
//! encodes the result as JPEG.

use ab_glyph::{FontRef, PxScale};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use thiserror::Error;

use crate::detection::Candidate;
use crate::vision::image_utils::decode_image_bytes;

static FONT_DATA: &[u8] = include_bytes!("../../assets/font.ttf");

/// MIME type of rendered output
pub const ANNOTATED_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to decode image for annotation: {0}")]
    Decode(String),

    #[error("Failed to encode annotated image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to load label font: {0}")]
    Font(String),
}

/// Colours and sizes used for annotations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationStyle {
    pub box_color: [u8; 3],
    pub text_color: [u8; 3],
    /// Box line thickness in pixels
    pub thickness: u32,
    pub font_size: f32,
    /// Padding around label text
    pub label_padding: u32,
    pub jpeg_quality: u8,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            box_color: [39, 160, 158],
            text_color: [255, 255, 255],
            thickness: 3,
            font_size: 20.0,
            label_padding: 2,
            jpeg_quality: 90,
        }
    }
}

/// Renders a single candidate onto an image
pub struct AnnotationRenderer {
    font: FontRef<'static>,
    style: AnnotationStyle,
}

impl std::fmt::Debug for AnnotationRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationRenderer")
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl AnnotationRenderer {
    pub fn new(style: AnnotationStyle) -> Result<Self, RenderError> {
        let font =
            FontRef::try_from_slice(FONT_DATA).map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self { font, style })
    }

    /// Decode `bytes`, then render as [`render_annotated`](Self::render_annotated)
    pub fn render_annotated_bytes(
        &self,
        bytes: &[u8],
        candidate: &Candidate,
        label: &str,
    ) -> Result<Vec<u8>, RenderError> {
        let (image, _) = decode_image_bytes(bytes, usize::MAX)
            .map_err(|e| RenderError::Decode(e.to_string()))?;
        self.render_annotated(&image, candidate, label)
    }

    /// Draw `candidate`'s box and `label` on a copy of `image`, encoded as JPEG
    pub fn render_annotated(
        &self,
        image: &DynamicImage,
        candidate: &Candidate,
        label: &str,
    ) -> Result<Vec<u8>, RenderError> {
        let mut canvas = image.to_rgb8();
        self.draw_candidate(&mut canvas, candidate, label);

        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, self.style.jpeg_quality).encode_image(&canvas)?;
        Ok(buffer)
    }

    fn draw_candidate(&self, canvas: &mut RgbImage, candidate: &Candidate, label: &str) {
        let (width, height) = canvas.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        let max_x = width as i32 - 1;
        let max_y = height as i32 - 1;

        let bbox = candidate.bbox;
        let x1 = (bbox.x1.floor() as i32).clamp(0, max_x);
        let y1 = (bbox.y1.floor() as i32).clamp(0, max_y);
        let x2 = (bbox.x2.ceil() as i32).clamp(0, max_x);
        let y2 = (bbox.y2.ceil() as i32).clamp(0, max_y);
        if x1 >= x2 || y1 >= y2 {
            return;
        }

        let color = Rgb(self.style.box_color);
        for t in 0..self.style.thickness as i32 {
            let w = x2 - x1 - 2 * t + 1;
            let h = y2 - y1 - 2 * t + 1;
            if w <= 0 || h <= 0 {
                break;
            }
            draw_hollow_rect_mut(
                canvas,
                Rect::at(x1 + t, y1 + t).of_size(w as u32, h as u32),
                color,
            );
        }

        let text = format!("{} {:.2}", label, candidate.confidence());
        let scale = PxScale::from(self.style.font_size);
        let (text_w, text_h) = text_size(scale, &self.font, &text);
        let pad = self.style.label_padding as i32;

        let strip_h = text_h as i32 + 2 * pad;
        let strip_w = (text_w as i32 + 2 * pad).min(width as i32 - x1);
        // Above the box when there is room, otherwise inside its top edge
        let strip_y = if y1 >= strip_h { y1 - strip_h } else { y1 };
        let strip_h = strip_h.min(height as i32 - strip_y);

        if strip_w > 0 && strip_h > 0 {
            draw_filled_rect_mut(
                canvas,
                Rect::at(x1, strip_y).of_size(strip_w as u32, strip_h as u32),
                color,
            );
            draw_text_mut(
                canvas,
                Rgb(self.style.text_color),
                x1 + pad,
                strip_y + pad,
                scale,
                &self.font,
                &text,
            );
        }
    }
}
