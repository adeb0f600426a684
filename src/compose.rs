//! Preview compositing: camera frame + canvas + on-screen widgets.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::error::SketchError;
use crate::landmarks::{HandLandmarks, HAND_CONNECTIONS};
use crate::palette::Palette;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const JOINT: Rgb<u8> = Rgb([255, 0, 0]);

/// Text handed to the frontend alongside the composited image.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub color_name: String,
    pub color: Rgb<u8>,
    pub status: String,
}

impl Overlay {
    pub fn color_label(&self) -> String {
        format!("Color: {}", self.color_name)
    }
}

/// Draw every swatch as a filled box with a 2 px white border.
pub fn draw_palette(frame: &mut RgbImage, palette: &Palette) {
    for swatch in palette.swatches() {
        let r = swatch.rect;
        let outer = Rect::at(r.x, r.y).of_size(r.width as u32 + 1, r.height as u32 + 1);
        draw_filled_rect_mut(frame, outer, swatch.color);
        draw_hollow_rect_mut(frame, outer, WHITE);
        let inner = Rect::at(r.x + 1, r.y + 1).of_size(r.width as u32 - 1, r.height as u32 - 1);
        draw_hollow_rect_mut(frame, inner, WHITE);
    }
}

/// Draw the hand skeleton: bones as lines, joints as dots.
pub fn draw_hand(frame: &mut RgbImage, hand: &HandLandmarks) {
    let (w, h) = frame.dimensions();
    let to_f32 = |i: usize| {
        let p = hand.pixel(i, w, h);
        (p.x as f32, p.y as f32)
    };
    for &(a, b) in HAND_CONNECTIONS.iter() {
        draw_line_segment_mut(frame, to_f32(a), to_f32(b), WHITE);
    }
    for i in 0..hand.points().len() {
        let p = hand.pixel(i, w, h);
        draw_filled_circle_mut(frame, (p.x, p.y), 3, JOINT);
    }
}

/// Average two equally sized images channel by channel.
pub fn blend_half(frame: &RgbImage, canvas: &RgbImage) -> Result<RgbImage, SketchError> {
    if frame.dimensions() != canvas.dimensions() {
        return Err(SketchError::DimensionMismatch {
            width: canvas.width(),
            height: canvas.height(),
            actual_width: frame.width(),
            actual_height: frame.height(),
        });
    }
    Ok(imageproc::map::map_colors2(frame, canvas, |a, b| {
        Rgb([
            mix(a.0[0], b.0[0]),
            mix(a.0[1], b.0[1]),
            mix(a.0[2], b.0[2]),
        ])
    }))
}

/// Rounded mean of two channel values.
fn mix(a: u8, b: u8) -> u8 {
    ((a as u16 + b as u16 + 1) / 2) as u8
}
