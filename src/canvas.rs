//! The drawing canvas and its linear undo/redo history.
//!
//! History entries are full raster snapshots. Every edit pushes the
//! pre-edit raster onto the undo stack and drops the whole redo stack;
//! undo and redo only move snapshots between the two stacks.

use std::collections::VecDeque;

use image::{Rgb, RgbImage};
use kurbo::Point;

use crate::error::SketchError;
use crate::geom::Pixel;
use crate::render;

#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
    undo: VecDeque<RgbImage>,
    redo: Vec<RgbImage>,
    /// Maximum undo depth; the oldest snapshots are dropped beyond it.
    limit: Option<usize>,
}

impl Canvas {
    /// A canvas filled with `background`, with empty history.
    pub fn new(width: u32, height: u32, background: Rgb<u8>, limit: Option<usize>) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, background),
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Record the current raster before an edit.
    fn checkpoint(&mut self) {
        self.undo.push_back(self.image.clone());
        if let Some(limit) = self.limit {
            while self.undo.len() > limit {
                self.undo.pop_front();
            }
        }
        self.redo.clear();
    }

    /// Draw a stroke segment. Skipped entirely when `from` is unset, which
    /// is the first frame of a stroke.
    ///
    /// Returns whether the canvas was edited.
    pub fn apply_draw(&mut self, from: Option<Pixel>, to: Pixel, color: Rgb<u8>, thickness: f64) -> bool {
        let Some(from) = from else {
            return false;
        };
        self.checkpoint();
        render::stroke_segment(&mut self.image, from, to, thickness, color);
        true
    }

    /// Reset a disk around `center` to the background colour.
    pub fn apply_erase(&mut self, center: Pixel, radius: f64, background: Rgb<u8>) {
        self.checkpoint();
        let center = Point::new(center.x as f64, center.y as f64);
        render::fill_disk(&mut self.image, center, radius, background);
    }

    /// Swap in a whole new raster (shape idealization output).
    pub fn replace_canvas(&mut self, raster: RgbImage) -> Result<(), SketchError> {
        let (width, height) = self.image.dimensions();
        if raster.dimensions() != (width, height) {
            return Err(SketchError::DimensionMismatch {
                width,
                height,
                actual_width: raster.width(),
                actual_height: raster.height(),
            });
        }
        self.checkpoint();
        self.image = raster;
        Ok(())
    }

    /// Restore the most recent snapshot. Returns `false` if there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.image, previous);
        self.redo.push(current);
        true
    }

    /// Re-apply the most recently undone state. Returns `false` if there
    /// is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.image, next);
        self.undo.push_back(current);
        true
    }

    /// A detached copy for compositing previews.
    pub fn snapshot_for_preview(&self) -> RgbImage {
        self.image.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn px(x: i32, y: i32) -> Pixel {
        Pixel::new(x, y)
    }

    fn canvas() -> Canvas {
        Canvas::new(640, 480, BLACK, None)
    }

    #[test]
    fn starts_filled_with_background() {
        let c = Canvas::new(8, 4, GREEN, None);
        assert!(c.image().pixels().all(|p| *p == GREEN));
        assert_eq!(c.undo_depth(), 0);
    }

    #[test]
    fn draw_without_anchor_is_skipped() {
        let mut c = canvas();
        let before = c.image().clone();
        assert!(!c.apply_draw(None, px(100, 100), RED, 5.0));
        assert_eq!(c.image(), &before);
        assert_eq!(c.undo_depth(), 0);
    }

    #[test]
    fn horizontal_segment_with_one_snapshot() {
        let mut c = canvas();
        assert!(c.apply_draw(Some(px(100, 100)), px(150, 100), RED, 5.0));
        assert_eq!(c.undo_depth(), 1);
        for x in (100..=150).step_by(10) {
            assert_eq!(*c.image().get_pixel(x, 100), RED);
            assert_eq!(*c.image().get_pixel(x, 102), RED);
            assert_eq!(*c.image().get_pixel(x, 98), RED);
            assert_eq!(*c.image().get_pixel(x, 106), BLACK);
        }
        assert_eq!(*c.image().get_pixel(125, 200), BLACK);
    }

    #[test]
    fn erase_fills_disk_with_background() {
        let mut c = canvas();
        c.apply_draw(Some(px(250, 300)), px(350, 300), RED, 9.0);
        c.apply_erase(px(300, 300), 20.0, BLACK);
        assert_eq!(c.undo_depth(), 2);
        assert_eq!(*c.image().get_pixel(300, 300), BLACK);
        assert_eq!(*c.image().get_pixel(315, 300), BLACK);
        assert_eq!(*c.image().get_pixel(330, 300), RED);
        assert_eq!(*c.image().get_pixel(260, 300), RED);
    }

    #[test]
    fn undo_then_redo_restores_state() {
        let mut c = canvas();
        c.apply_draw(Some(px(10, 10)), px(60, 60), RED, 5.0);
        c.apply_erase(px(30, 30), 8.0, BLACK);
        c.apply_draw(Some(px(100, 10)), px(100, 90), GREEN, 3.0);

        let before_undo = c.image().clone();
        assert!(c.undo());
        assert_ne!(c.image(), &before_undo);
        assert!(c.redo());
        assert_eq!(c.image(), &before_undo);

        // Walk the whole history back and forth.
        let mut states = vec![c.image().clone()];
        while c.undo() {
            states.push(c.image().clone());
        }
        assert_eq!(states.len(), 4);
        assert!(c.image().pixels().all(|p| *p == BLACK));
        for expected in states.iter().rev().skip(1) {
            assert!(c.redo());
            assert_eq!(c.image(), expected);
        }
        assert!(!c.redo());
    }

    #[test]
    fn new_edit_after_undo_clears_redo() {
        let mut c = canvas();
        c.apply_draw(Some(px(10, 10)), px(60, 10), RED, 5.0);
        c.apply_draw(Some(px(10, 30)), px(60, 30), RED, 5.0);
        c.undo();
        c.undo();
        assert_eq!(c.redo_depth(), 2);

        c.apply_erase(px(5, 5), 3.0, BLACK);
        assert_eq!(c.redo_depth(), 0);
        assert!(!c.redo());
        assert_eq!(c.undo_depth(), 1);
    }

    #[test]
    fn empty_stacks_are_noops() {
        let mut c = canvas();
        assert!(!c.undo());
        assert!(!c.redo());
        assert_eq!(c.undo_depth(), 0);
    }

    #[test]
    fn replace_checks_dimensions() {
        let mut c = canvas();
        let err = c.replace_canvas(RgbImage::new(10, 10)).unwrap_err();
        assert!(matches!(err, SketchError::DimensionMismatch { actual_width: 10, .. }));
        assert_eq!(c.undo_depth(), 0);

        let mut raster = RgbImage::new(640, 480);
        raster.put_pixel(1, 1, GREEN);
        c.replace_canvas(raster).unwrap();
        assert_eq!(*c.image().get_pixel(1, 1), GREEN);
        assert_eq!(c.undo_depth(), 1);
        assert!(c.undo());
        assert_eq!(*c.image().get_pixel(1, 1), BLACK);
    }

    #[test]
    fn history_limit_drops_oldest() {
        let mut c = Canvas::new(64, 64, BLACK, Some(2));
        for y in [10, 20, 30] {
            c.apply_draw(Some(px(5, y)), px(50, y), RED, 3.0);
        }
        assert_eq!(c.undo_depth(), 2);
        assert!(c.undo());
        assert!(c.undo());
        assert!(!c.undo());
        // The first stroke can no longer be undone.
        assert_eq!(*c.image().get_pixel(20, 10), RED);
        assert_eq!(*c.image().get_pixel(20, 20), BLACK);
    }

    #[test]
    fn preview_is_detached() {
        let mut c = canvas();
        let mut preview = c.snapshot_for_preview();
        preview.put_pixel(0, 0, RED);
        assert_eq!(*c.image().get_pixel(0, 0), BLACK);
        c.apply_erase(px(0, 0), 1.0, GREEN);
        assert_eq!(*preview.get_pixel(0, 0), RED);
    }
}
