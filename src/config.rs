use std::path::{Path, PathBuf};

use image::Rgb;
use serde::Deserialize;

use crate::error::SketchError;

/// All session parameters in one struct.
/// Deserializable so a partial JSON preset can override the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub frame: FrameConfig,
    pub brush: BrushConfig,
    pub gesture: GestureConfig,
    pub recognition: RecognitionConfig,
    pub history: HistoryConfig,
    pub output: OutputConfig,
}

impl SketchConfig {
    /// Load a JSON preset. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, SketchError> {
        let text = std::fs::read_to_string(path)?;
        let config: SketchConfig = serde_json::from_str(&text)
            .map_err(|e| SketchError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the session cannot run with.
    pub fn validate(&self) -> Result<(), SketchError> {
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(SketchError::Config(format!(
                "frame size must be non-zero, got {}x{}",
                self.frame.width, self.frame.height
            )));
        }
        if self.brush.thickness <= 0.0 {
            return Err(SketchError::Config("brush thickness must be positive".into()));
        }
        if self.brush.eraser_radius <= 0.0 {
            return Err(SketchError::Config("eraser radius must be positive".into()));
        }
        let r = &self.recognition;
        if r.square_aspect_min > r.square_aspect_max {
            return Err(SketchError::Config(format!(
                "square aspect band [{}, {}] is empty",
                r.square_aspect_min, r.square_aspect_max
            )));
        }
        if r.epsilon_fraction < 0.0 {
            return Err(SketchError::Config("epsilon fraction must not be negative".into()));
        }
        Ok(())
    }
}

/// Size and orientation of the camera frames (and therefore of the canvas).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
    /// Mirror frames horizontally so the preview behaves like a mirror.
    pub mirror: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            mirror: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Stroke width in pixels.
    pub thickness: f64,
    /// Radius of the pinch eraser disk in pixels.
    pub eraser_radius: f64,
    /// Colour erased pixels are reset to.
    pub background: [u8; 3],
}

impl BrushConfig {
    pub fn background_rgb(&self) -> Rgb<u8> {
        Rgb(self.background)
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            thickness: 5.0,
            eraser_radius: 20.0,
            background: [0, 0, 0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// A pinch is detected when index tip and thumb tip are closer than
    /// this on both axes (pixels, exclusive).
    pub pinch_threshold: i32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self { pinch_threshold: 40 }
    }
}

/// Heuristic constants of the shape recognition engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Pixels brighter than this (max channel) count as ink.
    pub ink_threshold: u8,
    /// Contours enclosing less area than this are noise.
    pub min_contour_area: f64,
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub epsilon_fraction: f64,
    /// Width/height band (inclusive) in which a quadrilateral is a square.
    pub square_aspect_min: f64,
    pub square_aspect_max: f64,
    /// Many-vertex shapes with circularity above this are circles.
    pub circularity_threshold: f64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            ink_threshold: 50,
            min_contour_area: 100.0,
            epsilon_fraction: 0.02,
            square_aspect_min: 0.8,
            square_aspect_max: 1.2,
            circularity_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo snapshots. `None` keeps everything.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            prefix: "drawing_".to_string(),
        }
    }
}
