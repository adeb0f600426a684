//! gesture-sketch: draw with hand gestures, then idealize the ink.
//!
//! A [`Session`] turns per-frame hand landmarks into drawing actions on
//! an undoable raster canvas, and on request replaces freehand ink with
//! clean filled triangles, squares, rectangles and circles.
//!
//! # Example
//!
//! ```no_run
//! use gesture_sketch::{recognize_and_idealize, RecognitionConfig};
//! use image::Rgb;
//!
//! let ink = image::open("scribble.png")?.into_rgb8();
//! let result = recognize_and_idealize(
//!     &ink,
//!     Rgb([255, 0, 0]),
//!     Rgb([0, 0, 0]),
//!     &RecognitionConfig::default(),
//! );
//! for shape in &result.shapes {
//!     println!("{} with {} vertices", shape.kind, shape.vertices);
//! }
//! result.raster.save("idealized.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

mod bitmap;
mod contour;
mod geom;
mod render;
mod simplify;

pub mod canvas;
pub mod compose;
pub mod config;
pub mod error;
pub mod gesture;
pub mod landmarks;
pub mod palette;
pub mod session;
pub mod shape;
pub mod source;
pub mod store;
pub mod tracker;

pub use canvas::Canvas;
pub use config::{RecognitionConfig, SketchConfig};
pub use error::SketchError;
pub use geom::Pixel;
pub use gesture::{Action, Gesture, GestureInterpreter};
pub use landmarks::{HandLandmarks, Landmark};
pub use palette::Palette;
pub use session::{Command, Flow, FrameSource, Frontend, HandTracker, Session};
pub use shape::{recognize_and_idealize, Recognition, RecognizedShape, ShapeKind};
