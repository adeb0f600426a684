//! Hand landmark input: 21 normalized points per tracked hand.
//!
//! Indices follow the MediaPipe hand model: 0 is the wrist, then four
//! points per finger from the base joint to the tip, thumb first.

use serde::Deserialize;

use crate::geom::Pixel;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// Bones of the hand skeleton, as landmark index pairs.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (17, 18), (18, 19), (19, 20),
    (0, 17),
];

/// One landmark in image-normalized coordinates (0..1 across the frame).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(from = "LandmarkRepr")]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Map to a pixel by truncating `x * width`, `y * height`.
    pub fn to_pixel(self, width: u32, height: u32) -> Pixel {
        Pixel::new(
            (self.x * width as f32) as i32,
            (self.y * height as f32) as i32,
        )
    }
}

/// Accepts `[x, y]`, `[x, y, z]` or `{ "x": .., "y": .., "z": .. }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Pair([f32; 2]),
    Triple([f32; 3]),
    Named {
        x: f32,
        y: f32,
        #[serde(default)]
        z: f32,
    },
}

impl From<LandmarkRepr> for Landmark {
    fn from(repr: LandmarkRepr) -> Self {
        match repr {
            LandmarkRepr::Pair([x, y]) => Landmark { x, y, z: 0.0 },
            LandmarkRepr::Triple([x, y, z]) => Landmark { x, y, z },
            LandmarkRepr::Named { x, y, z } => Landmark { x, y, z },
        }
    }
}

/// The landmark set of one detected hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build from a slice; `None` unless it holds exactly 21 landmarks.
    pub fn from_slice(points: &[Landmark]) -> Option<Self> {
        let points: [Landmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self { points })
    }

    pub fn get(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    pub fn pixel(&self, index: usize, width: u32, height: u32) -> Pixel {
        self.points[index].to_pixel(width, height)
    }
}
