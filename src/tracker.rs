//! Bundled hand trackers.
//!
//! Real landmark detection is an external model; these trackers feed
//! the session from a recording or from a pointing device instead.

use std::cell::Cell;
use std::io::BufRead;
use std::path::Path;
use std::rc::Rc;

use image::RgbImage;

use crate::error::SketchError;
use crate::landmarks::{
    HandLandmarks, Landmark, INDEX_PIP, INDEX_TIP, LANDMARK_COUNT, MIDDLE_PIP, MIDDLE_TIP,
    PINKY_PIP, PINKY_TIP, RING_PIP, RING_TIP, THUMB_TIP, WRIST,
};
use crate::session::HandTracker;

/// Replays landmarks recorded as JSON lines.
///
/// Each non-blank line is `null` (no hand in that frame) or an array of
/// 21 landmarks. Frames past the end of the recording have no hand.
#[derive(Debug, Clone)]
pub struct ReplayTracker {
    frames: Vec<Option<HandLandmarks>>,
    cursor: usize,
}

impl ReplayTracker {
    pub fn open(path: &Path) -> Result<Self, SketchError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self, SketchError> {
        let mut frames = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parsed: Option<Vec<Landmark>> =
                serde_json::from_str(line).map_err(|e| SketchError::Replay {
                    line: i + 1,
                    message: e.to_string(),
                })?;
            let hand = match parsed {
                None => None,
                Some(points) => Some(HandLandmarks::from_slice(&points).ok_or_else(|| {
                    SketchError::Replay {
                        line: i + 1,
                        message: format!("expected {} landmarks, got {}", LANDMARK_COUNT, points.len()),
                    }
                })?),
            };
            frames.push(hand);
        }
        log::info!("loaded {} recorded frames", frames.len());
        Ok(Self { frames, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// True once every recorded frame has been handed out.
    pub fn finished(&self) -> bool {
        self.cursor >= self.frames.len()
    }
}

impl HandTracker for ReplayTracker {
    fn detect(&mut self, _frame: &RgbImage) -> Option<HandLandmarks> {
        let hand = self.frames.get(self.cursor).cloned().flatten();
        self.cursor = self.cursor.saturating_add(1);
        hand
    }
}

/// Hand pose a pointer can stand in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPose {
    /// All fingers straight.
    Open,
    /// Only the index finger straight (draws).
    Pointing,
    /// Thumb touching a curled index finger (erases).
    Pinch,
}

/// Pointer position normalized to 0..1 plus button state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub primary: bool,
    pub secondary: bool,
}

impl PointerState {
    pub fn pose(&self) -> HandPose {
        if self.primary {
            HandPose::Pointing
        } else if self.secondary {
            HandPose::Pinch
        } else {
            HandPose::Open
        }
    }
}

/// Build a plausible hand whose index fingertip sits at `(x, y)`.
pub fn synthesize_hand(pose: HandPose, x: f32, y: f32) -> HandLandmarks {
    const FINGERS: [(usize, usize, f32); 4] = [
        (INDEX_TIP, INDEX_PIP, 0.0),
        (MIDDLE_TIP, MIDDLE_PIP, 0.03),
        (RING_TIP, RING_PIP, 0.06),
        (PINKY_TIP, PINKY_PIP, 0.09),
    ];
    let extended = match pose {
        HandPose::Open => [true; 4],
        HandPose::Pointing => [true, false, false, false],
        HandPose::Pinch => [false; 4],
    };

    let mut points = [Landmark::new(x, y + 0.2); LANDMARK_COUNT];
    points[WRIST] = Landmark::new(x + 0.04, y + 0.25);
    for (&(tip, pip, dx), &up) in FINGERS.iter().zip(extended.iter()) {
        let base = if tip == INDEX_TIP { y } else { y + 0.02 };
        let pip_y = if up { base + 0.06 } else { base - 0.03 };
        points[tip] = Landmark::new(x + dx, base);
        points[pip] = Landmark::new(x + dx, pip_y);
        // Remaining joints of the finger sit between the PIP and the knuckle.
        points[pip - 1] = Landmark::new(x + dx, base + 0.1);
        points[tip - 1] = Landmark::new(x + dx, (base + pip_y) / 2.0);
    }
    points[THUMB_TIP] = match pose {
        HandPose::Pinch => Landmark::new(x + 0.01, y + 0.01),
        _ => Landmark::new(x - 0.12, y + 0.12),
    };
    HandLandmarks::new(points)
}

/// Shared slot a frontend writes pointer state into each frame.
pub type PointerSlot = Rc<Cell<Option<PointerState>>>;

/// Tracks a "hand" driven by a mouse or touch pointer.
///
/// Primary button held draws, secondary button held erases, otherwise
/// the hand is open (it can still pick colours). No pointer means no
/// hand.
#[derive(Debug, Clone, Default)]
pub struct PointerHand {
    slot: PointerSlot,
}

impl PointerHand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for the frontend to publish pointer state through.
    pub fn slot(&self) -> PointerSlot {
        Rc::clone(&self.slot)
    }
}

impl HandTracker for PointerHand {
    fn detect(&mut self, _frame: &RgbImage) -> Option<HandLandmarks> {
        let state = self.slot.get()?;
        Some(synthesize_hand(state.pose(), state.x, state.y))
    }
}
