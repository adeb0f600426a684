//! Gesture interpretation: hand landmarks → one drawing action per frame.
//!
//! Classification is a pure function of the landmark geometry with a
//! fixed priority: select > draw > erase > idle. The interpreter adds the
//! only state that spans frames: the continuity pointer that joins
//! consecutive draw frames into a stroke, and the active colour.

use crate::config::GestureConfig;
use crate::geom::Pixel;
use crate::landmarks::{
    HandLandmarks, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP, RING_PIP,
    RING_TIP, THUMB_TIP,
};
use crate::palette::Palette;

/// "Finger extended" flags for index, middle, ring and pinky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerState(pub [bool; 4]);

impl FingerState {
    /// Only the index finger is straightened: the drawing pose.
    pub const INDEX_ONLY: FingerState = FingerState([true, false, false, false]);

    /// A finger is extended when its tip is above (smaller y than) its PIP joint.
    pub fn from_landmarks(hand: &HandLandmarks) -> Self {
        let extended = |tip: usize, pip: usize| hand.get(tip).y < hand.get(pip).y;
        FingerState([
            extended(INDEX_TIP, INDEX_PIP),
            extended(MIDDLE_TIP, MIDDLE_PIP),
            extended(RING_TIP, RING_PIP),
            extended(PINKY_TIP, PINKY_PIP),
        ])
    }

    pub fn is_drawing_pose(self) -> bool {
        self == Self::INDEX_ONLY
    }
}

/// What the hand is doing this frame, before stroke continuity is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Idle,
    /// Index fingertip is over the swatch with this index.
    Selecting(usize),
    /// Index-only pose at this fingertip position.
    Drawing(Pixel),
    /// Index and thumb pinched at this index fingertip position.
    Erasing(Pixel),
}

/// Classify one frame's hand geometry.
pub fn classify(
    fingers: FingerState,
    index_tip: Pixel,
    thumb_tip: Pixel,
    palette: &Palette,
    config: &GestureConfig,
) -> Gesture {
    if let Some(i) = palette.hit_test(index_tip) {
        return Gesture::Selecting(i);
    }
    if fingers.is_drawing_pose() {
        return Gesture::Drawing(index_tip);
    }
    if is_pinch(index_tip, thumb_tip, config.pinch_threshold) {
        return Gesture::Erasing(index_tip);
    }
    Gesture::Idle
}

/// Pinched when both axis separations are strictly below the threshold.
/// Separations are taken in `i64`, so saturated coordinates cannot overflow.
pub fn is_pinch(index_tip: Pixel, thumb_tip: Pixel, threshold: i32) -> bool {
    let apart = |a: i32, b: i32| (i64::from(a) - i64::from(b)).abs();
    let threshold = i64::from(threshold);
    apart(index_tip.x, thumb_tip.x) < threshold && apart(index_tip.y, thumb_tip.y) < threshold
}

/// The per-frame output of the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NoOp,
    SelectColor(usize),
    /// Extend the current stroke from the continuity pointer to `to`.
    DrawTo { from: Pixel, to: Pixel },
    Erase(Pixel),
    /// An in-progress stroke was ended by another pose.
    CommitStrokeBreak,
}

/// Turns landmark frames into actions, tracking stroke continuity and the
/// active colour.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    width: u32,
    height: u32,
    config: GestureConfig,
    previous: Option<Pixel>,
    active_color: usize,
    last_gesture: Option<Gesture>,
}

impl GestureInterpreter {
    /// `width`/`height` are the frame size landmarks are scaled to.
    pub fn new(width: u32, height: u32, config: GestureConfig) -> Self {
        Self {
            width,
            height,
            config,
            previous: None,
            active_color: 0,
            last_gesture: None,
        }
    }

    /// Index of the active palette colour.
    pub fn active_color(&self) -> usize {
        self.active_color
    }

    /// Continuity pointer: the last committed draw position.
    pub fn previous_point(&self) -> Option<Pixel> {
        self.previous
    }

    /// Gesture of the most recent frame, `None` if no hand was seen.
    pub fn last_gesture(&self) -> Option<Gesture> {
        self.last_gesture
    }

    /// Segment from the continuity pointer to the fingertip while drawing.
    pub fn pending_segment(&self) -> Option<(Pixel, Pixel)> {
        match (self.previous, self.last_gesture) {
            (Some(from), Some(Gesture::Drawing(to))) => Some((from, to)),
            _ => None,
        }
    }

    /// Interpret one frame. `hand` is `None` when no hand was detected.
    pub fn interpret(&mut self, hand: Option<&HandLandmarks>, palette: &Palette) -> Action {
        let Some(hand) = hand else {
            self.last_gesture = None;
            self.previous = None;
            return Action::NoOp;
        };

        let fingers = FingerState::from_landmarks(hand);
        let index_tip = hand.pixel(INDEX_TIP, self.width, self.height);
        let thumb_tip = hand.pixel(THUMB_TIP, self.width, self.height);
        let gesture = classify(fingers, index_tip, thumb_tip, palette, &self.config);
        log::trace!("fingers {:?} index {:?} → {:?}", fingers.0, index_tip, gesture);
        self.last_gesture = Some(gesture);

        match gesture {
            Gesture::Selecting(i) => {
                self.active_color = i;
                self.previous = None;
                Action::SelectColor(i)
            }
            Gesture::Drawing(to) => match self.previous.replace(to) {
                None => Action::NoOp,
                Some(from) => Action::DrawTo { from, to },
            },
            Gesture::Erasing(at) => {
                self.previous = None;
                Action::Erase(at)
            }
            Gesture::Idle => {
                if self.previous.take().is_some() {
                    Action::CommitStrokeBreak
                } else {
                    Action::NoOp
                }
            }
        }
    }
}
