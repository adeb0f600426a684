//! The frame loop: one owning session object that sequences capture,
//! gesture interpretation, canvas edits, commands and display.
//!
//! Everything mutable (canvas, history, active colour, stroke
//! continuity, status text) lives in [`Session`] and is only touched
//! from the loop thread.

use image::{Rgb, RgbImage};

use crate::canvas::Canvas;
use crate::compose::{self, Overlay};
use crate::config::SketchConfig;
use crate::error::SketchError;
use crate::gesture::{Action, GestureInterpreter};
use crate::landmarks::HandLandmarks;
use crate::palette::{Palette, Swatch};
use crate::render;
use crate::shape;
use crate::store::DrawingStore;

/// Supplies sequential frames of a fixed size.
pub trait FrameSource {
    fn resolution(&self) -> (u32, u32);

    /// Next frame. An error ends the session.
    fn next_frame(&mut self) -> Result<RgbImage, SketchError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn resolution(&self) -> (u32, u32) {
        (**self).resolution()
    }

    fn next_frame(&mut self) -> Result<RgbImage, SketchError> {
        (**self).next_frame()
    }
}

/// Finds at most one hand in a frame.
pub trait HandTracker {
    fn detect(&mut self, frame: &RgbImage) -> Option<HandLandmarks>;
}

/// Presents composited frames and reports discrete commands.
pub trait Frontend {
    fn is_open(&self) -> bool;

    /// At most one pending command; must not block for long.
    fn poll_command(&mut self) -> Option<Command>;

    fn present(&mut self, image: &RgbImage, overlay: &Overlay) -> Result<(), SketchError>;
}

/// Discrete user commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Undo,
    Redo,
    Recognize,
    Save,
}

impl Command {
    /// Default key bindings. Unbound keys map to `None`.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'q' => Some(Command::Quit),
            'z' => Some(Command::Undo),
            'y' => Some(Command::Redo),
            's' => Some(Command::Recognize),
            'w' => Some(Command::Save),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    config: SketchConfig,
    palette: Palette,
    interpreter: GestureInterpreter,
    canvas: Canvas,
    store: DrawingStore,
    status: String,
}

impl Session {
    /// Canvas size comes from `config.frame`.
    pub fn new(config: SketchConfig, palette: Palette) -> Self {
        let (width, height) = (config.frame.width, config.frame.height);
        let interpreter = GestureInterpreter::new(width, height, config.gesture.clone());
        let canvas = Canvas::new(width, height, config.brush.background_rgb(), config.history.limit);
        let store = DrawingStore::new(&config.output.directory, config.output.prefix.clone());
        Self {
            config,
            palette,
            interpreter,
            canvas,
            store,
            status: String::new(),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn active_swatch(&self) -> &Swatch {
        // The interpreter only ever selects indices from this palette.
        &self.palette.swatches()[self.interpreter.active_color()]
    }

    fn active_rgb(&self) -> Rgb<u8> {
        self.active_swatch().color
    }

    fn set_status(&mut self, message: impl Into<String>) {
        let message = message.into();
        if message != self.status {
            log::info!("{}", message);
            self.status = message;
        }
    }

    /// Interpret one frame's hand and apply the resulting edit.
    pub fn handle_hand(&mut self, hand: Option<&HandLandmarks>) -> Action {
        let action = self.interpreter.interpret(hand, &self.palette);
        match action {
            Action::SelectColor(_) => {
                let name = self.active_swatch().name.clone();
                self.set_status(format!("Color set to {}", name));
            }
            Action::DrawTo { from, to } => {
                let color = self.active_rgb();
                self.canvas
                    .apply_draw(Some(from), to, color, self.config.brush.thickness);
            }
            Action::Erase(at) => {
                let brush = &self.config.brush;
                self.canvas
                    .apply_erase(at, brush.eraser_radius, brush.background_rgb());
            }
            Action::NoOp | Action::CommitStrokeBreak => {}
        }
        action
    }

    /// Run one discrete command and update the status message.
    pub fn execute(&mut self, command: Command) -> Flow {
        match command {
            Command::Quit => {
                log::info!("quit requested");
                return Flow::Quit;
            }
            Command::Undo => {
                if self.canvas.undo() {
                    self.set_status("Undo performed.");
                } else {
                    self.set_status("Nothing to undo.");
                }
            }
            Command::Redo => {
                if self.canvas.redo() {
                    self.set_status("Redo performed.");
                } else {
                    self.set_status("Nothing to redo.");
                }
            }
            Command::Recognize => {
                let result = shape::recognize_and_idealize(
                    self.canvas.image(),
                    self.active_rgb(),
                    self.config.brush.background_rgb(),
                    &self.config.recognition,
                );
                match self.canvas.replace_canvas(result.raster) {
                    Ok(()) => self.set_status("Shape recognition complete."),
                    Err(e) => self.set_status(format!("Shape recognition failed: {e}")),
                }
            }
            Command::Save => match self.store.save(self.canvas.image()) {
                Ok(path) => self.set_status(format!("Drawing saved as '{}'", path.display())),
                Err(e) => {
                    log::warn!("save failed: {e}");
                    self.set_status(format!("Save failed: {e}"));
                }
            },
        }
        Flow::Continue
    }

    /// Canvas copy with the head of the in-progress stroke drawn in.
    pub fn preview(&self) -> RgbImage {
        let mut preview = self.canvas.snapshot_for_preview();
        if let Some((from, to)) = self.interpreter.pending_segment() {
            render::stroke_segment(&mut preview, from, to, self.config.brush.thickness, self.active_rgb());
        }
        preview
    }

    /// Camera frame with widgets, blended half and half with the preview.
    pub fn composite(&self, frame: &RgbImage, hand: Option<&HandLandmarks>) -> Result<RgbImage, SketchError> {
        let mut frame = frame.clone();
        compose::draw_palette(&mut frame, &self.palette);
        if let Some(hand) = hand {
            compose::draw_hand(&mut frame, hand);
        }
        compose::blend_half(&frame, &self.preview())
    }

    pub fn overlay(&self) -> Overlay {
        let swatch = self.active_swatch();
        Overlay {
            color_name: swatch.name.clone(),
            color: swatch.color,
            status: self.status.clone(),
        }
    }

    /// Process one frame: detect, interpret, edit, command, present.
    pub fn step(
        &mut self,
        frame: &RgbImage,
        tracker: &mut impl HandTracker,
        frontend: &mut impl Frontend,
    ) -> Result<Flow, SketchError> {
        let hand = tracker.detect(frame);
        self.handle_hand(hand.as_ref());

        if let Some(command) = frontend.poll_command() {
            if self.execute(command) == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }

        let image = self.composite(frame, hand.as_ref())?;
        frontend.present(&image, &self.overlay())?;
        Ok(Flow::Continue)
    }

    /// Drive the loop until the frontend closes, a quit command arrives or
    /// the frame source fails (which is returned as an error).
    pub fn run(
        &mut self,
        source: &mut impl FrameSource,
        tracker: &mut impl HandTracker,
        frontend: &mut impl Frontend,
    ) -> Result<(), SketchError> {
        let (width, height) = self.canvas.dimensions();
        log::info!(
            "session started: {}x{} canvas, {} colours",
            width,
            height,
            self.palette.len()
        );
        while frontend.is_open() {
            let frame = source.next_frame().map_err(|e| {
                log::error!("{e}");
                e
            })?;
            if self.step(&frame, tracker, frontend)? == Flow::Quit {
                break;
            }
        }
        log::info!("session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::tests::{at, hand};
    use crate::shape::ShapeKind;
    use std::collections::VecDeque;

    const DRAW: [bool; 4] = [true, false, false, false];
    const OPEN: [bool; 4] = [true, true, true, true];
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    fn session() -> Session {
        let mut config = SketchConfig::default();
        config.output.directory = std::env::temp_dir().join("gesture-sketch-unused");
        Session::new(config, Palette::default())
    }

    fn draw_hand(x: i32, y: i32) -> HandLandmarks {
        hand(at(x, y), DRAW, false)
    }

    // ── Fakes ───────────────────────────────────────────

    struct Frames {
        remaining: usize,
    }

    impl FrameSource for Frames {
        fn resolution(&self) -> (u32, u32) {
            (640, 480)
        }

        fn next_frame(&mut self) -> Result<RgbImage, SketchError> {
            if self.remaining == 0 {
                return Err(SketchError::FrameSource("camera unplugged".into()));
            }
            self.remaining -= 1;
            Ok(RgbImage::new(640, 480))
        }
    }

    struct Script(VecDeque<Option<HandLandmarks>>);

    impl HandTracker for Script {
        fn detect(&mut self, _frame: &RgbImage) -> Option<HandLandmarks> {
            self.0.pop_front().flatten()
        }
    }

    #[derive(Default)]
    struct Screen {
        commands: VecDeque<Option<Command>>,
        presented: Vec<(RgbImage, Overlay)>,
    }

    impl Frontend for Screen {
        fn is_open(&self) -> bool {
            true
        }

        fn poll_command(&mut self) -> Option<Command> {
            self.commands.pop_front().flatten()
        }

        fn present(&mut self, image: &RgbImage, overlay: &Overlay) -> Result<(), SketchError> {
            self.presented.push((image.clone(), overlay.clone()));
            Ok(())
        }
    }

    // ── Tests ───────────────────────────────────────────

    #[test]
    fn key_bindings() {
        assert_eq!(Command::from_key('z'), Some(Command::Undo));
        assert_eq!(Command::from_key('Y'), Some(Command::Redo));
        assert_eq!(Command::from_key('s'), Some(Command::Recognize));
        assert_eq!(Command::from_key('w'), Some(Command::Save));
        assert_eq!(Command::from_key('q'), Some(Command::Quit));
        assert_eq!(Command::from_key('x'), None);
    }

    #[test]
    fn two_draw_frames_make_one_segment() {
        let mut s = session();
        assert_eq!(s.handle_hand(Some(&draw_hand(100, 100))), Action::NoOp);
        assert_eq!(s.canvas().undo_depth(), 0);
        s.handle_hand(Some(&draw_hand(150, 100)));
        assert_eq!(s.canvas().undo_depth(), 1);
        for x in [100, 125, 150] {
            assert_eq!(*s.canvas().image().get_pixel(x, 100), RED);
        }
        assert_eq!(*s.canvas().image().get_pixel(125, 110), BLACK);
    }

    #[test]
    fn selecting_a_swatch_changes_the_stroke_colour() {
        let mut s = session();
        // Index-only pose over the Blue swatch still selects.
        assert_eq!(s.handle_hand(Some(&draw_hand(150, 20))), Action::SelectColor(2));
        assert_eq!(s.active_swatch().name, "Blue");
        assert_eq!(s.status(), "Color set to Blue");
        assert_eq!(s.canvas().undo_depth(), 0);

        s.handle_hand(Some(&draw_hand(200, 200)));
        s.handle_hand(Some(&draw_hand(260, 200)));
        assert_eq!(*s.canvas().image().get_pixel(230, 200), Rgb([0, 0, 255]));
    }

    #[test]
    fn pinch_erases_with_one_snapshot() {
        let mut s = session();
        s.handle_hand(Some(&draw_hand(280, 300)));
        s.handle_hand(Some(&draw_hand(320, 300)));
        let pinch = hand(at(300, 300), [true, true, false, false], true);
        assert_eq!(s.handle_hand(Some(&pinch)), Action::Erase(crate::geom::Pixel::new(300, 300)));
        assert_eq!(s.canvas().undo_depth(), 2);
        assert_eq!(*s.canvas().image().get_pixel(300, 300), BLACK);
        assert_eq!(*s.canvas().image().get_pixel(315, 300), BLACK);
    }

    #[test]
    fn undo_redo_report_status() {
        let mut s = session();
        s.execute(Command::Undo);
        assert_eq!(s.status(), "Nothing to undo.");
        s.execute(Command::Redo);
        assert_eq!(s.status(), "Nothing to redo.");

        s.handle_hand(Some(&draw_hand(100, 100)));
        s.handle_hand(Some(&draw_hand(150, 100)));
        let drawn = s.canvas().image().clone();
        assert_eq!(s.execute(Command::Undo), Flow::Continue);
        assert_eq!(s.status(), "Undo performed.");
        assert!(s.canvas().image().pixels().all(|p| *p == BLACK));
        s.execute(Command::Redo);
        assert_eq!(s.status(), "Redo performed.");
        assert_eq!(s.canvas().image(), &drawn);
    }

    #[test]
    fn recognize_replaces_ink_in_active_colour() {
        let mut s = session();
        // Trace a square outline with the default red brush.
        let corners = [(200, 150), (320, 150), (320, 270), (200, 270), (200, 150)];
        for &(x, y) in &corners {
            s.handle_hand(Some(&draw_hand(x, y)));
        }
        s.handle_hand(Some(&hand(at(0, 300), OPEN, false)));
        let before = s.canvas().undo_depth();

        s.execute(Command::Recognize);
        assert_eq!(s.status(), "Shape recognition complete.");
        assert_eq!(s.canvas().undo_depth(), before + 1);
        // Filled, not just the outline.
        assert_eq!(*s.canvas().image().get_pixel(260, 210), RED);

        let again = shape::recognize_and_idealize(s.canvas().image(), RED, BLACK, &Default::default());
        assert_eq!(again.count(ShapeKind::Square), 1);
    }

    #[test]
    fn custom_background_is_neither_ink_nor_erased_into_ink() {
        const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
        let mut config = SketchConfig::default();
        config.brush.background = [255, 255, 255];
        config.output.directory = std::env::temp_dir().join("gesture-sketch-unused");
        let mut s = Session::new(config, Palette::default());
        assert!(s.canvas().image().pixels().all(|p| *p == WHITE));

        let pinch = hand(at(300, 300), [true, true, false, false], true);
        s.handle_hand(Some(&pinch));
        s.execute(Command::Recognize);
        assert!(s.canvas().image().pixels().all(|p| *p == WHITE));

        let corners = [(200, 150), (320, 150), (320, 270), (200, 270), (200, 150)];
        for &(x, y) in &corners {
            s.handle_hand(Some(&draw_hand(x, y)));
        }
        s.handle_hand(Some(&hand(at(0, 300), OPEN, false)));
        s.execute(Command::Recognize);
        assert_eq!(*s.canvas().image().get_pixel(260, 210), RED);
        assert_eq!(*s.canvas().image().get_pixel(100, 400), WHITE);
        let again = shape::recognize_and_idealize(s.canvas().image(), RED, WHITE, &Default::default());
        assert_eq!(again.count(ShapeKind::Square), 1);
    }

    #[test]
    fn save_failure_is_a_status_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "file").unwrap();
        let mut config = SketchConfig::default();
        config.output.directory = blocker;
        let mut s = Session::new(config, Palette::default());
        assert_eq!(s.execute(Command::Save), Flow::Continue);
        assert!(s.status().starts_with("Save failed"), "{}", s.status());
    }

    #[test]
    fn save_writes_committed_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SketchConfig::default();
        config.output.directory = dir.path().join("output");
        let mut s = Session::new(config, Palette::default());
        s.handle_hand(Some(&draw_hand(100, 100)));
        s.handle_hand(Some(&draw_hand(150, 100)));
        s.execute(Command::Save);
        let path = dir.path().join("output").join("drawing_1.png");
        assert_eq!(s.status(), format!("Drawing saved as '{}'", path.display()));
        let saved = image::open(&path).unwrap().into_rgb8();
        assert_eq!(&saved, s.canvas().image());
    }

    #[test]
    fn composite_blends_frame_and_preview() {
        let mut s = session();
        s.handle_hand(Some(&draw_hand(300, 300)));
        s.handle_hand(Some(&draw_hand(360, 300)));
        let mut frame = RgbImage::new(640, 480);
        frame.put_pixel(500, 400, Rgb([100, 100, 100]));
        let out = s.composite(&frame, None).unwrap();
        assert_eq!(*out.get_pixel(330, 300), Rgb([128, 0, 0]));
        assert_eq!(*out.get_pixel(500, 400), Rgb([50, 50, 50]));
        // Palette strip is drawn on the frame half.
        assert_eq!(*out.get_pixel(35, 25), Rgb([128, 0, 0]));
    }

    #[test]
    fn preview_does_not_touch_history() {
        let mut s = session();
        s.handle_hand(Some(&draw_hand(300, 300)));
        let preview = s.preview();
        assert_eq!(*preview.get_pixel(300, 300), RED);
        assert_eq!(*s.canvas().image().get_pixel(300, 300), BLACK);
        assert_eq!(s.canvas().undo_depth(), 0);
    }

    #[test]
    fn run_draws_then_quits() {
        let mut s = session();
        let mut source = Frames { remaining: 10 };
        let mut tracker = Script(
            vec![Some(draw_hand(100, 100)), Some(draw_hand(150, 100)), None, None]
                .into_iter()
                .collect(),
        );
        let mut screen = Screen {
            commands: vec![None, None, Some(Command::Undo), Some(Command::Quit)]
                .into_iter()
                .collect(),
            ..Screen::default()
        };
        s.run(&mut source, &mut tracker, &mut screen).unwrap();
        assert_eq!(screen.presented.len(), 3);
        assert_eq!(screen.presented[2].1.status, "Undo performed.");
        assert_eq!(screen.presented[2].1.color_label(), "Color: Red");
        assert_eq!(s.canvas().redo_depth(), 1);
        assert_eq!(source.remaining, 6);
    }

    #[test]
    fn frame_source_failure_ends_the_run() {
        let mut s = session();
        let mut source = Frames { remaining: 2 };
        let mut tracker = Script(VecDeque::new());
        let mut screen = Screen::default();
        let err = s.run(&mut source, &mut tracker, &mut screen).unwrap_err();
        assert!(matches!(err, SketchError::FrameSource(_)));
        assert_eq!(screen.presented.len(), 2);
    }
}
