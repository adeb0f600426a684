use std::path::PathBuf;

use clap::Parser;
use gesture_sketch::compose::Overlay;
use gesture_sketch::source::BlankFrames;
use gesture_sketch::tracker::{PointerHand, PointerSlot, PointerState, ReplayTracker};
use gesture_sketch::{Command, FrameSource, Frontend, HandTracker, Palette, Session, SketchConfig, SketchError};
use image::{Rgb, RgbImage};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

const TITLE: &str = "Gesture Drawing";

#[derive(Parser)]
#[command(name = "gesture-sketch", about = "Draw with hand gestures and idealize the ink into shapes")]
struct Cli {
    /// JSON preset with any subset of the configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay recorded hand landmarks (JSON lines) instead of the mouse
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Camera index to capture from (needs the `camera` feature)
    #[cfg(feature = "camera")]
    #[arg(long)]
    camera: Option<u32>,

    /// Frame width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Brush thickness in pixels
    #[arg(long)]
    thickness: Option<f64>,

    /// Eraser radius in pixels
    #[arg(long)]
    eraser_radius: Option<f64>,

    /// Directory saved drawings go to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum undo depth (unbounded if omitted)
    #[arg(long)]
    history_limit: Option<usize>,

    /// Do not mirror camera frames
    #[arg(long)]
    no_mirror: bool,
}

impl Cli {
    fn into_config(self) -> Result<(SketchConfig, Option<PathBuf>), SketchError> {
        let mut config = match &self.config {
            Some(path) => SketchConfig::load(path)?,
            None => SketchConfig::default(),
        };
        if let Some(w) = self.width {
            config.frame.width = w;
        }
        if let Some(h) = self.height {
            config.frame.height = h;
        }
        if let Some(t) = self.thickness {
            config.brush.thickness = t;
        }
        if let Some(r) = self.eraser_radius {
            config.brush.eraser_radius = r;
        }
        if let Some(dir) = self.output {
            config.output.directory = dir;
        }
        if self.history_limit.is_some() {
            config.history.limit = self.history_limit;
        }
        if self.no_mirror {
            config.frame.mirror = false;
        }
        config.validate()?;
        Ok((config, self.replay))
    }
}

/// minifb window: shows frames, reads command keys and the mouse.
struct WindowFrontend {
    window: Window,
    buffer: Vec<u32>,
    pointer: Option<PointerSlot>,
}

impl WindowFrontend {
    fn new(width: usize, height: usize, pointer: Option<PointerSlot>) -> Result<Self, SketchError> {
        let mut window = Window::new(TITLE, width, height, WindowOptions::default())
            .map_err(|e| SketchError::Display(e.to_string()))?;
        window.set_target_fps(30);
        Ok(Self {
            window,
            buffer: vec![0; width * height],
            pointer,
        })
    }

    fn publish_pointer(&self) {
        let Some(slot) = &self.pointer else {
            return;
        };
        let (w, h) = self.window.get_size();
        let state = self
            .window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| PointerState {
                x: x / w.max(1) as f32,
                y: y / h.max(1) as f32,
                primary: self.window.get_mouse_down(MouseButton::Left),
                secondary: self.window.get_mouse_down(MouseButton::Right),
            });
        slot.set(state);
    }
}

impl Frontend for WindowFrontend {
    fn is_open(&self) -> bool {
        self.window.is_open()
    }

    fn poll_command(&mut self) -> Option<Command> {
        if self.window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            return Some(Command::Quit);
        }
        const KEYS: [(Key, char); 5] = [
            (Key::Q, 'q'),
            (Key::Z, 'z'),
            (Key::Y, 'y'),
            (Key::S, 's'),
            (Key::W, 'w'),
        ];
        KEYS.iter()
            .find(|(key, _)| self.window.is_key_pressed(*key, KeyRepeat::No))
            .and_then(|&(_, c)| Command::from_key(c))
    }

    fn present(&mut self, image: &RgbImage, overlay: &Overlay) -> Result<(), SketchError> {
        self.buffer.clear();
        self.buffer.extend(image.pixels().map(|Rgb([r, g, b])| {
            ((*r as u32) << 16) | ((*g as u32) << 8) | *b as u32
        }));
        let title = if overlay.status.is_empty() {
            format!("{TITLE} \u{00b7} {}", overlay.color_label())
        } else {
            format!("{TITLE} \u{00b7} {} \u{00b7} {}", overlay.color_label(), overlay.status)
        };
        self.window.set_title(&title);
        self.window
            .update_with_buffer(&self.buffer, image.width() as usize, image.height() as usize)
            .map_err(|e| SketchError::Display(e.to_string()))?;
        self.publish_pointer();
        Ok(())
    }
}

fn open_source(config: &SketchConfig, _cli_camera: Option<u32>) -> Result<Box<dyn FrameSource>, SketchError> {
    #[cfg(feature = "camera")]
    if let Some(index) = _cli_camera {
        let cam = gesture_sketch::source::CameraSource::open(
            index,
            config.frame.width,
            config.frame.height,
            config.frame.mirror,
        )?;
        return Ok(Box::new(cam));
    }
    Ok(Box::new(BlankFrames::new(
        config.frame.width,
        config.frame.height,
        Rgb([48, 48, 48]),
    )))
}

fn run<T: HandTracker>(
    mut config: SketchConfig,
    camera: Option<u32>,
    mut tracker: T,
    pointer: Option<PointerSlot>,
) -> Result<(), SketchError> {
    let mut source = open_source(&config, camera)?;
    // The canvas must match what the source actually delivers.
    let (width, height) = source.resolution();
    config.frame.width = width;
    config.frame.height = height;

    let mut frontend = WindowFrontend::new(width as usize, height as usize, pointer)?;
    let mut session = Session::new(config, Palette::default());
    session.run(&mut source, &mut tracker, &mut frontend)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    #[cfg(feature = "camera")]
    let camera = cli.camera;
    #[cfg(not(feature = "camera"))]
    let camera = None;

    let (config, replay) = cli.into_config()?;
    match replay {
        Some(path) => {
            let tracker = ReplayTracker::open(&path)?;
            run(config, camera, tracker, None)?;
        }
        None => {
            let tracker = PointerHand::new();
            let slot = tracker.slot();
            log::info!("pointer mode: hold left button to draw, right button to erase");
            run(config, camera, tracker, Some(slot))?;
        }
    }
    Ok(())
}
