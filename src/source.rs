//! Frame sources: where the per-frame camera image comes from.

use image::{Rgb, RgbImage};

use crate::error::SketchError;
use crate::session::FrameSource;

/// Solid frames of a fixed size, for sessions without a camera.
#[derive(Debug, Clone)]
pub struct BlankFrames {
    frame: RgbImage,
}

impl BlankFrames {
    pub fn new(width: u32, height: u32, color: Rgb<u8>) -> Self {
        Self {
            frame: RgbImage::from_pixel(width, height, color),
        }
    }
}

impl FrameSource for BlankFrames {
    fn resolution(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn next_frame(&mut self) -> Result<RgbImage, SketchError> {
        Ok(self.frame.clone())
    }
}

/// Live webcam frames via nokhwa, optionally mirrored.
#[cfg(feature = "camera")]
pub struct CameraSource {
    cam: nokhwa::Camera,
    width: u32,
    height: u32,
    mirror: bool,
}

#[cfg(feature = "camera")]
impl CameraSource {
    /// Open camera `index`, asking for the closest format to the
    /// requested resolution. The stream may settle on a different size;
    /// see [`FrameSource::resolution`].
    pub fn open(index: u32, width: u32, height: u32, mirror: bool) -> Result<Self, SketchError> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{
            CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
        };

        let fmt = CameraFormat::new(Resolution::new(width, height), FrameFormat::YUYV, 30);
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));
        let mut cam = nokhwa::Camera::new(CameraIndex::Index(index), req)
            .map_err(|e| SketchError::FrameSource(format!("create camera: {e}")))?;
        cam.open_stream()
            .map_err(|e| SketchError::FrameSource(format!("open stream: {e}")))?;

        let actual = cam.resolution();
        log::info!("camera {} streaming at {}x{}", index, actual.width(), actual.height());
        Ok(Self {
            cam,
            width: actual.width(),
            height: actual.height(),
            mirror,
        })
    }
}

#[cfg(feature = "camera")]
impl FrameSource for CameraSource {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<RgbImage, SketchError> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| SketchError::FrameSource(format!("fetch frame: {e}")))?;
        let decoded = frame
            .decode_image::<nokhwa::pixel_format::RgbFormat>()
            .map_err(|e| SketchError::FrameSource(format!("decode rgb: {e}")))?;
        // nokhwa may link a different `image` version; go through raw bytes.
        let (w, h) = decoded.dimensions();
        let mut image = RgbImage::from_raw(w, h, decoded.into_raw())
            .ok_or_else(|| SketchError::FrameSource("short frame buffer".into()))?;
        if self.mirror {
            image::imageops::flip_horizontal_in_place(&mut image);
        }
        Ok(image)
    }
}

#[cfg(feature = "camera")]
impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(e) = self.cam.stop_stream() {
            log::warn!("failed to stop camera stream: {e}");
        }
    }
}
