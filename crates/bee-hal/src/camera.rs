//! `ScanlineCamera` trait and supporting types for the line-capture camera.
//!
//! The camera is configured to read a single row of the sensor.  A capture
//! is started explicitly, completes asynchronously (DMA), and the finished
//! line stays available until the next capture overwrites it.

use async_trait::async_trait;
use bee_types::BeeError;

/// Pixel encoding of a [`CameraFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Two bytes per pixel, as delivered by the sensor.
    Rgb565,
    /// One brightness byte per pixel.
    Gray8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb565 => 2,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// A raw captured line returned by a camera driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFrame {
    /// Line width in pixels.
    pub width: u32,
    pub format: PixelFormat,
    /// Raw pixel data, `width * bytes_per_pixel` bytes.
    pub data: Vec<u8>,
}

impl CameraFrame {
    /// Build a greyscale frame from brightness samples.
    pub fn gray(samples: &[u8]) -> Self {
        Self {
            width: samples.len() as u32,
            format: PixelFormat::Gray8,
            data: samples.to_vec(),
        }
    }

    /// `true` when `data` holds exactly `width` pixels.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.width as usize * self.format.bytes_per_pixel()
    }
}

/// A one-shot line capture device.
#[async_trait]
pub trait ScanlineCamera: Send {
    /// Kick off the capture of one line.
    ///
    /// # Errors
    ///
    /// Returns [`BeeError::HardwareFault`] if a capture cannot be started.
    fn start_capture(&mut self) -> Result<(), BeeError>;

    /// Wait until the capture started by [`start_capture`][Self::start_capture]
    /// has landed in memory.
    ///
    /// # Errors
    ///
    /// Returns [`BeeError::HardwareFault`] if no capture is in flight or the
    /// transfer failed.
    async fn wait_capture_ready(&mut self) -> Result<(), BeeError>;

    /// The most recently completed line.
    fn last_frame(&self) -> CameraFrame;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_frame_is_well_formed() {
        let frame = CameraFrame::gray(&[1, 2, 3, 4]);
        assert_eq!(frame.width, 4);
        assert_eq!(frame.format, PixelFormat::Gray8);
        assert!(frame.is_well_formed());
    }

    #[test]
    fn rgb565_frame_needs_two_bytes_per_pixel() {
        let short = CameraFrame {
            width: 3,
            format: PixelFormat::Rgb565,
            data: vec![0; 3],
        };
        assert!(!short.is_well_formed());

        let full = CameraFrame {
            width: 3,
            format: PixelFormat::Rgb565,
            data: vec![0; 6],
        };
        assert!(full.is_well_formed());
    }
}
