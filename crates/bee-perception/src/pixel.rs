//! Brightness extraction from raw camera lines.
//!
//! The sensor delivers RGB565 with the high byte first.  Green carries six
//! bits split across the two bytes and is the channel with the best
//! signal-to-noise ratio, so it is used as brightness:
//!
//! ```text
//! byte 0: R4 R3 R2 R1 R0 G5 G4 G3      byte 1: G2 G1 G0 B4 B3 B2 B1 B0
//! brightness = (G5 G4 G3) << 5 | (G2 G1 G0) << 2
//! ```

use bee_hal::camera::{CameraFrame, PixelFormat};

/// Brightness of one RGB565 pixel given as `[high, low]` bytes.
pub fn rgb565_green(high: u8, low: u8) -> u8 {
    ((high & 0x07) << 5) | ((low & 0xE0) >> 3)
}

/// Convert a captured frame into one brightness sample per pixel.
///
/// A trailing odd byte in an RGB565 frame is ignored.
pub fn brightness_line(frame: &CameraFrame) -> Vec<u8> {
    match frame.format {
        PixelFormat::Gray8 => frame.data.clone(),
        PixelFormat::Rgb565 => frame
            .data
            .chunks_exact(2)
            .map(|px| rgb565_green(px[0], px[1]))
            .collect(),
    }
}
