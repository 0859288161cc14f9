//! Window geometry and colors as the protocol carries them

use serde::{Deserialize, Serialize};

/// Window geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub border_width: u16,
}

impl Geometry {
    pub fn new(x: i16, y: i16, width: u16, height: u16, border_width: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
            border_width,
        }
    }
}

/// 16-bit-per-channel color, the form `AllocColor` takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb16 {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl Rgb16 {
    /// Expand a 0xRRGGBB value, repeating each byte (0x28 -> 0x2828).
    pub fn from_hex(rgb: u32) -> Self {
        let channel = |shift: u32| ((rgb >> shift) & 0xff) as u16 * 0x101;
        Self {
            red: channel(16),
            green: channel(8),
            blue: channel(0),
        }
    }
}
