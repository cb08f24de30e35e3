//! Core primitives and traits shared by the video chip crates.

pub mod logging;

pub mod types {
    use serde::{Deserialize, Serialize};

    /// A frame of palette indices produced by an indexed-color video chip.
    ///
    /// Pixels hold raw color indices, not RGB values; palette lookup is the
    /// presentation layer's job. Index 0 means the layer is transparent at
    /// that position.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct IndexFrame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u8>,
    }

    impl IndexFrame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }
    }
}

use serde_json::Value;

/// A chip instance with resettable, serializable state.
///
/// Save states carry only internal chip state (registers, counters, working
/// sets); backing memories owned by the bus are persisted by their owner.
pub trait Chip {
    /// Reset to power-on defaults
    fn reset(&mut self);

    /// Return a JSON-serializable snapshot of the chip state.
    fn save_state(&self) -> Value;

    /// Restore a snapshot produced by [`Chip::save_state`].
    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error>;
}

/// Display-consumer boundary for indexed-color video output.
///
/// A video chip hands each finished pixel to a sink exactly once per dot.
/// `None` means the chip's layer is transparent at that position and
/// whatever lies behind it (backdrop, another layer) shows through.
pub trait PixelSink {
    /// Receive the color index for the pixel at (`x`, `line`).
    fn plot(&mut self, x: u16, line: u16, color: Option<u8>);
}

impl PixelSink for types::IndexFrame {
    fn plot(&mut self, x: u16, line: u16, color: Option<u8>) {
        if (x as u32) < self.width && (line as u32) < self.height {
            self.pixels[(line as u32 * self.width + x as u32) as usize] =
                color.unwrap_or(0);
        }
    }
}
