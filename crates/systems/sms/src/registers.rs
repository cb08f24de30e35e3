//! VDP register file
//!
//! All of the chip's programmable state lives here as explicitly-sized
//! integers and bools. Sub-byte fields are extracted with explicit
//! shift/mask operations; nothing relies on language-level bit-field layout.
//!
//! The mode selector is 4 bits assembled from bits scattered across the two
//! mode-control registers, in an order that does not match the source
//! bytes' bit positions. The scatter below reproduces the silicon exactly.

use serde::{Deserialize, Serialize};

/// Active display height, selected by the mode bits.
///
/// The three heights are a closed enumeration; every other mode value falls
/// back to the 192-line layout like the real chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayHeight {
    H192,
    H224,
    H240,
}

impl DisplayHeight {
    /// Number of visible scanlines
    pub fn lines(self) -> u16 {
        match self {
            DisplayHeight::H192 => 192,
            DisplayHeight::H224 => 224,
            DisplayHeight::H240 => 240,
        }
    }
}

/// The VDP's programmable registers, transient port state, and status flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Registers {
    // Mode control 1 (register 0)
    pub external_sync: bool,
    pub sprite_shift: bool,
    pub line_interrupts: bool,
    pub left_clip: bool,
    pub horizontal_scroll_lock: bool,
    pub vertical_scroll_lock: bool,

    // Mode control 2 (register 1)
    pub sprite_zoom: bool,
    pub sprite_size: bool,
    pub frame_interrupts: bool,
    pub display_enable: bool,

    // 4-bit mode selector assembled from both mode-control registers
    mode: u8,

    // Table base addresses (partial VRAM addresses, high bits only)
    pub name_table_address: u8,             // 4 bits
    pub color_table_address: u8,            // 8 bits
    pub pattern_table_address: u8,          // 3 bits
    pub sprite_attribute_table_address: u8, // 7 bits -> VRAM address bits 7-13
    pub sprite_pattern_table_address: u8,   // 3 bits -> VRAM address bits 11-13

    pub backdrop_color: u8, // 4 bits
    pub hscroll: u8,
    pub vscroll: u8,

    /// Reload value for the line-interrupt countdown (register 0xA)
    pub line_counter_reload: u8,
    /// Live countdown, reloaded from `line_counter_reload`
    pub line_counter: u8,

    // Control-port state
    pub control_latch: bool,
    pub address: u16, // 14 bits, wraps on auto-increment
    pub code: u8,     // 2-bit access code
    pub vram_latch: u8,

    // Status flags
    pub frame_interrupt_pending: bool,
    pub line_interrupt_pending: bool,
    pub sprite_overflow: bool,
    pub sprite_collision: bool,
    pub fifth_sprite: u8, // 5-bit table index of the first overflowing sprite
}

impl Registers {
    /// Dispatch a register write. Indices 0x0-0xA update the fields below;
    /// 0xB-0xF are accepted and discarded like the real chip.
    pub fn write(&mut self, index: u8, data: u8) {
        match index & 0x0F {
            // Mode control 1
            0x0 => {
                self.external_sync = data & 0x01 != 0;
                self.mode = (self.mode & !0x02) | (data & 0x02); // source bit 1 -> mode bit 1
                self.mode = (self.mode & !0x08) | ((data & 0x04) << 1); // source bit 2 -> mode bit 3
                self.sprite_shift = data & 0x08 != 0;
                self.line_interrupts = data & 0x10 != 0;
                self.left_clip = data & 0x20 != 0;
                self.horizontal_scroll_lock = data & 0x40 != 0;
                self.vertical_scroll_lock = data & 0x80 != 0;
            }

            // Mode control 2
            0x1 => {
                self.sprite_zoom = data & 0x01 != 0;
                self.sprite_size = data & 0x02 != 0;
                self.mode = (self.mode & !0x04) | ((data & 0x08) >> 1); // source bit 3 -> mode bit 2
                self.mode = (self.mode & !0x01) | ((data & 0x10) >> 4); // source bit 4 -> mode bit 0
                self.frame_interrupts = data & 0x20 != 0;
                self.display_enable = data & 0x40 != 0;
            }

            // Table base addresses
            0x2 => self.name_table_address = data & 0x0F,
            0x3 => self.color_table_address = data,
            0x4 => self.pattern_table_address = data & 0x07,
            0x5 => self.sprite_attribute_table_address = data & 0x7F,
            0x6 => self.sprite_pattern_table_address = data & 0x07,

            0x7 => self.backdrop_color = data & 0x0F,
            0x8 => self.hscroll = data,
            0x9 => self.vscroll = data,
            0xA => self.line_counter_reload = data,

            // 0xB-0xF unmapped
            _ => {}
        }
    }

    /// The assembled 4-bit mode selector
    pub fn mode(&self) -> u8 {
        self.mode
    }

    /// Active display height for the current mode
    pub fn display_height(&self) -> DisplayHeight {
        match self.mode {
            0b1011 => DisplayHeight::H224,
            0b1110 => DisplayHeight::H240,
            _ => DisplayHeight::H192,
        }
    }

    /// Return the current VRAM address, then advance it with 14-bit wrap
    pub fn address_increment(&mut self) -> u16 {
        let address = self.address;
        self.address = (self.address + 1) & 0x3FFF;
        address
    }
}
