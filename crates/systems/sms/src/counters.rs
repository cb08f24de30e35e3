//! Scanline and dot counters
//!
//! The chip keeps a raw dot counter and a raw scanline counter; what the
//! host reads through the counter ports is a transformed view. The vertical
//! counter applies a region- and height-dependent skip so that an 8-bit
//! value can cover a 262- or 313-line frame, and the horizontal counter is
//! a latched, phase-shifted quarter-rate view of the dot clock.

use serde::{Deserialize, Serialize};

use crate::registers::DisplayHeight;
use crate::vdp::Region;

/// Dot clocks per scanline
pub(crate) const DOTS_PER_LINE: u16 = 342;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Counters {
    /// Internal dot counter, 0..342, wraps per scanline
    pub hdot: u16,
    /// Raw scanline counter, wraps per frame
    pub vcounter: u16,
    /// Latched dot counter sampled by the external sync strobe
    hlatch: u16,
}

impl Counters {
    /// Host-visible vertical counter.
    ///
    /// Below a region/height threshold the raw counter passes through;
    /// above it a fixed offset is subtracted, reproducing the chip's
    /// non-linear rollover. The match is exhaustive over the closed
    /// (region, height) enumeration, so an unsupported combination cannot
    /// reach this point.
    pub fn vcounter_read(&self, region: Region, height: DisplayHeight) -> u8 {
        let v = self.vcounter;
        let mapped = match (region, height) {
            (Region::NtscJ | Region::NtscU, DisplayHeight::H192) => {
                if v <= 218 {
                    v
                } else {
                    v - 6
                }
            }
            (Region::NtscJ | Region::NtscU, DisplayHeight::H224) => {
                if v <= 234 {
                    v
                } else {
                    v - 6
                }
            }
            (Region::NtscJ | Region::NtscU, DisplayHeight::H240) => v,
            (Region::Pal, DisplayHeight::H192) => {
                if v <= 242 {
                    v
                } else {
                    v - 57
                }
            }
            (Region::Pal, DisplayHeight::H224) => {
                if v <= 258 {
                    v
                } else {
                    v - 57
                }
            }
            (Region::Pal, DisplayHeight::H240) => {
                if v <= 266 {
                    v
                } else {
                    v - 56
                }
            }
        };
        mapped as u8
    }

    /// Host-visible horizontal counter: the latched dot counter, shifted
    /// back 94 dots and divided by four
    pub fn hcounter_read(&self) -> u8 {
        (self.hlatch.wrapping_sub(94) >> 2) as u8
    }

    /// Sample the live dot counter into the latch (external sync strobe).
    /// The host reads the latched value, never the live one.
    pub fn latch_hcounter(&mut self) {
        self.hlatch = self.hdot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_line(v: u16) -> Counters {
        Counters {
            vcounter: v,
            ..Counters::default()
        }
    }

    #[test]
    fn test_ntsc_192_line_skip() {
        // Threshold 218: identity at or below, minus 6 above
        assert_eq!(
            at_line(218).vcounter_read(Region::NtscU, DisplayHeight::H192),
            218
        );
        assert_eq!(
            at_line(219).vcounter_read(Region::NtscU, DisplayHeight::H192),
            213
        );
        assert_eq!(
            at_line(261).vcounter_read(Region::NtscJ, DisplayHeight::H192),
            255
        );
    }

    #[test]
    fn test_ntsc_224_line_skip() {
        assert_eq!(
            at_line(234).vcounter_read(Region::NtscU, DisplayHeight::H224),
            234
        );
        assert_eq!(
            at_line(235).vcounter_read(Region::NtscU, DisplayHeight::H224),
            229
        );
    }

    #[test]
    fn test_ntsc_240_line_identity() {
        assert_eq!(
            at_line(250).vcounter_read(Region::NtscJ, DisplayHeight::H240),
            250
        );
    }

    #[test]
    fn test_pal_skips() {
        assert_eq!(
            at_line(242).vcounter_read(Region::Pal, DisplayHeight::H192),
            242
        );
        assert_eq!(
            at_line(243).vcounter_read(Region::Pal, DisplayHeight::H192),
            186
        );
        assert_eq!(
            at_line(259).vcounter_read(Region::Pal, DisplayHeight::H224),
            202
        );
        assert_eq!(
            at_line(267).vcounter_read(Region::Pal, DisplayHeight::H240),
            211
        );
    }

    #[test]
    fn test_hcounter_reads_latch_not_live() {
        let mut counters = Counters::default();
        counters.hdot = 150;
        counters.latch_hcounter();
        counters.hdot = 300;

        // (150 - 94) >> 2 = 14
        assert_eq!(counters.hcounter_read(), 14);

        counters.latch_hcounter();
        // (300 - 94) >> 2 = 51
        assert_eq!(counters.hcounter_read(), 51);
    }
}
