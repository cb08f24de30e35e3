//! VDP chip assembly and frame sequencing
//!
//! [`Vdp`] ties the register file, counters, and sprite engine together and
//! owns the per-scanline/per-dot stepping the surrounding scheduler drives.
//! Everything is synchronous: a tick completes before the call returns, and
//! a host write takes effect for all ticks after it.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use vdp_core::logging::{log, LogCategory, LogLevel};
use vdp_core::{Chip, PixelSink};

use crate::counters::{Counters, DOTS_PER_LINE};
use crate::memory::VideoMemory;
use crate::registers::{DisplayHeight, Registers};
use crate::sprites::SpriteLine;

/// Target hardware variant. Fixed at construction; decides the palette RAM
/// size the data port masks CRAM writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    /// Sega Master System (315-5124/315-5246): 32 palette entries
    MasterSystem,
    /// Game Gear (315-5378): 64 palette entries
    GameGear,
}

impl Model {
    /// Palette RAM entries for this variant
    pub fn cram_entries(self) -> usize {
        match self {
            Model::MasterSystem => 32,
            Model::GameGear => 64,
        }
    }
}

/// Video region. Decides lines per frame and the vertical-counter skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    NtscJ,
    NtscU,
    Pal,
}

impl Region {
    /// Total scanlines per frame (262 NTSC, 313 PAL)
    pub fn lines_per_frame(self) -> u16 {
        match self {
            Region::NtscJ | Region::NtscU => 262,
            Region::Pal => 313,
        }
    }
}

/// VDP configuration errors
#[derive(Debug, Error)]
pub enum VdpError {
    /// The injected memory's palette RAM does not match the model. This is
    /// caller misconfiguration, caught at construction rather than masked
    /// at runtime.
    #[error("CRAM has {found} entries, expected {expected} for {model:?}")]
    CramSize {
        model: Model,
        expected: usize,
        found: usize,
    },
}

/// Serialized chip state (registers, counters, and the per-line sprite
/// working set). VRAM/CRAM belong to their external owner and are persisted
/// there.
#[derive(Serialize, Deserialize)]
struct VdpState {
    registers: Registers,
    counters: Counters,
    line_sprites: SpriteLine,
}

/// Sega 315-5124/315-5246 VDP
pub struct Vdp {
    model: Model,
    region: Region,
    pub(crate) memory: Rc<RefCell<VideoMemory>>,
    pub(crate) regs: Registers,
    pub(crate) counters: Counters,
    pub(crate) line_sprites: SpriteLine,
}

impl Vdp {
    /// Create a VDP with its own freshly-allocated memories
    pub fn new(model: Model, region: Region) -> Self {
        Self {
            model,
            region,
            memory: Rc::new(RefCell::new(VideoMemory::new(model))),
            regs: Registers::default(),
            counters: Counters::default(),
            line_sprites: SpriteLine::default(),
        }
    }

    /// Create a VDP around externally-owned memories (the bus allocates
    /// VRAM/CRAM on the real board and shares them here).
    pub fn with_memory(
        model: Model,
        region: Region,
        memory: Rc<RefCell<VideoMemory>>,
    ) -> Result<Self, VdpError> {
        let found = memory.borrow().cram_entries();
        if found != model.cram_entries() {
            return Err(VdpError::CramSize {
                model,
                expected: model.cram_entries(),
                found,
            });
        }
        Ok(Self {
            model,
            region,
            memory,
            regs: Registers::default(),
            counters: Counters::default(),
            line_sprites: SpriteLine::default(),
        })
    }

    /// Shared handle to the backing VRAM/CRAM
    pub fn memory(&self) -> Rc<RefCell<VideoMemory>> {
        Rc::clone(&self.memory)
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Active display height for the current mode
    pub fn display_height(&self) -> DisplayHeight {
        self.regs.display_height()
    }

    /// Advance to the next scanline: bump the vertical counter, run the
    /// line-interrupt countdown, raise the frame interrupt at vblank entry,
    /// and evaluate sprites when the new line is visible.
    pub fn step_scanline(&mut self) {
        self.counters.vcounter = (self.counters.vcounter + 1) % self.region.lines_per_frame();
        self.counters.hdot = 0;

        let height = self.regs.display_height().lines();
        let line = self.counters.vcounter;

        // The line counter runs down over the active display plus one line;
        // during the rest of vblank it sits at the reload value.
        if line <= height {
            if self.regs.line_counter == 0 {
                self.regs.line_counter = self.regs.line_counter_reload;
                self.regs.line_interrupt_pending = true;
                log(LogCategory::Interrupts, LogLevel::Debug, || {
                    format!("line interrupt pending at line {}", line)
                });
            } else {
                self.regs.line_counter -= 1;
            }
        } else {
            self.regs.line_counter = self.regs.line_counter_reload;
        }

        if line == height + 1 {
            self.regs.frame_interrupt_pending = true;
            log(LogCategory::Interrupts, LogLevel::Debug, || {
                format!("frame interrupt pending at line {}", line)
            });
        }

        if line < height {
            self.evaluate_sprites(line as u8);
        }
    }

    /// Advance the dot counter by one and composite the sprite layer at the
    /// position just passed. Returns the pixel's color index, or `None`
    /// outside the active display, while the display is disabled, or where
    /// every selected sprite is transparent.
    pub fn step_dot(&mut self) -> Option<u8> {
        let x = self.counters.hdot;
        self.counters.hdot = (x + 1) % DOTS_PER_LINE;

        if x >= 256 {
            return None;
        }
        if !self.regs.display_enable {
            return None;
        }
        if self.counters.vcounter >= self.regs.display_height().lines() {
            return None;
        }
        self.sprite_pixel(x as u8)
    }

    /// Run all 342 dots of the current scanline, handing each visible pixel
    /// to the sink exactly once.
    pub fn run_scanline(&mut self, sink: &mut impl PixelSink) {
        let line = self.counters.vcounter;
        let visible = line < self.regs.display_height().lines();
        for _ in 0..DOTS_PER_LINE {
            let x = self.counters.hdot;
            let color = self.step_dot();
            if visible && x < 256 {
                sink.plot(x, line, color);
            }
        }
    }

    /// Host-visible vertical counter (region/height skip applied)
    pub fn vcounter(&self) -> u8 {
        self.counters
            .vcounter_read(self.region, self.regs.display_height())
    }

    /// Host-visible horizontal counter (reads the latch)
    pub fn hcounter(&self) -> u8 {
        self.counters.hcounter_read()
    }

    /// External sync strobe: sample the live dot counter into the latch
    pub fn latch_hcounter(&mut self) {
        self.counters.latch_hcounter();
    }

    /// Frame-interrupt pending flag (cleared only by `read_status`)
    pub fn frame_interrupt_pending(&self) -> bool {
        self.regs.frame_interrupt_pending
    }

    /// Line-interrupt pending flag
    pub fn line_interrupt_pending(&self) -> bool {
        self.regs.line_interrupt_pending
    }

    /// State of the chip's interrupt line as seen by the host CPU
    pub fn irq_pending(&self) -> bool {
        (self.regs.line_interrupt_pending && self.regs.line_interrupts)
            || (self.regs.frame_interrupt_pending && self.regs.frame_interrupts)
    }
}

impl Chip for Vdp {
    fn reset(&mut self) {
        self.regs = Registers::default();
        self.counters = Counters::default();
        self.line_sprites = SpriteLine::default();
        self.memory.borrow_mut().clear();
    }

    fn save_state(&self) -> Value {
        serde_json::to_value(VdpState {
            registers: self.regs.clone(),
            counters: self.counters.clone(),
            line_sprites: self.line_sprites.clone(),
        })
        .unwrap_or(Value::Null)
    }

    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error> {
        let state: VdpState = serde_json::from_value(v.clone())?;
        self.regs = state.registers;
        self.counters = state.counters;
        self.line_sprites = state.line_sprites;
        Ok(())
    }
}
