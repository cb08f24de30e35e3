//! Sega Master System / Game Gear VDP emulation core
//!
//! This crate implements the video display processor of the Sega Master
//! System (315-5124) and Game Gear (315-5246), a descendant of the Texas
//! Instruments TMS9918A. It models the chip's addressable behavior bit- and
//! cycle-exactly: the register file, the two-port VRAM/CRAM access protocol,
//! the scanline counters, and the legacy two-phase sprite pipeline.
//!
//! # Architecture
//!
//! - **Register file**: 11 programmable registers plus the control-port
//!   latch, VRAM address/code, and read-ahead buffer
//! - **Counters**: 342-dot scanline counter and region-aware vertical
//!   counter (NTSC 262 / PAL 313 lines per frame)
//! - **Sprite engine**: per-scanline selection of up to 4 sprites from a
//!   32-entry attribute table, then per-pixel compositing with collision
//!   and overflow detection
//!
//! The host CPU talks to the chip through four port operations
//! ([`Vdp::read_data`], [`Vdp::read_status`], [`Vdp::write_data`],
//! [`Vdp::write_control`]); finished pixels are handed to a
//! [`vdp_core::PixelSink`] as raw color indices. VRAM and CRAM are owned by
//! the surrounding bus and injected at construction.

mod counters;
mod io;
mod memory;
mod registers;
mod sprites;
mod vdp;

pub use memory::{VideoMemory, VRAM_SIZE};
pub use registers::DisplayHeight;
pub use vdp::{Model, Region, Vdp, VdpError};
