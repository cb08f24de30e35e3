//! Host port protocol
//!
//! The host CPU reaches the chip through two ports. The data port moves
//! bytes to/from VRAM or CRAM through an auto-incrementing address; the
//! control port assembles a 14-bit address plus 2-bit access code from two
//! consecutive writes, with register writes encoded as access code 2 rather
//! than a separate port. Every read of either port drops the control
//! latch back to the low-byte phase.

use vdp_core::logging::{log, LogCategory, LogLevel};

use crate::vdp::Vdp;

impl Vdp {
    /// Data-port read: returns the read-ahead byte latched by the previous
    /// access, then refills the latch from the current address and
    /// advances it.
    pub fn read_data(&mut self) -> u8 {
        self.regs.control_latch = false;

        let data = self.regs.vram_latch;
        let address = self.regs.address_increment();
        self.regs.vram_latch = self.memory.borrow().vram_read(address);
        data
    }

    /// Status-port read: packs the fifth-sprite index, collision, overflow
    /// and frame-interrupt flags into one byte, then clears every one of
    /// them (and the line-interrupt pending) in the same call. The host
    /// acknowledges interrupts through exactly this read.
    pub fn read_status(&mut self) -> u8 {
        self.regs.control_latch = false;

        let mut status = self.regs.fifth_sprite & 0x1F;
        if self.regs.sprite_collision {
            status |= 0x20;
        }
        if self.regs.sprite_overflow {
            status |= 0x40;
        }
        if self.regs.frame_interrupt_pending {
            status |= 0x80;
        }

        self.regs.line_interrupt_pending = false;
        self.regs.frame_interrupt_pending = false;
        self.regs.sprite_overflow = false;
        self.regs.sprite_collision = false;
        self.regs.fifth_sprite = 0;

        log(LogCategory::Io, LogLevel::Trace, || {
            format!("status read: 0x{:02X}", status)
        });
        status
    }

    /// Data-port write: VRAM for access codes 0-2, CRAM for code 3. The
    /// CRAM address is masked to the palette size before use; the 14-bit
    /// address advances either way.
    pub fn write_data(&mut self, data: u8) {
        self.regs.control_latch = false;

        let address = self.regs.address_increment();
        if self.regs.code <= 2 {
            self.memory.borrow_mut().vram_write(address, data);
        } else {
            self.memory.borrow_mut().cram_write(address, data);
        }
    }

    /// Control-port write, two-phase. The first byte of a pair holds
    /// address bits 0-7; the second holds address bits 8-13 and the access
    /// code. Code 0 primes the read-ahead latch; code 2 reinterprets the
    /// assembled address as a register write.
    pub fn write_control(&mut self, data: u8) {
        if !self.regs.control_latch {
            self.regs.control_latch = true;
            self.regs.address = (self.regs.address & 0x3F00) | data as u16;
            return;
        }

        self.regs.control_latch = false;
        self.regs.address = (self.regs.address & 0x00FF) | (((data & 0x3F) as u16) << 8);
        self.regs.code = data >> 6;

        if self.regs.code == 0 {
            let address = self.regs.address_increment();
            self.regs.vram_latch = self.memory.borrow().vram_read(address);
        }

        if self.regs.code == 2 {
            let index = ((self.regs.address >> 8) & 0x0F) as u8;
            let value = (self.regs.address & 0xFF) as u8;
            self.register_write(index, value);
        }
    }

    /// Internal register dispatch (control-port access code 2)
    fn register_write(&mut self, index: u8, data: u8) {
        log(LogCategory::Registers, LogLevel::Debug, || {
            format!("register 0x{:X} <- 0x{:02X}", index, data)
        });
        self.regs.write(index, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::VideoMemory;
    use crate::vdp::{Model, Region};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn vdp() -> Vdp {
        Vdp::new(Model::MasterSystem, Region::NtscU)
    }

    /// Issue a full VRAM write-setup command (access code 1)
    fn set_write_address(vdp: &mut Vdp, address: u16) {
        vdp.write_control((address & 0xFF) as u8);
        vdp.write_control(0x40 | ((address >> 8) & 0x3F) as u8);
    }

    /// Issue a full VRAM read-setup command (access code 0)
    fn set_read_address(vdp: &mut Vdp, address: u16) {
        vdp.write_control((address & 0xFF) as u8);
        vdp.write_control(((address >> 8) & 0x3F) as u8);
    }

    #[test]
    fn test_control_writes_compose_address_and_code() {
        let mut vdp = vdp();
        vdp.write_control(0x34);
        assert!(vdp.regs.control_latch);
        vdp.write_control(0x52); // code 1, address high 0x12

        assert!(!vdp.regs.control_latch);
        assert_eq!(vdp.regs.address, 0x1234);
        assert_eq!(vdp.regs.code, 1);
    }

    #[test]
    fn test_first_control_byte_keeps_high_address_bits() {
        let mut vdp = vdp();
        set_write_address(&mut vdp, 0x2BCD);
        vdp.write_control(0x11);
        // Only the low byte has been replaced so far
        assert_eq!(vdp.regs.address, 0x2B11);
    }

    #[test]
    fn test_data_access_restarts_control_latch() {
        let mut vdp = vdp();
        vdp.write_control(0xAA); // low byte of an aborted pair
        assert!(vdp.regs.control_latch);

        vdp.write_data(0x00); // any data access resets the phase
        assert!(!vdp.regs.control_latch);

        // The next control write is a low byte again
        vdp.write_control(0x33);
        assert!(vdp.regs.control_latch);
        vdp.write_control(0x40);
        assert_eq!(vdp.regs.address & 0xFF, 0x33);
    }

    #[test]
    fn test_status_read_restarts_control_latch() {
        let mut vdp = vdp();
        vdp.write_control(0xAA);
        vdp.read_status();
        assert!(!vdp.regs.control_latch);
    }

    #[test]
    fn test_vram_write_and_autoincrement() {
        let mut vdp = vdp();
        set_write_address(&mut vdp, 0x1000);
        vdp.write_data(0x11);
        vdp.write_data(0x22);

        let mem = vdp.memory();
        assert_eq!(mem.borrow().vram_read(0x1000), 0x11);
        assert_eq!(mem.borrow().vram_read(0x1001), 0x22);
        assert_eq!(vdp.regs.address, 0x1002);
    }

    #[test]
    fn test_address_wraps_at_14_bits() {
        let mut vdp = vdp();
        set_write_address(&mut vdp, 0x3FFF);
        vdp.write_data(0xAA);
        vdp.write_data(0xBB);

        let mem = vdp.memory();
        assert_eq!(mem.borrow().vram_read(0x3FFF), 0xAA);
        assert_eq!(mem.borrow().vram_read(0x0000), 0xBB);
    }

    #[test]
    fn test_full_address_space_walk_restores_address() {
        let mut vdp = vdp();
        set_write_address(&mut vdp, 0x0123);
        for _ in 0..0x4000 {
            vdp.write_data(0x55);
        }
        assert_eq!(vdp.regs.address, 0x0123);
    }

    #[test]
    fn test_read_setup_primes_read_ahead() {
        let mut vdp = vdp();
        {
            let mem = vdp.memory();
            let mut mem = mem.borrow_mut();
            mem.vram_write(0x0800, 0xDE);
            mem.vram_write(0x0801, 0xAD);
            mem.vram_write(0x0802, 0xBE);
        }

        set_read_address(&mut vdp, 0x0800);
        // The setup already fetched 0xDE and moved the address on
        assert_eq!(vdp.regs.address, 0x0801);

        assert_eq!(vdp.read_data(), 0xDE);
        assert_eq!(vdp.read_data(), 0xAD);
        assert_eq!(vdp.read_data(), 0xBE);
    }

    #[test]
    fn test_read_returns_latch_not_fresh_byte() {
        let mut vdp = vdp();
        vdp.memory().borrow_mut().vram_write(0x0100, 0x77);
        set_read_address(&mut vdp, 0x0100);

        // Overwrite the byte after the latch was primed: the stale latched
        // value still comes out first
        vdp.memory().borrow_mut().vram_write(0x0100, 0x99);
        assert_eq!(vdp.read_data(), 0x77);
    }

    #[test]
    fn test_cram_write_masks_to_32_entries() {
        let mut vdp = vdp();
        // Access code 3, address 32: aliases palette entry 0
        vdp.write_control(0x20);
        vdp.write_control(0xC0);
        vdp.write_data(0x2A);

        let mem = vdp.memory();
        assert_eq!(mem.borrow().cram_read(0), 0x2A);
    }

    #[test]
    fn test_cram_write_masks_to_64_entries_on_game_gear() {
        let mut vdp = Vdp::new(Model::GameGear, Region::NtscJ);
        vdp.write_control(0x20);
        vdp.write_control(0xC0);
        vdp.write_data(0x2A);

        let mem = vdp.memory();
        // Entry 32 is distinct on the 64-entry part
        assert_eq!(mem.borrow().cram_read(32), 0x2A);
        assert_eq!(mem.borrow().cram_read(0), 0);

        // Entry 64 aliases entry 0
        vdp.write_control(0x40);
        vdp.write_control(0xC0);
        vdp.write_data(0x15);
        assert_eq!(mem.borrow().cram_read(0), 0x15);
    }

    #[test]
    fn test_register_write_via_control_port() {
        let mut vdp = vdp();
        vdp.write_control(0xE0);
        vdp.write_control(0x81); // code 2, register 1
        assert!(vdp.regs.frame_interrupts);
        assert!(vdp.regs.display_enable);

        vdp.write_control(0x7E);
        vdp.write_control(0x85); // register 5
        assert_eq!(vdp.regs.sprite_attribute_table_address, 0x7E);
    }

    #[test]
    fn test_mode_bit_scatter_through_the_port() {
        let mut vdp = vdp();
        vdp.write_control(0b0000_0110);
        vdp.write_control(0x80); // register 0
        assert_eq!(vdp.regs.mode(), 0b1010);
    }

    #[test]
    fn test_status_read_packs_and_clears_atomically() {
        let mut vdp = vdp();
        vdp.regs.fifth_sprite = 0x13;
        vdp.regs.sprite_collision = true;
        vdp.regs.sprite_overflow = true;
        vdp.regs.frame_interrupt_pending = true;
        vdp.regs.line_interrupt_pending = true;

        let status = vdp.read_status();
        assert_eq!(status, 0x80 | 0x40 | 0x20 | 0x13);

        // Everything reported was cleared in the same call
        assert_eq!(vdp.read_status(), 0x00);
        assert!(!vdp.regs.line_interrupt_pending);
    }

    #[test]
    fn test_with_external_memory_port_protocol() {
        let mem = Rc::new(RefCell::new(VideoMemory::new(Model::MasterSystem)));
        let mut vdp =
            Vdp::with_memory(Model::MasterSystem, Region::NtscU, Rc::clone(&mem)).expect("config");

        set_write_address(&mut vdp, 0x0040);
        vdp.write_data(0x5A);
        // The externally-held handle sees the write
        assert_eq!(mem.borrow().vram_read(0x0040), 0x5A);
    }
}
