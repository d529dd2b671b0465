//! A simulated SPI register block, for testing on the host.
//!
//! The simulator follows the data sheet for everything the driver can
//! observe: writes to DATA empty the Tx buffer and start a frame, frames
//! finish after enough clock cycles and loop back into the Rx buffer,
//! and the error flags clear the way the hardware clears them.

use std::cell::{Cell, RefCell};
use std::vec::Vec;

use crate::power::{Bus, Line};
use crate::registers::{Address, Ctrl1, Registers};

use super::{FrameLength, Instance, InstanceSealed, StatusFlag};

#[derive(Debug)]
pub struct Sim {
    ctrl1: Cell<u16>,
    ctrl2: Cell<u16>,
    sts: Cell<u16>,
    crcpoly: Cell<u16>,
    rxcrc: Cell<u16>,
    txcrc: Cell<u16>,

    // word sitting in the tx buffer / shift register
    tx: Cell<Option<u16>>,
    rx: Cell<u16>,
    cycles: Cell<u32>,

    // progress through the multi-step clear sequences
    overrun_data_read: Cell<bool>,
    mode_fault_sts_read: Cell<bool>,

    writes: RefCell<Vec<(Address, u16)>>,
}

impl Default for Sim {
    fn default() -> Self {
        Self::new()
    }
}

impl Sim {
    /// A block in its reset state.
    pub fn new() -> Self {
        Self {
            ctrl1: Cell::new(0x0000),
            ctrl2: Cell::new(0x0000),
            sts: Cell::new(StatusFlag::TxEmpty.mask()),
            crcpoly: Cell::new(0x0007),
            rxcrc: Cell::new(0x0000),
            txcrc: Cell::new(0x0000),
            tx: Cell::new(None),
            rx: Cell::new(0x0000),
            cycles: Cell::new(0),
            overrun_data_read: Cell::new(false),
            mode_fault_sts_read: Cell::new(false),
            writes: RefCell::new(Vec::new()),
        }
    }

    /// Look at a register without any read side effects.
    pub fn peek(&self, address: Address) -> u16 {
        match address {
            Address::Ctrl1 => self.ctrl1.get(),
            Address::Ctrl2 => self.ctrl2.get(),
            Address::Sts => self.sts.get(),
            Address::Data => self.rx.get(),
            Address::CrcPoly => self.crcpoly.get(),
            Address::RxCrc => self.rxcrc.get(),
            Address::TxCrc => self.txcrc.get(),
        }
    }

    /// Set a register from the hardware side.
    pub fn poke(&self, address: Address, value: u16) {
        match address {
            Address::Ctrl1 => self.ctrl1.set(value),
            Address::Ctrl2 => self.ctrl2.set(value),
            Address::Sts => self.sts.set(value),
            Address::Data => self.rx.set(value),
            Address::CrcPoly => self.crcpoly.set(value),
            Address::RxCrc => self.rxcrc.set(value),
            Address::TxCrc => self.txcrc.set(value),
        }
    }

    /// Raise a status flag from the hardware side.
    pub fn raise(&self, flag: StatusFlag) {
        self.sts.set(self.sts.get() | flag.mask());
    }

    /// Is a status flag set, without reading STS?
    pub fn flag(&self, flag: StatusFlag) -> bool {
        self.sts.get() & flag.mask() != 0
    }

    /// Every write made so far, in order.
    pub fn writes(&self) -> Vec<(Address, u16)> {
        self.writes.borrow().clone()
    }

    /// Forget every write made so far.
    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }

    fn frame_length(&self) -> FrameLength {
        FrameLength::from_ctrl1(Ctrl1::from_bits(self.ctrl1.get()))
    }

    /// A word arrives on the bus, from the other side.
    pub fn deliver(&self, word: u16) {
        if self.flag(StatusFlag::RxNotEmpty) {
            // the old word wasn't read in time, the new one is lost
            self.raise(StatusFlag::Overrun);
        } else {
            self.rx.set(word & self.frame_length().word_mask());
            self.raise(StatusFlag::RxNotEmpty);
        }
    }

    /// Run the bus clock for some number of cycles.
    ///
    /// A frame in flight finishes once it has seen a full frame of
    /// cycles, and is looped back into the Rx buffer.
    pub fn clock(&self, cycles: u32) {
        let ctrl1 = Ctrl1::from_bits(self.ctrl1.get());
        if !ctrl1.enabled() {
            return;
        }

        let Some(word) = self.tx.get() else {
            return;
        };

        let elapsed = self.cycles.get() + cycles;
        if elapsed < self.frame_length().cycles() {
            self.cycles.set(elapsed);
            return;
        }

        self.cycles.set(0);
        self.tx.set(None);
        self.sts
            .set((self.sts.get() | StatusFlag::TxEmpty.mask()) & !StatusFlag::Busy.mask());
        if ctrl1.crc_next() {
            self.ctrl1.set(ctrl1.with_crc_next(false).into_bits());
        }

        self.deliver(word);
    }
}

impl Registers for Sim {
    fn read_raw(&self, address: Address) -> u16 {
        let value = self.peek(address);
        match address {
            Address::Sts => {
                if self.flag(StatusFlag::Overrun) && self.overrun_data_read.get() {
                    self.sts.set(self.sts.get() & !StatusFlag::Overrun.mask());
                    self.overrun_data_read.set(false);
                }
                if self.flag(StatusFlag::ModeFault) {
                    self.mode_fault_sts_read.set(true);
                }
                self.sts.set(self.sts.get() & !StatusFlag::Underrun.mask());
            }
            Address::Data => {
                self.sts.set(self.sts.get() & !StatusFlag::RxNotEmpty.mask());
                if self.flag(StatusFlag::Overrun) {
                    self.overrun_data_read.set(true);
                }
            }
            _ => {}
        }
        value
    }

    fn write_raw(&self, address: Address, value: u16) {
        self.writes.borrow_mut().push((address, value));
        match address {
            Address::Ctrl1 => {
                self.ctrl1.set(value);
                if self.flag(StatusFlag::ModeFault) && self.mode_fault_sts_read.get() {
                    self.sts.set(self.sts.get() & !StatusFlag::ModeFault.mask());
                    self.mode_fault_sts_read.set(false);
                }
            }
            Address::Ctrl2 => self.ctrl2.set(value),
            Address::Sts => {
                // only crc error is writable, and only to zero
                if value & StatusFlag::CrcError.mask() == 0 {
                    self.sts.set(self.sts.get() & !StatusFlag::CrcError.mask());
                }
            }
            Address::Data => {
                self.tx.set(Some(value));
                self.cycles.set(0);
                let mut sts = self.sts.get() & !StatusFlag::TxEmpty.mask();
                if Ctrl1::from_bits(self.ctrl1.get()).enabled() {
                    sts |= StatusFlag::Busy.mask();
                }
                self.sts.set(sts);
            }
            Address::CrcPoly => self.crcpoly.set(value),
            // read only
            Address::RxCrc | Address::TxCrc => {}
        }
    }
}

impl Registers for &Sim {
    fn read_raw(&self, address: Address) -> u16 {
        (**self).read_raw(address)
    }

    fn write_raw(&self, address: Address, value: u16) {
        (**self).write_raw(address, value)
    }
}

impl InstanceSealed for &Sim {}

impl Instance for &Sim {
    const NAME: &'static str = "SIM";
    const LINE: Line = Line::new(Bus::Apb2, 12);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reset_state() {
        let sim = Sim::new();
        assert_eq!(0x0002, sim.peek(Address::Sts));
        assert_eq!(0x0007, sim.peek(Address::CrcPoly));
        assert!(sim.writes().is_empty());
    }

    #[test]
    fn frame_needs_enable_and_cycles() {
        let sim = Sim::new();
        sim.write_raw(Address::Data, 0x1a5);
        assert!(!sim.flag(StatusFlag::TxEmpty));
        assert!(!sim.flag(StatusFlag::Busy));

        // disabled, nothing moves
        sim.clock(100);
        assert!(!sim.flag(StatusFlag::TxEmpty));

        sim.poke(Address::Ctrl1, 0x0040);
        sim.clock(7);
        assert!(!sim.flag(StatusFlag::TxEmpty));
        sim.clock(1);
        assert!(sim.flag(StatusFlag::TxEmpty));
        assert!(sim.flag(StatusFlag::RxNotEmpty));
        assert_eq!(0x00a5, sim.peek(Address::Data));
    }

    #[test]
    fn sts_write_only_touches_crc_error() {
        let sim = Sim::new();
        sim.poke(Address::Sts, 0x00ff);
        sim.write_raw(Address::Sts, 0x0000);
        assert_eq!(0x00ef, sim.peek(Address::Sts));
    }
}
