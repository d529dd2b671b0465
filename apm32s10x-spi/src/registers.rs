//! Interfaces for the registers of one SPI peripheral.
//!
//! Each register is a 16-bit value living in the low half of a 32-bit
//! slot. The bitfield types here describe what the bits mean; the
//! [Registers] trait moves them to and from the hardware.

use bitfield_struct::bitfield;
use vcell::VolatileCell;

/// Offset of a register from the start of a [RegisterBlock].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Address {
    Ctrl1 = 0x00,
    Ctrl2 = 0x04,
    Sts = 0x08,
    Data = 0x0c,
    CrcPoly = 0x10,
    RxCrc = 0x14,
    TxCrc = 0x18,
}

/// A trait describing a register generically.
pub trait Register: Copy + From<u16> + Into<u16> {
    /// Where this register lives in the block.
    const ADDRESS: Address;
}

/// Raw access to a block of SPI registers.
///
/// Reads and writes may have side effects in hardware (reading
/// [Sts] clears underrun, for instance), so every method here is a
/// real bus access, and `modify` is a read followed by a write.
pub trait Registers {
    /// Read a raw register.
    fn read_raw(&self, address: Address) -> u16;

    /// Write a raw register.
    fn write_raw(&self, address: Address, value: u16);

    /// Modify a raw register.
    #[inline(always)]
    fn modify_raw(&self, address: Address, f: impl FnOnce(u16) -> u16) {
        let value = self.read_raw(address);
        self.write_raw(address, f(value));
    }

    /// Read a register.
    #[inline(always)]
    fn read<R>(&self) -> R
    where
        R: Register,
    {
        self.read_raw(R::ADDRESS).into()
    }

    /// Write a register.
    #[inline(always)]
    fn write<R>(&self, value: R)
    where
        R: Register,
    {
        self.write_raw(R::ADDRESS, value.into())
    }

    /// Modify a register.
    #[inline(always)]
    fn modify<R>(&self, f: impl FnOnce(R) -> R)
    where
        R: Register,
    {
        self.modify_raw(R::ADDRESS, |v| f(v.into()).into())
    }
}

/// The memory layout of one SPI peripheral.
#[repr(C)]
pub struct RegisterBlock {
    ctrl1: VolatileCell<u32>,
    ctrl2: VolatileCell<u32>,
    sts: VolatileCell<u32>,
    data: VolatileCell<u32>,
    crcpoly: VolatileCell<u32>,
    rxcrc: VolatileCell<u32>,
    txcrc: VolatileCell<u32>,
}

impl RegisterBlock {
    #[inline(always)]
    fn cell(&self, address: Address) -> &VolatileCell<u32> {
        match address {
            Address::Ctrl1 => &self.ctrl1,
            Address::Ctrl2 => &self.ctrl2,
            Address::Sts => &self.sts,
            Address::Data => &self.data,
            Address::CrcPoly => &self.crcpoly,
            Address::RxCrc => &self.rxcrc,
            Address::TxCrc => &self.txcrc,
        }
    }
}

impl Registers for RegisterBlock {
    #[inline(always)]
    fn read_raw(&self, address: Address) -> u16 {
        // upper half of every slot is reserved
        self.cell(address).get() as u16
    }

    #[inline(always)]
    fn write_raw(&self, address: Address, value: u16) {
        self.cell(address).set(value as u32)
    }
}

impl core::fmt::Debug for RegisterBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        // don't touch sts or data, reading those has side effects
        f.debug_struct("RegisterBlock")
            .field("ctrl1", &Ctrl1::from_bits(self.read_raw(Address::Ctrl1)))
            .field("ctrl2", &Ctrl2::from_bits(self.read_raw(Address::Ctrl2)))
            .field("crcpoly", &self.read_raw(Address::CrcPoly))
            .finish_non_exhaustive()
    }
}

/// Baud rate divider, dividing the peripheral clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BaudRateDiv {
    Div2 = 0,
    Div4 = 1,
    Div8 = 2,
    Div16 = 3,
    Div32 = 4,
    Div64 = 5,
    Div128 = 6,
    Div256 = 7,
}

impl BaudRateDiv {
    pub const fn into_bits(self) -> u8 {
        self as u8
    }

    pub const fn from_bits(v: u8) -> Self {
        match v & 0x7 {
            0 => Self::Div2,
            1 => Self::Div4,
            2 => Self::Div8,
            3 => Self::Div16,
            4 => Self::Div32,
            5 => Self::Div64,
            6 => Self::Div128,
            _ => Self::Div256,
        }
    }
}

/// 0x00 Control register 1.
#[cfg_attr(not(feature = "defmt"), bitfield(u16))]
#[cfg_attr(feature = "defmt", bitfield(u16, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ctrl1 {
    /// Clock phase, sample on the second edge.
    pub cpha: bool,
    /// Clock polarity, clock idles high.
    pub cpol: bool,
    /// Master mode.
    pub master: bool,
    /// Baud rate divider.
    #[bits(3, from = BaudRateDiv::from_bits, into = BaudRateDiv::into_bits)]
    pub baud: BaudRateDiv,
    /// Peripheral enable.
    pub enabled: bool,
    /// Transmit LSB first.
    pub lsb_first: bool,
    /// Internal slave select, used when `software_nss` is set.
    pub internal_ss: bool,
    /// Software slave select management.
    pub software_nss: bool,
    /// Receive only, in two-line mode.
    pub rx_only: bool,
    /// 16-bit data frames.
    pub frame_16bit: bool,
    /// Next transmitted word is the CRC.
    pub crc_next: bool,
    /// Hardware CRC calculation.
    pub crc_enabled: bool,
    /// Output enabled in bidirectional mode (transmit).
    pub bidi_output: bool,
    /// Bidirectional (single line) mode.
    pub bidi_mode: bool,
}

impl Register for Ctrl1 {
    const ADDRESS: Address = Address::Ctrl1;
}

/// 0x04 Control register 2.
///
/// The interrupt enables sit 8 bits below the matching interrupt
/// source values.
#[cfg_attr(not(feature = "defmt"), bitfield(u16))]
#[cfg_attr(feature = "defmt", bitfield(u16, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ctrl2 {
    /// Rx buffer DMA request.
    pub rx_dma: bool,
    /// Tx buffer DMA request.
    pub tx_dma: bool,
    /// Drive the slave select output in master mode.
    pub ss_output: bool,
    #[bits(2)]
    __: u8,
    /// Error interrupt enable.
    pub err_int: bool,
    /// Rx buffer not empty interrupt enable.
    pub rxbne_int: bool,
    /// Tx buffer empty interrupt enable.
    pub txbe_int: bool,
    #[bits(8)]
    __: u8,
}

impl Register for Ctrl2 {
    const ADDRESS: Address = Address::Ctrl2;
}

/// 0x08 Status register.
///
/// Only the CRC error flag can be cleared by writing (a zero) here.
/// The other error flags clear through read sequences, see
/// [crate::spi::StatusFlag].
#[cfg_attr(not(feature = "defmt"), bitfield(u16))]
#[cfg_attr(feature = "defmt", bitfield(u16, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sts {
    /// Rx buffer not empty.
    #[bits(1, access = RO)]
    pub rx_not_empty: bool,
    /// Tx buffer empty.
    #[bits(1, access = RO)]
    pub tx_empty: bool,
    /// Side channel.
    #[bits(1, access = RO)]
    pub side_channel: bool,
    /// Underrun.
    #[bits(1, access = RO)]
    pub underrun: bool,
    /// CRC error.
    pub crc_error: bool,
    /// Mode fault.
    #[bits(1, access = RO)]
    pub mode_fault: bool,
    /// Overrun.
    #[bits(1, access = RO)]
    pub overrun: bool,
    /// Busy.
    #[bits(1, access = RO)]
    pub busy: bool,
    #[bits(8)]
    __: u8,
}

impl Register for Sts {
    const ADDRESS: Address = Address::Sts;
}

/// 0x0c Data register, a single slot for both directions.
#[cfg_attr(not(feature = "defmt"), bitfield(u16))]
#[cfg_attr(feature = "defmt", bitfield(u16, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Data {
    pub data: u16,
}

impl Register for Data {
    const ADDRESS: Address = Address::Data;
}

/// 0x10 CRC polynomial.
#[cfg_attr(not(feature = "defmt"), bitfield(u16))]
#[cfg_attr(feature = "defmt", bitfield(u16, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CrcPoly {
    pub polynomial: u16,
}

impl Register for CrcPoly {
    const ADDRESS: Address = Address::CrcPoly;
}

/// 0x14 Computed CRC of received words.
#[cfg_attr(not(feature = "defmt"), bitfield(u16))]
#[cfg_attr(feature = "defmt", bitfield(u16, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RxCrc {
    #[bits(16, access = RO)]
    pub crc: u16,
}

impl Register for RxCrc {
    const ADDRESS: Address = Address::RxCrc;
}

/// 0x18 Computed CRC of transmitted words.
#[cfg_attr(not(feature = "defmt"), bitfield(u16))]
#[cfg_attr(feature = "defmt", bitfield(u16, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxCrc {
    #[bits(16, access = RO)]
    pub crc: u16,
}

impl Register for TxCrc {
    const ADDRESS: Address = Address::TxCrc;
}
