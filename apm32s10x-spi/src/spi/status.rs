use crate::registers::{Address, Ctrl2, Sts};

use super::{Instance, Port};

/// Status flags, as bits in STS.
///
/// These are raised by the hardware only. Most of the error flags can't
/// be cleared by writing STS, and instead clear after a specific
/// sequence of register accesses that the caller must perform:
///
///  * [StatusFlag::Overrun]: read DATA ([Port::receive()]), then read
///    STS ([Port::read_status_flag()]).
///  * [StatusFlag::Underrun]: read STS.
///  * [StatusFlag::ModeFault]: read STS, then write CTRL1 (for
///    example, [Port::enable()]).
///  * [StatusFlag::CrcError]: write a zero to it, with
///    [Port::clear_crc_error_flag()].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusFlag {
    /// Rx buffer not empty.
    RxNotEmpty,
    /// Tx buffer empty.
    TxEmpty,
    /// Side channel.
    SideChannel,
    /// Underrun, slave mode only.
    Underrun,
    /// Received CRC doesn't match the computed one.
    CrcError,
    /// NSS pulled low while in master mode.
    ModeFault,
    /// Received word arrived before the previous was read.
    Overrun,
    /// A transfer is in progress.
    Busy,
}

impl StatusFlag {
    /// This flag's bit in STS.
    #[inline(always)]
    pub const fn mask(self) -> u16 {
        match self {
            Self::RxNotEmpty => 0x0001,
            Self::TxEmpty => 0x0002,
            Self::SideChannel => 0x0004,
            Self::Underrun => 0x0008,
            Self::CrcError => 0x0010,
            Self::ModeFault => 0x0020,
            Self::Overrun => 0x0040,
            Self::Busy => 0x0080,
        }
    }
}

/// Interrupt sources.
///
/// Each source's value holds its enable bit in CTRL2, shifted up by
/// [INTERRUPT_SHIFT], and its status bit in STS. The error sources all
/// share the single error enable bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interrupt {
    /// Tx buffer empty.
    TxEmpty,
    /// Rx buffer not empty.
    RxNotEmpty,
    /// Any error.
    ///
    /// This has no status bit of its own, so it never reads as pending.
    /// Enable it, then check the specific error sources.
    Error,
    /// Overrun error.
    Overrun,
    /// CRC error.
    CrcError,
    /// Mode fault error.
    ModeFault,
    /// Underrun error.
    Underrun,
}

/// Distance between an interrupt source and its enable bit in CTRL2.
pub const INTERRUPT_SHIFT: u32 = 8;

impl Interrupt {
    /// This source's combined enable and status bits.
    #[inline(always)]
    pub const fn bits(self) -> u16 {
        match self {
            Self::TxEmpty => 0x8002,
            Self::RxNotEmpty => 0x4001,
            Self::Error => 0x2000,
            Self::Overrun => 0x2040,
            Self::CrcError => 0x2010,
            Self::ModeFault => 0x2020,
            Self::Underrun => 0x2008,
        }
    }

    /// This source's enable bit in CTRL2.
    #[inline(always)]
    pub const fn enable_mask(self) -> u16 {
        self.bits() >> INTERRUPT_SHIFT
    }
}

/// Errors reported by the SPI peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A received word was lost.
    Overrun,
    /// NSS violation in master mode.
    ModeFault,
    /// CRC mismatch.
    Crc,
    /// Nothing was ready to send in slave mode.
    Underrun,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "SPI Error {:?}", self)
    }
}

impl Sts {
    /// Is the given flag set in this snapshot?
    #[inline(always)]
    pub fn is_set(&self, flag: StatusFlag) -> bool {
        self.into_bits() & flag.mask() != 0
    }

    /// The most serious error raised in this snapshot, if any.
    #[inline]
    pub fn error(&self) -> Option<Error> {
        if self.overrun() {
            Some(Error::Overrun)
        } else if self.mode_fault() {
            Some(Error::ModeFault)
        } else if self.crc_error() {
            Some(Error::Crc)
        } else if self.underrun() {
            Some(Error::Underrun)
        } else {
            None
        }
    }
}

impl<Spi> Port<Spi>
where
    Spi: Instance,
{
    /// Read every status flag at once.
    ///
    /// This is a real read of STS, and counts as one for the flag
    /// clearing sequences.
    #[inline(always)]
    pub fn status(&self) -> Sts {
        self.spi.read()
    }

    /// Is the given status flag set?
    #[inline(always)]
    pub fn read_status_flag(&self, flag: StatusFlag) -> bool {
        self.status().is_set(flag)
    }

    /// Allow a status condition to be reported as an interrupt.
    ///
    /// This doesn't raise anything by itself.
    #[inline(always)]
    pub fn enable_interrupt(&mut self, source: Interrupt) {
        self.spi
            .modify_raw(Address::Ctrl2, |v| v | source.enable_mask());
    }

    /// Stop a status condition being reported as an interrupt.
    #[inline(always)]
    pub fn disable_interrupt(&mut self, source: Interrupt) {
        self.spi
            .modify_raw(Address::Ctrl2, |v| v & !source.enable_mask());
    }

    /// Is this interrupt source enabled?
    #[inline(always)]
    pub fn is_interrupt_enabled(&self, source: Interrupt) -> bool {
        self.spi.read::<Ctrl2>().into_bits() & source.enable_mask() != 0
    }

    /// Is this interrupt pending?
    ///
    /// True only when the source is enabled *and* its status bit is
    /// set. A raised status bit with the source masked is not pending.
    #[inline(always)]
    pub fn read_interrupt_flag(&self, source: Interrupt) -> bool {
        let enabled = self.spi.read_raw(Address::Ctrl2) & source.enable_mask();
        let status = self.spi.read_raw(Address::Sts) & source.bits();
        enabled != 0 && status != 0
    }

    /// Clear the CRC error flag.
    ///
    /// This is the only flag that can be cleared by writing STS. The
    /// write leaves every other flag as it is.
    #[inline(always)]
    pub fn clear_crc_error_flag(&mut self) {
        // rc_w0: zero clears, ones are ignored, so no read needed
        self.spi
            .write_raw(Address::Sts, !StatusFlag::CrcError.mask());
    }

    /// Clear a status flag.
    ///
    /// Whatever `flag` is, this only ever clears
    /// [StatusFlag::CrcError]. The other flags need the access
    /// sequences listed on [StatusFlag].
    #[inline(always)]
    pub fn clear_status_flag(&mut self, _flag: StatusFlag) {
        self.clear_crc_error_flag();
    }

    /// Clear an interrupt flag.
    ///
    /// Like [Port::clear_status_flag()], this only ever clears the CRC
    /// error. Overrun, underrun and mode fault are cleared by the same
    /// sequences as their status flags, using
    /// [Port::read_interrupt_flag()] as the STS read.
    #[inline(always)]
    pub fn clear_interrupt_flag(&mut self, _source: Interrupt) {
        self.clear_crc_error_flag();
    }
}
