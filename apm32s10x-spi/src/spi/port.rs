use crate::power::ClockReset;
use crate::registers::{Address, CrcPoly, Ctrl1, Ctrl2, Data, RxCrc, TxCrc};

use super::{BidiDirection, Config, Error, FrameLength, Instance};

/// Wrap an SPI peripheral into a port.
#[inline(always)]
pub fn new<Spi>(spi: Spi) -> Port<Spi>
where
    Spi: Instance,
{
    Port::new(spi)
}

/// An SPI port.
///
/// Every method is a direct register access. Nothing here waits on the
/// hardware or checks that it is ready, and nothing stops two contexts
/// (say, a main loop and an interrupt handler) from using the same
/// peripheral at once. That is up to the caller.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Port<Spi> {
    pub(super) spi: Spi,
}

/// Which DMA request line to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaRequest {
    /// Request when the Tx buffer is empty.
    Tx,
    /// Request when the Rx buffer is not empty.
    Rx,
}

impl<Spi> Port<Spi>
where
    Spi: Instance,
{
    /// Wrap an SPI peripheral into a port.
    ///
    /// This leaves the registers as they are, see [Port::reset()].
    #[inline(always)]
    pub fn new(spi: Spi) -> Self {
        Self { spi }
    }

    /// Recover the SPI peripheral.
    #[inline(always)]
    pub fn free(self) -> Spi {
        self.spi
    }

    /// Reset the peripheral, returning every register to its reset
    /// value.
    #[inline]
    pub fn reset<Rcm>(&mut self, mut rcm: Rcm)
    where
        Rcm: ClockReset,
    {
        #[cfg(feature = "defmt")]
        defmt::trace!("{}: reset", Spi::NAME);

        rcm.pulse_reset(Spi::LINE);
    }

    /// Turn the peripheral clock on or off.
    #[inline]
    pub fn set_clock_enabled<Rcm>(&mut self, mut rcm: Rcm, enabled: bool)
    where
        Rcm: ClockReset,
    {
        rcm.set_clock_enabled(Spi::LINE, enabled);
    }

    /// Apply a configuration.
    ///
    /// Enable and the CRC controls are left alone, every other bit of
    /// CTRL1 is replaced. This does not enable the peripheral.
    #[inline]
    pub fn configure(&mut self, config: &Config) {
        #[cfg(feature = "defmt")]
        defmt::trace!("{}: configure {}", Spi::NAME, config);

        self.spi.modify_raw(Address::Ctrl1, |v| config.apply(v));
        self.spi
            .write(CrcPoly::new().with_polynomial(config.crc_polynomial));
    }

    /// Get the configuration currently in the registers.
    #[inline]
    pub fn config(&self) -> Config {
        Config::decode(
            self.spi.read_raw(Address::Ctrl1),
            self.spi.read_raw(Address::CrcPoly),
        )
    }

    /// Enable the peripheral.
    #[inline(always)]
    pub fn enable(&mut self) {
        self.spi.modify(|r: Ctrl1| r.with_enabled(true));
    }

    /// Disable the peripheral.
    #[inline(always)]
    pub fn disable(&mut self) {
        self.spi.modify(|r: Ctrl1| r.with_enabled(false));
    }

    /// Is the peripheral enabled?
    #[inline(always)]
    pub fn is_enabled(&self) -> bool {
        self.spi.read::<Ctrl1>().enabled()
    }

    /// Enable a DMA request line.
    #[inline(always)]
    pub fn enable_dma(&mut self, request: DmaRequest) {
        match request {
            DmaRequest::Tx => self.spi.modify(|r: Ctrl2| r.with_tx_dma(true)),
            DmaRequest::Rx => self.spi.modify(|r: Ctrl2| r.with_rx_dma(true)),
        }
    }

    /// Disable a DMA request line.
    #[inline(always)]
    pub fn disable_dma(&mut self, request: DmaRequest) {
        match request {
            DmaRequest::Tx => self.spi.modify(|r: Ctrl2| r.with_tx_dma(false)),
            DmaRequest::Rx => self.spi.modify(|r: Ctrl2| r.with_rx_dma(false)),
        }
    }

    /// Put a word in the data register.
    ///
    /// Only the low 8 bits are sent with 8-bit frames. Check
    /// [super::StatusFlag::TxEmpty] first, this doesn't.
    #[inline(always)]
    pub fn transmit(&mut self, value: u16) {
        self.spi.write(Data::new().with_data(value));
    }

    /// Take the word out of the data register.
    ///
    /// Check [super::StatusFlag::RxNotEmpty] first, this doesn't.
    #[inline(always)]
    pub fn receive(&mut self) -> u16 {
        self.spi.read::<Data>().data()
    }

    /// Set the internal slave select.
    ///
    /// Only has an effect with [super::SlaveSelect::Software].
    #[inline(always)]
    pub fn set_software_nss(&mut self) {
        self.spi.modify(|r: Ctrl1| r.with_internal_ss(true));
    }

    /// Clear the internal slave select.
    #[inline(always)]
    pub fn reset_software_nss(&mut self) {
        self.spi.modify(|r: Ctrl1| r.with_internal_ss(false));
    }

    /// Drive the slave select output (master mode only).
    #[inline(always)]
    pub fn enable_ss_output(&mut self) {
        self.spi.modify(|r: Ctrl2| r.with_ss_output(true));
    }

    /// Stop driving the slave select output.
    #[inline(always)]
    pub fn disable_ss_output(&mut self) {
        self.spi.modify(|r: Ctrl2| r.with_ss_output(false));
    }

    /// Change the frame length.
    ///
    /// The length bit is cleared with one write, and the new length
    /// OR-ed in with a second. Keep that order.
    #[inline(always)]
    pub fn set_frame_length(&mut self, length: FrameLength) {
        self.spi.modify(|r: Ctrl1| r.with_frame_16bit(false));
        self.spi.modify_raw(Address::Ctrl1, |v| v | length.bits());
    }

    /// Set the line direction in bidirectional mode.
    ///
    /// Transmit ORs its bit in, receive ANDs CTRL1 with its mask. The
    /// two are not a set / clear pair of the same bit.
    #[inline(always)]
    pub fn set_bidi_direction(&mut self, direction: BidiDirection) {
        match direction {
            BidiDirection::Tx => self
                .spi
                .modify_raw(Address::Ctrl1, |v| v | BidiDirection::Tx.bits()),
            BidiDirection::Rx => self
                .spi
                .modify_raw(Address::Ctrl1, |v| v & BidiDirection::Rx.bits()),
        }
    }

    /// Enable hardware CRC calculation.
    #[inline(always)]
    pub fn enable_crc(&mut self) {
        self.spi.modify(|r: Ctrl1| r.with_crc_enabled(true));
    }

    /// Disable hardware CRC calculation.
    #[inline(always)]
    pub fn disable_crc(&mut self) {
        self.spi.modify(|r: Ctrl1| r.with_crc_enabled(false));
    }

    /// Send the CRC after the word currently being transmitted.
    #[inline(always)]
    pub fn request_crc_transmit(&mut self) {
        self.spi.modify(|r: Ctrl1| r.with_crc_next(true));
    }

    /// Read the CRC computed over transmitted words.
    #[inline(always)]
    pub fn read_tx_crc(&self) -> u16 {
        self.spi.read::<TxCrc>().crc()
    }

    /// Read the CRC computed over received words.
    #[inline(always)]
    pub fn read_rx_crc(&self) -> u16 {
        self.spi.read::<RxCrc>().crc()
    }

    /// Read the CRC polynomial.
    #[inline(always)]
    pub fn read_crc_polynomial(&self) -> u16 {
        self.spi.read::<CrcPoly>().polynomial()
    }

    /// Read a single word, if one has arrived.
    ///
    /// Raised error flags are reported, but not cleared.
    #[inline(always)]
    pub fn read_one(&mut self) -> nb::Result<u16, Error> {
        let status = self.status();
        if let Some(e) = status.error() {
            Err(nb::Error::Other(e))
        } else if !status.rx_not_empty() {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(self.receive())
        }
    }

    /// Write a single word, if there is room.
    ///
    /// Raised error flags are reported, but not cleared.
    #[inline(always)]
    pub fn write_one(&mut self, value: u16) -> nb::Result<(), Error> {
        let status = self.status();
        if let Some(e) = status.error() {
            Err(nb::Error::Other(e))
        } else if !status.tx_empty() {
            Err(nb::Error::WouldBlock)
        } else {
            self.transmit(value);
            Ok(())
        }
    }
}
