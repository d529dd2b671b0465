use fugit::HertzU32 as Hertz;

use crate::registers::Ctrl1;

pub use crate::registers::BaudRateDiv;

/// Bits of CTRL1 that applying a [Config] leaves alone.
///
/// These are peripheral enable, CRC next and CRC enable.
pub const PRESERVE_MASK: u16 = 0x3040;

/// Transfer direction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Two lines, full duplex.
    FullDuplex,
    /// Two lines, receive only.
    RxOnly,
    /// One line, receiving.
    HalfDuplexRx,
    /// One line, transmitting.
    HalfDuplexTx,
}

impl Direction {
    /// This direction's bits in CTRL1.
    #[inline(always)]
    pub const fn bits(self) -> u16 {
        match self {
            Self::FullDuplex => 0x0000,
            Self::RxOnly => 0x0400,
            Self::HalfDuplexRx => 0x8000,
            Self::HalfDuplexTx => 0xc000,
        }
    }

    /// Recover the direction from CTRL1.
    ///
    /// Bidirectional mode wins over receive only, when both are set.
    #[inline(always)]
    pub fn from_ctrl1(r: Ctrl1) -> Self {
        match (r.bidi_mode(), r.bidi_output(), r.rx_only()) {
            (true, true, _) => Self::HalfDuplexTx,
            (true, false, _) => Self::HalfDuplexRx,
            (false, _, true) => Self::RxOnly,
            (false, _, false) => Self::FullDuplex,
        }
    }
}

/// Which side of the bus drives the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    Master,
    Slave,
}

impl Role {
    /// This role's bits in CTRL1.
    ///
    /// Master mode also raises the internal slave select, so a
    /// software-managed NSS doesn't immediately cause a mode fault.
    #[inline(always)]
    pub const fn bits(self) -> u16 {
        match self {
            Self::Master => 0x0104,
            Self::Slave => 0x0000,
        }
    }

    #[inline(always)]
    pub fn from_ctrl1(r: Ctrl1) -> Self {
        if r.master() {
            Self::Master
        } else {
            Self::Slave
        }
    }
}

/// Data frame length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameLength {
    Bits8,
    Bits16,
}

impl FrameLength {
    /// This length's bits in CTRL1.
    #[inline(always)]
    pub const fn bits(self) -> u16 {
        match self {
            Self::Bits8 => 0x0000,
            Self::Bits16 => 0x0800,
        }
    }

    #[inline(always)]
    pub fn from_ctrl1(r: Ctrl1) -> Self {
        if r.frame_16bit() {
            Self::Bits16
        } else {
            Self::Bits8
        }
    }

    /// Number of clock cycles in one frame.
    #[inline(always)]
    pub const fn cycles(self) -> u32 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
        }
    }

    /// Mask covering the valid bits of a data word.
    #[inline(always)]
    pub const fn word_mask(self) -> u16 {
        match self {
            Self::Bits8 => 0x00ff,
            Self::Bits16 => 0xffff,
        }
    }
}

/// Choices for clock polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    IdleLow,
    IdleHigh,
}

impl Polarity {
    #[inline(always)]
    pub const fn bits(self) -> u16 {
        match self {
            Self::IdleLow => 0x0000,
            Self::IdleHigh => 0x0002,
        }
    }

    #[inline(always)]
    pub fn from_ctrl1(r: Ctrl1) -> Self {
        if r.cpol() {
            Self::IdleHigh
        } else {
            Self::IdleLow
        }
    }
}

/// Choices for clock phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Sample on the first clock edge.
    FirstEdge,
    /// Sample on the second clock edge.
    SecondEdge,
}

impl Phase {
    #[inline(always)]
    pub const fn bits(self) -> u16 {
        match self {
            Self::FirstEdge => 0x0000,
            Self::SecondEdge => 0x0001,
        }
    }

    #[inline(always)]
    pub fn from_ctrl1(r: Ctrl1) -> Self {
        if r.cpha() {
            Self::SecondEdge
        } else {
            Self::FirstEdge
        }
    }
}

/// An SPI mode describing clock polarity and phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mode {
    pub polarity: Polarity,
    pub phase: Phase,
}

impl Mode {
    /// SPI mode 0: CPOL = 0, CPHA = 0.
    pub const MODE_0: Self = Self {
        polarity: Polarity::IdleLow,
        phase: Phase::FirstEdge,
    };

    /// SPI mode 1: CPOL = 0, CPHA = 1.
    pub const MODE_1: Self = Self {
        polarity: Polarity::IdleLow,
        phase: Phase::SecondEdge,
    };

    /// SPI mode 2: CPOL = 1, CPHA = 0.
    pub const MODE_2: Self = Self {
        polarity: Polarity::IdleHigh,
        phase: Phase::FirstEdge,
    };

    /// SPI mode 3: CPOL = 1, CPHA = 1.
    pub const MODE_3: Self = Self {
        polarity: Polarity::IdleHigh,
        phase: Phase::SecondEdge,
    };
}

/// Slave select (NSS) management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveSelect {
    /// NSS comes from the pin.
    Hardware,
    /// NSS comes from the internal slave select bit.
    Software,
}

impl SlaveSelect {
    #[inline(always)]
    pub const fn bits(self) -> u16 {
        match self {
            Self::Hardware => 0x0000,
            Self::Software => 0x0200,
        }
    }

    #[inline(always)]
    pub fn from_ctrl1(r: Ctrl1) -> Self {
        if r.software_nss() {
            Self::Software
        } else {
            Self::Hardware
        }
    }
}

/// Choices for bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

impl BitOrder {
    #[inline(always)]
    pub const fn bits(self) -> u16 {
        match self {
            Self::MsbFirst => 0x0000,
            Self::LsbFirst => 0x0080,
        }
    }

    #[inline(always)]
    pub fn from_ctrl1(r: Ctrl1) -> Self {
        if r.lsb_first() {
            Self::LsbFirst
        } else {
            Self::MsbFirst
        }
    }
}

impl BaudRateDiv {
    /// Every divider, from fastest to slowest.
    pub const ALL: [Self; 8] = [
        Self::Div2,
        Self::Div4,
        Self::Div8,
        Self::Div16,
        Self::Div32,
        Self::Div64,
        Self::Div128,
        Self::Div256,
    ];

    /// This divider's bits in CTRL1.
    #[inline(always)]
    pub const fn bits(self) -> u16 {
        (self.into_bits() as u16) << 3
    }

    /// The number the peripheral clock is divided by.
    #[inline(always)]
    pub const fn divisor(self) -> u32 {
        2 << self.into_bits()
    }

    /// The clock rate produced from the given peripheral clock.
    #[inline(always)]
    pub fn output(self, pclk: Hertz) -> Hertz {
        Hertz::from_raw(pclk.to_Hz() / self.divisor())
    }

    /// Find the fastest divider that doesn't exceed `target`.
    ///
    /// Returns [None] if even the slowest divider is too fast.
    #[inline]
    pub fn from_frequency(pclk: Hertz, target: Hertz) -> Option<Self> {
        Self::ALL.into_iter().find(|div| {
            pclk.to_Hz() as u64 <= target.to_Hz() as u64 * div.divisor() as u64
        })
    }
}

/// Bidirectional line direction, for the one-line modes.
///
/// The hardware has a single bit here (set to transmit), but the two
/// directions are not applied the same way: [BidiDirection::Tx] is
/// OR-ed into CTRL1, while [BidiDirection::Rx] is a mask AND-ed with
/// it. See [crate::spi::Port::set_bidi_direction()].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BidiDirection {
    Rx,
    Tx,
}

impl BidiDirection {
    /// The value combined with CTRL1 for this direction.
    #[inline(always)]
    pub const fn bits(self) -> u16 {
        match self {
            Self::Rx => 0xbfff,
            Self::Tx => 0x4000,
        }
    }
}

/// A complete SPI configuration.
///
/// Everything here except the CRC polynomial lives in CTRL1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub direction: Direction,
    pub role: Role,
    pub frame_length: FrameLength,
    pub polarity: Polarity,
    pub phase: Phase,
    pub nss: SlaveSelect,
    pub baud: BaudRateDiv,
    pub bit_order: BitOrder,
    pub crc_polynomial: u16,
}

impl Default for Config {
    #[inline(always)]
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Config {
    /// Full duplex slave, 8-bit frames in mode 0, hardware NSS,
    /// divide by 2, MSB first, CRC polynomial 7.
    pub const DEFAULT: Self = Self {
        direction: Direction::FullDuplex,
        role: Role::Slave,
        frame_length: FrameLength::Bits8,
        polarity: Polarity::IdleLow,
        phase: Phase::FirstEdge,
        nss: SlaveSelect::Hardware,
        baud: BaudRateDiv::Div2,
        bit_order: BitOrder::MsbFirst,
        crc_polynomial: 7,
    };

    /// The CTRL1 bits for this configuration.
    #[inline(always)]
    pub const fn encode(&self) -> u16 {
        self.direction.bits()
            | self.role.bits()
            | self.frame_length.bits()
            | self.polarity.bits()
            | self.phase.bits()
            | self.nss.bits()
            | self.baud.bits()
            | self.bit_order.bits()
    }

    /// Replace the configuration bits of an existing CTRL1 value.
    ///
    /// Bits in [PRESERVE_MASK] are kept, everything else comes from
    /// [Config::encode()]. The result doesn't depend on any other bit
    /// of `ctrl1`.
    #[inline(always)]
    pub const fn apply(&self, ctrl1: u16) -> u16 {
        (ctrl1 & PRESERVE_MASK) | self.encode()
    }

    /// Recover a configuration from CTRL1 and CRCPOLY.
    pub fn decode(ctrl1: u16, crc_polynomial: u16) -> Self {
        let r = Ctrl1::from_bits(ctrl1);
        Self {
            direction: Direction::from_ctrl1(r),
            role: Role::from_ctrl1(r),
            frame_length: FrameLength::from_ctrl1(r),
            polarity: Polarity::from_ctrl1(r),
            phase: Phase::from_ctrl1(r),
            nss: SlaveSelect::from_ctrl1(r),
            baud: r.baud(),
            bit_order: BitOrder::from_ctrl1(r),
            crc_polynomial,
        }
    }

    /// Set the direction mode.
    #[inline(always)]
    pub const fn with_direction(self, direction: Direction) -> Self {
        Self { direction, ..self }
    }

    /// Set master or slave.
    #[inline(always)]
    pub const fn with_role(self, role: Role) -> Self {
        Self { role, ..self }
    }

    /// Set the frame length.
    #[inline(always)]
    pub const fn with_frame_length(self, frame_length: FrameLength) -> Self {
        Self {
            frame_length,
            ..self
        }
    }

    /// Set the clock polarity.
    #[inline(always)]
    pub const fn with_polarity(self, polarity: Polarity) -> Self {
        Self { polarity, ..self }
    }

    /// Set the clock phase.
    #[inline(always)]
    pub const fn with_phase(self, phase: Phase) -> Self {
        Self { phase, ..self }
    }

    /// Set the clock polarity and phase together.
    #[inline(always)]
    pub const fn with_mode(self, mode: Mode) -> Self {
        Self {
            polarity: mode.polarity,
            phase: mode.phase,
            ..self
        }
    }

    /// Get the clock polarity and phase together.
    #[inline(always)]
    pub const fn mode(&self) -> Mode {
        Mode {
            polarity: self.polarity,
            phase: self.phase,
        }
    }

    /// Set slave select management.
    #[inline(always)]
    pub const fn with_nss(self, nss: SlaveSelect) -> Self {
        Self { nss, ..self }
    }

    /// Set the clock divider.
    #[inline(always)]
    pub const fn with_baud(self, baud: BaudRateDiv) -> Self {
        Self { baud, ..self }
    }

    /// Set the bit order.
    #[inline(always)]
    pub const fn with_bit_order(self, bit_order: BitOrder) -> Self {
        Self { bit_order, ..self }
    }

    /// Set the CRC polynomial.
    #[inline(always)]
    pub const fn with_crc_polynomial(self, crc_polynomial: u16) -> Self {
        Self {
            crc_polynomial,
            ..self
        }
    }
}
