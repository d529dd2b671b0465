//! Interfaces to the clock and reset controller.
//!
//! Clock gating and peripheral reset live in the reset and clock
//! management unit, which is shared by every peripheral on the chip. This
//! crate doesn't own it. Instead, a board hands the driver something
//! implementing [ClockReset], and the driver asks it to toggle the one
//! line belonging to its instance.

/// The peripheral bus a device hangs off of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bus {
    Apb1,
    Apb2,
}

/// A single clock enable / reset line.
///
/// The same bit position is used in the bus's clock enable register and
/// its reset register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line {
    pub bus: Bus,
    pub bit: u8,
}

impl Line {
    /// Create a line on the given bus.
    pub const fn new(bus: Bus, bit: u8) -> Self {
        Self { bus, bit }
    }

    /// This line's bit in its bus registers.
    #[inline(always)]
    pub const fn mask(&self) -> u32 {
        1 << self.bit
    }
}

/// Control over peripheral clock gates and resets.
pub trait ClockReset {
    /// Hold (or release) a device in reset.
    fn set_reset(&mut self, line: Line, asserted: bool);

    /// Turn a device's clock on or off.
    ///
    /// Writes to a device with its clock off are silently dropped.
    fn set_clock_enabled(&mut self, line: Line, enabled: bool);

    /// Reset a device by asserting then releasing its reset line.
    #[inline(always)]
    fn pulse_reset(&mut self, line: Line) {
        self.set_reset(line, true);
        self.set_reset(line, false);
    }
}

impl<T> ClockReset for &mut T
where
    T: ClockReset + ?Sized,
{
    #[inline(always)]
    fn set_reset(&mut self, line: Line, asserted: bool) {
        (**self).set_reset(line, asserted)
    }

    #[inline(always)]
    fn set_clock_enabled(&mut self, line: Line, enabled: bool) {
        (**self).set_clock_enabled(line, enabled)
    }
}
