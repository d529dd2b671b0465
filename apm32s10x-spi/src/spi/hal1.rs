use embedded_hal_1::spi as hal1;
use embedded_hal_nb::spi as hal1nb;

use super::{Error, Instance, Port};

impl hal1::Error for Error {
    #[inline(always)]
    fn kind(&self) -> hal1::ErrorKind {
        match self {
            Self::Overrun => hal1::ErrorKind::Overrun,
            Self::ModeFault => hal1::ErrorKind::ModeFault,
            Self::Crc => hal1::ErrorKind::Other,
            Self::Underrun => hal1::ErrorKind::Other,
        }
    }
}

impl<Spi> hal1::ErrorType for Port<Spi>
where
    Spi: Instance,
{
    type Error = Error;
}

// 8-bit words only use the low half of the data register
impl<Spi> hal1nb::FullDuplex<u8> for Port<Spi>
where
    Spi: Instance,
{
    #[inline(always)]
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        Port::read_one(self).map(|w| w as u8)
    }

    #[inline(always)]
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        Port::write_one(self, word as u16)
    }
}

impl<Spi> hal1nb::FullDuplex<u16> for Port<Spi>
where
    Spi: Instance,
{
    #[inline(always)]
    fn read(&mut self) -> nb::Result<u16, Self::Error> {
        Port::read_one(self)
    }

    #[inline(always)]
    fn write(&mut self, word: u16) -> nb::Result<(), Self::Error> {
        Port::write_one(self, word)
    }
}
