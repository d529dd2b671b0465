//! Interfaces for SPI.
//!
//! A typical session resets and configures the port, enables it, and
//! then moves words while watching the status flags:
//!
//! ```ignore
//! let p = spi::Peripherals::take().unwrap();
//! let mut port = spi::new(p.SPI1);
//! port.reset(&mut rcm);
//! port.configure(&spi::Config::default().with_role(spi::Role::Master));
//! port.enable();
//!
//! while !port.read_status_flag(spi::StatusFlag::TxEmpty) {}
//! port.transmit(0x55);
//! while !port.read_status_flag(spi::StatusFlag::RxNotEmpty) {}
//! let reply = port.receive();
//! ```

mod config;
pub use config::*;

mod hal1;

mod instance;
pub use instance::*;

mod port;
pub use port::*;

mod status;
pub use status::*;

#[cfg(test)]
mod sim;
