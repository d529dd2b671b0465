#![cfg_attr(not(test), no_std)]

//! Register-level driver for the SPI controllers on the APM32S10x.
//!
//! This exposes the raw primitives of the peripheral and nothing more:
//! configuring it, moving single words through the data register,
//! reading status flags, and masking interrupts. Waiting for flags,
//! buffering and error recovery are left to the caller.

pub mod power;
pub mod registers;
pub mod spi;
