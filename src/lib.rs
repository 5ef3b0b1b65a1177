//! Driver crate for the AWMF-0132/0133 quad beamformer ICs
//!
//! The recommended way to use this driver is the [high-level interface]. If you
//! require a higher degree of flexibility, you can use the
//! [word-level interface] or build commands yourself with the [`register`]
//! and [`codec`] modules.
//!
//! The AWMF is programmed through 60-bit registers that are shifted in as
//! 10-bit SPI words. Which register bank a command lands in depends on the
//! RX_EN/TX_EN lines, which the driver sets before every command.
//!
//! This driver is built on top of [`embedded-hal`], which means it is portable
//! and can be used on any platform that implements the `embedded-hal` API.
//!
//! [high-level interface]: hl/index.html
//! [word-level interface]: ll/index.html
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal
#![cfg_attr(not(any(test, feature = "std")), no_main)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "async")]
use maybe_async::must_be_async as maybe_async_attr;
#[cfg(not(feature = "async"))]
use maybe_async::must_be_sync as maybe_async_attr;

#[cfg(not(feature = "async"))]
use embedded_hal as spi_type;
#[cfg(feature = "async")]
use embedded_hal_async as spi_type;

pub mod codec;
pub mod configs;
pub mod hl;
pub mod ll;
pub mod mode;
pub mod register;
pub mod telemetry;

pub use crate::{
    codec::{EncodeError, LogicalValue, Packet},
    configs::{ChipVariant, Config},
    hl::{Error, Ready, Uninitialized, AWMF},
    mode::{Mode, ModeLine, ModePins},
    register::{Channel, CommonAttenuation},
    telemetry::Telemetry,
};
