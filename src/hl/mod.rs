//! High-level interface to the AWMF
//!
//! The entry point to this API is the [AWMF] struct. Please refer to the
//! documentation there for more details.
//!
//! This module implements a high-level interface to the AWMF. This is the
//! recommended way to access the AWMF using this crate, unless you need the
//! greater flexibility provided by the [register-level interface].
//!
//! [register-level interface]: ../ll/index.html

use core::fmt;

pub use error::*;
#[allow(unused_imports)]
pub use ready::*;
#[allow(unused_imports)]
pub use uninitialized::*;

use crate::{
    codec, ll, maybe_async_attr,
    mode::{Mode, ModeLine},
    register::{Command, Register},
    spi_type,
    telemetry::Telemetry,
    Config,
};

mod error;
mod ready;
mod uninitialized;

/// Entry point to the AWMF driver API
///
/// The driver owns the SPI device and the mode lines. Every command selects
/// its mode, then clocks its packet in; the next command only starts after
/// the previous one has completed.
#[derive(Copy, Clone)]
pub struct AWMF<SPI, LINE, State> {
    ll: ll::AWMF<SPI, LINE>,
    config: Config,
    state: State,
}

/// Indicates that the `AWMF` instance is not initialized yet
#[derive(Debug)]
pub struct Uninitialized;

/// Indicates that the `AWMF` instance is ready to be used
#[derive(Debug)]
pub struct Ready;

impl<SPI, LINE, State> AWMF<SPI, LINE, State> {
    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Provides direct access to the low-level API
    ///
    /// Be aware that commands sent through the low-level API are not tracked
    /// by the high-level API. Don't use the low-level and high-level APIs in
    /// tandem, unless you know what you're doing.
    pub fn ll(&mut self) -> &mut ll::AWMF<SPI, LINE> {
        &mut self.ll
    }

    /// Returns the SPI device and the mode lines
    pub fn release(self) -> (SPI, LINE) {
        self.ll.release()
    }
}

impl<SPI, LINE, State> AWMF<SPI, LINE, State>
where
    SPI: spi_type::spi::SpiDevice<u16>,
    LINE: ModeLine,
{
    /// Returns the mode a command has to be sent in
    fn mode_for(&self, command: &Command) -> Mode {
        match command.register() {
            Register::Init(_) => Mode::Init,
            _ => self.config.variant.mode(),
        }
    }

    /// Frames and sends one command, returning the telemetry that came back
    #[maybe_async_attr]
    async fn transmit(&mut self, command: &Command) -> Result<Telemetry, Error<SPI, LINE>> {
        let packet = command.to_packet(&self.config)?;
        let mode = self.mode_for(command);

        log::debug!(
            "{:?} <- {:#017x} ({:?})",
            command.register(),
            command.value().value(),
            mode
        );

        let reply = self.ll.exchange(mode, &packet).await?;
        if !Telemetry::is_complete(&reply, self.config.word_width) {
            log::warn!("short telemetry reply: {} words", reply.len());
        }

        Ok(Telemetry::decode(&reply, self.config.word_width))
    }

    /// Sends one command and returns the raw reply as one integer
    #[maybe_async_attr]
    async fn transmit_raw(&mut self, command: &Command) -> Result<u128, Error<SPI, LINE>> {
        let packet = command.to_packet(&self.config)?;
        let mode = self.mode_for(command);

        let reply = self.ll.exchange(mode, &packet).await?;

        Ok(codec::unpack(&reply, self.config.word_width)?)
    }
}

// Can't be derived without putting requirements on `SPI` and `LINE`.
impl<SPI, LINE, State> fmt::Debug for AWMF<SPI, LINE, State>
where
    State: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AWMF {{ config: {:?}, state: ", self.config)?;
        self.state.fmt(f)?;
        write!(f, ", .. }}")?;

        Ok(())
    }
}
