//! Low-level interface to the AWMF
//!
//! This module implements a word-level interface to the AWMF: select a mode,
//! clock a packet in, get the reply back. Users of this library should
//! typically not need to use this. Please consider using the [high-level
//! interface] instead.
//!
//! [high-level interface]: ../hl/index.html

use core::fmt;

use embedded_hal::spi;

use crate::{codec::Packet, maybe_async_attr, mode::Mode, mode::ModeLine, spi_type};

/// Entry point to the AWMF driver's low-level API
///
/// Please consider using [hl::AWMF] instead.
///
/// [hl::AWMF]: ../hl/struct.AWMF.html
#[derive(Copy, Clone)]
pub struct AWMF<SPI, LINE> {
    pub(crate) spi: SPI,
    pub(crate) line: LINE,
}

impl<SPI, LINE> AWMF<SPI, LINE> {
    /// Create a new instance of `AWMF`
    ///
    /// Requires the SPI device the AWMF is connected to, set up for the
    /// configured word width, and the output that drives its mode lines.
    pub fn new(spi: SPI, line: LINE) -> Self {
        AWMF { spi, line }
    }

    /// Allow access to the SPI bus
    pub fn bus(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Allow access to the mode lines
    pub fn mode_line(&mut self) -> &mut LINE {
        &mut self.line
    }

    /// Returns the SPI device and the mode lines
    pub fn release(self) -> (SPI, LINE) {
        (self.spi, self.line)
    }
}

impl<SPI, LINE> AWMF<SPI, LINE>
where
    SPI: spi_type::spi::SpiDevice<u16>,
    LINE: ModeLine,
{
    /// Drives the mode lines without sending anything
    pub fn select(&mut self, mode: Mode) -> Result<(), Error<SPI, LINE>> {
        log::trace!("mode line {}", mode.line_value());

        self.line
            .set_line(mode.line_value())
            .map_err(Error::ModeLine)
    }

    /// Selects `mode`, then exchanges `packet` with the AWMF
    ///
    /// The transfer is full duplex, so the reply has as many words as the
    /// packet. If the mode lines can't be set, nothing is sent.
    #[maybe_async_attr]
    pub async fn exchange(
        &mut self,
        mode: Mode,
        packet: &Packet,
    ) -> Result<Packet, Error<SPI, LINE>> {
        self.select(mode)?;

        let mut buffer = *packet;
        log::debug!("{:?} write {:03x?}", mode, &buffer[..]);

        self.spi
            .transfer_in_place(buffer.as_mut_slice())
            .await
            .map_err(Error::Transfer)?;

        log::debug!("{:?} read {:03x?}", mode, &buffer[..]);

        Ok(buffer)
    }
}

/// A transport error that can occur when communicating with the AWMF
pub enum Error<SPI, LINE>
where
    SPI: spi::ErrorType,
    LINE: ModeLine,
{
    /// SPI error occured during a transfer transaction
    Transfer(SPI::Error),

    /// Error occured while driving the mode lines
    ModeLine(LINE::Error),
}

// We can't derive this implementation, as the compiler will complain that the
// associated error type doesn't implement `Debug`.
impl<SPI, LINE> fmt::Debug for Error<SPI, LINE>
where
    SPI: spi::ErrorType,
    LINE: ModeLine,
    LINE::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Transfer(error) => write!(f, "Transfer({:?})", error),
            Error::ModeLine(error) => write!(f, "ModeLine({:?})", error),
        }
    }
}

#[cfg(feature = "defmt")]
impl<SPI, LINE> defmt::Format for Error<SPI, LINE>
where
    SPI: spi::ErrorType,
    LINE: ModeLine,
{
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Transfer(_) => defmt::write!(f, "Transfer()"),
            Error::ModeLine(_) => defmt::write!(f, "ModeLine()"),
        }
    }
}
