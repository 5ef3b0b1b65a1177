use core::fmt;
use core::fmt::{Display, Formatter};

use embedded_hal::spi;

use crate::{codec::EncodeError, ll, mode::ModeLine};

/// An error that can occur when sending a command
///
/// Encoding errors are always reported before anything was sent. Transport
/// errors are passed through as they are; the driver doesn't retry.
pub enum Error<SPI, LINE>
where
    SPI: spi::ErrorType,
    LINE: ModeLine,
{
    /// Error occured while using the SPI bus or the mode lines
    Spi(ll::Error<SPI, LINE>),

    /// The command could not be built
    Encode(EncodeError),
}

impl<SPI, LINE> From<ll::Error<SPI, LINE>> for Error<SPI, LINE>
where
    SPI: spi::ErrorType,
    LINE: ModeLine,
{
    fn from(error: ll::Error<SPI, LINE>) -> Self {
        Error::Spi(error)
    }
}

impl<SPI, LINE> From<EncodeError> for Error<SPI, LINE>
where
    SPI: spi::ErrorType,
    LINE: ModeLine,
{
    fn from(error: EncodeError) -> Self {
        Error::Encode(error)
    }
}

impl<SPI, LINE> Error<SPI, LINE>
where
    SPI: spi::ErrorType,
    LINE: ModeLine,
{
    /// Returns `true` if the command was rejected before reaching the bus
    pub fn is_encode(&self) -> bool {
        matches!(self, Error::Encode(_))
    }
}

impl<SPI, LINE> Display for Error<SPI, LINE>
where
    SPI: spi::ErrorType,
    LINE: ModeLine,
    LINE::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Spi(error) => write!(f, "transport error: {:?}", error),
            Error::Encode(error) => write!(f, "{}", error),
        }
    }
}

#[cfg(feature = "std")]
impl<SPI, LINE> std::error::Error for Error<SPI, LINE>
where
    SPI: spi::ErrorType,
    LINE: ModeLine,
    LINE::Error: fmt::Debug,
{
}

// We can't derive this implementation, as `Debug` is only implemented
// conditionally for `ll::Error`.
impl<SPI, LINE> fmt::Debug for Error<SPI, LINE>
where
    SPI: spi::ErrorType,
    LINE: ModeLine,
    LINE::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Spi(error) => write!(f, "Spi({:?})", error),
            Error::Encode(error) => write!(f, "Encode({:?})", error),
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
            Error::Spi(error) => defmt::write!(f, "Spi({})", error),
            Error::Encode(error) => defmt::write!(f, "Encode({})", error),
        }
    }
}
