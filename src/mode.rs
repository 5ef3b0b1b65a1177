//! Mode selection lines
//!
//! The AWMF latches an SPI command into the INIT, RX or TX register bank
//! depending on the state of its RX_EN/TX_EN inputs. The line value has to be
//! settled before the command is clocked in, otherwise the command lands in
//! the wrong bank.

use embedded_hal::digital::OutputPin;

#[cfg(feature = "defmt")]
use defmt::Format;

/// Register bank selected while a command is sent
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// INIT table writes, both enable lines low
    Init,
    /// Receive beamformer (AWMF-0132), RX_EN high
    Rx,
    /// Transmit beamformer (AWMF-0133), TX_EN high
    Tx,
}

impl Mode {
    /// Returns the value written to the mode lines
    pub fn line_value(self) -> u8 {
        match self {
            Mode::Init => 0,
            Mode::Rx => 1,
            Mode::Tx => 2,
        }
    }
}

/// The digital output that selects the mode
///
/// Implement this for whatever drives RX_EN/TX_EN on your board, e.g. a DIO
/// port of a USB-SPI bridge. [`ModePins`] covers the common case of two GPIO
/// pins.
pub trait ModeLine {
    /// Error type of the underlying output
    type Error;

    /// Drives the mode lines to `value`
    ///
    /// When this returns `Ok`, the lines must have settled.
    fn set_line(&mut self, value: u8) -> Result<(), Self::Error>;
}

impl<T: ModeLine + ?Sized> ModeLine for &mut T {
    type Error = T::Error;

    fn set_line(&mut self, value: u8) -> Result<(), Self::Error> {
        (**self).set_line(value)
    }
}

/// RX_EN and TX_EN on two output pins
///
/// Bit 0 of the line value drives RX_EN, bit 1 drives TX_EN.
#[derive(Debug)]
pub struct ModePins<RX, TX> {
    rx_en: RX,
    tx_en: TX,
}

impl<RX, TX> ModePins<RX, TX> {
    /// Create a new instance of `ModePins`
    pub fn new(rx_en: RX, tx_en: TX) -> Self {
        ModePins { rx_en, tx_en }
    }

    /// Returns the pins
    pub fn release(self) -> (RX, TX) {
        (self.rx_en, self.tx_en)
    }
}

impl<RX, TX, E> ModeLine for ModePins<RX, TX>
where
    RX: OutputPin<Error = E>,
    TX: OutputPin<Error = E>,
{
    type Error = E;

    fn set_line(&mut self, value: u8) -> Result<(), E> {
        if value & 0b01 != 0 {
            self.rx_en.set_high()?;
        } else {
            self.rx_en.set_low()?;
        }

        if value & 0b10 != 0 {
            self.tx_en.set_high()?;
        } else {
            self.tx_en.set_low()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use embedded_hal_mock::eh1::pin::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    #[test]
    fn line_values() {
        assert_eq!(Mode::Init.line_value(), 0);
        assert_eq!(Mode::Rx.line_value(), 1);
        assert_eq!(Mode::Tx.line_value(), 2);
    }

    #[test]
    fn pins_follow_the_line_value() {
        let rx_en = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
        ]);
        let tx_en = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);

        let mut pins = ModePins::new(rx_en, tx_en);
        pins.set_line(Mode::Rx.line_value()).unwrap();
        pins.set_line(Mode::Tx.line_value()).unwrap();
        pins.set_line(Mode::Init.line_value()).unwrap();

        let (mut rx_en, mut tx_en) = pins.release();
        rx_en.done();
        tx_en.done();
    }
}
