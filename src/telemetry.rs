//! Telemetry replies
//!
//! Every SPI exchange clocks a telemetry frame out of the AWMF. The reply
//! words are concatenated, most-significant word first, and the fields are
//! read from the low end of the result:
//!
//! ```text
//!  45    41 40    36 35    31 30    26 25    21 20    16 15    11 10     6 5       0
//! | P 4A  | P 4B   | P 3A   | P 3B   | P 2A   | P 2B   | P 1A   | P 1B   | temp    |
//! ```
//!
//! Values are raw sensor codes. Bits above 45 are not decoded.

use fixed::types::I16F16;

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::codec;
use crate::register::Channel;

/// Number of bits covered by the telemetry fields
pub const FRAME_BITS: u32 = 46;

/// A field of the telemetry frame
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum Field {
    /// IC temperature sensor, 6 bits
    Temperature,
    /// Detected power of a channel, 5 bits
    Power(Channel),
}

/// `(field, shift, width)` for every field, low-order first
pub const FIELD_LAYOUT: [(Field, u32, u32); 9] = [
    (Field::Temperature, 0, 6),
    (Field::Power(Channel::Element1B), 6, 5),
    (Field::Power(Channel::Element1A), 11, 5),
    (Field::Power(Channel::Element2B), 16, 5),
    (Field::Power(Channel::Element2A), 21, 5),
    (Field::Power(Channel::Element3B), 26, 5),
    (Field::Power(Channel::Element3A), 31, 5),
    (Field::Power(Channel::Element4B), 36, 5),
    (Field::Power(Channel::Element4A), 41, 5),
];

/// A decoded telemetry frame
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Telemetry {
    /// Raw temperature sensor code
    pub temperature: u8,
    /// Raw power detector codes, indexed by [`Channel::index`]
    pub power: [u8; 8],
}

impl Telemetry {
    /// Decodes a reply of `output_width`-bit words
    ///
    /// Never fails. If the reply holds fewer than [`FRAME_BITS`] bits, the
    /// fields that weren't covered read as zero; use [`Telemetry::is_complete`]
    /// to check for that.
    pub fn decode(words: &[u16], output_width: u32) -> Self {
        let mut telemetry = Telemetry::default();
        if output_width == 0 || output_width > codec::MAX_WORD_WIDTH {
            return telemetry;
        }

        // Only the trailing words carry the fields.
        let max_words = (u128::BITS / output_width) as usize;
        let words = &words[words.len().saturating_sub(max_words)..];

        let raw = match codec::unpack(words, output_width) {
            Ok(raw) => raw,
            Err(_) => return telemetry,
        };

        for &(field, shift, width) in FIELD_LAYOUT.iter() {
            let value = ((raw >> shift) & ((1 << width) - 1)) as u8;
            match field {
                Field::Temperature => telemetry.temperature = value,
                Field::Power(channel) => telemetry.power[channel.index()] = value,
            }
        }

        log::trace!("telemetry {:?} from {:?}", telemetry, words);

        telemetry
    }

    /// Returns whether a reply is long enough to cover every field
    pub fn is_complete(words: &[u16], output_width: u32) -> bool {
        words.len() as u32 * output_width >= FRAME_BITS
    }

    /// Returns the raw power code of a channel
    pub fn power(&self, channel: Channel) -> u8 {
        self.power[channel.index()]
    }

    /// Returns an estimate of the IC temperature in °C
    ///
    /// Uses the linear fit `code = 47.37 - 0.31 * T` of the on-chip sensor.
    pub fn temperature_celsius(&self) -> I16F16 {
        let offset = I16F16::from_num(47.37);
        let slope = I16F16::from_num(0.31);

        (offset - I16F16::from_num(self.temperature)) / slope
    }
}
