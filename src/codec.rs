//! Bit re-chunking between logical register values and transport words
//!
//! The AWMF SPI interface does not work on bytes. Every logical value is
//! split into a stream of bits, least-significant bit first, and that stream
//! is cut into transport words of a fixed width (10 bits on the AWMF-0132 and
//! AWMF-0133). Source values of any width share the same framing, so a 6-bit
//! phase and a 60-bit INIT entry go through the exact same loop.
//!
//! [`unpack`] is the inverse used for replies: the received words are
//! concatenated, most-significant word first, into one integer.

use core::{fmt, ops::Deref};

#[cfg(feature = "defmt")]
use defmt::Format;

/// The widest transport word supported by [`pack`]
///
/// Transport words are carried in `u16`s.
pub const MAX_WORD_WIDTH: u32 = 16;

/// An unsigned value together with the number of meaningful low-order bits
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogicalValue {
    value: u64,
    width: u32,
}

impl LogicalValue {
    /// Creates a new `LogicalValue`
    ///
    /// `width` must be in `1..=64` and `value` must fit into `width` bits.
    ///
    /// # Example
    ///
    /// ``` rust
    /// use awmf_ng::codec::LogicalValue;
    ///
    /// assert!(LogicalValue::new(63, 6).is_ok());
    /// assert!(LogicalValue::new(64, 6).is_err());
    /// assert!(LogicalValue::new(0, 0).is_err());
    /// ```
    pub fn new(value: u64, width: u32) -> Result<Self, EncodeError> {
        let max = max_value(width)?;
        if value > max {
            return Err(EncodeError::OutOfRange { value, max });
        }

        Ok(LogicalValue { value, width })
    }

    /// Creates a new `LogicalValue`, discarding all bits above `width`
    pub fn truncated(value: u64, width: u32) -> Result<Self, EncodeError> {
        let max = max_value(width)?;

        Ok(LogicalValue {
            value: value & max,
            width,
        })
    }

    /// Returns the value
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Returns the number of meaningful bits
    pub fn width(&self) -> u32 {
        self.width
    }
}

/// Returns the largest value that fits into `width` bits
pub(crate) fn max_value(width: u32) -> Result<u64, EncodeError> {
    match width {
        0 => Err(EncodeError::InvalidWidth(width)),
        64 => Ok(u64::MAX),
        1..=63 => Ok((1 << width) - 1),
        _ => Err(EncodeError::InvalidWidth(width)),
    }
}

/// A sequence of transport words, ready to be clocked out on the bus
///
/// The capacity is fixed so that packets can live on the stack of a `no_std`
/// target. 16 words of 10 bits hold more than two full AWMF registers.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Packet {
    words: [u16; Packet::CAPACITY],
    len: usize,
}

impl Packet {
    /// Maximum number of words in a packet
    pub const CAPACITY: usize = 16;

    /// Creates an empty packet
    pub const fn new() -> Self {
        Packet {
            words: [0; Packet::CAPACITY],
            len: 0,
        }
    }

    /// Creates a packet from a slice of words
    pub fn from_words(words: &[u16]) -> Result<Self, EncodeError> {
        let mut packet = Packet::new();
        for &word in words {
            packet.push(word)?;
        }

        Ok(packet)
    }

    /// Appends a word to the end of the packet
    pub fn push(&mut self, word: u16) -> Result<(), EncodeError> {
        if self.len >= Packet::CAPACITY {
            return Err(EncodeError::PacketOverflow);
        }
        self.words[self.len] = word;
        self.len += 1;

        Ok(())
    }

    /// Reverses the word order in place
    pub fn reverse(&mut self) {
        self.words[..self.len].reverse();
    }

    /// Returns the words as a mutable slice, for in-place transfers
    pub fn as_mut_slice(&mut self) -> &mut [u16] {
        &mut self.words[..self.len]
    }
}

impl Default for Packet {
    fn default() -> Self {
        Packet::new()
    }
}

impl Deref for Packet {
    type Target = [u16];

    fn deref(&self) -> &[u16] {
        &self.words[..self.len]
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Packet {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", &self.words[..self.len]);
    }
}

/// Packs logical values into transport words of `output_width` bits
///
/// The bits of every value are taken least-significant first, up to its
/// declared width, and appended to the current word. A word is emitted every
/// `output_width` bits. If the total number of bits is not a multiple of
/// `output_width`, the last word is emitted as it is, holding fewer
/// meaningful bits in its low-order positions.
///
/// With `big_endian` set, the finished word sequence is reversed, so the
/// word carrying the most-significant bits goes first on the bus.
///
/// # Example
///
/// ``` rust
/// use awmf_ng::codec::{pack, LogicalValue};
///
/// let value = LogicalValue::new(0b11_0000000001, 12).unwrap();
///
/// let packet = pack(&[value], 10, false).unwrap();
/// assert_eq!(&packet[..], &[0b0000000001, 0b11]);
///
/// let packet = pack(&[value], 10, true).unwrap();
/// assert_eq!(&packet[..], &[0b11, 0b0000000001]);
/// ```
pub fn pack(
    values: &[LogicalValue],
    output_width: u32,
    big_endian: bool,
) -> Result<Packet, EncodeError> {
    if output_width == 0 || output_width > MAX_WORD_WIDTH {
        return Err(EncodeError::InvalidWidth(output_width));
    }

    let mut packet = Packet::new();
    let mut word: u16 = 0;
    let mut bits_in_word = 0;

    for value in values {
        for i in 0..value.width {
            let bit = ((value.value >> i) & 0x1) as u16;
            word |= bit << bits_in_word;
            bits_in_word += 1;

            if bits_in_word >= output_width {
                packet.push(word)?;
                word = 0;
                bits_in_word = 0;
            }
        }
    }

    if bits_in_word != 0 {
        packet.push(word)?;
    }

    if big_endian {
        packet.reverse();
    }

    Ok(packet)
}

/// Concatenates transport words into one integer
///
/// The first word is the most significant one. Every word contributes
/// exactly `output_width` bits; bits above that are ignored.
///
/// Fails if the words don't fit into 128 bits.
pub fn unpack(words: &[u16], output_width: u32) -> Result<u128, EncodeError> {
    if output_width == 0 || output_width > MAX_WORD_WIDTH {
        return Err(EncodeError::InvalidWidth(output_width));
    }
    if words.len() * output_width as usize > u128::BITS as usize {
        return Err(EncodeError::PacketOverflow);
    }

    let mask = (1u128 << output_width) - 1;

    Ok(words.iter().fold(0u128, |acc, &word| {
        (acc << output_width) | (word as u128 & mask)
    }))
}

/// An error that can occur while building a command
///
/// None of these ever reach the bus: every command is validated completely
/// before the first transport call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum EncodeError {
    /// A numeric parameter was outside of its valid range
    OutOfRange {
        /// The rejected value
        value: u64,
        /// The largest accepted value
        max: u64,
    },

    /// A raw code did not name any valid setting
    InvalidValue(u8),

    /// A bit width of zero, or wider than the value type, was requested
    InvalidWidth(u32),

    /// The packed words didn't fit into a [`Packet`]
    PacketOverflow,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::OutOfRange { value, max } => {
                write!(f, "value {} out of range (max {})", value, max)
            }
            EncodeError::InvalidValue(code) => write!(f, "invalid value {:#04b}", code),
            EncodeError::InvalidWidth(width) => write!(f, "invalid bit width {}", width),
            EncodeError::PacketOverflow => write!(f, "packet overflow"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &[(u64, u32)]) -> Vec<LogicalValue> {
        raw.iter()
            .map(|&(value, width)| LogicalValue::new(value, width).unwrap())
            .collect()
    }

    /// Places each value at its cumulative offset, first value lowest
    fn concatenated(input: &[LogicalValue]) -> u128 {
        let mut offset = 0;
        let mut result = 0u128;
        for value in input {
            result |= (value.value() as u128) << offset;
            offset += value.width();
        }
        result
    }

    #[test]
    fn zero_width_is_rejected() {
        assert_eq!(LogicalValue::new(0, 0), Err(EncodeError::InvalidWidth(0)));
        assert_eq!(LogicalValue::truncated(1, 65), Err(EncodeError::InvalidWidth(65)));
        assert_eq!(pack(&[], 0, false), Err(EncodeError::InvalidWidth(0)));
    }

    #[test]
    fn oversized_values_are_rejected_or_masked() {
        assert_eq!(
            LogicalValue::new(0x40, 6),
            Err(EncodeError::OutOfRange {
                value: 0x40,
                max: 0x3f
            })
        );

        let value = LogicalValue::truncated(0x7f, 6).unwrap();
        assert_eq!(value.value(), 0x3f);

        let value = LogicalValue::new(u64::MAX, 64).unwrap();
        assert_eq!(value.width(), 64);
    }

    #[test]
    fn packs_lsb_first_across_word_boundaries() {
        // Two 6-bit values make one 10-bit word plus a 2-bit remainder.
        let packet = pack(&values(&[(0b101011, 6), (0b110001, 6)]), 10, false).unwrap();

        assert_eq!(&packet[..], &[0b0001_101011, 0b11]);
    }

    #[test]
    fn partial_final_word_is_not_padded() {
        let packet = pack(&values(&[(0xff, 8)]), 10, false).unwrap();

        assert_eq!(&packet[..], &[0xff]);

        let packet = pack(&values(&[(u64::MAX, 64)]), 10, false).unwrap();

        assert_eq!(packet.len(), 7);
        assert_eq!(&packet[..6], &[0x3ff; 6]);
        assert_eq!(packet[6], 0xf);
    }

    #[test]
    fn big_endian_reverses_words() {
        let inputs = [
            values(&[(0x0001_0000_0000_1234, 60)]),
            values(&[(0b101011, 6), (0xa5, 8), (0x3f, 6)]),
            values(&[(u64::MAX, 64), (0x15, 5)]),
        ];

        for input in inputs.iter() {
            let little = pack(input, 10, false).unwrap();
            let mut big = pack(input, 10, true).unwrap();

            big.reverse();
            assert_eq!(little, big);
        }
    }

    #[test]
    fn unpack_inverts_word_aligned_packing() {
        // Widths summing to a multiple of the word width
        let cases: [&[(u64, u32)]; 4] = [
            &[(0x3ff, 10), (0x155, 10)],
            &[(0x2a, 6), (0x9, 4), (0x3, 2), (0xff, 8)],
            &[(0x0_01_00_00_00_01_02_04_00, 60)],
            &[(0x123, 10), (0x0_3d_00_00_00_00_00_3e, 60)],
        ];

        for case in cases.iter() {
            let input = values(case);
            let packet = pack(&input, 10, true).unwrap();

            assert_eq!(unpack(&packet, 10).unwrap(), concatenated(&input));
        }

        // 0x2a | 0x9 << 6 | 0x3 << 10 | 0xff << 12
        let input = values(&[(0x2a, 6), (0x9, 4), (0x3, 2), (0xff, 8)]);
        let packet = pack(&input, 10, true).unwrap();
        assert_eq!(unpack(&packet, 10).unwrap(), 0xff_e6a);
    }

    #[test]
    fn unpack_inverts_generated_sequences() {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        for _ in 0..200 {
            let total = 10 * (1 + (next() % 12) as u32);
            let mut input = Vec::new();
            let mut remaining = total;
            while remaining > 0 {
                let width = (1 + (next() % 64) as u32).min(remaining);
                input.push(LogicalValue::truncated(next(), width).unwrap());
                remaining -= width;
            }

            let packet = pack(&input, 10, true).unwrap();
            assert_eq!(packet.len() as u32, total / 10);
            assert_eq!(unpack(&packet, 10).unwrap(), concatenated(&input), "{:?}", input);
        }
    }

    #[test]
    fn big_endian_round_trip_of_register_values() {
        let mut value: u64 = 0x0_0f_1e_2d_3c_4b_5a_69;
        for _ in 0..64 {
            let input = LogicalValue::truncated(value, 60).unwrap();
            let packet = pack(&[input], 10, true).unwrap();

            assert_eq!(packet.len(), 6);
            assert_eq!(unpack(&packet, 10).unwrap(), input.value() as u128);

            value = value.rotate_left(7) ^ 0x9e37_79b9;
        }
    }

    #[test]
    fn unpack_ignores_bits_above_word_width() {
        assert_eq!(unpack(&[0xfc00 | 0x1, 0x2], 10).unwrap(), (1 << 10) | 2);
    }

    #[test]
    fn unpack_rejects_oversized_input() {
        assert_eq!(unpack(&[0; 13], 10), Err(EncodeError::PacketOverflow));
        assert_eq!(unpack(&[1; 12], 10).unwrap() & 0x3ff, 1);
    }

    #[test]
    fn packet_capacity_is_enforced() {
        let input = values(&[(u64::MAX, 64), (u64::MAX, 64), (u64::MAX, 64)]);

        assert_eq!(pack(&input, 10, false), Err(EncodeError::PacketOverflow));
        assert_eq!(
            Packet::from_words(&[0; Packet::CAPACITY + 1]),
            Err(EncodeError::PacketOverflow)
        );
    }

    #[test]
    fn packing_is_deterministic() {
        let input = values(&[(0x0_02_00_00_00_00_05_c0, 60)]);

        assert_eq!(pack(&input, 10, true), pack(&input, 10, true));
    }
}
