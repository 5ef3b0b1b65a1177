//! Register encoding for the AWMF command set
//!
//! Every command is a single 60-bit logical register value. The register
//! address sits in bits 48..=55 and the payload fields below it:
//!
//! | Register | Address | Fields                                                |
//! |----------|---------|-------------------------------------------------------|
//! | MODE     | 0x00    | RF enable (bit 23), reset (bit 24)                    |
//! | BW0      | 0x01    | attenuation (4 bits/channel, bits 0..=31), common     |
//! |          |         | attenuation (bits 32..=33), channel off mask (34..=41)|
//! | BW1      | 0x02    | phase (6 bits/channel, bits 0..=47)                   |
//! | VERSION  | 0x3D    | version readback query                                |
//!
//! INIT entries are raw register values that already contain their address.
//!
//! Building a command never touches the bus. All parameters are checked here,
//! so an invalid command fails before any transport call is made.

use fixed::types::{I16F16, U16F16};

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::codec::{self, EncodeError, LogicalValue, Packet};
use crate::configs::Config;

/// Width of a logical AWMF register value
pub const REGISTER_WIDTH: u32 = 60;

/// Bit offset of the register address inside a logical value
pub const ADDRESS_SHIFT: u32 = 48;

/// Number of entries in an INIT table
pub const INIT_TABLE_LEN: usize = 19;

/// Largest attenuation step
pub const MAX_ATTENUATION: u8 = 15;

/// Largest phase step
pub const MAX_PHASE: u8 = 63;

const ON_OFF_SHIFT: u32 = 34;
const COMMON_ATTENUATION_SHIFT: u32 = 32;
const RESET_BIT: u32 = 24;
const RF_ENABLE_BIT: u32 = 23;

/// MODE register value that switches the readback to the version register
const VERSION_READBACK_MODE: u64 = 0x0_00_00_00_00_03_c4_00;
/// VERSION register query
const VERSION_QUERY: u64 = 0x0_3d_00_00_00_00_00_3e;

/// The registers that can be addressed
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Register {
    /// Chip mode register (reset, RF enable)
    Mode,
    /// Beam weight register 0 (gain, common gain, channel on/off)
    Bw0,
    /// Beam weight register 1 (phase)
    Bw1,
    /// Entry of the INIT table
    Init(u8),
    /// Version readback register
    Version,
}

impl Register {
    /// Returns the address tag of the register, already shifted into place
    ///
    /// INIT entries carry their address in their payload, so their tag is
    /// zero.
    pub fn tag(&self) -> u64 {
        let address: u64 = match self {
            Register::Mode | Register::Init(_) => 0x00,
            Register::Bw0 => 0x01,
            Register::Bw1 => 0x02,
            Register::Version => 0x3d,
        };

        address << ADDRESS_SHIFT
    }
}

/// One of the eight RF channels of the quad beamformer
///
/// Each of the four elements has an `a` and a `b` channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Channel {
    /// Element 1, channel a
    Element1A = 0b000,
    /// Element 1, channel b
    Element1B = 0b001,
    /// Element 2, channel a
    Element2A = 0b010,
    /// Element 2, channel b
    Element2B = 0b011,
    /// Element 3, channel a
    Element3A = 0b100,
    /// Element 3, channel b
    Element3B = 0b101,
    /// Element 4, channel a
    Element4A = 0b110,
    /// Element 4, channel b
    Element4B = 0b111,
}

/// Per-channel field offsets
struct ChannelLayout {
    attenuation: u32,
    phase: u32,
    on_off: u32,
}

const fn layout(index: u32) -> ChannelLayout {
    ChannelLayout {
        attenuation: index * 4,
        phase: index * 6,
        on_off: ON_OFF_SHIFT + index,
    }
}

const CHANNEL_LAYOUT: [ChannelLayout; 8] = [
    layout(0),
    layout(1),
    layout(2),
    layout(3),
    layout(4),
    layout(5),
    layout(6),
    layout(7),
];

impl Channel {
    /// All channels, in index order
    pub const ALL: [Channel; 8] = [
        Channel::Element1A,
        Channel::Element1B,
        Channel::Element2A,
        Channel::Element2B,
        Channel::Element3A,
        Channel::Element3B,
        Channel::Element4A,
        Channel::Element4B,
    ];

    /// Returns the channel index (0..=7)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Bit offset of the channel's 4-bit attenuation field in BW0
    pub fn attenuation_offset(self) -> u32 {
        CHANNEL_LAYOUT[self.index()].attenuation
    }

    /// Bit offset of the channel's 6-bit phase field in BW1
    pub fn phase_offset(self) -> u32 {
        CHANNEL_LAYOUT[self.index()].phase
    }

    /// Bit offset of the channel's bit in the BW0 off mask
    pub fn on_off_offset(self) -> u32 {
        CHANNEL_LAYOUT[self.index()].on_off
    }
}

impl TryFrom<u8> for Channel {
    type Error = EncodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Channel::ALL
            .get(value as usize)
            .copied()
            .ok_or(EncodeError::InvalidValue(value))
    }
}

/// Attenuation applied to all channels
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CommonAttenuation {
    /// 0 dB
    Zero = 0b00,
    /// 8 dB
    Eight = 0b01,
}

impl CommonAttenuation {
    /// Returns the attenuation in dB
    pub fn db(self) -> U16F16 {
        U16F16::from_num(8 * self as u8)
    }
}

impl TryFrom<u8> for CommonAttenuation {
    type Error = EncodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0b00 => Ok(CommonAttenuation::Zero),
            0b01 => Ok(CommonAttenuation::Eight),
            _ => Err(EncodeError::InvalidValue(value)),
        }
    }
}

/// A validated per-channel attenuation step, 0.5 dB each
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attenuation(u8);

impl Attenuation {
    /// Returns `Ok(...)` if `level` is within `0..=15`
    pub fn new(level: u8) -> Result<Self, EncodeError> {
        if level > MAX_ATTENUATION {
            return Err(EncodeError::OutOfRange {
                value: level.into(),
                max: MAX_ATTENUATION.into(),
            });
        }

        Ok(Attenuation(level))
    }

    /// Returns the raw step
    pub fn level(&self) -> u8 {
        self.0
    }

    /// Returns the attenuation in dB
    pub fn db(&self) -> U16F16 {
        U16F16::from_num(self.0) / 2
    }
}

/// A validated per-channel phase step, 5.625° each
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Phase(u8);

impl Phase {
    /// Returns `Ok(...)` if `level` is within `0..=63`
    pub fn new(level: u8) -> Result<Self, EncodeError> {
        if level > MAX_PHASE {
            return Err(EncodeError::OutOfRange {
                value: level.into(),
                max: MAX_PHASE.into(),
            });
        }

        Ok(Phase(level))
    }

    /// Returns the raw step
    pub fn level(&self) -> u8 {
        self.0
    }

    /// Returns the phase in degrees
    ///
    /// 360° are divided into 64 steps, so every step is exact.
    pub fn degrees(&self) -> U16F16 {
        U16F16::from_num(self.0) * 45 / 8
    }

    /// Returns the nearest phase step for an angle in degrees
    ///
    /// The angle is wrapped into `0..360`.
    pub fn from_degrees(degrees: I16F16) -> Self {
        let wrapped = degrees.rem_euclid(I16F16::from_num(360));
        let step = (wrapped * 8 / 45).round().to_num::<i32>();

        Phase((step & 0x3f) as u8)
    }
}

/// A logical register value, tagged with the register it addresses
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    register: Register,
    value: LogicalValue,
}

impl Command {
    fn new(register: Register, payload: u64) -> Result<Self, EncodeError> {
        Ok(Command {
            register,
            value: LogicalValue::new(register.tag() | payload, REGISTER_WIDTH)?,
        })
    }

    /// Returns the addressed register
    pub fn register(&self) -> Register {
        self.register
    }

    /// Returns the logical register value
    pub fn value(&self) -> LogicalValue {
        self.value
    }

    /// Frames the command into transport words
    pub fn to_packet(&self, config: &Config) -> Result<Packet, EncodeError> {
        codec::pack(&[self.value], config.word_width, config.big_endian)
    }
}

/// Turns channels on or off
///
/// `enables` is indexed by [`Channel::index`]. The hardware mask is active
/// low: a disabled channel sets its bit, so all channels on is `0x00` and all
/// channels off is `0xff`.
pub fn on_off_mask(enables: [bool; 8]) -> Result<Command, EncodeError> {
    let mask = Channel::ALL
        .iter()
        .filter(|channel| !enables[channel.index()])
        .fold(0u64, |mask, channel| mask | 1 << channel.on_off_offset());

    Command::new(Register::Bw0, mask)
}

/// Sets the attenuation of one channel, in 0.5 dB steps (`0..=15`)
pub fn attenuation(channel: Channel, level: u8) -> Result<Command, EncodeError> {
    let level = Attenuation::new(level)?;

    Command::new(
        Register::Bw0,
        u64::from(level.level()) << channel.attenuation_offset(),
    )
}

/// Sets the attenuation shared by all channels
pub fn common_attenuation(level: CommonAttenuation) -> Result<Command, EncodeError> {
    Command::new(Register::Bw0, (level as u64) << COMMON_ATTENUATION_SHIFT)
}

/// Sets the phase of one channel, in 5.625° steps (`0..=63`)
pub fn phase(channel: Channel, level: u8) -> Result<Command, EncodeError> {
    let level = Phase::new(level)?;

    Command::new(
        Register::Bw1,
        u64::from(level.level()) << channel.phase_offset(),
    )
}

/// Asserts or releases the chip reset
///
/// A reset takes two commands: one with `asserted` set, then one without.
/// Sequencing them is up to the caller; see [`AWMF::reset`].
///
/// [`AWMF::reset`]: crate::hl::AWMF::reset
pub fn reset(asserted: bool) -> Result<Command, EncodeError> {
    Command::new(Register::Mode, u64::from(asserted) << RESET_BIT)
}

/// Enables or disables the RF path
pub fn rf_enable(asserted: bool) -> Result<Command, EncodeError> {
    Command::new(Register::Mode, u64::from(asserted) << RF_ENABLE_BIT)
}

/// Wraps one entry of an INIT table
///
/// The payload is sent unmodified; it must fit into the register width.
pub fn init_entry(index: usize, payload: u64) -> Result<Command, EncodeError> {
    if index >= INIT_TABLE_LEN {
        return Err(EncodeError::OutOfRange {
            value: index as u64,
            max: (INIT_TABLE_LEN - 1) as u64,
        });
    }

    Command::new(Register::Init(index as u8), payload)
}

/// Switches the MODE readback to the version register
pub fn version_readback() -> Result<Command, EncodeError> {
    Command::new(Register::Mode, VERSION_READBACK_MODE)
}

/// Queries the version register
pub fn version_query() -> Result<Command, EncodeError> {
    Command::new(Register::Version, VERSION_QUERY & !Register::Version.tag())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BW0: u64 = 0x01 << 48;
    const BW1: u64 = 0x02 << 48;

    #[test]
    fn on_off_mask_is_active_low() {
        let all_on = on_off_mask([true; 8]).unwrap();
        assert_eq!(all_on.register(), Register::Bw0);
        assert_eq!(all_on.value().value(), BW0);

        let all_off = on_off_mask([false; 8]).unwrap();
        assert_eq!(all_off.value().value(), BW0 | 0xff << 34);

        let mut enables = [true; 8];
        enables[Channel::Element2B.index()] = false;
        let command = on_off_mask(enables).unwrap();
        assert_eq!(command.value().value(), BW0 | 1 << (34 + 3));
    }

    #[test]
    fn attenuation_range() {
        for channel in Channel::ALL.iter().copied() {
            assert!(attenuation(channel, 0).is_ok());
            assert!(attenuation(channel, 15).is_ok());
            assert_eq!(
                attenuation(channel, 16),
                Err(EncodeError::OutOfRange { value: 16, max: 15 })
            );
        }
    }

    #[test]
    fn phase_range() {
        for channel in Channel::ALL.iter().copied() {
            assert!(phase(channel, 0).is_ok());
            assert!(phase(channel, 63).is_ok());
            assert_eq!(
                phase(channel, 64),
                Err(EncodeError::OutOfRange { value: 64, max: 63 })
            );
        }
    }

    #[test]
    fn common_attenuation_values() {
        assert_eq!(
            CommonAttenuation::try_from(0b10u8),
            Err(EncodeError::InvalidValue(0b10))
        );

        let command = common_attenuation(CommonAttenuation::try_from(0b01u8).unwrap()).unwrap();
        assert_eq!(command.value().value(), BW0 | 1 << 32);

        let command = common_attenuation(CommonAttenuation::Zero).unwrap();
        assert_eq!(command.value().value(), BW0);
    }

    #[test]
    fn attenuation_offsets() {
        let command = attenuation(Channel::Element1A, 2).unwrap();
        assert_eq!(command.value().value(), BW0 | 2);

        let command = attenuation(Channel::Element4B, 15).unwrap();
        assert_eq!(command.value().value(), BW0 | 0xf << 28);
    }

    #[test]
    fn phase_offsets() {
        let command = phase(Channel::Element1B, 23).unwrap();
        assert_eq!(command.register(), Register::Bw1);
        assert_eq!(command.value().value(), BW1 | 23 << 6);

        let command = phase(Channel::Element4B, 63).unwrap();
        assert_eq!(command.value().value(), BW1 | 63 << 42);
    }

    #[test]
    fn channel_fields_are_disjoint() {
        for a in Channel::ALL.iter().copied() {
            for b in Channel::ALL.iter().copied().filter(|&b| b != a) {
                let att_a = attenuation(a, 0xa).unwrap().value().value();
                let att_b = attenuation(b, 0x5).unwrap().value().value();
                let combined = att_a | att_b;
                assert_eq!((combined >> a.attenuation_offset()) & 0xf, 0xa);
                assert_eq!((combined >> b.attenuation_offset()) & 0xf, 0x5);

                let ph_a = phase(a, 0x2a).unwrap().value().value();
                let ph_b = phase(b, 0x15).unwrap().value().value();
                let combined = ph_a | ph_b;
                assert_eq!((combined >> a.phase_offset()) & 0x3f, 0x2a);
                assert_eq!((combined >> b.phase_offset()) & 0x3f, 0x15);

                assert_ne!(a.on_off_offset(), b.on_off_offset());
            }
        }
    }

    #[test]
    fn fields_stay_below_the_address() {
        let payload_mask = (1u64 << ADDRESS_SHIFT) - 1;

        for channel in Channel::ALL.iter().copied() {
            let command = attenuation(channel, MAX_ATTENUATION).unwrap();
            assert_eq!(command.value().value() & !payload_mask, BW0);

            let command = phase(channel, MAX_PHASE).unwrap();
            assert_eq!(command.value().value() & !payload_mask, BW1);
        }
        let command = on_off_mask([false; 8]).unwrap();
        assert_eq!(command.value().value() & !payload_mask, BW0);
    }

    #[test]
    fn mode_register_bits() {
        assert_eq!(reset(true).unwrap().value().value(), 1 << 24);
        assert_eq!(reset(false).unwrap().value().value(), 0);
        assert_eq!(rf_enable(true).unwrap().value().value(), 1 << 23);
        assert_eq!(reset(true).unwrap().register(), Register::Mode);
    }

    #[test]
    fn init_entries_are_sent_unmodified() {
        let command = init_entry(6, 0x0_05_00_29_4a_52_94_a5).unwrap();
        assert_eq!(command.register(), Register::Init(6));
        assert_eq!(command.value().value(), 0x0_05_00_29_4a_52_94_a5);
        assert_eq!(command.value().width(), REGISTER_WIDTH);

        assert_eq!(
            init_entry(19, 0),
            Err(EncodeError::OutOfRange { value: 19, max: 18 })
        );
        assert!(init_entry(0, 1 << 60).is_err());
    }

    #[test]
    fn version_commands() {
        assert_eq!(
            version_query().unwrap().value().value(),
            0x0_3d_00_00_00_00_00_3e
        );
        assert_eq!(version_readback().unwrap().value().value(), 0x3c400);
    }

    #[test]
    fn packets_match_the_wire_format() {
        let config = Config::default();

        let packet = attenuation(Channel::Element1B, 2)
            .unwrap()
            .to_packet(&config)
            .unwrap();
        assert_eq!(&packet[..], &[0, 0x100, 0, 0, 0, 0x20]);

        let packet = on_off_mask([true; 8]).unwrap().to_packet(&config).unwrap();
        assert_eq!(&packet[..], &[0, 0x100, 0, 0, 0, 0]);
    }

    #[test]
    fn encoding_is_idempotent() {
        let config = Config::default();
        let commands = [
            on_off_mask([true, false, true, false, true, false, true, false]),
            attenuation(Channel::Element3A, 7),
            common_attenuation(CommonAttenuation::Eight),
            phase(Channel::Element2A, 42),
            reset(true),
            rf_enable(true),
            init_entry(9, 0x0_08_00_03_9b_ce_01_fe),
        ];

        for command in commands.iter() {
            let command = command.unwrap();
            assert_eq!(
                command.to_packet(&config).unwrap(),
                command.to_packet(&config).unwrap()
            );
        }
    }

    #[test]
    fn physical_units() {
        assert_eq!(Attenuation::new(15).unwrap().db(), U16F16::from_num(7.5));
        assert_eq!(Phase::new(63).unwrap().degrees(), U16F16::from_num(354.375));
        assert_eq!(CommonAttenuation::Eight.db(), U16F16::from_num(8));

        assert_eq!(Phase::from_degrees(I16F16::from_num(90)).level(), 16);
        assert_eq!(Phase::from_degrees(I16F16::from_num(-5.625)).level(), 63);
        assert_eq!(Phase::from_degrees(I16F16::from_num(359)).level(), 0);
    }

    #[test]
    fn channel_from_index() {
        assert_eq!(Channel::try_from(7u8), Ok(Channel::Element4B));
        assert_eq!(Channel::try_from(8u8), Err(EncodeError::InvalidValue(8)));
    }
}
