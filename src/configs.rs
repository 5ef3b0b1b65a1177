//! Configuration of the driver
//!
//! This module houses the datastructures that describe the attached chip and
//! the transport framing. The config is passed to [`AWMF::new`].
//!
//! [`AWMF::new`]: crate::hl::AWMF::new

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::{mode::Mode, register::INIT_TABLE_LEN};

/// Driver configuration
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// The attached beamformer
    pub variant: ChipVariant,
    /// Width of one SPI transport word in bits.
    ///
    /// The SPI device has to be set up for the same number of bits per word.
    pub word_width: u32,
    /// Send the most significant word first
    pub big_endian: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            variant: Default::default(),
            word_width: 10,
            big_endian: true,
        }
    }
}

impl Config {
    /// Returns the default configuration for a chip variant
    pub fn for_variant(variant: ChipVariant) -> Self {
        Config {
            variant,
            ..Default::default()
        }
    }
}

/// The beamformer variant
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChipVariant {
    /// AWMF-0132 K-band receive quad
    #[default]
    Awmf0132,
    /// AWMF-0133 Ka-band transmit quad
    Awmf0133,
}

impl ChipVariant {
    /// Returns the mode that beam commands are sent in
    pub fn mode(self) -> Mode {
        match self {
            ChipVariant::Awmf0132 => Mode::Rx,
            ChipVariant::Awmf0133 => Mode::Tx,
        }
    }

    /// Returns the vendor INIT table of the variant
    pub fn init_table(self) -> &'static InitTable {
        match self {
            ChipVariant::Awmf0132 => &AWMF_0132_INIT,
            ChipVariant::Awmf0133 => &AWMF_0133_INIT,
        }
    }
}

/// Register values written once after power-up, in order
pub type InitTable = [u64; INIT_TABLE_LEN];

/// INIT table of the AWMF-0132
pub static AWMF_0132_INIT: InitTable = [
    0x0_00_00_00_01_02_04_00, // 0
    0x0_00_00_00_00_02_04_00, // 1
    0x0_01_00_00_00_00_00_00, // 2
    0x0_02_00_00_00_00_00_00, // 3
    0x0_03_00_00_00_00_00_00, // 4
    0x0_04_00_00_00_00_00_00, // 5
    0x0_05_00_29_4a_52_94_a5, // 6
    0x0_06_00_00_00_00_01_e7, // 7
    0x0_07_00_00_00_00_00_00, // 8
    0x0_08_00_03_9b_ce_01_fe, // 9
    0x0_09_00_00_06_01_b6_f6, // 10
    0x0_0a_00_00_6d_b6_db_41, // 11
    0x0_0b_00_00_01_20_01_0a, // 12
    0x0_0c_00_00_00_09_00_01, // 13
    0x0_0d_00_00_00_00_08_00, // 14
    0x0_0e_00_00_00_00_00_00, // 15
    0x0_0f_00_00_00_00_00_00, // 16
    0x0_10_00_00_00_00_00_00, // 17
    0x0_11_00_00_00_00_00_00, // 18
];

/// INIT table of the AWMF-0133
pub static AWMF_0133_INIT: InitTable = [
    0x0_00_00_00_01_02_04_00, // 0
    0x0_00_00_00_00_02_04_00, // 1
    0x0_01_00_00_00_00_00_00, // 2
    0x0_02_00_00_00_00_00_00, // 3
    0x0_03_00_00_00_00_00_00, // 4
    0x0_04_00_00_00_00_00_00, // 5
    0x0_05_04_31_8c_63_18_c6, // 6
    0x0_06_00_00_00_00_01_60, // 7
    0x0_07_00_00_00_00_00_00, // 8
    0x0_08_00_03_bb_ff_ff_fe, // 9
    0x0_09_00_00_06_01_b6_f6, // 10
    0x0_0a_00_00_6d_b6_db_44, // 11
    0x0_0b_00_00_00_00_00_02, // 12
    0x0_0c_00_00_03_69_14_01, // 13
    0x0_0d_00_00_00_00_08_00, // 14
    0x0_0e_00_00_00_00_00_00, // 15
    0x0_0f_00_00_00_00_00_00, // 16
    0x0_10_00_00_00_00_00_00, // 17
    0x0_11_00_00_00_00_00_00, // 18
];
