use crate::{
    codec, maybe_async_attr,
    mode::{Mode, ModeLine},
    register::{self, Channel, Command, CommonAttenuation},
    spi_type,
    telemetry::Telemetry,
    Error, Ready, AWMF,
};

impl<SPI, LINE> AWMF<SPI, LINE, Ready>
where
    SPI: spi_type::spi::SpiDevice<u16>,
    LINE: ModeLine,
{
    /// Sends a command built with the [`register`] module
    ///
    /// INIT entries are sent in INIT mode, everything else in the mode of the
    /// configured chip variant.
    #[maybe_async_attr]
    pub async fn send(&mut self, command: &Command) -> Result<Telemetry, Error<SPI, LINE>> {
        self.transmit(command).await
    }

    /// Turns channels on or off
    ///
    /// `enables` is indexed by [`Channel::index`].
    #[maybe_async_attr]
    pub async fn set_channels(
        &mut self,
        enables: [bool; 8],
    ) -> Result<Telemetry, Error<SPI, LINE>> {
        let command = register::on_off_mask(enables)?;

        self.transmit(&command).await
    }

    /// Turns all channels on
    #[maybe_async_attr]
    pub async fn all_channels_on(&mut self) -> Result<Telemetry, Error<SPI, LINE>> {
        self.set_channels([true; 8]).await
    }

    /// Turns all channels off
    #[maybe_async_attr]
    pub async fn all_channels_off(&mut self) -> Result<Telemetry, Error<SPI, LINE>> {
        self.set_channels([false; 8]).await
    }

    /// Sets the attenuation of a channel to `level` * 0.5 dB
    ///
    /// `level` must be within `0..=15`.
    #[maybe_async_attr]
    pub async fn set_attenuation(
        &mut self,
        channel: Channel,
        level: u8,
    ) -> Result<Telemetry, Error<SPI, LINE>> {
        let command = register::attenuation(channel, level)?;

        self.transmit(&command).await
    }

    /// Sets the attenuation shared by all channels
    #[maybe_async_attr]
    pub async fn set_common_attenuation(
        &mut self,
        level: CommonAttenuation,
    ) -> Result<Telemetry, Error<SPI, LINE>> {
        let command = register::common_attenuation(level)?;

        self.transmit(&command).await
    }

    /// Sets the phase of a channel to `level` * 5.625°
    ///
    /// `level` must be within `0..=63`.
    #[maybe_async_attr]
    pub async fn set_phase(
        &mut self,
        channel: Channel,
        level: u8,
    ) -> Result<Telemetry, Error<SPI, LINE>> {
        let command = register::phase(channel, level)?;

        self.transmit(&command).await
    }

    /// Resets the beamformer
    ///
    /// Asserts the reset bit, then releases it again. Returns the telemetry of
    /// the release.
    #[maybe_async_attr]
    pub async fn reset(&mut self) -> Result<Telemetry, Error<SPI, LINE>> {
        let assert = register::reset(true)?;
        let release = register::reset(false)?;

        self.transmit(&assert).await?;
        self.transmit(&release).await
    }

    /// Enables or disables the RF path
    #[maybe_async_attr]
    pub async fn enable_rf(&mut self, enabled: bool) -> Result<Telemetry, Error<SPI, LINE>> {
        let command = register::rf_enable(enabled)?;

        self.transmit(&command).await
    }

    /// Drives the mode lines to `mode` without sending a command
    ///
    /// Useful to switch the RF front end between receive and transmit.
    pub fn select_mode(&mut self, mode: Mode) -> Result<(), Error<SPI, LINE>> {
        Ok(self.ll.select(mode)?)
    }

    /// Reads the chip version
    ///
    /// Switches the readback to the version register and queries it twice.
    /// The reply to the second query is returned, as raw register value.
    #[maybe_async_attr]
    pub async fn version(&mut self) -> Result<u64, Error<SPI, LINE>> {
        let readback = register::version_readback()?;
        let query = register::version_query()?;

        self.transmit(&readback).await?;
        self.transmit_raw(&query).await?;
        let version = self.transmit_raw(&query).await?;

        log::debug!("version {:#x}", version);

        Ok((version & u128::from(u64::MAX)) as u64)
    }

    /// Sends raw logical values, packed back to back
    ///
    /// Escape hatch for registers this driver doesn't know. The values are
    /// not checked beyond their width.
    #[maybe_async_attr]
    pub async fn write_raw(
        &mut self,
        mode: Mode,
        values: &[codec::LogicalValue],
    ) -> Result<Telemetry, Error<SPI, LINE>> {
        let packet = codec::pack(values, self.config.word_width, self.config.big_endian)?;
        let reply = self.ll.exchange(mode, &packet).await?;

        Ok(Telemetry::decode(&reply, self.config.word_width))
    }
}
