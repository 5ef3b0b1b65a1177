use crate::{
    configs::InitTable, ll, maybe_async_attr, mode::ModeLine, register, spi_type, Config, Error,
    Ready, Uninitialized, AWMF,
};

impl<SPI, LINE> AWMF<SPI, LINE, Uninitialized> {
    /// Create a new instance of `AWMF`
    ///
    /// Requires the SPI device the AWMF is connected to and the output that
    /// drives its RX_EN/TX_EN lines. The SPI device must be set up for
    /// `config.word_width` bits per word.
    pub fn new(spi: SPI, line: LINE, config: Config) -> Self {
        AWMF {
            ll: ll::AWMF::new(spi, line),
            config,
            state: Uninitialized,
        }
    }
}

impl<SPI, LINE> AWMF<SPI, LINE, Uninitialized>
where
    SPI: spi_type::spi::SpiDevice<u16>,
    LINE: ModeLine,
{
    /// Initialize the AWMF with the INIT table of the configured variant
    ///
    /// Writes all INIT entries in order, in INIT mode.
    #[maybe_async_attr]
    pub async fn init(self) -> Result<AWMF<SPI, LINE, Ready>, Error<SPI, LINE>> {
        let table = self.config.variant.init_table();

        self.init_with_table(table).await
    }

    /// Initialize the AWMF with a custom INIT table
    ///
    /// All entries are checked before the first one is sent.
    #[maybe_async_attr]
    pub async fn init_with_table(
        mut self,
        table: &InitTable,
    ) -> Result<AWMF<SPI, LINE, Ready>, Error<SPI, LINE>> {
        let mut commands = [None; register::INIT_TABLE_LEN];
        for (index, &payload) in table.iter().enumerate() {
            commands[index] = Some(register::init_entry(index, payload)?);
        }

        log::debug!("writing INIT table ({:?})", self.config.variant);

        for command in commands.iter().flatten() {
            self.transmit(command).await?;
        }

        Ok(AWMF {
            ll: self.ll,
            config: self.config,
            state: Ready,
        })
    }

    /// Skips the INIT table
    ///
    /// Use this if the chip has already been initialized, e.g. by a previous
    /// run of the application.
    pub fn assume_initialized(self) -> AWMF<SPI, LINE, Ready> {
        AWMF {
            ll: self.ll,
            config: self.config,
            state: Ready,
        }
    }
}
