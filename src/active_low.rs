use embedded_hal::digital::v2::OutputPin;

use crate::bus::{SpiController, SpiSettings};
use crate::chip_select::{ChipSelect, TransferType};
use crate::Error;

/// A ChipSelect implementation for the usual active-low CS pin, which also
/// manages a transaction on the SPI controller the device hangs off of.
///
/// The CS pin is asserted *after* the controller has applied the device’s
/// settings and deasserted *before* the transaction ends. The transaction is
/// begun and ended on every call, whatever the
/// [`TransferType`](enum.TransferType.html), so a chain of partial transfers
/// still has each step framed by its own transaction while CS stays low
/// across all of them.
///
/// Only the pin level and the controller’s transaction remember anything
/// between calls; this struct never changes after construction.
pub struct ActiveLowChipSelect<'a, CsPin, Spi> {
    cs: CsPin,
    settings: SpiSettings,
    spi: &'a Spi,
}

/// An [`ActiveLowChipSelect`](struct.ActiveLowChipSelect.html) bound to the
/// second SPI controller. Build one with
/// [`Controllers::active_low1`](struct.Controllers.html#method.active_low1).
///
/// The second controller usually has its own peripheral type, so `Spi1` need
/// not be the type of the first one.
#[cfg(feature = "spi1")]
pub type ActiveLowChipSelect1<'a, CsPin, Spi1> = ActiveLowChipSelect<'a, CsPin, Spi1>;

impl<'a, CsPin, Spi> ActiveLowChipSelect<'a, CsPin, Spi>
where
    CsPin: OutputPin,
    Spi: SpiController,
{
    /// Drives the CS pin high on init (which is "deselect"). The pin is
    /// already an output by virtue of its type, so this is the only setup it
    /// needs.
    pub fn new(
        mut cs: CsPin,
        settings: SpiSettings,
        spi: &'a Spi,
    ) -> Result<Self, Error<CsPin::Error, Spi::Error>> {
        cs.set_high().map_err(Error::ChipSelectPinError)?;

        Ok(ActiveLowChipSelect { cs, settings, spi })
    }

    /// The settings applied at the start of every transaction.
    pub fn settings(&self) -> &SpiSettings {
        &self.settings
    }

    /// The controller this device’s transactions run on.
    pub fn controller(&self) -> &'a Spi {
        self.spi
    }

    /// Gives the CS pin back, at whatever level it was last driven to.
    pub fn release(self) -> CsPin {
        self.cs
    }
}

impl<'a, CsPin, Spi> ChipSelect for ActiveLowChipSelect<'a, CsPin, Spi>
where
    CsPin: OutputPin,
    Spi: SpiController,
{
    type Error = Error<CsPin::Error, Spi::Error>;

    /// Begins the transaction, then sets the pin low unless the transfer
    /// continues an earlier selection.
    fn select(&mut self, transfer_type: TransferType) -> Result<(), Self::Error> {
        log::trace!("select({:?})", transfer_type);

        self.spi
            .begin_transaction(&self.settings)
            .map_err(Error::SpiError)?;

        if transfer_type == TransferType::NoStartCs {
            return Ok(());
        }

        self.cs.set_low().map_err(Error::ChipSelectPinError)
    }

    /// Sets the pin high unless the next transfer continues this selection,
    /// then ends the transaction.
    ///
    /// The transaction is ended even if the pin could not be written, in
    /// which case the pin error is the one returned.
    fn deselect(&mut self, transfer_type: TransferType) -> Result<(), Self::Error> {
        log::trace!("deselect({:?})", transfer_type);

        let released = if transfer_type == TransferType::NoEndCs {
            Ok(())
        } else {
            self.cs.set_high().map_err(Error::ChipSelectPinError)
        };

        let ended = self.spi.end_transaction().map_err(Error::SpiError);

        released.and(ended)
    }
}
