use core::fmt;

use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0};
use fugit::HertzU32;

/// Bit order on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// Settings an [`SpiController`](trait.SpiController.html) applies for the
/// length of a transaction.
///
/// Each device on a shared bus carries its own, since clock limits and SPI
/// modes differ from chip to chip.
#[derive(Clone, Copy, PartialEq)]
pub struct SpiSettings {
    pub clock: HertzU32,
    pub bit_order: BitOrder,
    pub mode: Mode,
}

impl SpiSettings {
    pub const fn new(clock: HertzU32, bit_order: BitOrder, mode: Mode) -> Self {
        SpiSettings {
            clock,
            bit_order,
            mode,
        }
    }
}

impl Default for SpiSettings {
    /// 4MHz, MSB first, mode 0.
    fn default() -> Self {
        SpiSettings::new(HertzU32::from_raw(4_000_000), BitOrder::MsbFirst, MODE_0)
    }
}

// embedded-hal 0.2’s `Mode` has no Debug, so the mode is shown by number.
impl fmt::Debug for SpiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpiSettings")
            .field("clock", &self.clock)
            .field("bit_order", &self.bit_order)
            .field("mode", &format_args!("MODE_{}", mode_number(&self.mode)))
            .finish()
    }
}

/// 0 through 3, as CPOL * 2 + CPHA.
fn mode_number(mode: &Mode) -> u8 {
    let cpol = match mode.polarity {
        Polarity::IdleLow => 0,
        Polarity::IdleHigh => 1,
    };
    let cpha = match mode.phase {
        Phase::CaptureOnFirstTransition => 0,
        Phase::CaptureOnSecondTransition => 1,
    };
    cpol << 1 | cpha
}

/// One SPI controller, as seen by the chip selects sharing it.
///
/// `begin_transaction` applies a device’s settings and claims the bus;
/// `end_transaction` gives it up. Every begin is followed by exactly one end
/// on the same controller.
///
/// The methods take `&self` because several devices hold on to the same
/// controller at once. Implementations keep whatever state they need behind
/// their own interior mutability (peripheral registers already work this way).
/// Nothing here stops two execution contexts from opening transactions at the
/// same time; callers that need that must lock around the controller.
pub trait SpiController {
    type Error;

    fn begin_transaction(&self, settings: &SpiSettings) -> Result<(), Self::Error>;

    fn end_transaction(&self) -> Result<(), Self::Error>;
}

impl<C: SpiController + ?Sized> SpiController for &C {
    type Error = C::Error;

    fn begin_transaction(&self, settings: &SpiSettings) -> Result<(), Self::Error> {
        (**self).begin_transaction(settings)
    }

    fn end_transaction(&self) -> Result<(), Self::Error> {
        (**self).end_transaction()
    }
}
