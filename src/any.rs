#[cfg(not(feature = "spi1"))]
use core::marker::PhantomData;

use embedded_hal::digital::v2::OutputPin;
#[cfg(not(feature = "spi1"))]
use void::Void;

use crate::active_low::ActiveLowChipSelect;
#[cfg(feature = "spi1")]
use crate::active_low::ActiveLowChipSelect1;
use crate::bus::{SpiController, SpiSettings};
use crate::chip_select::{ChipSelect, DebugChipSelect, DummyChipSelect, TransferType};
use crate::trace::{LogTrace, TraceSink};
use crate::Error;

/// Every kind of chip select this crate knows about, in one type.
///
/// The set is fixed for a given build, so a board can keep all of its
/// devices in one array and dispatch with a `match` instead of a vtable.
/// `ActiveLow1` only exists with the `spi1` feature. Its controller type
/// `Spi1` may differ from `Spi`, but must report the same error type.
pub enum AnyChipSelect<'a, CsPin, Spi, Sink = LogTrace, Spi1 = Spi> {
    Dummy(DummyChipSelect),
    Debug(DebugChipSelect<Sink>),
    ActiveLow(ActiveLowChipSelect<'a, CsPin, Spi>),
    #[cfg(feature = "spi1")]
    ActiveLow1(ActiveLowChipSelect1<'a, CsPin, Spi1>),
    /// Keeps `Spi1` in use on targets without a second controller. Can’t be
    /// constructed.
    #[cfg(not(feature = "spi1"))]
    #[doc(hidden)]
    NoSpi1(PhantomData<Spi1>, Void),
}

impl<'a, CsPin, Spi, Sink, Spi1> From<DummyChipSelect>
    for AnyChipSelect<'a, CsPin, Spi, Sink, Spi1>
{
    fn from(cs: DummyChipSelect) -> Self {
        AnyChipSelect::Dummy(cs)
    }
}

impl<'a, CsPin, Spi, Sink, Spi1> From<DebugChipSelect<Sink>>
    for AnyChipSelect<'a, CsPin, Spi, Sink, Spi1>
{
    fn from(cs: DebugChipSelect<Sink>) -> Self {
        AnyChipSelect::Debug(cs)
    }
}

impl<'a, CsPin, Spi, Sink, Spi1> ChipSelect for AnyChipSelect<'a, CsPin, Spi, Sink, Spi1>
where
    CsPin: OutputPin,
    Spi: SpiController,
    Spi1: SpiController<Error = Spi::Error>,
    Sink: TraceSink,
{
    type Error = Error<CsPin::Error, Spi::Error, Sink::Error>;

    fn select(&mut self, transfer_type: TransferType) -> Result<(), Self::Error> {
        match self {
            AnyChipSelect::Dummy(cs) => match cs.select(transfer_type) {
                Ok(()) => Ok(()),
                Err(never) => void::unreachable(never),
            },
            AnyChipSelect::Debug(cs) => cs.select(transfer_type).map_err(Error::TraceError),
            AnyChipSelect::ActiveLow(cs) => {
                cs.select(transfer_type).map_err(|err| err.with_trace())
            }
            #[cfg(feature = "spi1")]
            AnyChipSelect::ActiveLow1(cs) => {
                cs.select(transfer_type).map_err(|err| err.with_trace())
            }
            #[cfg(not(feature = "spi1"))]
            AnyChipSelect::NoSpi1(_, never) => match *never {},
        }
    }

    fn deselect(&mut self, transfer_type: TransferType) -> Result<(), Self::Error> {
        match self {
            AnyChipSelect::Dummy(cs) => match cs.deselect(transfer_type) {
                Ok(()) => Ok(()),
                Err(never) => void::unreachable(never),
            },
            AnyChipSelect::Debug(cs) => cs.deselect(transfer_type).map_err(Error::TraceError),
            AnyChipSelect::ActiveLow(cs) => {
                cs.deselect(transfer_type).map_err(|err| err.with_trace())
            }
            #[cfg(feature = "spi1")]
            AnyChipSelect::ActiveLow1(cs) => {
                cs.deselect(transfer_type).map_err(|err| err.with_trace())
            }
            #[cfg(not(feature = "spi1"))]
            AnyChipSelect::NoSpi1(_, never) => match *never {},
        }
    }
}

/// The SPI controllers of the target, for binding active-low chip selects to
/// the right one.
///
/// `new` takes the first controller. With the `spi1` feature,
/// [`with_spi1`](#method.with_spi1) adds the second one, which can be a
/// different peripheral type; only then is `active_low1` available.
pub struct Controllers<'a, Spi, Spi1 = ()> {
    spi: &'a Spi,
    spi1: Spi1,
}

impl<'a, Spi: SpiController> Controllers<'a, Spi> {
    pub fn new(spi: &'a Spi) -> Self {
        Controllers { spi, spi1: () }
    }

    /// Adds the second controller.
    #[cfg(feature = "spi1")]
    pub fn with_spi1<Spi1>(self, spi1: &'a Spi1) -> Controllers<'a, Spi, &'a Spi1>
    where
        Spi1: SpiController,
    {
        Controllers {
            spi: self.spi,
            spi1,
        }
    }
}

impl<'a, Spi: SpiController, Second> Controllers<'a, Spi, Second> {
    pub fn spi(&self) -> &'a Spi {
        self.spi
    }

    /// Creates an active-low chip select on the first controller. Drives
    /// `cs` high.
    pub fn active_low<CsPin, Sink, Spi1>(
        &self,
        cs: CsPin,
        settings: SpiSettings,
    ) -> Result<AnyChipSelect<'a, CsPin, Spi, Sink, Spi1>, Error<CsPin::Error, Spi::Error>>
    where
        CsPin: OutputPin,
    {
        ActiveLowChipSelect::new(cs, settings, self.spi).map(AnyChipSelect::ActiveLow)
    }
}

#[cfg(feature = "spi1")]
impl<'a, Spi: SpiController, Spi1: SpiController> Controllers<'a, Spi, &'a Spi1> {
    pub fn spi1(&self) -> &'a Spi1 {
        self.spi1
    }

    /// Creates an active-low chip select on the second controller. Drives
    /// `cs` high.
    pub fn active_low1<CsPin, Sink>(
        &self,
        cs: CsPin,
        settings: SpiSettings,
    ) -> Result<AnyChipSelect<'a, CsPin, Spi, Sink, Spi1>, Error<CsPin::Error, Spi1::Error>>
    where
        CsPin: OutputPin,
    {
        ActiveLowChipSelect1::new(cs, settings, self.spi1).map(AnyChipSelect::ActiveLow1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Event, EventLog, MockError, MockPin, MockSpi, RecordingTrace};
    use embedded_hal::digital::v2::PinState;

    type Device<'a> = AnyChipSelect<'a, MockPin, MockSpi, RecordingTrace>;


    #[test]
    fn test_mixed_devices_dispatch_in_order() {
        let events = EventLog::new();
        let spi = MockSpi::new("spi0", &events);
        let unused = MockSpi::new("unused", &events);
        let controllers = Controllers::new(&spi);
        let flash = MockPin::new("flash", &events);
        let probe = flash.clone();

        let mut devices: [Device; 3] = [
            DummyChipSelect.into(),
            DebugChipSelect::new(RecordingTrace::new(&events)).into(),
            controllers
                .active_low(flash, SpiSettings::default())
                .unwrap(),
        ];
        events.take();

        for device in devices.iter_mut() {
            device.select(TransferType::Normal).unwrap();
            device.deselect(TransferType::Normal).unwrap();
        }

        assert!(probe.is_high());
        assert!(!spi.is_open());
        assert_eq!(unused.transactions(), 0);
        assert_eq!(
            events.events(),
            vec![
                Event::Trace("Debug CS: select()".into()),
                Event::Trace("Debug CS: deselect()".into()),
                Event::Begin("spi0", SpiSettings::default()),
                Event::Pin("flash", PinState::Low),
                Event::Pin("flash", PinState::High),
                Event::End("spi0"),
            ]
        );
    }

    #[test]
    fn test_dummy_variant_touches_nothing() {
        let events = EventLog::new();
        let mut device: Device = DummyChipSelect.into();

        for &transfer_type in [
            TransferType::Normal,
            TransferType::NoStartCs,
            TransferType::NoEndCs,
        ]
        .iter()
        {
            device.select(transfer_type).unwrap();
            device.deselect(transfer_type).unwrap();
        }

        assert!(events.events().is_empty());
    }

    #[test]
    fn test_errors_keep_their_source() {
        let events = EventLog::new();
        let spi = MockSpi::new("spi0", &events);
        let controllers = Controllers::new(&spi);

        let mut debug: Device = DebugChipSelect::new(RecordingTrace::failing(&events)).into();
        assert_eq!(
            debug.select(TransferType::Normal),
            Err(Error::TraceError(MockError))
        );

        let mut active: Device = controllers
            .active_low(MockPin::new("cs", &events), SpiSettings::default())
            .unwrap();
        spi.set_failing(true);
        assert_eq!(
            active.select(TransferType::Normal),
            Err(Error::SpiError(MockError))
        );
    }

    #[test]
    fn test_construction_error_surfaces() {
        let events = EventLog::new();
        let spi = MockSpi::new("spi0", &events);
        let pin = MockPin::new("cs", &events);
        pin.set_failing(true);

        let result: Result<Device, _> =
            Controllers::new(&spi).active_low(pin, SpiSettings::default());

        assert!(matches!(result, Err(Error::ChipSelectPinError(MockError))));
    }

    /// A second controller with its own type, as a separate peripheral
    /// would have on real hardware.
    #[cfg(feature = "spi1")]
    struct OtherSpi(MockSpi);

    #[cfg(feature = "spi1")]
    impl SpiController for OtherSpi {
        type Error = MockError;

        fn begin_transaction(&self, settings: &SpiSettings) -> Result<(), MockError> {
            self.0.begin_transaction(settings)
        }

        fn end_transaction(&self) -> Result<(), MockError> {
            self.0.end_transaction()
        }
    }

    #[cfg(feature = "spi1")]
    type DualDevice<'a> = AnyChipSelect<'a, MockPin, MockSpi, RecordingTrace, OtherSpi>;

    #[cfg(feature = "spi1")]
    #[test]
    fn test_secondary_controller_is_independent() {
        let events = EventLog::new();
        let spi = MockSpi::new("spi0", &events);
        let spi1 = OtherSpi(MockSpi::new("spi1", &events));
        let controllers = Controllers::new(&spi).with_spi1(&spi1);
        let radio_pin = MockPin::new("radio", &events);
        let radio_probe = radio_pin.clone();

        let mut devices: [DualDevice; 2] = [
            controllers
                .active_low(MockPin::new("flash", &events), SpiSettings::default())
                .unwrap(),
            controllers
                .active_low1(radio_pin, SpiSettings::default())
                .unwrap(),
        ];
        assert!(matches!(devices[1], AnyChipSelect::ActiveLow1(_)));
        assert!(core::ptr::eq(controllers.spi1(), &spi1));
        events.take();

        devices[1].select(TransferType::Normal).unwrap();
        assert!(spi1.0.is_open());
        assert!(!spi.is_open());
        assert!(radio_probe.is_low());

        devices[0].select(TransferType::Normal).unwrap();
        devices[1].deselect(TransferType::Normal).unwrap();
        assert!(spi.is_open());
        assert!(!spi1.0.is_open());

        devices[0].deselect(TransferType::Normal).unwrap();
        assert_eq!(spi.transactions(), 1);
        assert_eq!(spi1.0.transactions(), 1);
        assert_eq!(
            events.events(),
            vec![
                Event::Begin("spi1", SpiSettings::default()),
                Event::Pin("radio", PinState::Low),
                Event::Begin("spi0", SpiSettings::default()),
                Event::Pin("flash", PinState::Low),
                Event::Pin("radio", PinState::High),
                Event::End("spi1"),
                Event::Pin("flash", PinState::High),
                Event::End("spi0"),
            ]
        );
    }

    #[test]
    fn test_first_controller_works_without_second() {
        let events = EventLog::new();
        let spi = MockSpi::new("spi0", &events);

        let mut flash: Device = Controllers::new(&spi)
            .active_low(MockPin::new("flash", &events), SpiSettings::default())
            .unwrap();

        flash.select(TransferType::Normal).unwrap();
        flash.deselect(TransferType::Normal).unwrap();
        assert_eq!(spi.transactions(), 1);
    }
}
