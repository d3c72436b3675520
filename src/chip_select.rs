use void::Void;

use crate::selection::Selection;
use crate::trace::{LogTrace, TraceSink};

/// Which edges of a transfer should toggle the CS line.
///
/// Exactly one value applies per call; these are not flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferType {
    /// Assert CS on `select` and release it on `deselect`.
    Normal,
    /// Leave CS alone on `select`, because an earlier transfer kept it
    /// asserted.
    NoStartCs,
    /// Leave CS asserted on `deselect`, so the next transfer can continue
    /// with `NoStartCs`.
    NoEndCs,
}

impl Default for TransferType {
    fn default() -> Self {
        TransferType::Normal
    }
}

/// Trait for an object that selects one member of an SPI bus.
///
/// A caller brackets every transfer with `select` and `deselect`, passing the
/// same kind of [`TransferType`](enum.TransferType.html) it would pass to the
/// bus. Selecting twice without a deselect in between is not detected here;
/// what happens then is up to the hardware.
pub trait ChipSelect {
    type Error;

    /// Claims the bus and addresses the chip.
    fn select(&mut self, transfer_type: TransferType) -> Result<(), Self::Error>;

    /// Releases the chip and gives up the bus.
    fn deselect(&mut self, transfer_type: TransferType) -> Result<(), Self::Error>;

    /// Selects the chip and returns a guard that deselects it, with
    /// `deselect_type`, when it goes out of scope.
    fn selection(
        &mut self,
        select_type: TransferType,
        deselect_type: TransferType,
    ) -> Result<Selection<'_, Self>, Self::Error>
    where
        Self: Sized,
    {
        self.select(select_type)?;
        Ok(Selection::new(self, deselect_type))
    }
}

impl<T: ChipSelect + ?Sized> ChipSelect for &mut T {
    type Error = T::Error;

    fn select(&mut self, transfer_type: TransferType) -> Result<(), Self::Error> {
        (**self).select(transfer_type)
    }

    fn deselect(&mut self, transfer_type: TransferType) -> Result<(), Self::Error> {
        (**self).deselect(transfer_type)
    }
}

/// "Do nothing" chip select, for when an API wants a device but there isn’t
/// one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DummyChipSelect;

impl ChipSelect for DummyChipSelect {
    type Error = Void;

    fn select(&mut self, _transfer_type: TransferType) -> Result<(), Void> {
        Ok(())
    }

    fn deselect(&mut self, _transfer_type: TransferType) -> Result<(), Void> {
        Ok(())
    }
}

/// "Do nothing" chip select that writes a line to its
/// [`TraceSink`](trait.TraceSink.html) whenever it is called.
///
/// The line is written before the call returns, so the trace is in call
/// order. The transfer type is not part of the line.
#[derive(Debug, Default)]
pub struct DebugChipSelect<S = LogTrace> {
    sink: S,
}

impl<S: TraceSink> DebugChipSelect<S> {
    const SELECT_LINE: &'static str = "Debug CS: select()";
    const DESELECT_LINE: &'static str = "Debug CS: deselect()";

    pub fn new(sink: S) -> Self {
        DebugChipSelect { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: TraceSink> ChipSelect for DebugChipSelect<S> {
    type Error = S::Error;

    fn select(&mut self, _transfer_type: TransferType) -> Result<(), S::Error> {
        self.sink.trace_line(Self::SELECT_LINE)
    }

    fn deselect(&mut self, _transfer_type: TransferType) -> Result<(), S::Error> {
        self.sink.trace_line(Self::DESELECT_LINE)
    }
}
