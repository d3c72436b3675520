//! Chip select handling for devices that share one SPI controller.
//!
//! Every device on the bus implements [`ChipSelect`](trait.ChipSelect.html):
//! `select` claims the bus and addresses the device, `deselect` releases the
//! device and gives up the bus. What happens on the wire is up to the
//! implementation:
//!
//! * [`DummyChipSelect`](struct.DummyChipSelect.html) does nothing, for slots
//!   where a device is required but none is populated.
//! * [`DebugChipSelect`](struct.DebugChipSelect.html) does nothing either, but
//!   writes a line to a [`TraceSink`](trait.TraceSink.html) on every call.
//! * [`ActiveLowChipSelect`](struct.ActiveLowChipSelect.html) drives an
//!   active-low CS [`OutputPin`](embedded_hal::digital::v2::OutputPin) and
//!   wraps the selection in a transaction on an
//!   [`SpiController`](trait.SpiController.html).
//!
//! When the set of devices is fixed at build time,
//! [`AnyChipSelect`](enum.AnyChipSelect.html) holds any of them without going
//! through a trait object.
//!
//! A [`TransferType`](enum.TransferType.html) passed to each call lets a
//! transfer skip asserting CS at its start or releasing it at its end, so
//! several transactions can run back to back under one continuous selection:
//!
//! ```ignore
//! cs.select(TransferType::Normal)?;
//! // write the command
//! cs.deselect(TransferType::NoEndCs)?;
//!
//! cs.select(TransferType::NoStartCs)?;
//! // read the response, possibly with other settings
//! cs.deselect(TransferType::Normal)?;
//! ```
//!
//! Nothing here serializes access to a controller. Use it from one execution
//! context, or put your own lock around the bus.
//!
//! The `spi1` feature enables the variants bound to a second SPI controller.
//! The `mock` feature exports the fakes used by this crate’s tests.

#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "mock", not(test)))]
extern crate std;

mod active_low;
mod any;
mod bus;
mod chip_select;
mod selection;
mod trace;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use void::Void;

pub use active_low::ActiveLowChipSelect;
#[cfg(feature = "spi1")]
pub use active_low::ActiveLowChipSelect1;
pub use any::{AnyChipSelect, Controllers};
pub use bus::{BitOrder, SpiController, SpiSettings};
pub use chip_select::{ChipSelect, DebugChipSelect, DummyChipSelect, TransferType};
pub use selection::Selection;
pub use trace::{FmtTrace, LogTrace, TraceSink};

/// Errors from the collaborators a chip select drives. Each one is passed
/// through as-is.
#[derive(Debug, PartialEq)]
pub enum Error<PinError, SpiError, TraceError = Void> {
    /// Writing the CS pin failed. Really won’t happen unless the pin is on a
    /// GPIO expander or something, but it’s a part of the
    /// [`v2::OutputPin`](embedded_hal::digital::v2::OutputPin) signature.
    ChipSelectPinError(PinError),
    /// The SPI controller refused to begin or end a transaction.
    SpiError(SpiError),
    /// The trace sink of a [`DebugChipSelect`](struct.DebugChipSelect.html)
    /// could not take the line.
    TraceError(TraceError),
}

impl<PinError, SpiError> Error<PinError, SpiError, Void> {
    /// Re-types an error that cannot carry a trace failure so it fits next to
    /// errors that can.
    pub fn with_trace<TraceError>(self) -> Error<PinError, SpiError, TraceError> {
        match self {
            Error::ChipSelectPinError(err) => Error::ChipSelectPinError(err),
            Error::SpiError(err) => Error::SpiError(err),
            Error::TraceError(never) => void::unreachable(never),
        }
    }
}
