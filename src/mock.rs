//! Fake collaborators for testing code that drives chip selects.
//!
//! [`MockPin`], [`MockSpi`] and [`RecordingTrace`] all append to a shared
//! [`EventLog`], so a test can check the order in which a chip select touched
//! its pin, its controller and its trace sink.

use core::cell::{Cell, RefCell};
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_hal::digital::v2::{OutputPin, PinState};

use crate::bus::{SpiController, SpiSettings};
use crate::trace::TraceSink;

/// Error returned by every fake once it has been told to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockError;

/// Something a fake saw happen.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A pin was driven to a level.
    Pin(&'static str, PinState),
    /// A controller began a transaction with these settings.
    Begin(&'static str, SpiSettings),
    /// A controller ended its transaction.
    End(&'static str),
    /// A trace line was written.
    Trace(String),
}

/// Shared, ordered record of [`Event`]s.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    /// Everything recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Returns everything recorded so far and starts over.
    pub fn take(&self) -> Vec<Event> {
        self.events.replace(Vec::new())
    }
}

/// Fake output pin. Clones share their level, so a test can keep one clone
/// to look at a pin it handed to a chip select.
#[derive(Clone, Debug)]
pub struct MockPin {
    name: &'static str,
    state: Rc<Cell<Option<PinState>>>,
    failing: Rc<Cell<bool>>,
    events: EventLog,
}

impl MockPin {
    /// A pin that has never been driven.
    pub fn new(name: &'static str, events: &EventLog) -> Self {
        MockPin {
            name,
            state: Rc::new(Cell::new(None)),
            failing: Rc::new(Cell::new(false)),
            events: events.clone(),
        }
    }

    /// The last level written, if any.
    pub fn state(&self) -> Option<PinState> {
        self.state.get()
    }

    pub fn is_high(&self) -> bool {
        self.state() == Some(PinState::High)
    }

    pub fn is_low(&self) -> bool {
        self.state() == Some(PinState::Low)
    }

    /// Makes every later write fail without changing the level.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    fn drive(&mut self, state: PinState) -> Result<(), MockError> {
        if self.failing.get() {
            return Err(MockError);
        }
        self.state.set(Some(state));
        self.events.push(Event::Pin(self.name, state));
        Ok(())
    }
}

impl OutputPin for MockPin {
    type Error = MockError;

    fn set_low(&mut self) -> Result<(), MockError> {
        self.drive(PinState::Low)
    }

    fn set_high(&mut self) -> Result<(), MockError> {
        self.drive(PinState::High)
    }
}

/// Fake SPI controller that tracks whether a transaction is open.
#[derive(Debug)]
pub struct MockSpi {
    name: &'static str,
    open: Cell<bool>,
    settings: Cell<Option<SpiSettings>>,
    transactions: Cell<usize>,
    failing: Cell<bool>,
    events: EventLog,
}

impl MockSpi {
    pub fn new(name: &'static str, events: &EventLog) -> Self {
        MockSpi {
            name,
            open: Cell::new(false),
            settings: Cell::new(None),
            transactions: Cell::new(0),
            failing: Cell::new(false),
            events: events.clone(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Settings of the most recent transaction.
    pub fn settings(&self) -> Option<SpiSettings> {
        self.settings.get()
    }

    /// How many transactions have been begun.
    pub fn transactions(&self) -> usize {
        self.transactions.get()
    }

    /// Makes every later begin and end fail without changing state.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }
}

impl SpiController for MockSpi {
    type Error = MockError;

    fn begin_transaction(&self, settings: &SpiSettings) -> Result<(), MockError> {
        if self.failing.get() {
            return Err(MockError);
        }
        self.open.set(true);
        self.settings.set(Some(*settings));
        self.transactions.set(self.transactions.get() + 1);
        self.events.push(Event::Begin(self.name, *settings));
        Ok(())
    }

    fn end_transaction(&self) -> Result<(), MockError> {
        if self.failing.get() {
            return Err(MockError);
        }
        self.open.set(false);
        self.events.push(Event::End(self.name));
        Ok(())
    }
}

/// Trace sink that keeps its lines and also records them as events.
#[derive(Debug)]
pub struct RecordingTrace {
    lines: Vec<String>,
    failing: bool,
    events: EventLog,
}

impl RecordingTrace {
    pub fn new(events: &EventLog) -> Self {
        RecordingTrace {
            lines: Vec::new(),
            failing: false,
            events: events.clone(),
        }
    }

    /// A sink that rejects every line.
    pub fn failing(events: &EventLog) -> Self {
        RecordingTrace {
            failing: true,
            ..Self::new(events)
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.clone()
    }
}

impl TraceSink for RecordingTrace {
    type Error = MockError;

    fn trace_line(&mut self, line: &str) -> Result<(), MockError> {
        if self.failing {
            return Err(MockError);
        }
        self.lines.push(line.to_string());
        self.events.push(Event::Trace(line.to_string()));
        Ok(())
    }
}
