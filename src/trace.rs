use core::fmt;

use void::Void;

/// Somewhere for a [`DebugChipSelect`](struct.DebugChipSelect.html) to write
/// its trace lines.
pub trait TraceSink {
    type Error;

    /// Writes one complete line. `line` has no trailing newline.
    fn trace_line(&mut self, line: &str) -> Result<(), Self::Error>;
}

impl<T: TraceSink + ?Sized> TraceSink for &mut T {
    type Error = T::Error;

    fn trace_line(&mut self, line: &str) -> Result<(), Self::Error> {
        (**self).trace_line(line)
    }
}

/// Sends trace lines to the [`log`](https://docs.rs/log) facade at debug
/// level. Whatever logger the application installed decides where they end up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogTrace;

impl TraceSink for LogTrace {
    type Error = Void;

    fn trace_line(&mut self, line: &str) -> Result<(), Void> {
        log::debug!("{}", line);
        Ok(())
    }
}

/// Writes trace lines, newline-terminated, to anything that implements
/// [`fmt::Write`](core::fmt::Write), such as a serial port wrapper.
#[derive(Debug, Default)]
pub struct FmtTrace<W> {
    writer: W,
}

impl<W: fmt::Write> FmtTrace<W> {
    pub fn new(writer: W) -> Self {
        FmtTrace { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: fmt::Write> TraceSink for FmtTrace<W> {
    type Error = fmt::Error;

    fn trace_line(&mut self, line: &str) -> Result<(), fmt::Error> {
        self.writer.write_str(line)?;
        self.writer.write_char('\n')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Takes at most `capacity` bytes, like a full UART buffer.
    struct Bounded {
        buf: String,
        capacity: usize,
    }

    impl fmt::Write for Bounded {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if self.buf.len() + s.len() > self.capacity {
                return Err(fmt::Error);
            }
            self.buf.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn test_fmt_trace_terminates_lines() {
        let mut sink = FmtTrace::new(String::new());
        sink.trace_line("one").unwrap();
        sink.trace_line("two").unwrap();
        assert_eq!(sink.into_inner(), "one\ntwo\n");
    }

    #[test]
    fn test_fmt_trace_reports_write_failure() {
        let mut sink = FmtTrace::new(Bounded {
            buf: String::new(),
            capacity: 4,
        });
        assert_eq!(sink.trace_line("abc"), Ok(()));
        assert_eq!(sink.trace_line("def"), Err(fmt::Error));
    }

    #[test]
    fn test_log_trace_is_infallible() {
        let mut sink = LogTrace;
        assert!(sink.trace_line("Debug CS: select()").is_ok());
    }
}
