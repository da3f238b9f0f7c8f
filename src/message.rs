//! Log arguments and the optional multi-line capability.

use std::fmt;
use std::io::Write;

/// A value that can be passed as the message argument of a log call.
///
/// By default the message is the value's `Display` output. Types that want
/// to stream their text line by line (and have it redacted afterwards)
/// return themselves from [`Loggable::as_multi_line`].
pub trait Loggable: fmt::Display {
    fn as_multi_line(&self) -> Option<&dyn MultiLine> {
        None
    }
}

/// Steps through a multi-line rendering one line per call.
///
/// Each call appends one line (without the trailing newline) to the buffer
/// and returns whether more lines remain.
pub type LinePrinter<'a> = Box<dyn FnMut(&mut Vec<u8>) -> bool + 'a>;

/// Capability for arguments whose message spans several lines.
pub trait MultiLine {
    fn multi_line_printer(&self) -> LinePrinter<'_>;
}

macro_rules! impl_loggable {
    ($($ty:ty),* $(,)?) => {
        $(impl Loggable for $ty {})*
    };
}

impl_loggable!(
    str,
    String,
    char,
    bool,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    serde_json::Value,
    fmt::Arguments<'_>,
    std::io::Error,
    dyn std::error::Error,
    dyn std::error::Error + Send + Sync,
);

impl<T: Loggable + ?Sized> Loggable for &T {
    fn as_multi_line(&self) -> Option<&dyn MultiLine> {
        (**self).as_multi_line()
    }
}

impl<T: Loggable + ?Sized> Loggable for Box<T> {
    fn as_multi_line(&self) -> Option<&dyn MultiLine> {
        (**self).as_multi_line()
    }
}

/// A message made of separate lines, printed through the multi-line path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lines<T>(pub Vec<T>);

impl<T: fmt::Display> fmt::Display for Lines<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl<T: fmt::Display> MultiLine for Lines<T> {
    fn multi_line_printer(&self) -> LinePrinter<'_> {
        let mut lines = self.0.iter().peekable();
        Box::new(move |buf: &mut Vec<u8>| {
            if let Some(line) = lines.next() {
                // Writing into a Vec cannot fail.
                let _ = write!(buf, "{}", line);
            }
            lines.peek().is_some()
        })
    }
}

impl<T: fmt::Display> Loggable for Lines<T> {
    fn as_multi_line(&self) -> Option<&dyn MultiLine> {
        Some(self)
    }
}

impl<T> From<Vec<T>> for Lines<T> {
    fn from(lines: Vec<T>) -> Self {
        Lines(lines)
    }
}
