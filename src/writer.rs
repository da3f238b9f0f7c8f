use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// In-memory destination that can be cloned and read back.
///
/// Useful in tests and for embedding the output in another process that
/// collects records itself. All clones share the same bytes.
#[derive(Clone, Debug, Default)]
pub struct SharedWriter {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }

    /// Written bytes split into lines, lossily decoded.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.bytes.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
