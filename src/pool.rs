use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, OnceLock};

/// Largest capacity, in bytes, a buffer may have and still be taken back
/// by the pool. Sized for a typical single log line.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 768;

/// Default number of idle buffers a pool keeps.
pub const DEFAULT_MAX_IDLE: usize = 256;

static BUFFER_POOL: OnceLock<Arc<BufferPool>> = OnceLock::new();

/// Process-wide pool shared by every [`JsonOutput`](crate::json_output::JsonOutput)
/// that was not given its own.
pub fn buffer_pool() -> Arc<BufferPool> {
    BUFFER_POOL
        .get_or_init(|| Arc::new(BufferPool::new(DEFAULT_MAX_BUFFER_SIZE)))
        .clone()
}

/// Thread-safe pool of reusable byte buffers.
///
/// Fresh buffers are allocated with `max_buffer_size` capacity. A buffer
/// that grew past that capacity while in use is refused on release and
/// simply dropped, so one oversized log line never inflates the memory the
/// pool keeps around. At most `max_idle` buffers are kept; extra ones are
/// dropped on release, so a burst of concurrent logging does not pin its
/// peak buffer count forever.
#[derive(Debug)]
pub struct BufferPool {
    max_buffer_size: usize,
    max_idle: usize,
    idle: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    pub fn new(max_buffer_size: usize) -> Self {
        Self {
            max_buffer_size,
            max_idle: DEFAULT_MAX_IDLE,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Limit on idle buffers kept for reuse.
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }

    pub fn max_idle(&self) -> usize {
        self.max_idle
    }

    /// Capacity threshold above which released buffers are dropped.
    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    /// Number of buffers currently waiting for reuse.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Take an empty buffer, reusing an idle one when available. Never blocks
    /// on anything but the short critical section around the idle list.
    pub fn acquire(&self) -> Vec<u8> {
        self.idle
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.max_buffer_size))
    }

    /// Hand a buffer back to the pool.
    ///
    /// **Returns**
    /// - `true` if the buffer was cleared and kept for reuse.
    /// - `false` if its capacity exceeds the threshold or the pool already
    ///   holds `max_idle` buffers; the buffer is dropped.
    pub fn release(&self, mut buf: Vec<u8>) -> bool {
        if buf.capacity() > self.max_buffer_size {
            return false;
        }
        buf.clear();
        let mut idle = self.idle.lock();
        if idle.len() >= self.max_idle {
            return false;
        }
        idle.push(buf);
        true
    }

    /// Acquire a buffer that is released automatically when the guard goes
    /// out of scope, including on early returns.
    pub fn scoped(&self) -> PooledBuffer<'_> {
        PooledBuffer {
            pool: self,
            buf: self.acquire(),
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BUFFER_SIZE)
    }
}

/// Buffer borrowed from a [`BufferPool`] for the duration of a scope.
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
