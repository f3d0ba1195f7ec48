//! Single-entry "current frame" slot shared between the delivery thread and
//! the reader.

use parking_lot::Mutex;

/// A value stamped with its arrival order.
#[derive(Debug)]
pub struct Versioned<T> {
    pub seq: u64,
    pub value: T,
}

#[derive(Debug)]
struct SlotState<T> {
    current: Option<Versioned<T>>,
    arrivals: u64,
}

/// Holds at most one frame. Replaced frames are handed back to the caller
/// for disposal outside the lock.
#[derive(Debug)]
pub struct FrameSlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameSlot<T> {
    pub fn new() -> Self {
        Self { state: Mutex::new(SlotState { current: None, arrivals: 0 }) }
    }

    /// Installs `value` as the current frame and returns the previous one.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut state = self.state.lock();
        state.arrivals += 1;
        let seq = state.arrivals;
        state.current.replace(Versioned { seq, value }).map(|old| old.value)
    }

    /// Drops the current frame reference, e.g. when the source is disposed.
    pub fn clear(&self) -> Option<T> {
        self.state.lock().current.take().map(|old| old.value)
    }

    /// Runs `f` against the current frame while holding the lock.
    ///
    /// Frame delivery blocks until `f` returns.
    pub fn with_current<R>(&self, f: impl FnOnce(&Versioned<T>) -> R) -> Option<R> {
        let state = self.state.lock();
        state.current.as_ref().map(f)
    }

    pub fn has_frame(&self) -> bool {
        self.state.lock().current.is_some()
    }

    /// Total frames ever installed.
    pub fn arrivals(&self) -> u64 {
        self.state.lock().arrivals
    }
}
