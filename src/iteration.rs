//! Iteration lock.
//!
//! Counts open iterations over a table. While the count is non-zero the
//! table refuses structural mutation. The count is a depth, not a flag,
//! so any number of cursors may be open at once.

use core::cell::Cell;

/// Per-table open-iteration counter. Detached cursors call `open`/`close`
/// directly; borrowed iterators hold an `IterationGuard`.
#[derive(Debug, Default)]
pub(crate) struct IterationLock {
    depth: Cell<u32>,
}

impl IterationLock {
    pub(crate) const fn new() -> Self {
        Self {
            depth: Cell::new(0),
        }
    }

    #[inline]
    pub(crate) fn depth(&self) -> u32 {
        self.depth.get()
    }

    #[inline]
    pub(crate) fn open(&self) {
        let d = self.depth.get();
        match d.checked_add(1) {
            Some(n) => self.depth.set(n),
            // Same policy as `Rc`: an overflowing count cannot be recovered from.
            None => std::process::abort(),
        }
    }

    #[inline]
    pub(crate) fn close(&self) {
        let d = self.depth.get();
        assert!(d > 0, "iteration lock released more times than acquired");
        self.depth.set(d - 1);
    }

    /// Open one iteration for the lifetime of the returned guard.
    #[inline]
    pub(crate) fn acquire(&self) -> IterationGuard<'_> {
        self.open();
        IterationGuard { owner: self }
    }
}

/// RAII guard returned by `IterationLock::acquire`.
#[derive(Debug)]
pub(crate) struct IterationGuard<'a> {
    owner: &'a IterationLock,
}

impl Drop for IterationGuard<'_> {
    fn drop(&mut self) {
        self.owner.close();
    }
}
