//! Scoped flags for the network's reentrancy and feedback guards.

use std::cell::Cell;

/// Sets a flag for the lifetime of the guard and restores the previous
/// value on drop, including when the scope unwinds.
#[must_use = "the flag is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopedFlag<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> ScopedFlag<'a> {
    /// Set `flag` to `value` until the guard is dropped.
    pub fn set(flag: &'a Cell<bool>, value: bool) -> Self {
        let previous = flag.replace(value);
        Self { flag, previous }
    }

    /// Value the flag will be restored to.
    pub fn previous(&self) -> bool {
        self.previous
    }
}

impl Drop for ScopedFlag<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}
