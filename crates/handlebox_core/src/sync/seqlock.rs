//! # Sequence Lock
//!
//! Lock-free readers, one writer at a time.
//!
//! This module requires unsafe code: readers look at the protected value
//! through a shared pointer while a writer may be changing it. A reader
//! never *uses* what it saw unless the sequence proves no write overlapped.

#![allow(unsafe_code)]
//!
//! ## Protocol
//!
//! ```text
//!   writer:  seq = 2k+1 ──► mutate ──► seq = 2k+2
//!
//!   reader:  s1 = seq ──► copy out ──► s2 = seq
//!            accept iff s1 == s2 and s1 is even
//! ```
//!
//! Readers must copy what they need out of the closure given to
//! [`SeqLock::read`]. A torn read is discarded and retried, so the closure
//! may run several times and must not have side effects beyond producing its
//! return value.

use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::{fence, AtomicU64, Ordering};

/// A value guarded by a sequence counter.
///
/// Writers are not serialized by the lock itself. Every caller of
/// [`write`](SeqLock::write) must hold some other exclusive guard (a mutex,
/// or `&mut` ownership) for the duration of the call.
pub struct SeqLock<T> {
    /// Even when settled, odd while a write is in progress.
    sequence: AtomicU64,
    data: UnsafeCell<T>,
}

// SAFETY: the value moves with the lock.
unsafe impl<T: Send> Send for SeqLock<T> {}

// SAFETY: shared access only hands out `&T` to readers (which need `T: Sync`)
// and `&mut T` to a writer that the caller has made exclusive (which needs
// `T: Send`).
unsafe impl<T: Send + Sync> Sync for SeqLock<T> {}

/// Bumps the sequence back to even when a write ends, even by unwinding.
struct WriteGuard<'a> {
    sequence: &'a AtomicU64,
    start: u64,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.sequence
            .store(self.start.wrapping_add(2), Ordering::Release);
    }
}

impl<T> SeqLock<T> {
    /// Wraps a value.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            sequence: AtomicU64::new(0),
            data: UnsafeCell::new(value),
        }
    }

    /// Returns the current sequence number. Odd means a write is running.
    #[inline]
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }

    /// Runs `f` on a consistent view of the value and returns its result.
    ///
    /// Spins while a write is in progress and retries if one overlapped.
    pub fn read<R, F>(&self, mut f: F) -> R
    where
        F: FnMut(&T) -> R,
    {
        loop {
            let before = self.sequence.load(Ordering::Acquire);
            if before & 1 == 1 {
                std::hint::spin_loop();
                continue;
            }

            // SAFETY: the pointer is valid for the lifetime of `self`. A
            // concurrent writer may be mutating through it; in that case the
            // sequence check below rejects `result` and it is dropped unused.
            let result = f(unsafe { &*self.data.get() });

            fence(Ordering::Acquire);
            let after = self.sequence.load(Ordering::Relaxed);
            if before == after {
                return result;
            }
        }
    }

    /// Mutates the value, bracketing the change with sequence increments.
    ///
    /// # Safety
    ///
    /// The caller must guarantee that no other `write` or
    /// [`peek`](Self::peek) runs concurrently on this lock, typically by
    /// holding a mutex that every writer takes.
    pub unsafe fn write<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let start = self.sequence.load(Ordering::Relaxed);
        debug_assert!(start & 1 == 0, "overlapping sequence lock writers");
        self.sequence.store(start.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        let _guard = WriteGuard {
            sequence: &self.sequence,
            start,
        };
        // SAFETY: the caller guarantees writer exclusivity; readers never
        // hold on to references past their sequence check.
        f(unsafe { &mut *self.data.get() })
    }

    /// Borrows the value without touching the sequence.
    ///
    /// # Safety
    ///
    /// Same contract as [`write`](Self::write): the caller must hold the
    /// writers' exclusive guard for as long as the returned reference lives.
    #[must_use]
    pub unsafe fn peek(&self) -> &T {
        // SAFETY: with writers excluded, nothing mutates the value.
        unsafe { &*self.data.get() }
    }

    /// Exclusive access through `&mut self`; no sequence bump needed.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Unwraps the value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: Default> Default for SeqLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for SeqLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeqLock")
            .field("sequence", &self.sequence())
            .finish_non_exhaustive()
    }
}
