//! `IrqMutex`: a mutex that disables interrupts while held.
//!
//! The teacher kernel needs a ticket lock here because it is SMP; this
//! kernel is explicitly single-core cooperative (spec §5, Non-goals), so a
//! flag-and-bool lock is enough to give the same observable contract:
//! mutual exclusion between mainline code and the two ISRs, which is all
//! spec §5 actually requires ("disable interrupts around any sequence that
//! reads `current_thread`").

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::cpu;

pub struct IrqMutex<T> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

unsafe impl<T: Send> Send for IrqMutex<T> {}
unsafe impl<T: Send> Sync for IrqMutex<T> {}

pub struct IrqMutexGuard<'a, T> {
    mutex: &'a IrqMutex<T>,
    saved_flags: u32,
}

impl<T> IrqMutex<T> {
    pub const fn new(data: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(data),
        }
    }

    /// Acquire the lock, disabling interrupts for the duration.
    ///
    /// There is no SMP contention to spin against here — on a single core
    /// with interrupts about to be disabled, the only way this could already
    /// be held is a reentrant call from the same mainline flow, which is a
    /// bug in the caller. We still CAS rather than assume, so a reentrant
    /// call deadlock-spins instead of silently aliasing `&mut T`.
    #[inline]
    pub fn lock(&self) -> IrqMutexGuard<'_, T> {
        let saved_flags = cpu::save_flags_cli();
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
        IrqMutexGuard {
            mutex: self,
            saved_flags,
        }
    }

    pub fn try_lock(&self) -> Option<IrqMutexGuard<'_, T>> {
        let saved_flags = cpu::save_flags_cli();
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(IrqMutexGuard {
                mutex: self,
                saved_flags,
            })
        } else {
            cpu::restore_flags(saved_flags);
            None
        }
    }

    /// Forcibly release the lock without a guard.
    ///
    /// # Safety
    /// Only safe when the caller knows no other code is executing with the
    /// lock held — e.g. panic recovery.
    pub unsafe fn force_unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

impl<'a, T> Deref for IrqMutexGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.mutex.data.get() }
    }
}

impl<'a, T> DerefMut for IrqMutexGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.mutex.data.get() }
    }
}

impl<'a, T> Drop for IrqMutexGuard<'a, T> {
    fn drop(&mut self) {
        self.mutex.locked.store(false, Ordering::Release);
        cpu::restore_flags(self.saved_flags);
    }
}
