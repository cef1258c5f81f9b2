//! Interrupt-disable primitive backing [`crate::sync::IrqMutex`].
//!
//! On a real 32-bit x86 target this is `pushfd`/`cli` and `popfd` — the
//! boot/interrupt plumbing that owns the IDT/PIC/PIT is out of scope for
//! this crate (spec §1), so all we need here is the flag save/restore
//! contract. On every other target (host unit tests, `cargo doc`, …) the
//! same contract is modeled with a thread-local-free atomic flag, since the
//! kernel itself is single-core and single-threaded cooperative (spec §5).

#[cfg(target_arch = "x86")]
mod arch {
    use core::arch::asm;

    /// Save EFLAGS and clear the interrupt flag. Returns the saved flags.
    #[inline(always)]
    pub fn save_flags_cli() -> u32 {
        let flags: u32;
        unsafe {
            asm!(
                "pushfd",
                "cli",
                "pop {0}",
                out(reg) flags,
                options(nomem, preserves_flags)
            );
        }
        flags
    }

    /// Restore EFLAGS as previously saved by [`save_flags_cli`].
    #[inline(always)]
    pub fn restore_flags(flags: u32) {
        unsafe {
            asm!("push {0}", "popfd", in(reg) flags, options(nomem));
        }
    }
}

#[cfg(not(target_arch = "x86"))]
mod arch {
    use core::sync::atomic::{AtomicBool, Ordering};

    /// Stand-in for the hardware interrupt flag on non-x86 hosts (tests).
    static INTERRUPTS_ENABLED: AtomicBool = AtomicBool::new(true);

    #[inline(always)]
    pub fn save_flags_cli() -> u32 {
        let was_enabled = INTERRUPTS_ENABLED.swap(false, Ordering::SeqCst);
        was_enabled as u32
    }

    #[inline(always)]
    pub fn restore_flags(flags: u32) {
        INTERRUPTS_ENABLED.store(flags != 0, Ordering::SeqCst);
    }
}

pub use arch::{restore_flags, save_flags_cli};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_restore_round_trips() {
        let flags = save_flags_cli();
        restore_flags(flags);
        // Nesting must not panic or deadlock, only matters on the real
        // hardware path; here we just check it is callable repeatedly.
        let flags2 = save_flags_cli();
        restore_flags(flags2);
    }
}
