use nanokernel_abi::ids::{Pid, Tid};
use nanokernel_abi::limits::{MAX_PROCESS_NAME, MAX_THREADS_PER_PROCESS};

use crate::state::{ProcessState, ThreadState};

/// An arena entry in the thread table. `next` is the ready-queue link
/// (index-based, not a pointer) — see spec §9's re-architecture note.
pub(crate) struct ThreadSlot {
    pub used: bool,
    pub tid: Tid,
    pub pid: Pid,
    pub priority: u8,
    pub state: ThreadState,
    pub entry: fn(),
    pub stack: Option<*mut u8>,
    pub next: Option<usize>,
}

unsafe impl Send for ThreadSlot {}

impl ThreadSlot {
    pub(crate) fn unused() -> Self {
        Self {
            used: false,
            tid: Tid::INVALID,
            pid: Pid::INVALID,
            priority: 0,
            state: ThreadState::Terminated,
            entry: noop_entry,
            stack: None,
            next: None,
        }
    }
}

fn noop_entry() {}

pub(crate) struct ProcessSlot {
    pub used: bool,
    pub pid: Pid,
    pub name: [u8; MAX_PROCESS_NAME],
    pub name_len: u8,
    pub state: ProcessState,
    pub memory: Option<*mut u8>,
    pub memory_size: usize,
    pub thread_count: u8,
    pub threads: [Option<usize>; MAX_THREADS_PER_PROCESS],
}

unsafe impl Send for ProcessSlot {}

impl ProcessSlot {
    pub(crate) fn unused() -> Self {
        Self {
            used: false,
            pid: Pid::INVALID,
            name: [0u8; MAX_PROCESS_NAME],
            name_len: 0,
            state: ProcessState::Terminated,
            memory: None,
            memory_size: 0,
            thread_count: 0,
            threads: [None; MAX_THREADS_PER_PROCESS],
        }
    }
}
