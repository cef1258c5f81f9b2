//! The kernel context: the single struct that owns one instance of every
//! core singleton, per spec §9's re-architecture pointer ("expose them
//! through a single kernel context struct with an initialization phase").

use nanokernel_abi::ids::Pid;
use nanokernel_fs::FileStore;
use nanokernel_heap::Heap;
use nanokernel_ipc::MessageBus;
use nanokernel_klog::Log;
use nanokernel_proc::ProcessManager;

/// The pid the shell uses for its own file operations, matching the
/// original's literal `fs_open(filename, mode, 0)` — the shell itself is
/// not a scheduled process, so it borrows the sentinel "no owner" pid.
pub const SHELL_PID: Pid = Pid(0);

pub struct KernelContext {
    pub heap: Heap,
    pub log: Log,
    pub fs: FileStore,
    pub ipc: MessageBus,
    pub proc: ProcessManager,
}

impl KernelContext {
    pub fn new() -> Self {
        let heap = Heap::new();
        heap.init();
        Self {
            heap,
            log: Log::new(),
            fs: FileStore::new(),
            ipc: MessageBus::new(),
            proc: ProcessManager::new(),
        }
    }
}

impl Default for KernelContext {
    fn default() -> Self {
        Self::new()
    }
}
