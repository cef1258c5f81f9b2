//! Process and thread manager (spec §4.4): a fixed process table, a
//! flattened thread arena shared by every process, and a single
//! priority-ordered ready queue threaded through the arena by index rather
//! than by pointer (spec §9's re-architecture note — the original's raw
//! `thread_t*` linked list becomes `Option<usize>` links into a fixed
//! array, so there is no per-thread heap allocation and no dangling-pointer
//! hazard on termination).
#![no_std]

mod slots;
mod stats;
mod state;

#[cfg(test)]
mod tests;

use nanokernel_abi::error::{KError, KResult};
use nanokernel_abi::ids::{Pid, Tid};
use nanokernel_abi::limits::{
    DEFAULT_THREAD_PRIORITY, MAX_PROCESSES, MAX_PROCESS_NAME, MAX_THREADS_PER_PROCESS,
    MAX_THREAD_PRIORITY, THREAD_STACK_SIZE,
};
use nanokernel_heap::Heap;
use nanokernel_klib::sync::IrqMutex;

pub use state::{ProcessState, ThreadState};
pub use stats::ProcessStats;

use slots::{ProcessSlot, ThreadSlot};

const THREAD_ARENA_CAPACITY: usize = MAX_PROCESSES * MAX_THREADS_PER_PROCESS;

struct PmState {
    processes: [ProcessSlot; MAX_PROCESSES],
    threads: [ThreadSlot; THREAD_ARENA_CAPACITY],
    next_pid: u32,
    next_tid: u32,
    process_count: u32,
    ready_head: Option<usize>,
    current: Option<usize>,
}

impl PmState {
    fn new() -> Self {
        Self {
            processes: core::array::from_fn(|_| ProcessSlot::unused()),
            threads: core::array::from_fn(|_| ThreadSlot::unused()),
            next_pid: 1,
            next_tid: 1,
            process_count: 0,
            ready_head: None,
            current: None,
        }
    }

    fn find_process(&self, pid: Pid) -> Option<usize> {
        self.processes.iter().position(|p| p.used && p.pid == pid)
    }

    fn find_thread(&self, tid: Tid) -> Option<usize> {
        self.threads.iter().position(|t| t.used && t.tid == tid)
    }

    fn find_free_thread_slot(&self) -> Option<usize> {
        self.threads.iter().position(|t| !t.used)
    }

    /// Insert `idx` into the ready queue, non-increasing by priority, after
    /// the run of entries with priority `>=` its own (FIFO among equals).
    fn insert_ready(&mut self, idx: usize) {
        let priority = self.threads[idx].priority;
        let mut prev = None;
        let mut current = self.ready_head;
        while let Some(c) = current {
            if self.threads[c].priority >= priority {
                prev = Some(c);
                current = self.threads[c].next;
            } else {
                break;
            }
        }
        match prev {
            None => {
                self.threads[idx].next = self.ready_head;
                self.ready_head = Some(idx);
            }
            Some(p) => {
                self.threads[idx].next = current;
                self.threads[p].next = Some(idx);
            }
        }
    }

    fn remove_from_ready(&mut self, idx: usize) {
        if self.ready_head == Some(idx) {
            self.ready_head = self.threads[idx].next;
            self.threads[idx].next = None;
            return;
        }
        let mut current = self.ready_head;
        while let Some(c) = current {
            if self.threads[c].next == Some(idx) {
                self.threads[c].next = self.threads[idx].next;
                self.threads[idx].next = None;
                return;
            }
            current = self.threads[c].next;
        }
    }

    /// Pop the head, rotating it to the tail when another thread follows it
    /// (round-robin within the queue). With a single ready thread, the head
    /// is simply handed back each time. Spec §9, kept for source fidelity.
    fn pop_and_rotate(&mut self) -> Option<usize> {
        let head = self.ready_head?;
        if let Some(next) = self.threads[head].next {
            self.ready_head = Some(next);
            let mut tail = next;
            while let Some(n) = self.threads[tail].next {
                tail = n;
            }
            self.threads[tail].next = Some(head);
            self.threads[head].next = None;
        }
        Some(head)
    }
}

/// The kernel-wide process manager singleton.
pub struct ProcessManager {
    state: IrqMutex<PmState>,
}

impl ProcessManager {
    pub fn new() -> Self {
        Self {
            state: IrqMutex::new(PmState::new()),
        }
    }

    pub fn create_process(&self, heap: &Heap, entry: fn(), memory_size: usize, name: &str) -> KResult<Pid> {
        let mut state = self.state.lock();
        if state.process_count as usize >= MAX_PROCESSES {
            return Err(KError::ResourceExhausted);
        }
        let slot = state
            .processes
            .iter()
            .position(|p| !p.used)
            .ok_or(KError::ResourceExhausted)?;

        let memory = if memory_size > 0 {
            Some(heap.alloc(memory_size).ok_or(KError::ResourceExhausted)?)
        } else {
            None
        };

        let pid = Pid(state.next_pid);
        state.next_pid += 1;

        let mut name_buf = [0u8; MAX_PROCESS_NAME];
        let take = name.len().min(MAX_PROCESS_NAME - 1);
        name_buf[..take].copy_from_slice(&name.as_bytes()[..take]);

        state.processes[slot] = ProcessSlot {
            used: true,
            pid,
            name: name_buf,
            name_len: take as u8,
            state: ProcessState::Created,
            memory,
            memory_size,
            thread_count: 0,
            threads: [None; MAX_THREADS_PER_PROCESS],
        };
        state.process_count += 1;
        drop(state);

        match self.spawn_thread(heap, pid, entry, DEFAULT_THREAD_PRIORITY) {
            Ok(_) => {
                self.state.lock().processes[slot].state = ProcessState::Ready;
                Ok(pid)
            }
            Err(e) => {
                let mut state = self.state.lock();
                if let Some(mem) = memory {
                    heap.release(mem);
                }
                state.processes[slot] = ProcessSlot::unused();
                state.process_count -= 1;
                Err(e)
            }
        }
    }

    /// Create a new thread in `pid`, allocating its stack from `heap` and
    /// inserting it into the ready queue in priority order.
    pub fn create_thread(&self, heap: &Heap, pid: Pid, entry: fn(), priority: u8) -> KResult<Tid> {
        self.spawn_thread(heap, pid, entry, priority)
    }

    fn spawn_thread(&self, heap: &Heap, pid: Pid, entry: fn(), priority: u8) -> KResult<Tid> {
        let stack = heap.alloc(THREAD_STACK_SIZE).ok_or(KError::ResourceExhausted)?;

        let mut state = self.state.lock();
        let proc_idx = match state.find_process(pid) {
            Some(idx) => idx,
            None => {
                drop(state);
                heap.release(stack);
                return Err(KError::NotFound);
            }
        };

        if state.processes[proc_idx].thread_count as usize >= MAX_THREADS_PER_PROCESS {
            drop(state);
            heap.release(stack);
            return Err(KError::ResourceExhausted);
        }
        let Some(thread_idx) = state.find_free_thread_slot() else {
            drop(state);
            heap.release(stack);
            return Err(KError::ResourceExhausted);
        };

        let priority = priority.min(MAX_THREAD_PRIORITY);
        let tid = Tid(state.next_tid);
        state.next_tid += 1;

        state.threads[thread_idx] = ThreadSlot {
            used: true,
            tid,
            pid,
            priority,
            state: ThreadState::Ready,
            entry,
            stack: Some(stack),
            next: None,
        };

        let process = &mut state.processes[proc_idx];
        process.threads[process.thread_count as usize] = Some(thread_idx);
        process.thread_count += 1;

        state.insert_ready(thread_idx);
        Ok(tid)
    }

    pub fn terminate_process(&self, heap: &Heap, pid: Pid) -> KResult<()> {
        let mut state = self.state.lock();
        let proc_idx = state.find_process(pid).ok_or(KError::NotFound)?;

        for slot in 0..state.processes[proc_idx].thread_count as usize {
            if let Some(thread_idx) = state.processes[proc_idx].threads[slot] {
                state.threads[thread_idx].state = ThreadState::Terminated;
                state.remove_from_ready(thread_idx);
                if let Some(stack) = state.threads[thread_idx].stack.take() {
                    heap.release(stack);
                }
            }
        }

        if let Some(mem) = state.processes[proc_idx].memory.take() {
            heap.release(mem);
        }
        state.processes[proc_idx].state = ProcessState::Terminated;
        Ok(())
    }

    pub fn terminate_thread(&self, heap: &Heap, tid: Tid) -> KResult<()> {
        let mut state = self.state.lock();
        let idx = state.find_thread(tid).ok_or(KError::NotFound)?;
        state.threads[idx].state = ThreadState::Terminated;
        state.remove_from_ready(idx);
        if let Some(stack) = state.threads[idx].stack.take() {
            heap.release(stack);
        }
        Ok(())
    }

    pub fn process_state(&self, pid: Pid) -> ProcessState {
        let state = self.state.lock();
        state
            .find_process(pid)
            .map(|idx| state.processes[idx].state)
            .unwrap_or(ProcessState::Terminated)
    }

    pub fn thread_state(&self, tid: Tid) -> ThreadState {
        let state = self.state.lock();
        state
            .find_thread(tid)
            .map(|idx| state.threads[idx].state)
            .unwrap_or(ThreadState::Terminated)
    }

    pub fn set_thread_priority(&self, tid: Tid, priority: u8) -> KResult<()> {
        let mut state = self.state.lock();
        let idx = state.find_thread(tid).ok_or(KError::NotFound)?;
        state.threads[idx].priority = priority.min(MAX_THREAD_PRIORITY);
        Ok(())
    }

    /// Pop and rotate the ready queue, marking the chosen thread `Running`.
    /// Returns `(pid, tid)` of the thread now current, if any is ready.
    pub fn schedule(&self) -> Option<(Pid, Tid)> {
        let mut state = self.state.lock();
        let idx = state.pop_and_rotate()?;
        state.threads[idx].state = ThreadState::Running;
        state.current = Some(idx);
        Some((state.threads[idx].pid, state.threads[idx].tid))
    }

    pub fn current(&self) -> Option<(Pid, Tid)> {
        let state = self.state.lock();
        state.current.map(|idx| (state.threads[idx].pid, state.threads[idx].tid))
    }

    pub fn stats(&self) -> ProcessStats {
        let state = self.state.lock();
        let mut stats = ProcessStats {
            total_processes: state.process_count,
            ..Default::default()
        };

        for process in state.processes.iter().filter(|p| p.used) {
            match process.state {
                ProcessState::Running => stats.running_processes += 1,
                ProcessState::Ready | ProcessState::Created => stats.ready_processes += 1,
                ProcessState::Blocked => stats.blocked_processes += 1,
                ProcessState::Terminated => stats.terminated_processes += 1,
            }
            stats.total_threads += process.thread_count as u32;
            for slot in process.threads.iter().flatten() {
                match state.threads[*slot].state {
                    ThreadState::Ready | ThreadState::Created => stats.ready_threads += 1,
                    ThreadState::Running => stats.running_threads += 1,
                    _ => {}
                }
            }
        }
        stats
    }

    /// List every live process as `(pid, name, state, thread_count)`.
    pub fn list_processes(&self, mut visit: impl FnMut(Pid, &str, ProcessState, u8)) {
        let state = self.state.lock();
        for process in state.processes.iter().filter(|p| p.used) {
            let name = core::str::from_utf8(&process.name[..process.name_len as usize]).unwrap_or("");
            visit(process.pid, name, process.state, process.thread_count);
        }
    }

    /// List every thread belonging to `pid` as `(tid, priority, state)`, in
    /// table order. Used to print the nested thread listing under each
    /// process (`/proclist`, `/proc`, `top`).
    pub fn list_threads(&self, pid: Pid, mut visit: impl FnMut(Tid, u8, ThreadState)) {
        let state = self.state.lock();
        let Some(proc_idx) = state.find_process(pid) else {
            return;
        };
        let process = &state.processes[proc_idx];
        for slot in process.threads.iter().take(process.thread_count as usize).flatten() {
            let thread = &state.threads[*slot];
            visit(thread.tid, thread.priority, thread.state);
        }
    }

    /// Look up a single process's `(name, state, memory_size, thread_count)`
    /// via callback, avoiding a borrow that would outlive the lock.
    pub fn with_process<R>(&self, pid: Pid, f: impl FnOnce(&str, ProcessState, usize, u8) -> R) -> Option<R> {
        let state = self.state.lock();
        let idx = state.find_process(pid)?;
        let process = &state.processes[idx];
        let name = core::str::from_utf8(&process.name[..process.name_len as usize]).unwrap_or("");
        Some(f(name, process.state, process.memory_size, process.thread_count))
    }
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::new()
    }
}
