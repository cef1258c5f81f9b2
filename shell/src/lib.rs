//! The shell dispatcher (spec §4.6): thin glue between a line of text and
//! the five core subsystems. Command parsing is intentionally trivial —
//! prefix match plus whitespace split, per spec §1 ("not hard
//! engineering") — grounded line-for-line on the original's
//! `process_command`.
#![no_std]

mod context;
pub mod math;

pub use context::{KernelContext, SHELL_PID};

use core::fmt::Write as _;

use nanokernel_abi::error::KError;
use nanokernel_abi::ids::Pid;
use nanokernel_console::Console;
use nanokernel_fs::FileMode;
use nanokernel_proc::{ProcessState, ThreadState};

/// Yields completed, NUL-terminated input lines — the keyboard
/// collaborator's observable contract (spec §1/§5). Returns `None` between
/// lines; never blocks.
pub trait LineSource {
    fn poll_line(&mut self) -> Option<&str>;
}

/// The ~100 Hz PIT tick collaborator (spec §5): `poll_tick` reports whether
/// a tick has elapsed since the last call, the cooperative scheduling
/// point at which the mainline loop should call `ProcessManager::schedule`.
pub trait TickSource {
    fn poll_tick(&mut self) -> bool;
}

/// Adapts a `&mut dyn Console` to a concrete `core::fmt::Write` so it can be
/// handed to APIs that take `&mut dyn core::fmt::Write` (e.g. `Log::print_all`)
/// without relying on trait-object-to-trait-object upcasting.
struct ConsoleWriter<'a>(&'a mut dyn Console);

impl core::fmt::Write for ConsoleWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0.write_str(s)
    }
}

fn process_state_label(state: ProcessState) -> &'static str {
    match state {
        ProcessState::Running => "RUNNING",
        ProcessState::Ready => "READY",
        ProcessState::Blocked => "BLOCKED",
        ProcessState::Terminated => "TERMINATED",
        // The original's print switch has no case for the transient
        // "just created" state and falls through to its default arm.
        ProcessState::Created => "UNKNOWN",
    }
}

fn thread_state_label(state: ThreadState) -> &'static str {
    match state {
        ThreadState::Running => "RUNNING",
        ThreadState::Ready => "READY",
        ThreadState::Blocked => "BLOCKED",
        ThreadState::Terminated => "TERMINATED",
        ThreadState::Created => "UNKNOWN",
    }
}

/// Dispatches shell command lines against a [`KernelContext`], writing
/// output to a [`Console`].
pub struct Shell<'a> {
    ctx: &'a KernelContext,
}

impl<'a> Shell<'a> {
    pub fn new(ctx: &'a KernelContext) -> Self {
        Self { ctx }
    }

    fn print_processes(&self, console: &mut dyn Console) {
        let _ = writeln!(console, "\n=== Processes and Threads ===");

        // `list_processes` holds the process table lock for its entire
        // callback; snapshot the pids first so the per-process detail calls
        // below (each of which takes the same lock) never nest inside it.
        let mut pids = [None; nanokernel_abi::limits::MAX_PROCESSES];
        let mut count = 0;
        self.ctx.proc.list_processes(|pid, _name, state, thread_count| {
            if count < pids.len() {
                pids[count] = Some((pid, state, thread_count));
                count += 1;
            }
        });

        for &(pid, state, thread_count) in pids.iter().take(count).flatten() {
            let memory_kb = self
                .ctx
                .proc
                .with_process(pid, |_, _, memory_size, _| memory_size / 1024)
                .unwrap_or(0);
            let _ = writeln!(
                console,
                "PID {} | State: {} | Memory: {}KB | Threads: {}",
                pid.0,
                process_state_label(state),
                memory_kb,
                thread_count
            );
            self.ctx.proc.list_threads(pid, |tid, priority, tstate| {
                let _ = writeln!(
                    console,
                    "  TID {} | Priority: {} | State: {}",
                    tid.0,
                    priority,
                    thread_state_label(tstate)
                );
            });
        }
    }

    fn cmd_memstat(&self, console: &mut dyn Console) {
        let stats = self.ctx.heap.stats();
        let usage = if stats.total_size > 0 {
            stats.allocated_size * 100 / stats.total_size
        } else {
            0
        };
        let _ = writeln!(console, "\n=== Memory Statistics ===");
        let _ = writeln!(console, "Total Memory:     {} KB", stats.total_size / 1024);
        let _ = writeln!(console, "Used Memory:      {} KB", stats.allocated_size / 1024);
        let _ = writeln!(console, "Free Memory:      {} KB", stats.free_size / 1024);
        let _ = writeln!(console, "Block Count:      {}", stats.total_blocks);
        let _ = writeln!(console, "Allocations:      {}", stats.allocation_count);
        let _ = writeln!(console, "Frees:            {}", stats.free_count);
        let _ = writeln!(console, "Usage:            {}%", usage);
    }

    fn cmd_procstat(&self, console: &mut dyn Console) {
        let stats = self.ctx.proc.stats();
        let _ = writeln!(console, "\n=== Process & Thread Statistics ===");
        let _ = writeln!(console, "Total Processes:      {}", stats.total_processes);
        let _ = writeln!(console, "Running Processes:    {}", stats.running_processes);
        let _ = writeln!(console, "Ready Processes:      {}", stats.ready_processes);
        let _ = writeln!(console, "Blocked Processes:    {}", stats.blocked_processes);
        let _ = writeln!(console, "Total Threads:        {}", stats.total_threads);
        let _ = writeln!(console, "Ready Threads:        {}", stats.ready_threads);
        let _ = writeln!(console, "Running Threads:      {}", stats.running_threads);
    }

    fn cmd_fsstat(&self, console: &mut dyn Console) {
        let stats = self.ctx.fs.stats();
        let _ = writeln!(console, "\n=== Filesystem Statistics ===");
        let _ = writeln!(console, "Total Files:          {}", stats.total_files);
        let _ = writeln!(console, "Used Files:           {}", stats.used_files);
        let _ = writeln!(console, "Open Files:           {}", stats.open_files);
        let _ = writeln!(console, "Used Space:           {} bytes", stats.used_space);
        let _ = writeln!(console, "Free Space:           {} KB", stats.free_space / 1024);
    }

    fn cmd_ls(&self, console: &mut dyn Console) {
        let _ = writeln!(console, "\n=== Filesystem - Files ===");
        let mut any = false;
        self.ctx.fs.list_files(|name, size| {
            any = true;
            let _ = writeln!(
                console,
                "File: {} | Size: {} | Cap: {}",
                name,
                size,
                nanokernel_abi::limits::MAX_FILE_SIZE
            );
        });
        if !any {
            let _ = writeln!(console, "No files");
        }
    }

    fn cmd_cat(&self, console: &mut dyn Console, filename: &str) {
        let fd = match self.ctx.fs.open(&self.ctx.heap, filename, FileMode::Read, SHELL_PID) {
            Ok(fd) => fd,
            Err(_) => {
                let _ = writeln!(console, "Error: File not found");
                return;
            }
        };

        let mut buf = [0u8; 1023];
        let n = self.ctx.fs.read(fd, &mut buf).unwrap_or(0);
        if n > 0 {
            let text = core::str::from_utf8(&buf[..n]).unwrap_or("");
            console.puts(text);
            let _ = writeln!(console);
        } else {
            let _ = writeln!(console, "Error: Could not read file");
        }
        let _ = self.ctx.fs.close(fd);
    }

    fn cmd_write(&self, console: &mut dyn Console, rest: &str) {
        let (filename, text) = match rest.split_once(' ') {
            Some((name, text)) => (name, text),
            None => (rest, ""),
        };
        let filename = filename.get(..63).unwrap_or(filename);

        let fd = match self.ctx.fs.open(&self.ctx.heap, filename, FileMode::Write, SHELL_PID) {
            Ok(fd) => fd,
            Err(_) => {
                let _ = writeln!(console, "Error: Could not create file");
                return;
            }
        };
        let _ = self.ctx.fs.write(&self.ctx.heap, fd, text.as_bytes());
        let _ = self.ctx.fs.close(fd);
        let _ = writeln!(console, "File written successfully");
    }

    fn cmd_rm(&self, console: &mut dyn Console, filename: &str) {
        match self.ctx.fs.delete(&self.ctx.heap, filename) {
            Ok(()) => {
                let _ = writeln!(console, "File deleted successfully");
            }
            Err(_) => {
                let _ = writeln!(console, "Error: File not found");
            }
        }
    }

    fn cmd_procinfo(&self, console: &mut dyn Console, pid_str: &str) {
        let pid = math::atoi(pid_str);
        if pid < 0 {
            let _ = writeln!(console, "Process not found");
            return;
        }
        let found = self.ctx.proc.with_process(Pid(pid as u32), |_, _, memory_size, thread_count| {
            (memory_size, thread_count)
        });
        match found {
            Some((memory_size, thread_count)) => {
                let _ = writeln!(console, "Process ID: {}", pid);
                let _ = writeln!(console, "Memory: {}KB", memory_size / 1024);
                let _ = writeln!(console, "Threads: {}", thread_count);
            }
            None => {
                let _ = writeln!(console, "Process not found");
            }
        }
    }

    fn cmd_dmesg_all(&self, console: &mut dyn Console) {
        let _ = writeln!(console, "\n=== System Log (dmesg) ===");
        self.ctx.log.print_all(&mut ConsoleWriter(console));
    }

    fn cmd_dmesg_count(&self, console: &mut dyn Console, count_str: &str) {
        let count = math::atoi(count_str);
        if count <= 0 {
            let _ = writeln!(console, "Invalid count");
            return;
        }
        let _ = writeln!(console, "\n=== Recent Log Entries ===");
        self.ctx.log.print_last(count as u32, &mut ConsoleWriter(console));
    }

    fn cmd_top(&self, console: &mut dyn Console) {
        let stats = self.ctx.proc.stats();
        let _ = writeln!(console, "\n=== System Processes (top) ===");
        let _ = writeln!(
            console,
            "Processes: {} | Running: {} | Ready: {}",
            stats.total_processes, stats.running_processes, stats.ready_processes
        );
        let _ = writeln!(
            console,
            "Threads: {} | Running: {} | Ready: {}",
            stats.total_threads, stats.running_threads, stats.ready_threads
        );
        self.print_processes(console);
    }

    fn cmd_help(&self, console: &mut dyn Console) {
        let _ = writeln!(console, "Available Commands:");
        let _ = writeln!(console, "  /pr <text>        - Echo text");
        let _ = writeln!(console, "  /math <expr>      - Calculate math (e.g., /math =2+3)");
        let _ = writeln!(console, "  /memstat          - Show memory statistics");
        let _ = writeln!(console, "  /procstat         - Show process/thread statistics");
        let _ = writeln!(console, "  /proclist         - List all processes and threads");
        let _ = writeln!(console, "  /procinfo <pid>   - Show process info");
        let _ = writeln!(console, "  /fsstat           - Show filesystem statistics");
        let _ = writeln!(console, "  /ls               - List files");
        let _ = writeln!(console, "  /cat <filename>   - Read file contents");
        let _ = writeln!(console, "  /write <file> <text> - Write to file");
        let _ = writeln!(console, "  /rm <filename>    - Delete file");
        let _ = writeln!(console, "  /proc             - View /proc filesystem");
        let _ = writeln!(console, "  top               - Show running processes");
        let _ = writeln!(console, "  dmesg             - Show all kernel logs");
        let _ = writeln!(console, "  dmesg <count>     - Show last N entries");
        let _ = writeln!(console, "  help              - Show this help");
    }

    /// Parse and run one command line, writing its output to `console`.
    pub fn dispatch(&self, console: &mut dyn Console, input: &str) {
        if let Some(expr) = input.strip_prefix("/math ") {
            let expr = expr.strip_prefix('=').unwrap_or(expr);
            match math::evaluate(expr) {
                Some(result) => {
                    let _ = writeln!(console, "Result: {}", result);
                }
                None => {
                    let _ = writeln!(console, "Error: Division by zero or invalid expression");
                }
            }
            return;
        }

        if let Some(text) = input.strip_prefix("/pr ") {
            let _ = writeln!(console, "Echo: {}", text);
            return;
        }
        if input == "/pr" {
            let _ = writeln!(console, "Echo: ");
            return;
        }

        if input == "/memstat" {
            return self.cmd_memstat(console);
        }
        if input == "/procstat" {
            return self.cmd_procstat(console);
        }
        if input == "/proclist" {
            return self.print_processes(console);
        }
        if let Some(pid_str) = input.strip_prefix("/procinfo ") {
            return self.cmd_procinfo(console, pid_str);
        }
        if input == "/fsstat" {
            return self.cmd_fsstat(console);
        }
        if input == "/ls" {
            return self.cmd_ls(console);
        }
        if let Some(filename) = input.strip_prefix("/cat ") {
            return self.cmd_cat(console, filename);
        }
        if let Some(rest) = input.strip_prefix("/write ") {
            return self.cmd_write(console, rest);
        }
        if let Some(filename) = input.strip_prefix("/rm ") {
            return self.cmd_rm(console, filename);
        }
        if input == "/proc" {
            let _ = writeln!(console, "\n=== /proc - Process Information ===");
            return self.print_processes(console);
        }
        if input == "top" {
            return self.cmd_top(console);
        }
        if input == "dmesg" {
            return self.cmd_dmesg_all(console);
        }
        if let Some(count_str) = input.strip_prefix("dmesg ") {
            return self.cmd_dmesg_count(console, count_str);
        }
        if input == "help" {
            return self.cmd_help(console);
        }

        let _ = writeln!(console, "Unknown command: {}", input);
    }
}

/// Errors from core subsystems are never fatal to the shell; this maps a
/// `KError` to the single-line human message spec §7 requires.
pub fn error_line(err: KError) -> &'static str {
    err.message()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanokernel_console::TextConsole;

    struct CapturingConsole {
        inner: TextConsole,
        captured: [u8; 4096],
        len: usize,
    }

    impl CapturingConsole {
        fn new() -> Self {
            Self {
                inner: TextConsole::new(),
                captured: [0u8; 4096],
                len: 0,
            }
        }

        fn as_str(&self) -> &str {
            core::str::from_utf8(&self.captured[..self.len]).unwrap_or("")
        }
    }

    impl core::fmt::Write for CapturingConsole {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let space = self.captured.len() - self.len;
            let take = space.min(s.len());
            self.captured[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
            self.len += take;
            Ok(())
        }
    }

    impl Console for CapturingConsole {
        fn put_char(&mut self, c: u8) {
            self.inner.put_char(c);
            if self.len < self.captured.len() {
                self.captured[self.len] = c;
                self.len += 1;
            }
        }
        fn clear(&mut self) {
            self.inner.clear();
        }
        fn scroll(&mut self) {
            self.inner.scroll();
        }
    }

    fn harness() -> (KernelContext, CapturingConsole) {
        (KernelContext::new(), CapturingConsole::new())
    }

    #[test]
    fn math_left_to_right() {
        let (ctx, mut out) = harness();
        Shell::new(&ctx).dispatch(&mut out, "/math =2+3*4");
        assert_eq!(out.as_str(), "Result: 20\n");
    }

    #[test]
    fn math_division_by_zero() {
        let (ctx, mut out) = harness();
        Shell::new(&ctx).dispatch(&mut out, "/math 5/0");
        assert_eq!(out.as_str(), "Error: Division by zero or invalid expression\n");
    }

    #[test]
    fn pr_echoes_text() {
        let (ctx, mut out) = harness();
        Shell::new(&ctx).dispatch(&mut out, "/pr hello world");
        assert_eq!(out.as_str(), "Echo: hello world\n");
    }

    #[test]
    fn bare_pr_echoes_nothing() {
        let (ctx, mut out) = harness();
        Shell::new(&ctx).dispatch(&mut out, "/pr");
        assert_eq!(out.as_str(), "Echo: \n");
    }

    #[test]
    fn write_then_cat_roundtrips() {
        let (ctx, mut out) = harness();
        let shell = Shell::new(&ctx);
        shell.dispatch(&mut out, "/write greeting.txt hello there");
        assert!(out.as_str().contains("File written successfully"));

        out.len = 0;
        shell.dispatch(&mut out, "/cat greeting.txt");
        assert_eq!(out.as_str(), "hello there\n");
    }

    #[test]
    fn cat_missing_file_reports_error() {
        let (ctx, mut out) = harness();
        Shell::new(&ctx).dispatch(&mut out, "/cat nope.txt");
        assert_eq!(out.as_str(), "Error: File not found\n");
    }

    #[test]
    fn rm_then_rm_again_reports_not_found() {
        let (ctx, mut out) = harness();
        let shell = Shell::new(&ctx);
        shell.dispatch(&mut out, "/write a.txt x");
        out.len = 0;
        shell.dispatch(&mut out, "/rm a.txt");
        assert_eq!(out.as_str(), "File deleted successfully\n");
        out.len = 0;
        shell.dispatch(&mut out, "/rm a.txt");
        assert_eq!(out.as_str(), "Error: File not found\n");
    }

    #[test]
    fn ls_reports_no_files_when_empty() {
        let (ctx, mut out) = harness();
        Shell::new(&ctx).dispatch(&mut out, "/ls");
        assert!(out.as_str().contains("No files"));
    }

    #[test]
    fn procinfo_reports_not_found_for_unknown_pid() {
        let (ctx, mut out) = harness();
        Shell::new(&ctx).dispatch(&mut out, "/procinfo 999");
        assert_eq!(out.as_str(), "Process not found\n");
    }

    #[test]
    fn unknown_command_is_echoed_back() {
        let (ctx, mut out) = harness();
        Shell::new(&ctx).dispatch(&mut out, "/bogus");
        assert_eq!(out.as_str(), "Unknown command: /bogus\n");
    }

    #[test]
    fn help_lists_every_command() {
        let (ctx, mut out) = harness();
        Shell::new(&ctx).dispatch(&mut out, "help");
        assert!(out.as_str().contains("/math <expr>"));
        assert!(out.as_str().contains("dmesg <count>"));
    }

    #[test]
    fn dmesg_with_no_entries_says_so() {
        let (ctx, mut out) = harness();
        Shell::new(&ctx).dispatch(&mut out, "dmesg");
        assert!(out.as_str().contains("No log entries"));
    }

    #[test]
    fn dmesg_invalid_count_is_reported() {
        let (ctx, mut out) = harness();
        Shell::new(&ctx).dispatch(&mut out, "dmesg 0");
        assert_eq!(out.as_str(), "Invalid count\n");
    }
}
