//! The runnable nanokernel binary: wires the six core subsystems together
//! behind a [`KernelContext`] and drives the shell from a line at a time.
//!
//! Real protected-mode boot (GDT/IDT/PIC/PIT programming, keyboard scancode
//! decode, the VGA text buffer) is out of scope (spec §1) — this binary
//! stands in the host-testable `LineSource`/`TickSource`/`Console`
//! collaborators a bare-metal build would otherwise wire to hardware, using
//! stdin/stdout instead of a serial port and a PIT.

use std::io::{self, Write as _};

use nanokernel_klib::klog::klog_register_backend;
use nanokernel_klog::LogLevel;
use nanokernel_shell::{KernelContext, LineSource, Shell, TickSource};
use nanokernel_console::Console;

/// Reads one line of input per poll. Blocks on stdin, unlike the real
/// keyboard ISR this stands in for — there is no interrupt to wait on here.
struct StdinLineSource {
    buf: String,
}

impl StdinLineSource {
    fn new() -> Self {
        Self { buf: String::new() }
    }
}

impl LineSource for StdinLineSource {
    fn poll_line(&mut self) -> Option<&str> {
        self.buf.clear();
        match io::stdin().read_line(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(self.buf.trim_end_matches(['\n', '\r'])),
            Err(_) => None,
        }
    }
}

/// Fires every 100 polls, standing in for the ~100 Hz PIT tick (spec §5).
struct PollCountTick {
    polls: u32,
}

impl TickSource for PollCountTick {
    fn poll_tick(&mut self) -> bool {
        self.polls = self.polls.wrapping_add(1);
        self.polls % 100 == 0
    }
}

/// Writes straight to stdout; the 80x25 grid model lives in
/// `nanokernel_console::TextConsole` and is exercised by that crate's tests,
/// not re-simulated here.
struct StdoutConsole;

impl core::fmt::Write for StdoutConsole {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        print!("{}", s);
        Ok(())
    }
}

impl Console for StdoutConsole {
    fn put_char(&mut self, c: u8) {
        print!("{}", c as char);
    }

    fn clear(&mut self) {
        print!("\x1B[2J\x1B[H");
    }

    fn scroll(&mut self) {}
}

fn klog_backend(args: core::fmt::Arguments<'_>) {
    println!("[klog] {}", args);
}

#[cfg(feature = "builtin-tests")]
fn run_selftest() {
    let (passed, failed) = nanokernel_tests::run();
    println!("selftest: {} passed, {} failed", passed, failed);
}

#[cfg(not(feature = "builtin-tests"))]
fn run_selftest() {
    println!("selftest: not built into this image (enable the builtin-tests feature)");
}

fn main() {
    klog_register_backend(klog_backend);

    let ctx = KernelContext::new();
    ctx.log.write(LogLevel::Info, "kernel boot");

    let shell = Shell::new(&ctx);
    let mut console = StdoutConsole;
    let mut lines = StdinLineSource::new();
    let mut ticks = PollCountTick { polls: 0 };

    println!("nanokernel ready. type 'help' for commands, 'selftest' to run the built-in test suite, 'exit' to quit.");
    io::stdout().flush().ok();

    loop {
        if ticks.poll_tick() {
            ctx.proc.schedule();
        }

        let line = match lines.poll_line() {
            Some(line) => line.to_string(),
            None => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }
        if line == "selftest" {
            run_selftest();
            continue;
        }

        shell.dispatch(&mut console, line);
        io::stdout().flush().ok();
    }
}
