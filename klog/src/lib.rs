//! The retained system log (spec §4.2): a fixed-capacity ring of formatted
//! entries queryable by the shell's `dmesg` command — distinct from
//! `nanokernel_klib::klog`'s transient print pipe, which every write here
//! also feeds so live trace output and `dmesg` never disagree.
#![no_std]

use core::fmt::Write as _;

use nanokernel_abi::limits::{MAX_LOG_ENTRIES, MAX_LOG_MESSAGE};
use nanokernel_klib::sync::IrqMutex;
use nanokernel_klib::{klog_debug, klog_error, klog_info, klog_warn};
use nanokernel_klib::RingBuffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Debug,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }
}

#[derive(Clone, Copy)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: u32,
    message: [u8; MAX_LOG_MESSAGE],
    len: u16,
}

impl Default for LogEntry {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            timestamp: 0,
            message: [0u8; MAX_LOG_MESSAGE],
            len: 0,
        }
    }
}

impl LogEntry {
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.message[..self.len as usize]).unwrap_or("")
    }
}

/// Fixed-size formatting sink so `write()` can take `core::fmt::Arguments`
/// without touching `alloc`.
struct MessageBuf {
    buf: [u8; MAX_LOG_MESSAGE],
    len: usize,
}

impl core::fmt::Write for MessageBuf {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let space = MAX_LOG_MESSAGE - self.len;
        let take = space.min(s.len());
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

struct LogState {
    ring: RingBuffer<LogEntry, MAX_LOG_ENTRIES>,
    next_timestamp: u32,
}

impl LogState {
    fn new() -> Self {
        Self {
            ring: RingBuffer::new(),
            next_timestamp: 0,
        }
    }

    fn push(&mut self, level: LogLevel, text: &str) {
        let mut message = [0u8; MAX_LOG_MESSAGE];
        let take = text.len().min(MAX_LOG_MESSAGE);
        message[..take].copy_from_slice(&text.as_bytes()[..take]);

        let entry = LogEntry {
            level,
            timestamp: self.next_timestamp,
            message,
            len: take as u16,
        };
        self.next_timestamp = self.next_timestamp.wrapping_add(1);
        self.ring.push_overwrite(entry);
    }
}

/// The kernel-wide log singleton.
pub struct Log {
    state: IrqMutex<LogState>,
}

impl Log {
    pub fn new() -> Self {
        Self {
            state: IrqMutex::new(LogState::new()),
        }
    }

    pub fn write(&self, level: LogLevel, text: &str) {
        self.state.lock().push(level, text);
        match level {
            LogLevel::Info => klog_info!("{}", text),
            LogLevel::Warning => klog_warn!("{}", text),
            LogLevel::Error => klog_error!("{}", text),
            LogLevel::Debug => klog_debug!("{}", text),
        }
    }

    pub fn write_fmt(&self, level: LogLevel, args: core::fmt::Arguments<'_>) {
        let mut buf = MessageBuf {
            buf: [0u8; MAX_LOG_MESSAGE],
            len: 0,
        };
        let _ = buf.write_fmt(args);
        let text = core::str::from_utf8(&buf.buf[..buf.len]).unwrap_or("");
        self.write(level, text);
    }

    pub fn info(&self, text: &str) {
        self.write(LogLevel::Info, text);
    }

    pub fn warning(&self, text: &str) {
        self.write(LogLevel::Warning, text);
    }

    pub fn error(&self, text: &str) {
        self.write(LogLevel::Error, text);
    }

    pub fn debug(&self, text: &str) {
        self.write(LogLevel::Debug, text);
    }

    pub fn clear(&self) {
        self.state.lock().ring.reset();
    }

    pub fn count(&self) -> u32 {
        self.state.lock().ring.len()
    }

    /// Render every retained entry, oldest first, to `out`.
    pub fn print_all(&self, out: &mut dyn core::fmt::Write) {
        let state = self.state.lock();
        if state.ring.is_empty() {
            let _ = writeln!(out, "No log entries");
            return;
        }
        for entry in state.ring.iter_chronological() {
            let _ = writeln!(out, "[{:>5}] {:<5} {}", entry.timestamp, entry.level.label(), entry.message());
        }
    }

    /// Render the most recent `n` entries, oldest-of-the-selection first.
    pub fn print_last(&self, n: u32, out: &mut dyn core::fmt::Write) {
        let state = self.state.lock();
        let total = state.ring.len();
        if total == 0 {
            let _ = writeln!(out, "No log entries");
            return;
        }
        let skip = total.saturating_sub(n);
        for entry in state.ring.iter_chronological().skip(skip as usize) {
            let _ = writeln!(out, "[{:>5}] {:<5} {}", entry.timestamp, entry.level.label(), entry.message());
        }
    }
}

impl Default for Log {
    fn default() -> Self {
        Self::new()
    }
}
