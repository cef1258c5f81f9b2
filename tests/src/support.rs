//! Shared fixed-capacity string sink for cases that need to inspect
//! formatted output (log entries, `dmesg`-style rendering) without `alloc`.

pub(crate) struct FixedString<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> FixedString<N> {
    pub(crate) fn new() -> Self {
        Self { buf: [0u8; N], len: 0 }
    }

    pub(crate) fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }
}

impl<const N: usize> core::fmt::Write for FixedString<N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let space = N - self.len;
        let take = space.min(s.len());
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

/// A thread/process entry point that does nothing; every scenario here
/// exercises bookkeeping, never real execution.
pub(crate) fn noop() {}
