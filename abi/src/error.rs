//! Shared kernel error taxonomy (spec §7). Every fallible core operation
//! returns `Result<T, KError>` internally; the shell is the only place that
//! flattens this back down to a human-readable line.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KError {
    /// Null/absent argument, out-of-range size, unknown id.
    InvalidArgument,
    /// No free inode, descriptor, process, thread, mailbox slot, or heap OOM.
    ResourceExhausted,
    /// File, process, thread, or mailbox lookup came up empty.
    NotFound,
    /// Bounds check failed or a guard sentinel was corrupted.
    Integrity,
    /// Operation would need to block (e.g. receive on an empty mailbox);
    /// there is no blocking primitive, so the caller must retry.
    WouldBlock,
    /// Name already refers to something else (e.g. a descriptor already in use).
    AlreadyExists,
}

impl KError {
    /// Render the way the shell prints it: `Error: <message>`.
    pub fn message(self) -> &'static str {
        match self {
            KError::InvalidArgument => "invalid argument",
            KError::ResourceExhausted => "resource exhausted",
            KError::NotFound => "not found",
            KError::Integrity => "integrity check failed",
            KError::WouldBlock => "would block",
            KError::AlreadyExists => "already exists",
        }
    }
}

impl core::fmt::Display for KError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

pub type KResult<T> = Result<T, KError>;
