//! Small newtypes over `u32` for the id-like quantities passed across
//! subsystem boundaries. Kept as thin wrappers (not bitflags-worthy, not
//! arena handles) — see `nanokernel_proc` for the arena handle types used
//! internally by the scheduler.

/// Process id. `0` is never assigned to a real process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid(pub u32);

/// Thread id. `0` is never assigned to a real thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tid(pub u32);

/// Mailbox id. `0` means "no queue" / failure, per spec §4.5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueueId(pub u32);

/// Open file descriptor index, dense over `0..open_count` (spec §4.3). Not
/// stable across a `close` of a lower-numbered descriptor — the table
/// shifts down to close the hole.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fd(pub u32);

impl QueueId {
    pub const INVALID: QueueId = QueueId(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl Pid {
    pub const INVALID: Pid = Pid(0);
}

impl Tid {
    pub const INVALID: Tid = Tid(0);
}
