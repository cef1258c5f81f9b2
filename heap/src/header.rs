//! Block header layout, stored inline at the front of every block in the
//! pool. `next` is an offset into the pool rather than a raw pointer, so the
//! list stays valid regardless of where the pool itself is mapped.

#[repr(C)]
pub(crate) struct Header {
    /// Bytes in this block after the header: the rounded payload region
    /// plus its end guard.
    pub size: u32,
    /// Bytes actually requested by the caller (`<=` the rounded region).
    /// Zero while the block is free.
    pub capacity: u32,
    pub is_free: bool,
    pub guard_start: u32,
    pub next: u32,
}
