//! The kernel heap (spec §4.1): a single static byte region carved into a
//! singly linked, address-ordered list of block headers. First-fit
//! allocation, forward+backward coalescing on release, guard bytes around
//! every live payload.
#![no_std]

mod header;
mod stats;


use core::mem::size_of;
use core::ptr;

use nanokernel_abi::limits::{GUARD_SENTINEL, GUARD_SIZE, MEMORY_BLOCK_SIZE, MEMORY_SIZE};
use nanokernel_klib::align_up_usize;
use nanokernel_klib::sync::IrqMutex;

use header::Header;
pub use stats::HeapStats;

const NO_NEXT: u32 = u32::MAX;
const HEADER_SIZE: usize = size_of::<Header>();

/// Largest single allocation the heap will ever hand out, per spec §4.1
/// ("Reject n == 0 or n > MAX_FILE_SIZE") and the original `memory_alloc`
/// (`size > 65536 -> NULL`). A file store write that needs `size + 1` bytes
/// for the trailing NUL fails once `size` reaches `MAX_FILE_SIZE`, matching
/// the original's behavior at that edge rather than growing the ceiling to
/// paper over it.
pub const MAX_ALLOC_SIZE: usize = nanokernel_abi::limits::MAX_FILE_SIZE;

#[repr(align(16))]
struct Pool([u8; MEMORY_SIZE]);

struct HeapState {
    pool: Pool,
    initialized: bool,
    stats: HeapStats,
}

impl HeapState {
    const fn new() -> Self {
        Self {
            pool: Pool([0u8; MEMORY_SIZE]),
            initialized: false,
            stats: HeapStats::zero(),
        }
    }

    fn base_ptr(&mut self) -> *mut u8 {
        self.pool.0.as_mut_ptr()
    }

    fn header_at(&mut self, offset: u32) -> *mut Header {
        unsafe { self.base_ptr().add(offset as usize) as *mut Header }
    }

    fn payload_of(&mut self, offset: u32) -> *mut u8 {
        unsafe { self.base_ptr().add(offset as usize + HEADER_SIZE) }
    }

    /// Offset (into the pool) of the header owning `payload`, or `None` if
    /// `payload` does not point inside this heap's pool at all.
    fn offset_of_payload(&mut self, payload: *mut u8) -> Option<u32> {
        let base = self.base_ptr() as usize;
        let p = payload as usize;
        if p < base + HEADER_SIZE || p > base + MEMORY_SIZE {
            return None;
        }
        let header_addr = p - HEADER_SIZE;
        Some((header_addr - base) as u32)
    }

    fn init(&mut self) {
        self.stats = HeapStats::zero();
        let base = self.base_ptr();
        let root = base as *mut Header;
        unsafe {
            *root = Header {
                size: (MEMORY_SIZE - HEADER_SIZE) as u32,
                capacity: 0,
                is_free: true,
                guard_start: 0,
                next: NO_NEXT,
            };
        }
        self.stats.total_size = (MEMORY_SIZE - HEADER_SIZE) as u64;
        self.stats.free_size = self.stats.total_size;
        self.stats.total_blocks = 1;
        self.stats.free_blocks = 1;
        self.initialized = true;
    }

    fn alloc(&mut self, n: usize) -> Option<*mut u8> {
        if n == 0 || n > MAX_ALLOC_SIZE {
            return None;
        }

        let rounded = align_up_usize(n, MEMORY_BLOCK_SIZE);
        let need = rounded + GUARD_SIZE;
        // rounded >= n always, so the end guard at payload+n always lands
        // inside the need-byte region reserved for this block.
        debug_assert!(n + GUARD_SIZE <= need);

        let mut offset = 0u32;
        loop {
            let header = self.header_at(offset);
            let (is_free, size, next) = unsafe { ((*header).is_free, (*header).size, (*header).next) };
            if is_free && (size as usize) >= need {
                break;
            }
            if next == NO_NEXT {
                return None;
            }
            offset = next;
        }

        let header = self.header_at(offset);
        let old_size = unsafe { (*header).size } as usize;
        let old_next = unsafe { (*header).next };

        if old_size > need + HEADER_SIZE {
            let new_offset = offset + (HEADER_SIZE + need) as u32;
            let new_header = self.header_at(new_offset);
            unsafe {
                *new_header = Header {
                    size: (old_size - need - HEADER_SIZE) as u32,
                    capacity: 0,
                    is_free: true,
                    guard_start: 0,
                    next: old_next,
                };
                (*header).next = new_offset;
                (*header).size = need as u32;
            }
            self.stats.total_blocks += 1;
            self.stats.free_blocks += 1;
        }

        unsafe {
            (*header).is_free = false;
            (*header).capacity = n as u32;
            (*header).guard_start = GUARD_SENTINEL;
        }

        let payload = self.payload_of(offset);
        unsafe {
            ptr::write_unaligned(payload.add(n) as *mut u32, GUARD_SENTINEL);
        }

        self.stats.allocated_size += unsafe { (*header).size } as u64;
        self.stats.allocated_blocks += 1;
        self.stats.free_blocks = self.stats.free_blocks.saturating_sub(1);
        self.stats.allocation_count += 1;
        self.recompute_free_size();

        Some(payload)
    }

    fn release(&mut self, payload: *mut u8) {
        let Some(offset) = self.offset_of_payload(payload) else {
            return;
        };
        let header = self.header_at(offset);
        if unsafe { (*header).is_free } {
            return; // double free: silently ignored, per spec §4.1.
        }

        unsafe {
            (*header).is_free = true;
            self.stats.allocated_size = self.stats.allocated_size.saturating_sub((*header).size as u64);
        }
        self.stats.allocated_blocks = self.stats.allocated_blocks.saturating_sub(1);
        self.stats.free_blocks += 1;
        self.stats.free_count += 1;

        self.coalesce_forward(offset);
        self.coalesce_backward(offset);
        self.recompute_free_size();
    }

    fn coalesce_forward(&mut self, offset: u32) {
        let header = self.header_at(offset);
        let next_offset = unsafe { (*header).next };
        if next_offset == NO_NEXT {
            return;
        }
        let next_header = self.header_at(next_offset);
        if !unsafe { (*next_header).is_free } {
            return;
        }
        let merged_size = unsafe { (*header).size as usize + HEADER_SIZE + (*next_header).size as usize };
        let grand_next = unsafe { (*next_header).next };
        unsafe {
            (*header).size = merged_size as u32;
            (*header).next = grand_next;
        }
        self.stats.total_blocks = self.stats.total_blocks.saturating_sub(1);
        self.stats.free_blocks = self.stats.free_blocks.saturating_sub(1);
    }

    fn coalesce_backward(&mut self, offset: u32) {
        let mut cursor = 0u32;
        loop {
            let header = self.header_at(cursor);
            let next = unsafe { (*header).next };
            if next == offset {
                break;
            }
            if next == NO_NEXT {
                return; // offset is the root header; nothing precedes it.
            }
            cursor = next;
        }

        let prev_header = self.header_at(cursor);
        if !unsafe { (*prev_header).is_free } {
            return;
        }
        let this_header = self.header_at(offset);
        let merged_size =
            unsafe { (*prev_header).size as usize + HEADER_SIZE + (*this_header).size as usize };
        let grand_next = unsafe { (*this_header).next };
        unsafe {
            (*prev_header).size = merged_size as u32;
            (*prev_header).next = grand_next;
        }
        self.stats.total_blocks = self.stats.total_blocks.saturating_sub(1);
        self.stats.free_blocks = self.stats.free_blocks.saturating_sub(1);
    }

    fn recompute_free_size(&mut self) {
        self.stats.free_size = self.stats.total_size.saturating_sub(self.stats.allocated_size);
    }

    fn valid_ptr(&mut self, payload: *mut u8) -> bool {
        self.offset_of_payload(payload).is_some()
    }

    fn bounds_ok(&mut self, payload: *mut u8, offset: usize) -> bool {
        let Some(hdr_offset) = self.offset_of_payload(payload) else {
            return false;
        };
        let header = self.header_at(hdr_offset);
        let capacity = unsafe { (*header).capacity } as usize;
        offset <= capacity
    }

    fn guards_ok(&mut self, payload: *mut u8) -> bool {
        let Some(hdr_offset) = self.offset_of_payload(payload) else {
            return false;
        };
        let header = self.header_at(hdr_offset);
        let (guard_start, capacity, is_free) =
            unsafe { ((*header).guard_start, (*header).capacity as usize, (*header).is_free) };
        if is_free || guard_start != GUARD_SENTINEL {
            return false;
        }
        let end_guard = unsafe { ptr::read_unaligned(payload.add(capacity) as *const u32) };
        end_guard == GUARD_SENTINEL
    }
}

unsafe impl Send for HeapState {}

/// The kernel-wide heap singleton. One per `KernelContext` in production;
/// tests construct their own via [`Heap::new`] for isolation.
pub struct Heap {
    state: IrqMutex<HeapState>,
}

impl Heap {
    pub const fn new() -> Self {
        Self {
            state: IrqMutex::new(HeapState::new()),
        }
    }

    pub fn init(&self) {
        self.state.lock().init();
    }

    pub fn alloc(&self, n: usize) -> Option<*mut u8> {
        let mut state = self.state.lock();
        if !state.initialized {
            return None;
        }
        state.alloc(n)
    }

    pub fn release(&self, payload: *mut u8) {
        if payload.is_null() {
            return;
        }
        let mut state = self.state.lock();
        if !state.initialized {
            return;
        }
        state.release(payload)
    }

    pub fn valid_ptr(&self, payload: *mut u8) -> bool {
        if payload.is_null() {
            return false;
        }
        self.state.lock().valid_ptr(payload)
    }

    pub fn bounds_ok(&self, payload: *mut u8, offset: usize) -> bool {
        if payload.is_null() {
            return false;
        }
        self.state.lock().bounds_ok(payload, offset)
    }

    pub fn guards_ok(&self, payload: *mut u8) -> bool {
        if payload.is_null() {
            return false;
        }
        self.state.lock().guards_ok(payload)
    }

    pub fn stats(&self) -> HeapStats {
        self.state.lock().stats
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
