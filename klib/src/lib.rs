//! Support library shared by every kernel-core crate: the interrupt-disabling
//! mutex, the fixed-capacity ring buffer, the klog print pipe, and alignment
//! helpers. Mirrors the role `slopos-lib` plays for the teacher kernel, cut
//! down to what a single-core cooperative kernel needs.
#![no_std]

pub mod alignment;
pub mod cpu;
pub mod klog;
pub mod ring_buffer;
pub mod sync;
pub mod testing;

pub use alignment::{align_down_usize, align_up_usize};
pub use ring_buffer::RingBuffer;
pub use sync::IrqMutex;
