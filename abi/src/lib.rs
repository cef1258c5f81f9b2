//! Shared ABI surface for the nanokernel workspace: limits, error codes,
//! and the small id newtypes every subsystem trades in.
#![no_std]

pub mod error;
pub mod limits;
pub mod ids;

pub use error::KError;
pub use ids::{Fd, Pid, QueueId, Tid};
