//! ABI limits. Every fixed-capacity table in the kernel core is sized from
//! one of these constants — see spec §6.

pub const MAX_FILES: usize = 32;
pub const MAX_FILENAME: usize = 64;
pub const MAX_FILE_SIZE: usize = 65536;

pub const MAX_PROCESSES: usize = 8;
pub const MAX_THREADS_PER_PROCESS: usize = 4;
pub const THREAD_STACK_SIZE: usize = 4096;
pub const MAX_PROCESS_NAME: usize = 32;

pub const MAX_MESSAGE_QUEUES: usize = 8;
pub const MAX_MESSAGES_PER_QUEUE: usize = 32;
pub const MAX_MESSAGE_SIZE: usize = 256;

pub const MAX_LOG_ENTRIES: usize = 256;
pub const MAX_LOG_MESSAGE: usize = 128;

pub const MEMORY_SIZE: usize = 0x100000;
pub const MEMORY_BLOCK_SIZE: usize = 16;
pub const GUARD_SIZE: usize = 4;
pub const GUARD_SENTINEL: u32 = 0xDEAD_BEEF;

pub const DEFAULT_THREAD_PRIORITY: u8 = 5;
pub const MAX_THREAD_PRIORITY: u8 = 10;

pub const CONSOLE_WIDTH: usize = 80;
pub const CONSOLE_HEIGHT: usize = 25;
pub const CONSOLE_ATTR_DEFAULT: u8 = 0x0F;
