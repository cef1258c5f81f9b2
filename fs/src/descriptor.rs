use nanokernel_abi::ids::Pid;
use nanokernel_abi::limits::MAX_FILENAME;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
    Append,
}

#[derive(Clone, Copy)]
pub(crate) struct Descriptor {
    pub open: bool,
    pub inode_idx: usize,
    pub filename: [u8; MAX_FILENAME],
    pub filename_len: u8,
    pub owner_pid: Pid,
    pub mode: FileMode,
    pub read_pos: u32,
    pub write_pos: u32,
}

impl Descriptor {
    pub(crate) const EMPTY: Descriptor = Descriptor {
        open: false,
        inode_idx: 0,
        filename: [0u8; MAX_FILENAME],
        filename_len: 0,
        owner_pid: Pid::INVALID,
        mode: FileMode::Read,
        read_pos: 0,
        write_pos: 0,
    };
}
