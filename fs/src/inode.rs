use nanokernel_abi::limits::MAX_FILENAME;

#[derive(Clone, Copy)]
pub(crate) struct Inode {
    pub used: bool,
    pub inode_num: u32,
    pub filename: [u8; MAX_FILENAME],
    pub filename_len: u8,
    pub size: u32,
    pub data: Option<*mut u8>,
}

unsafe impl Send for Inode {}

impl Inode {
    pub(crate) fn unused(slot: u32) -> Self {
        Self {
            used: false,
            inode_num: slot,
            filename: [0u8; MAX_FILENAME],
            filename_len: 0,
            size: 0,
            data: None,
        }
    }
}
