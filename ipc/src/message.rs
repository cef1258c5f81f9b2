use nanokernel_abi::ids::Pid;
use nanokernel_abi::limits::MAX_MESSAGE_SIZE;

#[derive(Clone, Copy)]
pub struct Message {
    pub from_pid: Pid,
    pub to_pid: Pid,
    pub timestamp: u32,
    len: u16,
    data: [u8; MAX_MESSAGE_SIZE],
}

impl Message {
    pub(crate) fn new(from_pid: Pid, to_pid: Pid, timestamp: u32, payload: &[u8]) -> Self {
        let mut data = [0u8; MAX_MESSAGE_SIZE];
        let take = payload.len().min(MAX_MESSAGE_SIZE);
        data[..take].copy_from_slice(&payload[..take]);
        Self {
            from_pid,
            to_pid,
            timestamp,
            len: take as u16,
            data,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

impl Default for Message {
    fn default() -> Self {
        Self {
            from_pid: Pid::INVALID,
            to_pid: Pid::INVALID,
            timestamp: 0,
            len: 0,
            data: [0u8; MAX_MESSAGE_SIZE],
        }
    }
}
