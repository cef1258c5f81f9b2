//! IPC statistics surfaced to the shell (spec §4.6).

#[derive(Clone, Copy, Debug, Default)]
pub struct IpcStats {
    pub total_queues: u32,
    pub active_queues: u32,
    pub total_messages: u32,
    pub total_sent: u64,
    pub total_received: u64,
}
