//! Mailbox-style message bus (spec §4.5): one fixed-capacity queue per
//! owning process, addressed by owner pid on send/receive and by an opaque
//! id on create/destroy.
#![no_std]

mod message;
mod stats;


use nanokernel_abi::error::{KError, KResult};
use nanokernel_abi::ids::{Pid, QueueId};
use nanokernel_abi::limits::{MAX_MESSAGES_PER_QUEUE, MAX_MESSAGE_QUEUES, MAX_MESSAGE_SIZE};
use nanokernel_klib::sync::IrqMutex;
use nanokernel_klib::RingBuffer;

pub use message::Message;
pub use stats::IpcStats;

struct Queue {
    used: bool,
    queue_id: QueueId,
    owner_pid: Pid,
    ring: RingBuffer<Message, MAX_MESSAGES_PER_QUEUE>,
}

impl Queue {
    fn empty() -> Self {
        Self {
            used: false,
            queue_id: QueueId::INVALID,
            owner_pid: Pid::INVALID,
            ring: RingBuffer::new(),
        }
    }
}

struct IpcState {
    queues: [Queue; MAX_MESSAGE_QUEUES],
    next_queue_id: u32,
    active_queues: u32,
    total_messages: u32,
    total_sent: u64,
    total_received: u64,
}

impl IpcState {
    fn new() -> Self {
        Self {
            queues: core::array::from_fn(|_| Queue::empty()),
            next_queue_id: 1,
            active_queues: 0,
            total_messages: 0,
            total_sent: 0,
            total_received: 0,
        }
    }

    fn find_by_id(&self, id: QueueId) -> Option<usize> {
        self.queues.iter().position(|q| q.used && q.queue_id == id)
    }

    fn find_by_owner(&self, pid: Pid) -> Option<usize> {
        self.queues.iter().position(|q| q.used && q.owner_pid == pid)
    }
}

/// The kernel-wide mailbox bus singleton.
pub struct MessageBus {
    state: IrqMutex<IpcState>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            state: IrqMutex::new(IpcState::new()),
        }
    }

    pub fn create_queue(&self, owner_pid: Pid) -> KResult<QueueId> {
        let mut state = self.state.lock();
        let slot = state
            .queues
            .iter()
            .position(|q| !q.used)
            .ok_or(KError::ResourceExhausted)?;

        let id = QueueId(state.next_queue_id);
        state.next_queue_id += 1;
        state.queues[slot] = Queue {
            used: true,
            queue_id: id,
            owner_pid,
            ring: RingBuffer::new(),
        };
        state.active_queues += 1;
        Ok(id)
    }

    pub fn destroy_queue(&self, queue_id: QueueId) -> KResult<()> {
        let mut state = self.state.lock();
        let idx = state.find_by_id(queue_id).ok_or(KError::NotFound)?;
        state.queues[idx] = Queue::empty();
        state.active_queues -= 1;
        Ok(())
    }

    pub fn send(&self, from_pid: Pid, to_pid: Pid, data: &[u8]) -> KResult<()> {
        if data.is_empty() || data.len() > MAX_MESSAGE_SIZE {
            return Err(KError::InvalidArgument);
        }
        let mut state = self.state.lock();
        let idx = state.find_by_owner(to_pid).ok_or(KError::NotFound)?;
        let message = Message::new(from_pid, to_pid, 0, data);
        if !state.queues[idx].ring.try_push(message) {
            return Err(KError::ResourceExhausted);
        }
        state.total_sent += 1;
        state.total_messages += 1;
        Ok(())
    }

    pub fn receive(&self, to_pid: Pid) -> KResult<Message> {
        let mut state = self.state.lock();
        let idx = state.find_by_owner(to_pid).ok_or(KError::NotFound)?;
        let message = state.queues[idx].ring.try_pop().ok_or(KError::WouldBlock)?;
        state.total_received += 1;
        Ok(message)
    }

    pub fn queue_exists(&self, queue_id: QueueId) -> bool {
        self.state.lock().find_by_id(queue_id).is_some()
    }

    pub fn stats(&self) -> IpcStats {
        let state = self.state.lock();
        IpcStats {
            total_queues: MAX_MESSAGE_QUEUES as u32,
            active_queues: state.active_queues,
            total_messages: state.total_messages,
            total_sent: state.total_sent,
            total_received: state.total_received,
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
