//! In-memory file store (spec §4.3): a fixed inode table plus a dense,
//! shift-on-close descriptor table, with file data backed by
//! `nanokernel_heap::Heap` allocations rather than its own arena.
#![no_std]

mod inode;
mod descriptor;
mod stats;


use nanokernel_abi::error::{KError, KResult};
use nanokernel_abi::ids::{Fd, Pid};
use nanokernel_abi::limits::{MAX_FILENAME, MAX_FILES};
use nanokernel_heap::Heap;
use nanokernel_klib::sync::IrqMutex;

pub use descriptor::FileMode;
pub use stats::FsStats;

use descriptor::Descriptor;
use inode::Inode;

fn copy_name(src: &str) -> ([u8; MAX_FILENAME], u8) {
    let mut buf = [0u8; MAX_FILENAME];
    let take = src.len().min(MAX_FILENAME - 1);
    buf[..take].copy_from_slice(&src.as_bytes()[..take]);
    (buf, take as u8)
}

fn name_eq(buf: &[u8; MAX_FILENAME], len: u8, other: &str) -> bool {
    &buf[..len as usize] == other.as_bytes()
}

struct FsState {
    inodes: [Inode; MAX_FILES],
    next_inode_num: u32,
    used_inodes: u32,
    descriptors: [Descriptor; MAX_FILES],
    open_count: u32,
}

impl FsState {
    fn new() -> Self {
        Self {
            inodes: core::array::from_fn(|i| Inode::unused(i as u32)),
            next_inode_num: 1,
            used_inodes: 0,
            descriptors: [Descriptor::EMPTY; MAX_FILES],
            open_count: 0,
        }
    }

    fn find_inode(&self, filename: &str) -> Option<usize> {
        self.inodes
            .iter()
            .position(|inode| inode.used && name_eq(&inode.filename, inode.filename_len, filename))
    }

    fn find_free_inode(&self) -> Option<usize> {
        self.inodes.iter().position(|inode| !inode.used)
    }
}

/// The kernel-wide file store singleton.
pub struct FileStore {
    state: IrqMutex<FsState>,
}

impl FileStore {
    pub fn new() -> Self {
        Self {
            state: IrqMutex::new(FsState::new()),
        }
    }

    pub fn open(&self, heap: &Heap, filename: &str, mode: FileMode, pid: Pid) -> KResult<Fd> {
        if filename.is_empty() || filename.len() >= MAX_FILENAME {
            return Err(KError::InvalidArgument);
        }

        let mut state = self.state.lock();
        if state.open_count as usize >= MAX_FILES {
            return Err(KError::ResourceExhausted);
        }

        let inode_idx = match mode {
            FileMode::Read => state.find_inode(filename).ok_or(KError::NotFound)?,
            FileMode::Write | FileMode::Append => match state.find_inode(filename) {
                Some(idx) => {
                    if mode == FileMode::Write {
                        let inode = &mut state.inodes[idx];
                        if let Some(data) = inode.data.take() {
                            heap.release(data);
                        }
                        inode.size = 0;
                    }
                    idx
                }
                None => {
                    let idx = state.find_free_inode().ok_or(KError::ResourceExhausted)?;
                    let (name, len) = copy_name(filename);
                    let inode_num = state.next_inode_num;
                    state.next_inode_num += 1;
                    state.inodes[idx] = Inode {
                        used: true,
                        inode_num,
                        filename: name,
                        filename_len: len,
                        size: 0,
                        data: None,
                    };
                    state.used_inodes += 1;
                    idx
                }
            },
        };

        let inode = &state.inodes[inode_idx];
        let write_pos = if mode == FileMode::Append { inode.size } else { 0 };
        let (name, len) = copy_name(filename);

        let slot = state.open_count as usize;
        state.descriptors[slot] = Descriptor {
            open: true,
            inode_idx,
            filename: name,
            filename_len: len,
            owner_pid: pid,
            mode,
            read_pos: 0,
            write_pos,
        };
        state.open_count += 1;

        Ok(Fd(slot as u32))
    }

    pub fn close(&self, fd: Fd) -> KResult<()> {
        let mut state = self.state.lock();
        let idx = fd.0 as usize;
        if idx >= state.open_count as usize {
            return Err(KError::InvalidArgument);
        }

        for i in idx..(state.open_count as usize - 1) {
            state.descriptors[i] = state.descriptors[i + 1];
        }
        state.open_count -= 1;
        state.descriptors[state.open_count as usize] = Descriptor::EMPTY;
        Ok(())
    }

    pub fn read(&self, fd: Fd, buf: &mut [u8]) -> KResult<usize> {
        let mut state = self.state.lock();
        let idx = fd.0 as usize;
        if idx >= state.open_count as usize {
            return Err(KError::InvalidArgument);
        }
        let inode_idx = state.descriptors[idx].inode_idx;
        let size = state.inodes[inode_idx].size;
        let read_pos = state.descriptors[idx].read_pos;

        if read_pos > size {
            return Err(KError::Integrity);
        }
        if read_pos >= size {
            return Ok(0);
        }

        let remaining = (size - read_pos) as usize;
        let to_read = buf.len().min(remaining);
        let data = state.inodes[inode_idx].data.ok_or(KError::Integrity)?;

        unsafe {
            core::ptr::copy_nonoverlapping(data.add(read_pos as usize), buf.as_mut_ptr(), to_read);
        }
        state.descriptors[idx].read_pos += to_read as u32;
        Ok(to_read)
    }

    pub fn write(&self, heap: &Heap, fd: Fd, data: &[u8]) -> KResult<usize> {
        let mut state = self.state.lock();
        let idx = fd.0 as usize;
        if idx >= state.open_count as usize {
            return Err(KError::InvalidArgument);
        }

        let write_pos = state.descriptors[idx].write_pos;
        let needed = write_pos as u64 + data.len() as u64;
        if needed > nanokernel_abi::limits::MAX_FILE_SIZE as u64 {
            return Err(KError::ResourceExhausted);
        }
        let needed = needed as u32;

        let inode_idx = state.descriptors[idx].inode_idx;
        let current_size = state.inodes[inode_idx].size;

        if needed > current_size {
            let new_buf = heap
                .alloc(needed as usize + 1)
                .ok_or(KError::ResourceExhausted)?;
            if let Some(old) = state.inodes[inode_idx].data {
                if current_size > 0 {
                    unsafe {
                        core::ptr::copy_nonoverlapping(old, new_buf, current_size as usize);
                    }
                }
                heap.release(old);
            }
            state.inodes[inode_idx].data = Some(new_buf);
            state.inodes[inode_idx].size = needed;
        }

        let buf = state.inodes[inode_idx].data.ok_or(KError::Integrity)?;
        unsafe {
            core::ptr::copy_nonoverlapping(data.as_ptr(), buf.add(write_pos as usize), data.len());
        }
        // The backing allocation is always sized needed+1, so there is room
        // for a trailing NUL right after the newly written content, keeping
        // the buffer printable as a C string (spec §4.3).
        unsafe {
            *buf.add(needed as usize) = 0;
        }
        state.descriptors[idx].write_pos += data.len() as u32;
        Ok(data.len())
    }

    /// Delete a file by name. Two-pass: first collect every open descriptor
    /// index referring to it, then close them from highest index to lowest,
    /// so the shift-on-close compaction never skips an index that hadn't
    /// been visited yet (spec §9, resolved open question).
    pub fn delete(&self, heap: &Heap, filename: &str) -> KResult<()> {
        let mut state = self.state.lock();
        let inode_idx = state.find_inode(filename).ok_or(KError::NotFound)?;
        let inode_num = state.inodes[inode_idx].inode_num;

        let mut to_close = [0u32; MAX_FILES];
        let mut to_close_count = 0;
        for i in 0..state.open_count as usize {
            if state.inodes[state.descriptors[i].inode_idx].inode_num == inode_num {
                to_close[to_close_count] = i as u32;
                to_close_count += 1;
            }
        }
        drop(state);

        for i in (0..to_close_count).rev() {
            let _ = self.close(Fd(to_close[i]));
        }

        let mut state = self.state.lock();
        if let Some(data) = state.inodes[inode_idx].data.take() {
            heap.release(data);
        }
        state.inodes[inode_idx] = Inode::unused(inode_idx as u32);
        state.used_inodes = state.used_inodes.saturating_sub(1);
        Ok(())
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.state.lock().find_inode(filename).is_some()
    }

    pub fn filesize(&self, filename: &str) -> Option<u32> {
        let state = self.state.lock();
        state.find_inode(filename).map(|idx| state.inodes[idx].size)
    }

    pub fn stats(&self) -> FsStats {
        let state = self.state.lock();
        let used_space: u64 = state.inodes.iter().filter(|i| i.used).map(|i| i.size as u64).sum();
        let total_space = MAX_FILES as u64 * nanokernel_abi::limits::MAX_FILE_SIZE as u64;
        FsStats {
            total_files: MAX_FILES as u32,
            used_files: state.used_inodes,
            open_files: state.open_count,
            total_space,
            used_space,
            free_space: total_space.saturating_sub(used_space),
        }
    }

    /// List every used file as `(name, size)` pairs, via callback to avoid
    /// pulling in `alloc`.
    pub fn list_files(&self, mut visit: impl FnMut(&str, u32)) {
        let state = self.state.lock();
        for inode in state.inodes.iter().filter(|i| i.used) {
            let name = core::str::from_utf8(&inode.filename[..inode.filename_len as usize]).unwrap_or("");
            visit(name, inode.size);
        }
    }

    /// Read a line (stopping at `\0` or `\n`, not included) into `buf`,
    /// returning the number of bytes read (spec §4.3 `io_read_string`).
    pub fn read_line(&self, fd: Fd, buf: &mut [u8]) -> KResult<usize> {
        let mut pos = 0;
        let mut byte = [0u8; 1];
        while pos + 1 < buf.len() {
            let n = self.read(fd, &mut byte)?;
            if n == 0 || byte[0] == 0 || byte[0] == b'\n' {
                break;
            }
            buf[pos] = byte[0];
            pos += 1;
        }
        Ok(pos)
    }

    pub fn write_line(&self, heap: &Heap, fd: Fd, text: &str) -> KResult<usize> {
        self.write(heap, fd, text.as_bytes())
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}
