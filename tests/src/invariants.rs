//! The nine numbered invariants from spec §8, one case per invariant.

use nanokernel_abi::ids::{Fd, Pid, Tid};
use nanokernel_abi::limits::MAX_LOG_ENTRIES;
use nanokernel_fs::{FileMode, FileStore};
use nanokernel_heap::Heap;
use nanokernel_ipc::MessageBus;
use nanokernel_klib::testing::TestResult;
use nanokernel_klib::{assert_eq_test, assert_test, pass};
use nanokernel_klog::{Log, LogLevel};
use nanokernel_proc::ProcessManager;

use crate::support::{noop, FixedString};

pub(crate) fn alloc_within_capacity_never_fails() -> TestResult {
    let heap = Heap::new();
    heap.init();
    for _ in 0..100 {
        assert_test!(heap.alloc(64).is_some());
    }
    pass!()
}

pub(crate) fn release_leaves_no_adjacent_free_blocks() -> TestResult {
    let heap = Heap::new();
    heap.init();
    let x = heap.alloc(64).unwrap();
    let y = heap.alloc(64).unwrap();
    let z = heap.alloc(64).unwrap();

    // Release the middle block first (not adjacent to any other free
    // block), then the two ends: every release should coalesce as far as
    // it can, leaving the whole pool as one free block again.
    heap.release(y);
    heap.release(x);
    heap.release(z);

    let stats = heap.stats();
    assert_eq_test!(stats.total_blocks, 1);
    assert_eq_test!(stats.free_blocks, 1);
    pass!()
}

pub(crate) fn guards_detect_overflow() -> TestResult {
    let heap = Heap::new();
    heap.init();
    let p = heap.alloc(16).unwrap();
    assert_test!(heap.guards_ok(p));

    unsafe {
        for i in 0..16u8 {
            core::ptr::write(p.add(i as usize), i);
        }
    }
    assert_test!(heap.guards_ok(p));

    unsafe {
        core::ptr::write(p.add(16), 0xAA);
    }
    assert_test!(!heap.guards_ok(p));
    pass!()
}

pub(crate) fn file_roundtrip() -> TestResult {
    let heap = Heap::new();
    heap.init();
    let fs = FileStore::new();

    let fd = fs.open(&heap, "round.txt", FileMode::Write, Pid(1)).unwrap();
    assert_eq_test!(fs.write(&heap, fd, b"hello world").unwrap(), 11);
    fs.close(fd).unwrap();

    let fd = fs.open(&heap, "round.txt", FileMode::Read, Pid(1)).unwrap();
    let mut buf = [0u8; 32];
    let n = fs.read(fd, &mut buf).unwrap();
    assert_test!(&buf[..n] == b"hello world");
    pass!()
}

pub(crate) fn delete_is_idempotent() -> TestResult {
    let heap = Heap::new();
    heap.init();
    let fs = FileStore::new();

    let fd = fs.open(&heap, "gone.txt", FileMode::Write, Pid(1)).unwrap();
    fs.close(fd).unwrap();

    assert_test!(fs.delete(&heap, "gone.txt").is_ok());
    assert_test!(fs.delete(&heap, "gone.txt").is_err());
    assert_test!(!fs.exists("gone.txt"));
    pass!()
}

pub(crate) fn descriptor_renumbering() -> TestResult {
    let heap = Heap::new();
    heap.init();
    let fs = FileStore::new();

    let a = fs.open(&heap, "a.txt", FileMode::Write, Pid(1)).unwrap();
    let b = fs.open(&heap, "b.txt", FileMode::Write, Pid(1)).unwrap();
    assert_test!(a.0 < b.0);

    fs.close(a).unwrap();
    let renumbered = Fd(b.0 - 1);
    assert_eq_test!(fs.write(&heap, renumbered, b"x").unwrap(), 1);
    fs.close(renumbered).unwrap();
    assert_test!(fs.exists("b.txt"));
    pass!()
}

pub(crate) fn scheduler_priority_order_and_rotation() -> TestResult {
    let heap = Heap::new();
    heap.init();
    let pm = ProcessManager::new();

    let pid = pm.create_process(&heap, noop, 4096, "sched").unwrap();
    let t_hi_a = pm.create_thread(&heap, pid, noop, 7).unwrap();
    let t_lo = pm.create_thread(&heap, pid, noop, 3).unwrap();
    let t_hi_b = pm.create_thread(&heap, pid, noop, 7).unwrap();

    // Main thread (tid 1) carries the default priority (5). Full priority
    // multiset across the process is {7, 3, 7, 5}; the ready queue orders
    // by priority, FIFO among ties.
    let expected = [t_hi_a, t_hi_b, Tid(1), t_lo];
    for _ in 0..2 {
        for &want in expected.iter() {
            let (_, got) = pm.schedule().unwrap();
            assert_eq_test!(got, want);
        }
    }
    pass!()
}

pub(crate) fn mailbox_fifo() -> TestResult {
    let bus = MessageBus::new();
    let receiver = Pid(3);
    bus.create_queue(receiver).unwrap();

    bus.send(Pid(1), receiver, b"m1").unwrap();
    bus.send(Pid(1), receiver, b"m2").unwrap();
    bus.send(Pid(1), receiver, b"m3").unwrap();

    assert_test!(bus.receive(receiver).unwrap().payload() == b"m1");
    assert_test!(bus.receive(receiver).unwrap().payload() == b"m2");
    assert_test!(bus.receive(receiver).unwrap().payload() == b"m3");
    pass!()
}

pub(crate) fn log_circularity() -> TestResult {
    let log = Log::new();
    for i in 0..(MAX_LOG_ENTRIES as u32 + 10) {
        log.write_fmt(LogLevel::Info, format_args!("e{}", i));
    }
    assert_eq_test!(log.count(), MAX_LOG_ENTRIES as u32);

    let mut out = FixedString::<4096>::new();
    log.print_all(&mut out);

    // The first 10 writes (e0..e9) were overwritten; the oldest surviving
    // entry is e10.
    let first_line = out.as_str().lines().next().unwrap_or("");
    assert_test!(first_line.trim_end().ends_with("e10"));
    pass!()
}
