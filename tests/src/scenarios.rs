//! The six concrete scenarios from spec §8 (S1-S6), each a literal
//! transcription of the sequence of calls the spec describes.

use nanokernel_abi::ids::{Fd, Pid, Tid};
use nanokernel_fs::{FileMode, FileStore};
use nanokernel_heap::Heap;
use nanokernel_ipc::MessageBus;
use nanokernel_klib::testing::TestResult;
use nanokernel_klib::{assert_eq_test, assert_test, pass};
use nanokernel_klog::{Log, LogLevel};
use nanokernel_proc::ProcessManager;

use crate::support::{noop, FixedString};

pub(crate) fn s1_heap_release_then_alloc_reuses_coalesced_block() -> TestResult {
    let heap = Heap::new();
    heap.init();

    let p = heap.alloc(100).unwrap();
    assert_test!(heap.valid_ptr(p));
    assert_test!(heap.guards_ok(p));
    unsafe {
        for i in 0..100u8 {
            core::ptr::write(p.add(i as usize), i);
        }
    }
    heap.release(p);

    let q = heap.alloc(100).unwrap();
    assert_eq_test!(q, p);
    pass!()
}

pub(crate) fn s2_write_close_reopen_read_roundtrips() -> TestResult {
    let heap = Heap::new();
    heap.init();
    let fs = FileStore::new();

    let fd0 = fs.open(&heap, "a", FileMode::Write, Pid(1)).unwrap();
    assert_eq_test!(fs.write(&heap, fd0, b"hello").unwrap(), 5);
    fs.close(fd0).unwrap();

    let fd0 = fs.open(&heap, "a", FileMode::Read, Pid(1)).unwrap();
    let mut buf = [0u8; 16];
    let n = fs.read(fd0, &mut buf).unwrap();
    assert_eq_test!(n, 5);
    assert_test!(&buf[..5] == b"hello");
    pass!()
}

pub(crate) fn s3_close_renumbers_descriptor_under_the_surviving_fd() -> TestResult {
    let heap = Heap::new();
    heap.init();
    let fs = FileStore::new();

    let fd0 = fs.open(&heap, "a", FileMode::Write, Pid(1)).unwrap();
    fs.open(&heap, "b", FileMode::Write, Pid(1)).unwrap();
    fs.close(fd0).unwrap();

    // b was fd1; closing fd0 shifts it down to fd0.
    let renumbered = Fd(0);
    assert_eq_test!(fs.write(&heap, renumbered, b"x").unwrap(), 1);
    fs.close(renumbered).unwrap();
    assert_test!(fs.exists("b"));
    pass!()
}

pub(crate) fn s4_highest_priority_thread_runs_before_the_main_thread() -> TestResult {
    let heap = Heap::new();
    heap.init();
    let pm = ProcessManager::new();

    let pid = pm.create_process(&heap, noop, 4096, "p").unwrap();
    let t_hi = pm.create_thread(&heap, pid, noop, 9).unwrap();
    let t_lo = pm.create_thread(&heap, pid, noop, 1).unwrap();

    let (_, first) = pm.schedule().unwrap();
    assert_eq_test!(first, t_hi);

    let (_, second) = pm.schedule().unwrap();
    assert_eq_test!(second, Tid(1));
    assert_test!(second != t_lo);
    pass!()
}

pub(crate) fn s5_mailbox_receives_in_send_order_then_would_block() -> TestResult {
    let bus = MessageBus::new();
    let receiver = Pid(7);
    bus.create_queue(receiver).unwrap();

    bus.send(Pid(1), receiver, b"A").unwrap();
    bus.send(Pid(1), receiver, b"BB").unwrap();

    let m1 = bus.receive(receiver).unwrap();
    assert_eq_test!(m1.from_pid, Pid(1));
    assert_test!(m1.payload() == b"A");

    let m2 = bus.receive(receiver).unwrap();
    assert_test!(m2.payload() == b"BB");

    assert_test!(bus.receive(receiver).is_err());
    pass!()
}

pub(crate) fn s6_print_last_emits_exactly_the_newest_n_entries() -> TestResult {
    let log = Log::new();
    for i in 1..=266u32 {
        log.write_fmt(LogLevel::Info, format_args!("x{}", i));
    }

    let mut out = FixedString::<256>::new();
    log.print_last(3, &mut out);

    let mut lines = out.as_str().lines();
    assert_test!(lines.next().unwrap_or("").trim_end().ends_with("x264"));
    assert_test!(lines.next().unwrap_or("").trim_end().ends_with("x265"));
    assert_test!(lines.next().unwrap_or("").trim_end().ends_with("x266"));
    assert_test!(lines.next().is_none());
    pass!()
}
