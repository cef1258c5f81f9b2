use super::*;

fn harness() -> (Heap, ProcessManager) {
    let heap = Heap::new();
    heap.init();
    (heap, ProcessManager::new())
}

fn noop() {}

#[test]
fn create_process_starts_ready_with_one_thread() {
    let (heap, pm) = harness();
    let pid = pm.create_process(&heap, noop, 4096, "init").unwrap();
    assert_eq!(pm.process_state(pid), ProcessState::Ready);
    assert_eq!(pm.stats().total_threads, 1);
}

#[test]
fn schedule_returns_the_only_ready_thread_repeatedly() {
    let (heap, pm) = harness();
    let pid = pm.create_process(&heap, noop, 1024, "a").unwrap();
    let first = pm.schedule().unwrap();
    let second = pm.schedule().unwrap();
    assert_eq!(first.0, pid);
    assert_eq!(first, second);
}

#[test]
fn higher_priority_thread_is_scheduled_first() {
    let (heap, pm) = harness();
    let pid = pm.create_process(&heap, noop, 1024, "a").unwrap();
    // main thread has DEFAULT_THREAD_PRIORITY (5); add a higher-priority one.
    let high_tid = pm.create_thread(&heap, pid, noop, 9).unwrap();
    let (_, scheduled_tid) = pm.schedule().unwrap();
    assert_eq!(scheduled_tid, high_tid);
}

#[test]
fn equal_priority_threads_are_fifo_and_rotate() {
    let (heap, pm) = harness();
    let pid = pm.create_process(&heap, noop, 1024, "a").unwrap();
    // Main thread (tid 1, priority 5) is already ready; add two more at 5.
    let t2 = pm.create_thread(&heap, pid, noop, 5).unwrap();
    let t3 = pm.create_thread(&heap, pid, noop, 5).unwrap();

    let first = pm.schedule().unwrap().1;
    let second = pm.schedule().unwrap().1;
    let third = pm.schedule().unwrap().1;
    let fourth = pm.schedule().unwrap().1;
    assert_eq!(first, Tid(1));
    assert_eq!(second, t2);
    assert_eq!(third, t3);
    assert_eq!(fourth, Tid(1), "queue must rotate back to the first thread");
}

#[test]
fn terminate_thread_removes_it_from_the_ready_queue() {
    let (heap, pm) = harness();
    let pid = pm.create_process(&heap, noop, 1024, "a").unwrap();
    let t2 = pm.create_thread(&heap, pid, noop, 5).unwrap();

    pm.terminate_thread(&heap, t2).unwrap();
    assert_eq!(pm.thread_state(t2), ThreadState::Terminated);

    // only the main thread remains ready.
    let scheduled = pm.schedule().unwrap().1;
    assert_eq!(scheduled, Tid(1));
    assert_eq!(pm.schedule().unwrap().1, Tid(1));
}

#[test]
fn terminate_process_terminates_all_its_threads() {
    let (heap, pm) = harness();
    let pid = pm.create_process(&heap, noop, 1024, "a").unwrap();
    let t2 = pm.create_thread(&heap, pid, noop, 5).unwrap();

    pm.terminate_process(&heap, pid).unwrap();
    assert_eq!(pm.process_state(pid), ProcessState::Terminated);
    assert_eq!(pm.thread_state(t2), ThreadState::Terminated);
    assert_eq!(pm.thread_state(Tid(1)), ThreadState::Terminated);
}

#[test]
fn too_many_processes_is_rejected() {
    let (heap, pm) = harness();
    for _ in 0..MAX_PROCESSES {
        pm.create_process(&heap, noop, 256, "p").unwrap();
    }
    assert_eq!(pm.create_process(&heap, noop, 256, "overflow"), Err(KError::ResourceExhausted));
}

#[test]
fn list_threads_reports_every_thread_in_table_order() {
    let (heap, pm) = harness();
    let pid = pm.create_process(&heap, noop, 1024, "a").unwrap();
    let t2 = pm.create_thread(&heap, pid, noop, 3).unwrap();

    let mut seen = [None; 2];
    let mut i = 0;
    pm.list_threads(pid, |tid, priority, state| {
        seen[i] = Some((tid, priority, state));
        i += 1;
    });
    assert_eq!(seen[0], Some((Tid(1), 5, ThreadState::Ready)));
    assert_eq!(seen[1], Some((t2, 3, ThreadState::Ready)));
}

#[test]
fn with_process_exposes_name_state_memory_and_thread_count() {
    let (heap, pm) = harness();
    let pid = pm.create_process(&heap, noop, 4096, "init").unwrap();
    let (name_len, state, memory_size, thread_count) = pm
        .with_process(pid, |name, state, memory_size, thread_count| {
            (name.len(), state, memory_size, thread_count)
        })
        .unwrap();
    assert_eq!(name_len, 4);
    assert_eq!(state, ProcessState::Ready);
    assert_eq!(memory_size, 4096);
    assert_eq!(thread_count, 1);

    assert!(pm.with_process(Pid(999), |_, _, _, _| ()).is_none());
}

#[test]
fn thread_priority_can_be_changed_after_creation() {
    let (heap, pm) = harness();
    let pid = pm.create_process(&heap, noop, 1024, "a").unwrap();
    let t2 = pm.create_thread(&heap, pid, noop, 1).unwrap();
    pm.set_thread_priority(t2, 9).unwrap();
    // Priority is updated for the next time the thread is (re)inserted;
    // its current queue position is not retroactively re-sorted.
    assert_eq!(pm.set_thread_priority(Tid(999), 9), Err(KError::NotFound));
}
