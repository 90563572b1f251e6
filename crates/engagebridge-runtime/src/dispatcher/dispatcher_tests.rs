#![allow(non_snake_case)]

use super::*;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Task) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let make = move |n: u32| -> Task {
        let sink = sink.clone();
        Box::new(move || sink.lock().push(n))
    };
    (seen, make)
}

fn failing_task() {
    panic!("task failed");
}

// ImmediateDispatcher tests

#[test]
fn ImmediateDispatcher___dispatch___runs_inline() {
    let (seen, task) = recorder();

    ImmediateDispatcher.dispatch(task(1));

    assert_eq!(*seen.lock(), vec![1]);
}

#[test]
fn ImmediateDispatcher___panicking_task___is_contained() {
    let (seen, task) = recorder();

    ImmediateDispatcher.dispatch(Box::new(failing_task));
    ImmediateDispatcher.dispatch(task(2));

    assert_eq!(*seen.lock(), vec![2]);
}

// ManualDispatcher tests

#[test]
fn ManualDispatcher___dispatch___queues_until_drained() {
    let dispatcher = ManualDispatcher::new();
    let (seen, task) = recorder();

    dispatcher.dispatch(task(1));
    dispatcher.dispatch(task(2));

    assert!(seen.lock().is_empty());
    assert_eq!(dispatcher.pending(), 2);
    assert_eq!(dispatcher.run_pending(), 2);
    assert_eq!(*seen.lock(), vec![1, 2]);
}

#[test]
fn ManualDispatcher___task_dispatching_more_work___runs_it_in_same_drain() {
    let dispatcher = Arc::new(ManualDispatcher::new());
    let (seen, task) = recorder();
    let follow_up = task(2);
    let inner = dispatcher.clone();

    dispatcher.dispatch(Box::new(move || inner.dispatch(follow_up)));
    dispatcher.dispatch(task(1));

    assert_eq!(dispatcher.run_pending(), 3);
    assert_eq!(*seen.lock(), vec![1, 2]);
}

// UiThread tests

#[test]
fn UiThread___dispatch___runs_tasks_in_order() {
    let ui = UiThread::spawn("test-ui").unwrap();
    let (seen, task) = recorder();

    for n in 0..100 {
        ui.dispatch(task(n));
    }
    ui.shutdown();

    assert_eq!(*seen.lock(), (0..100).collect::<Vec<_>>());
}

#[test]
fn UiThread___dispatch___runs_on_ui_thread() {
    let ui = Arc::new(UiThread::spawn("test-ui").unwrap());
    let (tx, rx) = std_mpsc::channel();
    let ui_handle = ui.clone();

    ui.dispatch(Box::new(move || {
        let _ = tx.send((ui_handle.is_current(), thread::current().name().map(str::to_owned)));
    }));

    let (on_ui, name) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(on_ui);
    assert_eq!(name.as_deref(), Some("test-ui"));
    assert!(!ui.is_current());
}

#[test]
fn UiThread___dispatch_from_ui_thread___is_queued_behind_current_task() {
    let ui = Arc::new(UiThread::spawn("test-ui").unwrap());
    let (seen, task) = recorder();
    let (tx, rx) = std_mpsc::channel();
    let inner = ui.clone();
    let nested = task(2);
    let first = task(1);

    ui.dispatch(Box::new(move || {
        inner.dispatch(nested);
        first();
        inner.dispatch(Box::new(move || {
            let _ = tx.send(());
        }));
    }));
    rx.recv_timeout(Duration::from_secs(5)).unwrap();

    assert_eq!(*seen.lock(), vec![1, 2]);
}

#[test]
fn UiThread___shutdown___idempotent_and_drops_later_tasks() {
    let ui = UiThread::spawn("test-ui").unwrap();
    let (seen, task) = recorder();

    ui.shutdown();
    ui.shutdown();
    ui.dispatch(task(1));

    assert!(seen.lock().is_empty());
}

#[test]
fn UiThread___panicking_task___keeps_thread_alive() {
    let ui = UiThread::spawn("test-ui").unwrap();
    let (seen, task) = recorder();

    ui.dispatch(Box::new(failing_task));
    ui.dispatch(task(7));
    ui.shutdown();

    assert_eq!(*seen.lock(), vec![7]);
}
