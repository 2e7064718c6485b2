use std::time::Duration;

use super::*;

fn buf() -> ImageBuffer {
    ImageBuffer::filled(8, 8, [10, 20, 30, 255]).unwrap()
}

fn panicking_worker(
    _buffer: &mut ImageBuffer,
    _kind: FilterKind,
    _progress: &mut dyn FnMut(f32),
    _cancelled: &dyn Fn() -> bool,
) -> StudioResult<RunOutcome> {
    panic!("boom");
}

fn slow_worker(
    buffer: &mut ImageBuffer,
    kind: FilterKind,
    progress: &mut dyn FnMut(f32),
    cancelled: &dyn Fn() -> bool,
) -> StudioResult<RunOutcome> {
    for i in 0..200 {
        if cancelled() {
            return Ok(RunOutcome::Cancelled);
        }
        progress(i as f32 / 200.0);
        std::thread::sleep(Duration::from_millis(5));
    }
    engine::run_rows(buffer, kind, progress, cancelled)
}

#[test]
fn run_returns_filtered_buffer_and_goes_idle() {
    let mut d = FilterDispatcher::new();
    let mut last = 0.0f32;
    let out = d
        .run(buf(), FilterKind::Invert, None, &mut |p| last = p)
        .unwrap();
    let JobOutcome::Finished(out) = out else {
        panic!("expected finished job");
    };
    assert_eq!(out.pixel(0, 0), Some([245, 235, 225, 255]));
    assert_eq!(last, 1.0);
    assert!(d.is_idle());
}

#[test]
fn worker_panic_surfaces_error_and_resets() {
    let mut d = FilterDispatcher::with_worker(panicking_worker);
    let err = d
        .run(buf(), FilterKind::Sepia, None, &mut |_| {})
        .unwrap_err();
    assert!(matches!(err, StudioError::FilterExecution(_)));
    assert!(err.to_string().contains("boom"));
    assert!(d.is_idle());
}

#[test]
fn new_submission_supersedes_running_job() {
    let mut d = FilterDispatcher::with_worker(slow_worker);
    let first = d.submit(buf(), FilterKind::Invert).unwrap();
    let second = d.submit(buf(), FilterKind::RemoveRed).unwrap();
    assert!(second > first);
    assert_eq!(d.active_job(), Some(second));

    let outcome = d.wait(first, None, &mut |_| {}).unwrap();
    assert!(matches!(outcome, JobOutcome::Superseded));

    let outcome = d.wait(second, None, &mut |_| {}).unwrap();
    let JobOutcome::Finished(out) = outcome else {
        panic!("expected the newer job to finish");
    };
    assert_eq!(out.pixel(3, 3), Some([0, 20, 30, 255]));

    // Nothing from the cancelled job leaks out afterwards.
    assert!(d.poll().is_empty());
}

#[test]
fn wait_honors_deadline() {
    let mut d = FilterDispatcher::with_worker(slow_worker);
    let job = d.submit(buf(), FilterKind::Invert).unwrap();
    let outcome = d
        .wait(
            job,
            Some(Instant::now() + Duration::from_millis(20)),
            &mut |_| {},
        )
        .unwrap();
    assert!(matches!(outcome, JobOutcome::TimedOut));
    assert!(!d.is_idle());
    d.cancel();
    assert!(d.is_idle());
}

#[test]
fn poll_delivers_terminal_event_for_active_job() {
    let mut d = FilterDispatcher::new();
    let job = d.submit(buf(), FilterKind::Solarize).unwrap();
    let mut done = false;
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done && Instant::now() < deadline {
        for ev in d.poll() {
            assert_eq!(ev.job(), job);
            if matches!(ev, DispatchEvent::Done { .. }) {
                done = true;
            }
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(done);
    assert!(d.is_idle());
}
