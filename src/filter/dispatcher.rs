//! Off-thread filter execution with at most one job in flight.
//!
//! Every submission gets a fresh [`JobId`]. Submitting while a job is still running cancels and
//! joins the old worker before the new one starts. Events from superseded jobs can still be
//! sitting in the channel; they are dropped by comparing job ids, never delivered.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use crate::filter::engine::{self, RunOutcome};
use crate::filter::kind::FilterKind;
use crate::foundation::buffer::ImageBuffer;
use crate::foundation::error::{StudioError, StudioResult};

/// Identifier of one submitted filter job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

/// Event emitted by a worker.
#[derive(Debug)]
pub enum DispatchEvent {
    /// Fractional progress in `[0, 1]`.
    Progress {
        /// Job the event belongs to.
        job: JobId,
        /// Completed fraction.
        fraction: f32,
    },
    /// Terminal success with the transformed buffer.
    Done {
        /// Job the event belongs to.
        job: JobId,
        /// Filtered pixels.
        buffer: ImageBuffer,
    },
    /// Terminal failure inside the worker.
    Failed {
        /// Job the event belongs to.
        job: JobId,
        /// Human-readable fault description.
        message: String,
    },
}

impl DispatchEvent {
    /// Job this event belongs to.
    pub fn job(&self) -> JobId {
        match self {
            DispatchEvent::Progress { job, .. }
            | DispatchEvent::Done { job, .. }
            | DispatchEvent::Failed { job, .. } => *job,
        }
    }
}

/// Result of [`FilterDispatcher::wait`].
#[derive(Debug)]
pub enum JobOutcome {
    /// The job finished and produced a buffer.
    Finished(ImageBuffer),
    /// The deadline passed before the job finished. The job keeps running.
    TimedOut,
    /// A newer submission replaced this job (or it was cancelled); no result will arrive.
    Superseded,
}

pub(crate) type WorkerFn = fn(
    &mut ImageBuffer,
    FilterKind,
    &mut dyn FnMut(f32),
    &dyn Fn() -> bool,
) -> StudioResult<RunOutcome>;

struct ActiveJob {
    id: JobId,
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Runs [`engine`] transforms on a background thread.
pub struct FilterDispatcher {
    worker: WorkerFn,
    next_id: u64,
    active: Option<ActiveJob>,
    tx: Sender<DispatchEvent>,
    rx: Receiver<DispatchEvent>,
}

impl Default for FilterDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterDispatcher {
    /// Create an idle dispatcher backed by the pixel filter engine.
    pub fn new() -> Self {
        Self::with_worker(engine::run_rows)
    }

    pub(crate) fn with_worker(worker: WorkerFn) -> Self {
        let (tx, rx) = unbounded();
        Self {
            worker,
            next_id: 0,
            active: None,
            tx,
            rx,
        }
    }

    /// `true` when no job is in flight.
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Id of the job currently in flight, if any.
    pub fn active_job(&self) -> Option<JobId> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Start filtering `buffer` with `kind`, cancelling any job already in flight.
    pub fn submit(&mut self, buffer: ImageBuffer, kind: FilterKind) -> StudioResult<JobId> {
        buffer.validate()?;
        self.cancel();

        self.next_id += 1;
        let id = JobId(self.next_id);
        let cancel = Arc::new(AtomicBool::new(false));
        let worker = self.worker;
        let tx = self.tx.clone();
        let flag = Arc::clone(&cancel);

        let thread = std::thread::Builder::new()
            .name(format!("reelcast-filter-{}", id.0))
            .spawn(move || run_job(worker, id, buffer, kind, &flag, &tx))
            .map_err(|e| {
                StudioError::filter_execution(format!("failed to spawn filter worker: {e}"))
            })?;

        tracing::debug!(job = id.0, %kind, "filter job submitted");
        self.active = Some(ActiveJob { id, cancel, thread });
        Ok(id)
    }

    /// Cancel the in-flight job, if any. No result is delivered for it.
    pub fn cancel(&mut self) {
        if let Some(job) = self.active.take() {
            job.cancel.store(true, Ordering::Relaxed);
            if job.thread.join().is_err() {
                tracing::warn!(job = job.id.0, "cancelled filter worker panicked");
            }
            tracing::debug!(job = job.id.0, "filter job cancelled");
        }
    }

    /// Drain pending events for the active job without blocking.
    ///
    /// Stale events from superseded jobs are discarded. A terminal event returns the
    /// dispatcher to idle.
    pub fn poll(&mut self) -> Vec<DispatchEvent> {
        let pending: Vec<DispatchEvent> = self.rx.try_iter().collect();
        let mut out = Vec::with_capacity(pending.len());
        for ev in pending {
            if self.accept(&ev) {
                out.push(ev);
            }
        }
        out
    }

    /// Block until `job` finishes, the deadline passes, or the job is found to be superseded.
    ///
    /// A worker fault resets the dispatcher to idle and surfaces as
    /// [`StudioError::FilterExecution`].
    pub fn wait(
        &mut self,
        job: JobId,
        deadline: Option<Instant>,
        on_progress: &mut dyn FnMut(f32),
    ) -> StudioResult<JobOutcome> {
        loop {
            if self.active_job() != Some(job) {
                return Ok(JobOutcome::Superseded);
            }

            let ev = match deadline {
                Some(d) => match self.rx.recv_deadline(d) {
                    Ok(ev) => ev,
                    Err(RecvTimeoutError::Timeout) => return Ok(JobOutcome::TimedOut),
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(StudioError::filter_execution("filter channel closed"));
                    }
                },
                None => self
                    .rx
                    .recv()
                    .map_err(|_| StudioError::filter_execution("filter channel closed"))?,
            };

            if !self.accept(&ev) {
                continue;
            }
            match ev {
                DispatchEvent::Progress { fraction, .. } => on_progress(fraction),
                DispatchEvent::Done { buffer, .. } => return Ok(JobOutcome::Finished(buffer)),
                DispatchEvent::Failed { message, .. } => {
                    return Err(StudioError::filter_execution(message));
                }
            }
        }
    }

    /// Submit and wait in one call.
    pub fn run(
        &mut self,
        buffer: ImageBuffer,
        kind: FilterKind,
        deadline: Option<Instant>,
        on_progress: &mut dyn FnMut(f32),
    ) -> StudioResult<JobOutcome> {
        let job = self.submit(buffer, kind)?;
        self.wait(job, deadline, on_progress)
    }

    /// Keep events for the active job, retire it on terminal events.
    fn accept(&mut self, ev: &DispatchEvent) -> bool {
        let Some(active) = self.active.as_ref() else {
            tracing::trace!(job = ev.job().0, "dropping event with no active job");
            return false;
        };
        if ev.job() != active.id {
            tracing::trace!(job = ev.job().0, active = active.id.0, "dropping stale event");
            return false;
        }
        if matches!(
            ev,
            DispatchEvent::Done { .. } | DispatchEvent::Failed { .. }
        ) && let Some(job) = self.active.take()
            && job.thread.join().is_err()
        {
            tracing::warn!(job = job.id.0, "filter worker panicked after reporting");
        }
        true
    }
}

impl Drop for FilterDispatcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run_job(
    worker: WorkerFn,
    id: JobId,
    mut buffer: ImageBuffer,
    kind: FilterKind,
    cancel: &AtomicBool,
    tx: &Sender<DispatchEvent>,
) {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let mut progress = |fraction: f32| {
            let _ = tx.send(DispatchEvent::Progress { job: id, fraction });
        };
        let cancelled = || cancel.load(Ordering::Relaxed);
        worker(&mut buffer, kind, &mut progress, &cancelled)
    }));

    let ev = match result {
        Ok(Ok(RunOutcome::Finished)) => DispatchEvent::Done { job: id, buffer },
        Ok(Ok(RunOutcome::Cancelled)) => return,
        Ok(Err(e)) => DispatchEvent::Failed {
            job: id,
            message: e.to_string(),
        },
        Err(panic) => DispatchEvent::Failed {
            job: id,
            message: panic_message(panic.as_ref()),
        },
    };
    if cancel.load(Ordering::Relaxed) {
        return;
    }
    let _ = tx.send(ev);
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("filter worker panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("filter worker panicked: {s}")
    } else {
        "filter worker panicked".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filter/dispatcher.rs"]
mod tests;
