//! Drives one generation: preflight checks, then one tick per output frame until the frame
//! budget is spent, the caller cancels, or the watchdog fires.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::encode::sink::{AudioTrack, EncoderSink, SinkConfig};
use crate::filter::dispatcher::{FilterDispatcher, JobOutcome};
use crate::filter::engine;
use crate::filter::kind::FilterKind;
use crate::foundation::buffer::ImageBuffer;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StudioError, StudioResult};
use crate::schedule::timing::TimingConfig;
use crate::sequence::effect_sequence::EffectSequence;
use crate::text::compositor::TextCompositor;
use crate::text::style::TextStyle;

/// Default slack added to the effective duration before the watchdog fires.
pub const DEFAULT_WATCHDOG_BUFFER: Duration = Duration::from_millis(2000);

/// Lifecycle of a [`FrameScheduler`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    /// Nothing running.
    #[default]
    Idle,
    /// Validating inputs and probing the sink.
    Preparing,
    /// Emitting frames.
    Rendering,
    /// The sink was finalized.
    Completed,
    /// A fatal error stopped the generation.
    Failed,
    /// The caller cancelled; the sink was aborted.
    Cancelled,
}

impl GenerationState {
    /// `true` for `Completed`, `Failed`, and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Non-fatal conditions collected during a generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Warning {
    /// The sink finalized without any frames.
    EmptyOutput,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::EmptyOutput => f.write_str("encoder finalized with zero captured frames"),
        }
    }
}

/// Event pushed through a [`StatusReporter`].
#[derive(Clone, Debug, PartialEq)]
pub enum StatusEvent {
    /// The scheduler moved to a new state.
    State(GenerationState),
    /// Throttled frame progress.
    Progress {
        /// Frames emitted so far.
        frame: u64,
        /// Planned frame count.
        total: u64,
    },
    /// Progress of an off-thread filter job.
    FilterProgress {
        /// Filter being applied.
        kind: FilterKind,
        /// Completed fraction in `[0, 1]`.
        fraction: f32,
    },
    /// A non-fatal warning.
    Warning(Warning),
    /// The fatal error that moved the scheduler to `Failed`.
    Error(String),
}

/// Single channel every status change goes through.
#[derive(Clone, Debug, Default)]
pub struct StatusReporter {
    tx: Option<Sender<StatusEvent>>,
}

impl StatusReporter {
    /// Reporter plus the receiving end of its channel.
    pub fn channel() -> (Self, Receiver<StatusEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx: Some(tx) }, rx)
    }

    /// Reporter that drops every event.
    pub fn silent() -> Self {
        Self::default()
    }

    fn send(&self, ev: StatusEvent) {
        if let Some(tx) = self.tx.as_ref() {
            // A hung-up receiver just means nobody is listening any more.
            let _ = tx.send(ev);
        }
    }
}

/// Cooperative cancellation flag shared between the caller and the scheduler.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect before the next tick.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// `true` once [`CancelToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How ticks are spaced in wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FramePacing {
    /// Sleep so frame `n` is emitted no earlier than `n / fps` seconds after start.
    Realtime,
    /// Emit frames back to back.
    #[default]
    AsFastAsPossible,
}

/// Where filters run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Off-thread through a [`FilterDispatcher`].
    #[default]
    Dispatcher,
    /// On the scheduler thread.
    Inline,
}

/// Options controlling a [`FrameScheduler`].
#[derive(Clone, Debug)]
pub struct SchedulerOpts {
    /// Tick pacing policy.
    pub pacing: FramePacing,
    /// Where filters run.
    pub filter_mode: FilterMode,
    /// Slack added to the effective duration before the watchdog fires.
    pub watchdog_buffer: Duration,
}

impl Default for SchedulerOpts {
    fn default() -> Self {
        Self {
            pacing: FramePacing::default(),
            filter_mode: FilterMode::default(),
            watchdog_buffer: DEFAULT_WATCHDOG_BUFFER,
        }
    }
}

/// Everything one generation reads. Nothing here is mutated.
#[derive(Clone, Copy, Debug)]
pub struct GenerationInput<'a> {
    /// Base still image.
    pub image: &'a ImageBuffer,
    /// Length and cadence.
    pub timing: &'a TimingConfig,
    /// Effect timeline; snapshotted at generation start.
    pub sequence: &'a EffectSequence,
    /// Caption; snapshotted at generation start.
    pub text: &'a TextStyle,
    /// Audio to mux, if any.
    pub audio: Option<&'a AudioTrack>,
}

/// Outcome of a generation that did not fail.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GenerationReport {
    /// Terminal state (`Completed` or `Cancelled`).
    pub state: GenerationState,
    /// Planned frame count.
    pub total_frames: u64,
    /// Frames handed to the sink.
    pub frames_emitted: u64,
    /// `true` when the watchdog forced finalization.
    pub timed_out: bool,
    /// Non-fatal conditions.
    pub warnings: Vec<Warning>,
}

struct Plan {
    fps: Fps,
    total_frames: u64,
    loop_sequence: bool,
    sequence: EffectSequence,
    text: TextStyle,
    deadline: Instant,
}

enum TickEnd {
    Finished,
    TimedOut,
    Cancelled,
}

/// Single-threaded frame pump.
pub struct FrameScheduler {
    opts: SchedulerOpts,
    state: GenerationState,
    dispatcher: FilterDispatcher,
    compositor: TextCompositor,
    reporter: StatusReporter,
}

impl FrameScheduler {
    /// Create an idle scheduler.
    pub fn new(opts: SchedulerOpts, compositor: TextCompositor, reporter: StatusReporter) -> Self {
        Self {
            opts,
            state: GenerationState::Idle,
            dispatcher: FilterDispatcher::new(),
            compositor,
            reporter,
        }
    }

    /// Swap the filter dispatcher, e.g. for one with a custom worker.
    pub(crate) fn with_dispatcher(mut self, dispatcher: FilterDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Current state.
    pub fn state(&self) -> GenerationState {
        self.state
    }

    fn transition(&mut self, state: GenerationState) {
        tracing::debug!(from = ?self.state, to = ?state, "scheduler state");
        self.state = state;
        self.reporter.send(StatusEvent::State(state));
    }

    fn fail(&mut self, err: StudioError) -> StudioError {
        tracing::error!(error = %err, "generation failed");
        self.reporter.send(StatusEvent::Error(err.to_string()));
        self.transition(GenerationState::Failed);
        err
    }

    /// Run one generation into `sink`.
    ///
    /// Configuration, audio, and capability problems are returned before any frame reaches the
    /// sink. Runtime sink or filter faults abort the sink and return the error; the scheduler
    /// ends in `Failed` either way.
    #[tracing::instrument(skip_all, fields(width = input.image.width(), height = input.image.height()))]
    pub fn generate(
        &mut self,
        input: GenerationInput<'_>,
        sink: &mut dyn EncoderSink,
        cancel: &CancelToken,
    ) -> StudioResult<GenerationReport> {
        self.transition(GenerationState::Preparing);
        let plan = match self.prepare(&input, sink) {
            Ok(plan) => plan,
            Err(e) => return Err(self.fail(e)),
        };

        self.transition(GenerationState::Rendering);
        let mut emitted = 0u64;
        let end = match self.render(&plan, input.image, sink, cancel, &mut emitted) {
            Ok(end) => end,
            Err(e) => {
                sink.abort();
                return Err(self.fail(e));
            }
        };

        let mut report = GenerationReport {
            state: GenerationState::Completed,
            total_frames: plan.total_frames,
            frames_emitted: emitted,
            timed_out: false,
            warnings: Vec::new(),
        };

        match end {
            TickEnd::Cancelled => {
                tracing::info!(emitted, "generation cancelled");
                self.dispatcher.cancel();
                sink.abort();
                report.state = GenerationState::Cancelled;
                self.transition(GenerationState::Cancelled);
                return Ok(report);
            }
            TickEnd::TimedOut => {
                tracing::warn!(
                    emitted,
                    total = plan.total_frames,
                    "watchdog expired; finalizing with captured frames"
                );
                self.dispatcher.cancel();
                report.timed_out = true;
            }
            TickEnd::Finished => {}
        }

        let summary = match sink.end() {
            Ok(s) => s,
            Err(e) => return Err(self.fail(e)),
        };
        if summary.frames_written == 0 {
            tracing::warn!("{}", Warning::EmptyOutput);
            report.warnings.push(Warning::EmptyOutput);
            self.reporter.send(StatusEvent::Warning(Warning::EmptyOutput));
        }

        self.transition(GenerationState::Completed);
        tracing::info!(frames = emitted, timed_out = report.timed_out, "generation completed");
        Ok(report)
    }

    fn prepare(
        &mut self,
        input: &GenerationInput<'_>,
        sink: &mut dyn EncoderSink,
    ) -> StudioResult<Plan> {
        input.timing.validate()?;
        input.image.validate()?;
        input.text.validate()?;
        sink.probe()?;

        let total_frames = input.timing.total_frames()?;
        let budget = input.timing.watchdog_budget(self.opts.watchdog_buffer)?;

        sink.begin(SinkConfig {
            width: input.image.width(),
            height: input.image.height(),
            fps: input.timing.fps,
            total_frames,
            audio: input.audio.cloned(),
        })?;

        tracing::info!(
            total_frames,
            fps = input.timing.fps.get(),
            segments = input.sequence.segments().len(),
            "prepared generation"
        );
        Ok(Plan {
            fps: input.timing.fps,
            total_frames,
            loop_sequence: input.timing.fit_to_audio,
            sequence: input.sequence.snapshot(),
            text: input.text.clone(),
            deadline: Instant::now() + budget,
        })
    }

    fn render(
        &mut self,
        plan: &Plan,
        image: &ImageBuffer,
        sink: &mut dyn EncoderSink,
        cancel: &CancelToken,
        emitted: &mut u64,
    ) -> StudioResult<TickEnd> {
        let fps = u64::from(plan.fps.get());
        let start = Instant::now();
        let mut frames: HashMap<FilterKind, ImageBuffer> = HashMap::new();

        for i in 0..plan.total_frames {
            if cancel.is_cancelled() {
                return Ok(TickEnd::Cancelled);
            }
            if Instant::now() >= plan.deadline {
                return Ok(TickEnd::TimedOut);
            }
            if self.opts.pacing == FramePacing::Realtime {
                let due = start + Duration::from_secs_f64(plan.fps.frames_to_secs(i));
                if pace_until(due, plan.deadline) {
                    return Ok(TickEnd::TimedOut);
                }
            }

            let idx = FrameIndex(i);
            let kind = plan
                .sequence
                .resolve_filter(idx, plan.total_frames, plan.loop_sequence);

            if !frames.contains_key(&kind) {
                let Some(frame) = self.build_frame(image, kind, &plan.text, plan.deadline)? else {
                    return Ok(TickEnd::TimedOut);
                };
                frames.insert(kind, frame);
            }
            let Some(frame) = frames.get(&kind) else {
                return Err(StudioError::filter_execution("memoized frame disappeared"));
            };

            sink.push_frame(idx, frame)?;
            *emitted += 1;

            if *emitted % fps == 0 || *emitted == plan.total_frames {
                self.reporter.send(StatusEvent::Progress {
                    frame: *emitted,
                    total: plan.total_frames,
                });
            }
        }
        Ok(TickEnd::Finished)
    }

    /// Filter the base image and composite the caption. `None` when the deadline passed while
    /// the filter was still running.
    fn build_frame(
        &mut self,
        image: &ImageBuffer,
        kind: FilterKind,
        text: &TextStyle,
        deadline: Instant,
    ) -> StudioResult<Option<ImageBuffer>> {
        tracing::debug!(filter = %kind, "building frame");
        let mut frame = if kind.is_identity() {
            image.clone()
        } else {
            match self.opts.filter_mode {
                FilterMode::Inline => engine::apply(image.clone(), kind)?,
                FilterMode::Dispatcher => {
                    let reporter = &self.reporter;
                    let mut on_progress =
                        |fraction| reporter.send(StatusEvent::FilterProgress { kind, fraction });
                    match self
                        .dispatcher
                        .run(image.clone(), kind, Some(deadline), &mut on_progress)?
                    {
                        JobOutcome::Finished(buf) => buf,
                        JobOutcome::TimedOut => return Ok(None),
                        JobOutcome::Superseded => {
                            return Err(StudioError::filter_execution(
                                "filter job was superseded mid-generation",
                            ));
                        }
                    }
                }
            }
        };
        self.compositor.composite(&mut frame, text)?;
        Ok(Some(frame))
    }
}

/// Sleep until `due`, but never past `deadline`. True when the deadline has been reached.
fn pace_until(due: Instant, deadline: Instant) -> bool {
    let wake = due.min(deadline);
    let now = Instant::now();
    if wake > now {
        std::thread::sleep(wake - now);
    }
    Instant::now() >= deadline
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
