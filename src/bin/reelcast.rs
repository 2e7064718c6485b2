use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reelcast::{
    AnchorPosition, CancelToken, FfmpegSink, FfmpegSinkOpts, FilterKind, FilterMode, FontBook,
    FrameIndex, FramePacing, FrameScheduler, Project, Rgba8, SchedulerOpts, Session, StatusEvent,
    StatusReporter, TextCompositor,
};

#[derive(Parser, Debug)]
#[command(name = "reelcast", version, about = "Turn a still image into a filtered, captioned video")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single output frame as a PNG.
    Still(StillArgs),
    /// Print the filter of every output frame as JSON.
    Timeline(TimelineArgs),
}

/// Project file plus flag overrides shared by every subcommand.
#[derive(Args, Debug)]
struct JobArgs {
    /// Project JSON. Without it, `--image` and `--duration`/`--fps` describe the job.
    #[arg(long = "project")]
    project: Option<PathBuf>,

    /// Base still image.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Audio track to mux (and to fit to with `--fit-to-audio`).
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Output length in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Output frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Use the audio length as the output length.
    #[arg(long)]
    fit_to_audio: bool,

    /// Filter used when the project has no effect timeline.
    #[arg(long)]
    filter: Option<FilterKind>,

    /// Caption text.
    #[arg(long)]
    text: Option<String>,

    /// Caption anchor, e.g. `bottom_center` or `top-right`.
    #[arg(long)]
    anchor: Option<AnchorPosition>,

    /// Caption size in pixels.
    #[arg(long)]
    font_size: Option<f32>,

    /// Caption color (`#rgb`, `#rrggbb`, `#rrggbbaa`).
    #[arg(long, value_parser = parse_color)]
    color: Option<Rgba8>,

    /// Draw a box behind the caption.
    #[arg(long)]
    text_background: bool,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Pace frames to the output frame rate instead of rendering as fast as possible.
    #[arg(long)]
    realtime: bool,

    /// Run filters on the scheduler thread instead of the background worker.
    #[arg(long)]
    inline_filters: bool,

    /// Watchdog slack in milliseconds on top of the output duration.
    #[arg(long, default_value_t = 2000)]
    watchdog_buffer_ms: u64,
}

#[derive(Args, Debug)]
struct StillArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Audio length in seconds, skipping the `ffprobe` call.
    #[arg(long)]
    audio_duration: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Still(args) => cmd_still(args),
        Command::Timeline(args) => cmd_timeline(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn,reelcast=info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_color(s: &str) -> Result<Rgba8, String> {
    Rgba8::parse_hex(s).map_err(|e| e.to_string())
}

fn load_project(job: &JobArgs) -> anyhow::Result<Project> {
    let mut project = match job.project.as_deref() {
        Some(path) => Project::load(path)?,
        None => {
            let image = job
                .image
                .clone()
                .context("either --project or --image is required")?;
            let timing = reelcast::TimingConfig::fixed(
                job.duration.unwrap_or(5.0),
                reelcast::Fps::new(job.fps.unwrap_or(30))?,
            );
            Project::new(image, timing)
        }
    };

    if let Some(image) = job.image.clone() {
        project.image = image;
    }
    if let Some(audio) = job.audio.clone() {
        project.audio = Some(audio);
    }
    if let Some(d) = job.duration {
        project.timing.duration_seconds = d;
    }
    if let Some(fps) = job.fps {
        project.timing.fps = reelcast::Fps::new(fps)?;
    }
    if job.fit_to_audio {
        project.timing.fit_to_audio = true;
    }
    if let Some(filter) = job.filter {
        project.filter = filter;
    }
    if let Some(text) = job.text.clone() {
        project.text.content = text;
    }
    if let Some(anchor) = job.anchor {
        project.text.anchor = anchor;
    }
    if let Some(size) = job.font_size {
        project.text.font_size_px = size;
    }
    if let Some(color) = job.color {
        project.text.color = color;
    }
    if job.text_background {
        project.text.background_enabled = true;
    }
    project.font_dirs.extend(job.font_dirs.iter().cloned());

    project.validate()?;
    tracing::debug!(?project, "resolved project");
    Ok(project)
}

fn make_compositor(project: &Project) -> TextCompositor {
    let mut fonts = FontBook::system();
    for dir in &project.font_dirs {
        fonts.load_fonts_from_dir(dir);
    }
    TextCompositor::new(fonts)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut project = load_project(&args.job)?;
    if let Some(out) = args.out {
        project.output = out;
    }
    let session = Session::from_project(&project)?;

    let opts = SchedulerOpts {
        pacing: if args.realtime {
            FramePacing::Realtime
        } else {
            FramePacing::AsFastAsPossible
        },
        filter_mode: if args.inline_filters {
            FilterMode::Inline
        } else {
            FilterMode::Dispatcher
        },
        watchdog_buffer: Duration::from_millis(args.watchdog_buffer_ms),
    };

    let (reporter, rx) = StatusReporter::channel();
    let printer = std::thread::spawn(move || {
        for ev in rx {
            match ev {
                StatusEvent::Progress { frame, total } => eprintln!("frame {frame}/{total}"),
                StatusEvent::Warning(w) => eprintln!("warning: {w}"),
                StatusEvent::Error(e) => eprintln!("error: {e}"),
                StatusEvent::State(_) | StatusEvent::FilterProgress { .. } => {}
            }
        }
    });

    let mut scheduler = FrameScheduler::new(opts, make_compositor(&project), reporter);
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&project.output));
    let result = session.generate(&mut scheduler, &mut sink, &CancelToken::new());
    drop(scheduler);
    if printer.join().is_err() {
        tracing::warn!("status printer thread panicked");
    }

    let report = result?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!("wrote {}", project.output.display());
    Ok(())
}

fn cmd_still(args: StillArgs) -> anyhow::Result<()> {
    let project = load_project(&args.job)?;
    let session = Session::from_project(&project)?;
    let mut compositor = make_compositor(&project);

    let frame = session.render_still(FrameIndex(args.frame), &mut compositor)?;
    reelcast::save_png(&frame, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

#[derive(serde::Serialize)]
struct TimelineOut<'a> {
    fps: u32,
    total_frames: u64,
    frames: &'a [FilterKind],
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let project = load_project(&args.job)?;
    let mut timing = project.timing.clone();
    timing.audio_duration_seconds = match (args.audio_duration, project.audio.as_deref()) {
        (Some(d), _) => Some(d),
        (None, Some(path)) if timing.fit_to_audio => Some(probe_duration(path)?),
        _ => None,
    };

    let sequence = project.effects.snapshot().with_global_filter(project.filter);
    let total = timing.total_frames()?;
    let frames = sequence.resolve_all(total, timing.fit_to_audio);
    let out = TimelineOut {
        fps: timing.fps.get(),
        total_frames: total,
        frames: &frames,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn probe_duration(path: &Path) -> anyhow::Result<f64> {
    Ok(reelcast::probe_audio(path)?.duration_seconds)
}
