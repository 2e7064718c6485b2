use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{EncoderSink, SinkConfig, SinkSummary};
use crate::foundation::buffer::ImageBuffer;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{StudioError, StudioResult};

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
///
/// When [`SinkConfig::audio`] is set the audio file becomes a second input and the output is
/// cut to the video duration.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    frames_written: u64,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            frames_written: 0,
        }
    }

    /// Output path this sink writes to.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn kill_child(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        self.cfg = None;
    }

    fn discard_output(&self) {
        if self.opts.out_path.exists()
            && let Err(e) = std::fs::remove_file(&self.opts.out_path)
        {
            tracing::warn!(
                path = %self.opts.out_path.display(),
                error = %e,
                "failed to remove partial output"
            );
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.kill_child();
        }
    }
}

impl EncoderSink for FfmpegSink {
    fn probe(&self) -> StudioResult<()> {
        if !is_ffmpeg_on_path() {
            return Err(StudioError::capability_missing(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }
        Ok(())
    }

    fn begin(&mut self, cfg: SinkConfig) -> StudioResult<()> {
        validate_sink_config(&cfg)?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(StudioError::invalid_config(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(ffmpeg_args(&cfg, &self.opts))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        tracing::debug!(?cmd, "spawning ffmpeg");

        let mut child = cmd.spawn().map_err(|e| {
            StudioError::capability_missing(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| StudioError::encoder("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| StudioError::encoder("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &ImageBuffer) -> StudioResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| StudioError::encoder("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(StudioError::encoder(
                "ffmpeg sink received out-of-order frame index",
            ));
        }

        if frame.width() != cfg.width || frame.height() != cfg.height {
            return Err(StudioError::invalid_buffer(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }

        flatten_straight_over_bg(&mut self.scratch, frame.data(), self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(StudioError::encoder("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            StudioError::encoder(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        self.last_idx = Some(idx);
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> StudioResult<SinkSummary> {
        if self.child.is_none() {
            return Err(StudioError::encoder("ffmpeg sink not started"));
        }
        if self.frames_written == 0 {
            // ffmpeg refuses to mux an empty stream; leave nothing behind.
            self.kill_child();
            self.discard_output();
            return Ok(SinkSummary::default());
        }

        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| StudioError::encoder("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| StudioError::encoder(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| StudioError::encoder("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| StudioError::encoder(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        self.cfg = None;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(StudioError::encoder(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::info!(
            path = %self.opts.out_path.display(),
            frames = self.frames_written,
            "ffmpeg finished"
        );
        Ok(SinkSummary {
            frames_written: self.frames_written,
        })
    }

    fn abort(&mut self) {
        if self.child.is_none() {
            return;
        }
        self.kill_child();
        self.discard_output();
    }
}

fn validate_sink_config(cfg: &SinkConfig) -> StudioResult<()> {
    if cfg.width == 0 || cfg.height == 0 {
        return Err(StudioError::invalid_config(
            "ffmpeg sink width/height must be non-zero",
        ));
    }
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(StudioError::invalid_config(
            "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
        ));
    }
    Ok(())
}

/// Full `ffmpeg` argument list for `cfg`, excluding the program name.
pub(crate) fn ffmpeg_args(cfg: &SinkConfig, opts: &FfmpegSinkOpts) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |s: &str| args.push(OsString::from(s));

    push(if opts.overwrite { "-y" } else { "-n" });
    push("-loglevel");
    push("error");

    // Input 0: raw straight-alpha RGBA8 frames, flattened in push_frame.
    push("-f");
    push("rawvideo");
    push("-pix_fmt");
    push("rgba");
    push("-s");
    push(&format!("{}x{}", cfg.width, cfg.height));
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    push("-r");
    push(&cfg.fps.get().to_string());
    push("-i");
    push("pipe:0");

    if let Some(audio) = cfg.audio.as_ref() {
        args.push(OsString::from("-i"));
        args.push(audio.path.clone().into_os_string());
        for a in [
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-t",
        ] {
            args.push(OsString::from(a));
        }
        args.push(OsString::from(format!("{:.3}", cfg.duration_secs())));
    } else {
        for a in ["-an", "-c:v", "libx264", "-pix_fmt", "yuv420p"] {
            args.push(OsString::from(a));
        }
    }
    args.push(OsString::from("-movflags"));
    args.push(OsString::from("+faststart"));
    args.push(opts.out_path.clone().into_os_string());
    args
}

fn flatten_straight_over_bg(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) -> StudioResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StudioError::invalid_buffer(
            "flatten_straight_over_bg expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255 - a;
        for i in 0..3 {
            let c = mul_div255(u16::from(s[i]), a) + mul_div255(u16::from(bg_rgba[i]), inv);
            d[i] = c.min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> StudioResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_tool_on_path("ffmpeg")
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    is_tool_on_path("ffprobe")
}

fn is_tool_on_path(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
