//! Local frame/video extraction backed by the system `ffmpeg`/`ffprobe`
//! binaries.
//!
//! Extracted artifacts are keyed by deterministic paths under a cache
//! directory; an existing file at the target path is taken as a finished
//! extraction and the subprocess is skipped. No content hashing is done, so
//! a changed source video reusing a name returns the stale artifact.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    config::Config,
    error::{FrameplotError, FrameplotResult},
};

/// Metadata record for a source video and its extractable frames.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FrameContainer {
    /// Name used in cache paths. Must be unique per source video.
    pub video_name: String,
    pub video_path: PathBuf,
    /// Externally tracked number of extractable frames.
    pub frame_count: u64,
}

/// A single still of a source video, addressed by index.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    pub container: FrameContainer,
    pub index: u64,
}

impl FrameContainer {
    pub fn frame(&self, index: u64) -> Frame {
        Frame {
            container: self.clone(),
            index,
        }
    }
}

fn ffmpeg_decode(cfg: &Config) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-v", "error"]);
    if cfg.hwaccel {
        cmd.args(["-hwaccel", "cuda"]);
    }
    cmd
}

fn run_checked(mut cmd: Command, what: &str) -> FrameplotResult<()> {
    tracing::debug!(?cmd, "running {what}");
    let out = cmd
        .output()
        .map_err(|e| FrameplotError::extraction(format!("failed to run ffmpeg for {what}: {e}")))?;
    if !out.status.success() {
        return Err(FrameplotError::extraction(format!(
            "ffmpeg {what} failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}

/// Extract the still image for `frame` to
/// `<cache_dir>/<video_name>/<index:04>.png`.
///
/// Returns the path without invoking ffmpeg when the file already exists.
pub fn extract_single_frame(frame: &Frame, cfg: &Config) -> FrameplotResult<PathBuf> {
    let output_path = single_frame_path(frame, cfg);

    if output_path.exists() {
        tracing::debug!(path = %output_path.display(), "frame already extracted");
        return Ok(output_path);
    }

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            FrameplotError::extraction(format!(
                "failed to create frame directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut cmd = ffmpeg_decode(cfg);
    cmd.arg("-i")
        .arg(&frame.container.video_path)
        .args([
            "-vf",
            &format!("select=eq(n\\,{})", frame.index),
            "-frames:v",
            "1",
        ])
        .arg(&output_path);
    run_checked(cmd, "single frame extraction")?;

    if !output_path.exists() {
        return Err(FrameplotError::extraction(format!(
            "ffmpeg produced no output at '{}'",
            output_path.display()
        )));
    }

    Ok(output_path)
}

/// Deterministic still path for `frame` under the cache directory.
pub fn single_frame_path(frame: &Frame, cfg: &Config) -> PathBuf {
    cfg.cache_dir
        .join(&frame.container.video_name)
        .join(format!("{:04}.png", frame.index))
}

/// Extract every frame of the container's video to
/// `<cache_dir>/<video_name>/`, numbered `0000.png` onward.
///
/// When the directory already holds exactly `frame_count` entries the
/// extraction is considered complete and nothing is run.
pub fn extract_frames(container: &FrameContainer, cfg: &Config) -> FrameplotResult<PathBuf> {
    let output_dir = cfg.cache_dir.join(&container.video_name);

    if let Ok(entries) = std::fs::read_dir(&output_dir)
        && entries.count() as u64 == container.frame_count
    {
        tracing::debug!(dir = %output_dir.display(), "all frames already extracted");
        return Ok(output_dir);
    }

    std::fs::create_dir_all(&output_dir).map_err(|e| {
        FrameplotError::extraction(format!(
            "failed to create frame directory '{}': {e}",
            output_dir.display()
        ))
    })?;

    let mut cmd = ffmpeg_decode(cfg);
    cmd.arg("-i")
        .arg(&container.video_path)
        .args(["-start_number", "0"])
        .arg(output_dir.join("%04d.png"));
    run_checked(cmd, "bulk frame extraction")?;

    Ok(output_dir)
}

/// Extract the frame range `[left_index, right_index)` of `video_path` into
/// `<cache_dir>/<stem>-<left>-<right>.mp4`, skipping if already present.
pub fn extract_video_subset(
    video_path: &Path,
    left_index: u64,
    right_index: u64,
    cfg: &Config,
) -> FrameplotResult<PathBuf> {
    if left_index >= right_index {
        return Err(FrameplotError::validation(format!(
            "invalid frame range: left index {left_index} must be below right index {right_index}"
        )));
    }

    let name = video_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            FrameplotError::validation(format!(
                "video path '{}' has no usable file stem",
                video_path.display()
            ))
        })?;
    let output_path = cfg
        .cache_dir
        .join(format!("{name}-{left_index}-{right_index}.mp4"));

    if output_path.exists() {
        tracing::debug!(path = %output_path.display(), "subset already extracted");
        return Ok(output_path);
    }

    let mut cmd = ffmpeg_decode(cfg);
    cmd.arg("-i")
        .arg(video_path)
        .args([
            "-vf",
            &format!("select=between(n\\,{left_index}\\,{})", right_index - 1),
            "-fps_mode",
            "vfr",
            "-an",
        ])
        .arg(&output_path);
    run_checked(cmd, "video subset extraction")?;

    Ok(output_path)
}

/// Count the video frames of a source file with `ffprobe`.
pub fn probe_frame_count(video_path: &Path) -> FrameplotResult<u64> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        nb_read_frames: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-count_frames",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=nb_read_frames",
            "-print_format",
            "json",
        ])
        .arg(video_path)
        .output()
        .map_err(|e| FrameplotError::extraction(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(FrameplotError::extraction(format!(
            "ffprobe failed for '{}': {}",
            video_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| FrameplotError::serde(format!("ffprobe json parse failed: {e}")))?;
    parsed
        .streams
        .first()
        .and_then(|s| s.nb_read_frames.as_ref())
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| FrameplotError::extraction("ffprobe reported no video frame count"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> FrameContainer {
        FrameContainer {
            video_name: "cam0".to_string(),
            video_path: PathBuf::from("/videos/cam0.mp4"),
            frame_count: 120,
        }
    }

    #[test]
    fn still_paths_are_zero_padded() {
        let cfg = Config::default();
        let frame = container().frame(7);
        assert_eq!(
            single_frame_path(&frame, &cfg),
            PathBuf::from("/tmp/cam0/0007.png")
        );

        let frame = container().frame(1234);
        assert_eq!(
            single_frame_path(&frame, &cfg),
            PathBuf::from("/tmp/cam0/1234.png")
        );
    }

    #[test]
    fn subset_rejects_empty_range() {
        let cfg = Config::default();
        assert!(extract_video_subset(Path::new("/videos/cam0.mp4"), 5, 5, &cfg).is_err());
        assert!(extract_video_subset(Path::new("/videos/cam0.mp4"), 6, 5, &cfg).is_err());
    }

    #[test]
    fn subset_requires_a_file_stem() {
        let cfg = Config::default();
        let err = extract_video_subset(Path::new("/"), 0, 2, &cfg).unwrap_err();
        assert!(err.to_string().contains("file stem"));
    }
}
