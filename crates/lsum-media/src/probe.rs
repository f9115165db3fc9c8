//! FFprobe media information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::command::{check_ffprobe, last_line};
use crate::error::{MediaError, MediaResult};

/// Media file information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Sample rate of the first audio stream (Hz)
    pub sample_rate: Option<u32>,
    /// Channel count of the first audio stream
    pub channels: Option<u16>,
    /// Whether a video stream is present
    pub has_video: bool,
    /// File size in bytes
    pub size: u64,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    sample_rate: Option<String>,
    channels: Option<u16>,
    duration: Option<String>,
}

/// Probe a media file.
pub async fn probe_media(path: impl AsRef<Path>, timeout_secs: Option<u64>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let child = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let output = match timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), child.wait_with_output())
            .await
            .map_err(|_| MediaError::Timeout(secs))??,
        None => child.wait_with_output().await?,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let message = last_line(&stderr).unwrap_or("FFprobe failed").to_string();
        return Err(MediaError::ffprobe_failed(message, Some(stderr)));
    }

    parse_probe_output(&output.stdout)
}

/// Parse FFprobe JSON into [`MediaInfo`].
///
/// Container duration wins; otherwise the longest stream duration is used.
fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let duration = parse_secs(probe.format.duration.as_deref())
        .or_else(|| {
            probe
                .streams
                .iter()
                .filter_map(|s| parse_secs(s.duration.as_deref()))
                .reduce(f64::max)
        })
        .ok_or_else(|| MediaError::invalid_media("No duration reported"))?;

    let audio = probe.streams.iter().find(|s| s.codec_type == "audio");

    Ok(MediaInfo {
        duration,
        sample_rate: audio
            .and_then(|s| s.sample_rate.as_ref())
            .and_then(|r| r.parse().ok()),
        channels: audio.and_then(|s| s.channels),
        has_video: probe.streams.iter().any(|s| s.codec_type == "video"),
        size: probe
            .format
            .size
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
    })
}

fn parse_secs(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}
