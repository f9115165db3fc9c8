//! Pipeline configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lsum_media::{EnergySilenceConfig, PlannerConfig, DEFAULT_SAMPLE_RATE};
use lsum_models::DEFAULT_CLASS_COLUMN;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the source recordings
    pub media_dir: PathBuf,
    /// Directory for decoded audio, cleared on reset
    pub audio_dir: PathBuf,
    /// Directory for per-recording segment folders and the manifest, cleared on reset
    pub segments_dir: PathBuf,
    /// File name of the segment manifest inside `segments_dir`
    pub manifest_name: String,
    /// File extensions treated as source recordings
    pub media_extensions: Vec<String>,
    /// Segment planner thresholds
    pub planner: PlannerConfig,
    /// Silence detector parameters
    pub detector: EnergySilenceConfig,
    /// Waveform sample rate for analysis
    pub sample_rate: u32,
    /// Timeout for each external tool invocation
    pub tool_timeout: Duration,
    /// Maximum recordings segmented concurrently
    pub max_parallel_recordings: usize,
    /// Classified-table column holding the label
    pub class_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_data_dir("./data")
    }
}

impl PipelineConfig {
    /// Defaults with every directory under `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            media_dir: data_dir.join("media"),
            audio_dir: data_dir.join("audio"),
            segments_dir: data_dir.join("segmented"),
            manifest_name: "index.csv".to_string(),
            media_extensions: ["mp4", "mkv", "mov", "webm", "avi"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            planner: PlannerConfig::default(),
            detector: EnergySilenceConfig::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            tool_timeout: Duration::from_secs(600),
            max_parallel_recordings: 2,
            class_column: DEFAULT_CLASS_COLUMN.to_string(),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("LSUM_DATA_DIR").unwrap_or_else(|_| "./data".to_string());
        let defaults = Self::with_data_dir(&data_dir);

        let planner = PlannerConfig::default()
            .with_up_bound(env_or("LSUM_UP_BOUND", defaults.planner.up_bound))
            .with_min_tail(env_or("LSUM_MIN_TAIL", defaults.planner.min_tail))
            .with_start_offset(env_or("LSUM_START_OFFSET", defaults.planner.start_offset));

        let detector = EnergySilenceConfig::default().with_window(
            env_or("LSUM_ST_WIN", defaults.detector.st_win),
            env_or("LSUM_ST_STEP", defaults.detector.st_step),
        );

        Self {
            media_dir: env_path("LSUM_MEDIA_DIR").unwrap_or(defaults.media_dir),
            audio_dir: env_path("LSUM_AUDIO_DIR").unwrap_or(defaults.audio_dir),
            segments_dir: env_path("LSUM_SEGMENTS_DIR").unwrap_or(defaults.segments_dir),
            manifest_name: std::env::var("LSUM_MANIFEST_NAME").unwrap_or(defaults.manifest_name),
            media_extensions: std::env::var("LSUM_MEDIA_EXTENSIONS")
                .ok()
                .map(|v| parse_extensions(&v))
                .filter(|exts| !exts.is_empty())
                .unwrap_or(defaults.media_extensions),
            planner,
            detector,
            sample_rate: env_or("LSUM_SAMPLE_RATE", defaults.sample_rate),
            tool_timeout: Duration::from_secs(env_or(
                "LSUM_TOOL_TIMEOUT_SECS",
                defaults.tool_timeout.as_secs(),
            )),
            max_parallel_recordings: env_or(
                "LSUM_MAX_PARALLEL_RECORDINGS",
                defaults.max_parallel_recordings,
            ),
            class_column: std::env::var("LSUM_CLASS_COLUMN").unwrap_or(defaults.class_column),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.segments_dir.join(&self.manifest_name)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Comma-separated extensions, lowercased and without leading dots.
fn parse_extensions(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
