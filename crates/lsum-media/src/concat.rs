//! Lossless concatenation with the FFmpeg concat demuxer.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::ensure_non_empty;

/// Concatenate `inputs` in order into `output` with stream copy.
///
/// All inputs must exist. The demuxer list lives in a temporary
/// directory that is removed on return.
pub async fn concat_files(inputs: &[PathBuf], output: &Path, runner: &FfmpegRunner) -> MediaResult<()> {
    if inputs.is_empty() {
        return Err(MediaError::EmptyConcat);
    }

    let mut list = String::new();
    for input in inputs {
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.clone()));
        }
        let absolute = tokio::fs::canonicalize(input).await?;
        list.push_str(&concat_list_entry(&absolute));
    }

    let temp_dir = tempfile::tempdir()?;
    let list_path = temp_dir.path().join("concat.txt");
    tokio::fs::write(&list_path, &list).await?;

    debug!(
        inputs = inputs.len(),
        output = %output.display(),
        "Concatenating segments"
    );

    let cmd = FfmpegCommand::new(&list_path, output)
        .input_format("concat")
        .input_args(["-safe", "0"])
        .codec_copy();

    runner.run(&cmd).await?;
    ensure_non_empty(output).await?;

    info!(
        inputs = inputs.len(),
        output = %output.display(),
        "Concatenation completed"
    );

    Ok(())
}

/// One `file '<path>'` line; single quotes are escaped for the demuxer.
fn concat_list_entry(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{}'\n", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_list_entry() {
        assert_eq!(
            concat_list_entry(Path::new("/data/lecture_1/part_0.mp4")),
            "file '/data/lecture_1/part_0.mp4'\n"
        );
        assert_eq!(
            concat_list_entry(Path::new("/data/it's/part_0.mp4")),
            "file '/data/it'\\''s/part_0.mp4'\n"
        );
    }

    #[tokio::test]
    async fn test_empty_input_list() {
        let result = concat_files(&[], Path::new("summary.mp4"), &FfmpegRunner::new()).await;
        assert!(matches!(result, Err(MediaError::EmptyConcat)));
    }

    #[tokio::test]
    async fn test_missing_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("part_9.mp4");
        let result = concat_files(
            &[missing.clone()],
            &dir.path().join("summary.mp4"),
            &FfmpegRunner::new(),
        )
        .await;
        assert!(matches!(result, Err(MediaError::FileNotFound(p)) if p == missing));
    }
}
