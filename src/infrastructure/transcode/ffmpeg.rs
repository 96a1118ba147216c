use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::{MediaProbe, TranscodeEngine, TranscodeError, TranscodeOptions};
use crate::config::settings::FfmpegConfig;

// Keep error messages readable; ffmpeg stderr can be megabytes.
const STDERR_TAIL_BYTES: usize = 2048;

pub struct FfmpegEngine {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl FfmpegEngine {
    pub fn new(config: &FfmpegConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
        }
    }

    fn probe_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-show_entries".to_string(),
            "stream=codec_name,width,height:format=duration".to_string(),
            "-of".to_string(),
            "json".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }

    fn frame_args(input: &Path, offset: Duration, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-ss".to_string(),
            format_offset(offset),
            "-frames:v".to_string(),
            "1".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    fn transcode_args(input: &Path, output: &Path, options: &TranscodeOptions) -> Vec<String> {
        let mut filters = Vec::new();
        if let Some(height) = options.max_height {
            // -2 keeps the width even, which libx264 with yuv420p requires.
            filters.push(format!("scale=-2:{}", height));
        }
        filters.push(format!("format={}", options.pixel_format));

        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c:v".to_string(),
            options.video_codec.clone(),
            "-vf".to_string(),
            filters.join(","),
            output.to_string_lossy().to_string(),
        ]
    }

    fn parse_probe_output(stdout: &str) -> Result<MediaProbe, TranscodeError> {
        let parsed: ProbeOutput =
            serde_json::from_str(stdout).map_err(|e| TranscodeError::ProbeFailed {
                reason: format!("unreadable ffprobe output: {}", e),
            })?;

        let stream = parsed.streams.into_iter().next();
        let duration_secs = parsed
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.parse::<f64>().ok());

        Ok(match stream {
            Some(s) => MediaProbe {
                width: s.width,
                height: s.height,
                codec_name: s.codec_name,
                duration_secs,
            },
            None => MediaProbe {
                duration_secs,
                ..Default::default()
            },
        })
    }

    async fn run(binary: &Path, args: &[String]) -> Result<Output, TranscodeError> {
        debug!(binary = %binary.display(), args = ?args, "Spawning engine process");

        Command::new(binary)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::BinaryNotFound {
                        path: binary.to_path_buf(),
                    }
                } else {
                    TranscodeError::Io(e)
                }
            })
    }

    fn ensure_input(path: &Path) -> Result<(), TranscodeError> {
        if !path.exists() {
            return Err(TranscodeError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}

fn format_offset(offset: Duration) -> String {
    let total = offset.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn stderr_tail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
    let start = (start..stderr.len())
        .find(|i| stderr.is_char_boundary(*i))
        .unwrap_or(stderr.len());
    stderr[start..].trim().to_string()
}

#[async_trait]
impl TranscodeEngine for FfmpegEngine {
    async fn probe(&self, path: &Path) -> Result<MediaProbe, TranscodeError> {
        Self::ensure_input(path)?;

        let output = Self::run(&self.ffprobe_path, &Self::probe_args(path)).await?;
        if !output.status.success() {
            return Err(TranscodeError::ProbeFailed {
                reason: format!("ffprobe exited with {}: {}", output.status, stderr_tail(&output)),
            });
        }

        Self::parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    async fn extract_frame(&self, input: &Path, offset: Duration, output_path: &Path) -> Result<(), TranscodeError> {
        Self::ensure_input(input)?;

        let output = Self::run(&self.ffmpeg_path, &Self::frame_args(input, offset, output_path)).await?;
        if !output.status.success() {
            return Err(TranscodeError::FrameFailed {
                reason: format!("ffmpeg exited with {}: {}", output.status, stderr_tail(&output)),
            });
        }
        // ffmpeg exits 0 without writing anything when the offset is past the end.
        if !output_path.exists() {
            return Err(TranscodeError::FrameFailed {
                reason: format!("no frame at {}", format_offset(offset)),
            });
        }

        info!("Frame extracted to {}", output_path.display());
        Ok(())
    }

    async fn transcode(&self, input: &Path, output_path: &Path, options: &TranscodeOptions) -> Result<(), TranscodeError> {
        Self::ensure_input(input)?;

        let args = Self::transcode_args(input, output_path, options);
        let output = Self::run(&self.ffmpeg_path, &args).await?;
        if !output.status.success() {
            let stderr = stderr_tail(&output);
            error!("An error occurred while transcoding {}: {}", input.display(), stderr);
            return Err(TranscodeError::TranscodeFailed {
                reason: format!("ffmpeg exited with {}", output.status),
                stderr: Some(stderr),
            });
        }

        info!("Transcoded {} to {}", input.display(), output_path.display());
        Ok(())
    }
}
