use crate::core::{FfmpegTools, ProbeError};
use crate::media::metadata::{parse_seconds, MediaMetadata};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Runs `ffprobe` against a media reference and interprets what it prints.
///
/// Both calls block the current thread until the tool exits. Only a failure
/// to start the tool is returned as an error; everything after that is
/// logged and resolved to "no metadata" or a zero duration.
#[derive(Debug, Clone)]
pub struct MetadataProbe {
    tool: PathBuf,
}

impl MetadataProbe {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    pub fn from_tools(tools: &FfmpegTools) -> Self {
        Self::new(tools.probe.clone())
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }

    /// Read the format section of `media`.
    ///
    /// Returns `Ok(None)` for a blank reference (the tool is not run) and
    /// when the output could not be decoded.
    pub fn probe(&self, media: &str) -> Result<Option<MediaMetadata>, ProbeError> {
        if media.trim().is_empty() {
            return Ok(None);
        }
        log::debug!("Getting metadata for {}", media);

        let output = self.run(&["-i", media, "-show_entries", "format", "-of", "json", "-v", "quiet"])?;
        match MediaMetadata::from_probe_output(&output) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(e) => {
                log::error!("Could not parse metadata for {}: {}", media, e);
                Ok(None)
            }
        }
    }

    /// Read only the duration of `media`; zero when blank or not reported.
    pub fn probe_duration(&self, media: &str) -> Result<Duration, ProbeError> {
        if media.trim().is_empty() {
            return Ok(Duration::ZERO);
        }
        log::debug!("Getting duration for {}", media);

        let output = self.run(&["-i", media, "-show_entries", "format=duration", "-v", "quiet"])?;
        match parse_duration_output(&output) {
            Ok(duration) => Ok(duration),
            Err(e) => {
                log::error!("Could not parse duration for {}: {}", media, e);
                Ok(Duration::ZERO)
            }
        }
    }

    /// Run the tool and return stdout followed by stderr as one string.
    fn run(&self, args: &[&str]) -> Result<String, ProbeError> {
        log::debug!("Running {} {}", self.tool.display(), args.join(" "));

        let output = Command::new(&self.tool)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProbeError::Launch {
                tool: self.tool.clone(),
                source,
            })?;

        if !output.status.success() {
            log::warn!("{}", ProbeError::NonZeroExit(output.status.to_string()));
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        log::debug!("Output of process is\n{}", text);
        Ok(text)
    }
}

/// Find the `duration=<seconds>` line of a `format=duration` report.
///
/// ```text
/// [FORMAT]
/// duration=238.471837
/// [/FORMAT]
/// ```
pub fn parse_duration_output(output: &str) -> Result<Duration, ProbeError> {
    let value = output
        .lines()
        .find_map(|line| line.trim().strip_prefix("duration="))
        .ok_or_else(|| ProbeError::Decode("no duration line in probe output".to_string()))?;

    value
        .trim()
        .parse::<f64>()
        .map_err(|e| ProbeError::Decode(format!("bad duration {:?}: {}", value, e)))?;
    Ok(parse_seconds(value))
}
