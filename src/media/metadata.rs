use crate::core::ProbeError;
use crate::media::fraction;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

/// Format-level metadata reported by `ffprobe -show_entries format -of json`.
///
/// Values are kept as the raw strings the tool printed. Every accessor
/// normalizes a missing value to `""`, `0` or a zero duration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaMetadata {
    format: Format,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Format {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    nb_streams: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    nb_programs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format_long_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    tags: Tags,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Tags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disc: Option<String>,
    // ID3v2.3 frame some taggers use instead of "disc"
    #[serde(rename = "TPA", default, skip_serializing_if = "Option::is_none")]
    tpa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    album_artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    track: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compilation: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

impl MediaMetadata {
    /// Decode the captured output of a full probe.
    ///
    /// Only the first JSON value is read, so trailing diagnostics that ended
    /// up in the same capture do not spoil an otherwise valid report. A report
    /// without a `format` object is rejected.
    pub fn from_probe_output(output: &str) -> Result<Self, ProbeError> {
        let mut values = serde_json::Deserializer::from_str(output).into_iter::<Self>();
        match values.next() {
            Some(Ok(metadata)) => Ok(metadata),
            Some(Err(e)) => Err(ProbeError::Decode(e.to_string())),
            None => Err(ProbeError::Decode("no JSON in probe output".to_string())),
        }
    }

    pub fn filename(&self) -> &str {
        or_empty(&self.format.filename)
    }

    pub fn stream_count(&self) -> u32 {
        self.format.nb_streams
    }

    pub fn program_count(&self) -> u32 {
        self.format.nb_programs
    }

    pub fn format_name(&self) -> &str {
        or_empty(&self.format.format_name)
    }

    pub fn format_long_name(&self) -> &str {
        or_empty(&self.format.format_long_name)
    }

    /// Size in bytes, as printed by the probe
    pub fn size(&self) -> &str {
        or_empty(&self.format.size)
    }

    /// Bit rate in bits per second, as printed by the probe
    pub fn bit_rate(&self) -> &str {
        or_empty(&self.format.bit_rate)
    }

    /// Raw duration string, e.g. `"238.471837"`
    pub fn duration_str(&self) -> &str {
        or_empty(&self.format.duration)
    }

    /// Duration truncated to whole milliseconds; zero if unknown or unparseable.
    pub fn duration(&self) -> Duration {
        parse_seconds(self.duration_str())
    }

    /// The disc tag, falling back to the legacy `TPA` frame when `disc` is empty.
    pub fn disc(&self) -> &str {
        let tags = &self.format.tags;
        match tags.disc.as_deref() {
            Some(disc) if !disc.is_empty() => disc,
            _ => or_empty(&tags.tpa),
        }
    }

    pub fn title(&self) -> &str {
        or_empty(&self.format.tags.title)
    }

    pub fn artist(&self) -> &str {
        or_empty(&self.format.tags.artist)
    }

    pub fn album(&self) -> &str {
        or_empty(&self.format.tags.album)
    }

    pub fn album_artist(&self) -> &str {
        or_empty(&self.format.tags.album_artist)
    }

    pub fn genre(&self) -> &str {
        or_empty(&self.format.tags.genre)
    }

    pub fn track(&self) -> &str {
        or_empty(&self.format.tags.track)
    }

    pub fn date(&self) -> &str {
        or_empty(&self.format.tags.date)
    }

    pub fn is_compilation(&self) -> bool {
        self.format.tags.compilation.as_deref() == Some("1")
    }

    pub fn track_number(&self) -> i32 {
        fraction::parse(self.track()).0
    }

    pub fn total_tracks(&self) -> i32 {
        fraction::parse(self.track()).1
    }

    pub fn disc_number(&self) -> i32 {
        fraction::parse(self.disc()).0
    }

    pub fn total_discs(&self) -> i32 {
        fraction::parse(self.disc()).1
    }
}

/// Convert fractional seconds to a duration, truncating below one millisecond.
pub(crate) fn parse_seconds(raw: &str) -> Duration {
    match raw.trim().parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds > 0.0 => {
            Duration::from_millis((seconds * 1000.0) as u64)
        }
        _ => Duration::ZERO,
    }
}

impl fmt::Display for MediaMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPILATION_REPORT: &str = r#"{
        "format": {
            "filename": "/music/01 Cars.mp3",
            "nb_streams": 2,
            "nb_programs": 0,
            "format_name": "mp3",
            "format_long_name": "MP2/3 (MPEG audio layer 2/3)",
            "start_time": "0.025057",
            "duration": "238.471837",
            "size": "9638590",
            "bit_rate": "323348",
            "probe_score": 51,
            "tags": {
                "disc": "1/1",
                "title": "Cars",
                "artist": "Gary Numan",
                "album": "Just Can't Get Enough: New Wave Hits Of The '80s Vol. 3",
                "album_artist": "Various Artists",
                "genre": "New Wave",
                "track": "1/16",
                "date": "1994",
                "compilation": "1"
            }
        }
    }"#;

    fn decode(json: &str) -> MediaMetadata {
        MediaMetadata::from_probe_output(json).expect("Failed to decode report")
    }

    #[test]
    fn test_decode_full_report() {
        let metadata = decode(COMPILATION_REPORT);

        assert_eq!(metadata.filename(), "/music/01 Cars.mp3");
        assert_eq!(metadata.stream_count(), 2);
        assert_eq!(metadata.program_count(), 0);
        assert_eq!(metadata.format_name(), "mp3");
        assert_eq!(metadata.format_long_name(), "MP2/3 (MPEG audio layer 2/3)");
        assert_eq!(metadata.size(), "9638590");
        assert_eq!(metadata.bit_rate(), "323348");
        assert_eq!(metadata.duration_str(), "238.471837");
        assert_eq!(metadata.disc(), "1/1");
        assert_eq!(metadata.title(), "Cars");
        assert_eq!(metadata.artist(), "Gary Numan");
        assert_eq!(metadata.album(), "Just Can't Get Enough: New Wave Hits Of The '80s Vol. 3");
        assert_eq!(metadata.album_artist(), "Various Artists");
        assert_eq!(metadata.genre(), "New Wave");
        assert_eq!(metadata.track(), "1/16");
        assert_eq!(metadata.date(), "1994");
        assert!(metadata.is_compilation());
        assert_eq!(metadata.track_number(), 1);
        assert_eq!(metadata.total_tracks(), 16);
        assert_eq!(metadata.disc_number(), 1);
        assert_eq!(metadata.total_discs(), 1);
    }

    #[test]
    fn test_duration_truncates_to_millis() {
        let duration = decode(COMPILATION_REPORT).duration();
        assert_eq!(duration.as_secs(), 238);
        assert_eq!(duration.subsec_nanos(), 471_000_000);
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("256.548000"), Duration::from_millis(256_548));
        assert_eq!(parse_seconds("0.9999"), Duration::from_millis(999));
        assert_eq!(parse_seconds("N/A"), Duration::ZERO);
        assert_eq!(parse_seconds(""), Duration::ZERO);
        assert_eq!(parse_seconds("-3.5"), Duration::ZERO);
        assert_eq!(parse_seconds("NaN"), Duration::ZERO);
    }

    #[test]
    fn test_missing_fields_normalize() {
        let metadata = decode(r#"{"format": {}}"#);

        assert_eq!(metadata.filename(), "");
        assert_eq!(metadata.stream_count(), 0);
        assert_eq!(metadata.program_count(), 0);
        assert_eq!(metadata.title(), "");
        assert_eq!(metadata.disc(), "");
        assert_eq!(metadata.duration(), Duration::ZERO);
        assert!(!metadata.is_compilation());
        assert_eq!(metadata.track_number(), 0);
        assert_eq!(metadata.total_discs(), 0);
    }

    #[test]
    fn test_null_tags_and_counts() {
        let metadata = decode(r#"{"format": {"nb_streams": null, "tags": null, "title": null}}"#);
        assert_eq!(metadata.stream_count(), 0);
        assert_eq!(metadata.artist(), "");
    }

    #[test]
    fn test_disc_prefers_disc_tag() {
        let metadata = decode(r#"{"format": {"tags": {"disc": "1/3", "TPA": "2/2"}}}"#);
        assert_eq!(metadata.disc(), "1/3");
        assert_eq!(metadata.disc_number(), 1);
        assert_eq!(metadata.total_discs(), 3);
    }

    #[test]
    fn test_disc_falls_back_to_tpa() {
        let metadata = decode(r#"{"format": {"tags": {"TPA": "2/2"}}}"#);
        assert_eq!(metadata.disc(), "2/2");
        assert_eq!(metadata.disc_number(), 2);
        assert_eq!(metadata.total_discs(), 2);

        let metadata = decode(r#"{"format": {"tags": {"disc": "", "TPA": "2/2"}}}"#);
        assert_eq!(metadata.disc(), "2/2");
    }

    #[test]
    fn test_compilation_flag() {
        let flag = |value: &str| {
            decode(&format!(r#"{{"format": {{"tags": {{"compilation": "{}"}}}}}}"#, value)).is_compilation()
        };
        assert!(flag("1"));
        assert!(!flag("0"));
        assert!(!flag("true"));
        assert!(!flag(" 1"));
    }

    #[test]
    fn test_single_track_without_disc() {
        let metadata = decode(r#"{"format": {"duration": "256.548000", "tags": {"track": "1", "title": "01 - Track 1"}}}"#);

        assert_eq!(metadata.duration().as_secs(), 256);
        assert_eq!(metadata.duration().subsec_nanos(), 548_000_000);
        assert_eq!(metadata.track_number(), 1);
        assert_eq!(metadata.total_tracks(), 0);
        assert_eq!(metadata.disc_number(), 0);
        assert_eq!(metadata.total_discs(), 0);
        assert!(!metadata.is_compilation());
    }

    #[test]
    fn test_trailing_output_is_ignored() {
        let output = format!("{}\n[mp3 @ 0x55d] Estimating duration from bitrate\n", COMPILATION_REPORT);
        assert_eq!(decode(&output).title(), "Cars");
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(MediaMetadata::from_probe_output(""), Err(ProbeError::Decode(_))));
        assert!(matches!(MediaMetadata::from_probe_output("not json"), Err(ProbeError::Decode(_))));
        // ffprobe prints an empty object for inputs it cannot open
        assert!(matches!(MediaMetadata::from_probe_output("{\n\n}\n"), Err(ProbeError::Decode(_))));
    }

    #[test]
    fn test_display_renders_schema_fields() {
        let metadata = decode(r#"{"format": {"duration": "1.5", "tags": {"track": "3/9", "TPA": "1/2"}}}"#);
        let report: serde_json::Value = serde_json::from_str(&metadata.to_string()).expect("Display is JSON");

        assert_eq!(report["format"]["duration"], "1.5");
        assert_eq!(report["format"]["nb_streams"], 0);
        assert_eq!(report["format"]["tags"]["track"], "3/9");
        assert_eq!(report["format"]["tags"]["TPA"], "1/2");
        // derived values are not part of the report
        assert!(report["format"]["tags"].get("disc").is_none());
        assert!(report.get("track_number").is_none());
    }
}
