//! Timed caption parsing and the playback-time to caption mapping.

use std::sync::LazyLock;

use manatan_types::SubtitleCue;
use regex::Regex;

use crate::error::{OverlayError, Result};

/// Seeks land on a cue start; this keeps "previous" from re-selecting the
/// cue playback just jumped to.
pub const SEEK_EPSILON: f64 = 0.05;
/// Seek distance when no caption is on screen.
pub const FALLBACK_SEEK_SECONDS: f64 = 10.0;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));
static ASS_OVERRIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]+\}").expect("valid override pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    WebVtt,
    Srt,
    Ass,
}

impl SubtitleFormat {
    /// Header sniffing first, then the URL extension. Unknown input is
    /// treated as SRT-like.
    pub fn detect(input: &str, url: &str) -> Self {
        let trimmed = input.trim_start();
        let url = url.to_lowercase();
        if trimmed.starts_with("WEBVTT") || url.ends_with(".vtt") {
            SubtitleFormat::WebVtt
        } else if url.ends_with(".srt") {
            SubtitleFormat::Srt
        } else if url.ends_with(".ass") || url.ends_with(".ssa") || trimmed.contains("[Events]") {
            SubtitleFormat::Ass
        } else {
            SubtitleFormat::Srt
        }
    }
}

/// `HH:MM:SS.mmm`, `MM:SS.mmm` or the SRT comma form, in seconds.
pub fn parse_timestamp(value: &str) -> Result<f64> {
    let normalized = value.trim().replacen(',', ".", 1);
    let parts: Vec<&str> = normalized.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => ("0", *m, *s),
        _ => return Err(OverlayError::MalformedTimestamp(value.to_string())),
    };
    let (whole, fraction) = seconds.split_once('.').unwrap_or((seconds, "0"));

    let number = |part: &str| -> Result<f64> {
        part.trim()
            .parse::<f64>()
            .map_err(|_| OverlayError::MalformedTimestamp(value.to_string()))
    };
    // "5" is 500ms, "05" is 50ms.
    let millis = format!("{fraction:0<3}");
    Ok(number(hours)? * 3600.0
        + number(minutes)? * 60.0
        + number(whole)?
        + number(&millis)? / 10f64.powi(millis.len() as i32))
}

fn strip_tags(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}

pub fn parse_vtt_or_srt(input: &str) -> Vec<SubtitleCue> {
    let normalized = input.replace('\r', "");
    let lines: Vec<&str> = normalized.split('\n').collect();
    let mut cues = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index].trim();
        if line.is_empty() {
            index += 1;
            continue;
        }
        if line.chars().all(|c| c.is_ascii_digit()) {
            index += 1;
        }

        let time_line = lines.get(index).copied().unwrap_or_default();
        let Some((start_raw, end_raw)) = time_line.split_once("-->") else {
            index += 1;
            continue;
        };
        index += 1;

        let first_token = |raw: &str| raw.split_whitespace().next().unwrap_or_default().to_string();
        let mut text_lines = Vec::new();
        while index < lines.len() && !lines[index].trim().is_empty() {
            text_lines.push(lines[index]);
            index += 1;
        }

        match (
            parse_timestamp(&first_token(start_raw)),
            parse_timestamp(&first_token(end_raw)),
        ) {
            (Ok(start), Ok(end)) => cues.push(SubtitleCue {
                start,
                end,
                text: strip_tags(&text_lines.join("\n")),
            }),
            _ => tracing::debug!(time_line, "skipping cue with malformed timing"),
        }
    }

    cues
}

pub fn parse_ass(input: &str) -> Vec<SubtitleCue> {
    let normalized = input.replace('\r', "");
    let mut cues = Vec::new();
    let mut in_events = false;
    let mut format: Vec<String> = Vec::new();

    for line in normalized.split('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with("[Events]") {
            in_events = true;
            continue;
        }
        if !in_events {
            continue;
        }
        if let Some(columns) = trimmed.strip_prefix("Format:") {
            format = columns.split(',').map(|c| c.trim().to_string()).collect();
            continue;
        }
        let Some(payload) = trimmed.strip_prefix("Dialogue:") else {
            continue;
        };
        if format.is_empty() {
            continue;
        }

        let column = |name: &str| format.iter().position(|c| c == name);
        let (Some(text_at), Some(start_at), Some(end_at)) =
            (column("Text"), column("Start"), column("End"))
        else {
            continue;
        };

        let parts: Vec<&str> = payload.trim().split(',').collect();
        let raw_text = parts.get(text_at..).map(|p| p.join(",")).unwrap_or_default();
        let text = ASS_OVERRIDE
            .replace_all(&raw_text, "")
            .replace("\\N", "\n")
            .replace("\\n", "\n");

        let timing = (
            parts.get(start_at).map(|s| parse_timestamp(s)),
            parts.get(end_at).map(|s| parse_timestamp(s)),
        );
        if let (Some(Ok(start)), Some(Ok(end))) = timing {
            cues.push(SubtitleCue {
                start,
                end,
                text: strip_tags(&text),
            });
        }
    }

    cues
}

pub fn parse_subtitles(input: &str, url: &str) -> Result<Vec<SubtitleCue>> {
    let trimmed = input.trim();
    let format = SubtitleFormat::detect(trimmed, url);
    let cues = match format {
        SubtitleFormat::WebVtt | SubtitleFormat::Srt => parse_vtt_or_srt(trimmed),
        SubtitleFormat::Ass => parse_ass(trimmed),
    };
    if cues.is_empty() {
        return Err(OverlayError::EmptySubtitles);
    }
    tracing::debug!(?format, cues = cues.len(), url, "parsed subtitles");
    Ok(cues)
}

/// Cues ordered by start time plus the user's timing offset.
#[derive(Debug, Clone, Default)]
pub struct SubtitleTimeline {
    cues: Vec<SubtitleCue>,
    offset_seconds: f64,
}

impl SubtitleTimeline {
    pub fn new(mut cues: Vec<SubtitleCue>, offset_ms: i64) -> Self {
        cues.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self {
            cues,
            offset_seconds: offset_ms as f64 / 1000.0,
        }
    }

    pub fn set_offset_ms(&mut self, offset_ms: i64) {
        self.offset_seconds = offset_ms as f64 / 1000.0;
    }

    pub fn cues(&self) -> &[SubtitleCue] {
        &self.cues
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn active_at(&self, time: f64) -> Vec<&SubtitleCue> {
        let effective = time + self.offset_seconds;
        self.cues
            .iter()
            .filter(|cue| effective >= cue.start && effective <= cue.end)
            .collect()
    }

    /// Playback time of the previous caption, or ten seconds back when
    /// nothing is showing. `duration` bounds the result when known.
    pub fn previous_seek(&self, time: f64, duration: Option<f64>) -> f64 {
        if self.cues.is_empty() || self.active_at(time).is_empty() {
            return clamp_time(time - FALLBACK_SEEK_SECONDS, duration);
        }
        let effective = time + self.offset_seconds;
        let target = self
            .cues
            .iter()
            .rev()
            .find(|cue| cue.start < effective - SEEK_EPSILON)
            .unwrap_or(&self.cues[0]);
        clamp_time(target.start - self.offset_seconds, duration)
    }

    pub fn next_seek(&self, time: f64, duration: Option<f64>) -> f64 {
        if self.cues.is_empty() || self.active_at(time).is_empty() {
            return clamp_time(time + FALLBACK_SEEK_SECONDS, duration);
        }
        let effective = time + self.offset_seconds;
        let last = &self.cues[self.cues.len() - 1];
        let target = self
            .cues
            .iter()
            .find(|cue| cue.start > effective + SEEK_EPSILON)
            .unwrap_or(last);
        clamp_time(target.start - self.offset_seconds, duration)
    }
}

fn clamp_time(time: f64, duration: Option<f64>) -> f64 {
    let upper = duration.filter(|d| *d > 0.0).unwrap_or(time);
    time.max(0.0).min(upper.max(0.0))
}
