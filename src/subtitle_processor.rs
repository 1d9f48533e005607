use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::SubtitleError;

// @module: Subtitle parsing and building

// @const: SRT time range, comma or dot before the milliseconds
static SRT_TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,2}:\d{2}:\d{2}[,.]\d{3}\s+-->\s+\d{1,2}:\d{2}:\d{2}[,.]\d{3}").unwrap()
});

// @const: VTT time range, hours optional, cue settings may follow
static VTT_TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}:)?\d{2}:\d{2}\.\d{3}\s+-->\s+(\d{2,}:)?\d{2}:\d{2}\.\d{3}").unwrap()
});

// @const: Blank line separating blocks
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

// @const: ASS override tags such as {\i1} or {\pos(10,20)}
static ASS_OVERRIDE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

// @const: Timestamp components, ASS or SRT/VTT style
static TIMESTAMP_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{1,2}):(\d{1,2})(?:[.,](\d{1,3}))?$").unwrap()
});

const ASS_HEADER: &str = "[Script Info]
Title: Translated Subtitle
ScriptType: v4.00+
WrapStyle: 0
ScaledBorderAndShadow: yes
YCbCr Matrix: None

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
";

// @enum: Supported subtitle container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
    Ass,
}

impl SubtitleFormat {
    /// Detect the format from a file extension (`.ssa` is read as ASS)
    pub fn from_path(path: &Path) -> Result<Self, SubtitleError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            "ass" | "ssa" => Ok(Self::Ass),
            _ => Err(SubtitleError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Srt => "SRT",
            Self::Vtt => "WebVTT",
            Self::Ass => "ASS",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// @enum: What the output file contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    TranslationOnly,
    OriginalAndTranslation,
}

// @enum: Where the translation goes in bilingual output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationPosition {
    #[default]
    Below,
    Above,
}

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Position in the file, 1-based
    pub index: usize,

    // @field: Time range as written, e.g. "00:00:01,000 --> 00:00:02,500"
    pub time_range: String,

    // @field: Subtitle text, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(index: usize, time_range: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index,
            time_range: time_range.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{}", self.time_range)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Parsed subtitle file
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// Container format
    pub format: SubtitleFormat,

    /// Entries in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Parse `content` as `format`
    ///
    /// Blank content yields an empty collection. Non-blank content without a
    /// single recognisable entry is a parse error.
    pub fn parse(format: SubtitleFormat, content: &str) -> Result<Self, SubtitleError> {
        let content = normalize_newlines(content);
        let entries = match format {
            SubtitleFormat::Srt => parse_srt(&content),
            SubtitleFormat::Vtt => parse_vtt(&content)?,
            SubtitleFormat::Ass => parse_ass(&content),
        };

        if entries.is_empty() && !content.trim().is_empty() {
            return Err(SubtitleError::Parse {
                format: format.name().to_string(),
                message: "no subtitle entries found".to_string(),
            });
        }

        debug!("Parsed {} {} entries", entries.len(), format);
        Ok(Self { format, entries })
    }

    /// Texts of all entries, in order
    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    /// Render the collection with `translations` attached
    pub fn build(
        &self,
        translations: &[String],
        mode: OutputMode,
        position: TranslationPosition,
    ) -> Result<String, SubtitleError> {
        if translations.len() != self.entries.len() {
            return Err(SubtitleError::TranslationCount {
                expected: self.entries.len(),
                actual: translations.len(),
            });
        }

        let entries: Vec<SubtitleEntry> = self
            .entries
            .iter()
            .zip(translations)
            .map(|(entry, translation)| SubtitleEntry {
                text: compose_text(&entry.text, translation, mode, position),
                ..entry.clone()
            })
            .collect();

        Ok(match self.format {
            SubtitleFormat::Srt => build_srt(&entries),
            SubtitleFormat::Vtt => build_vtt(&entries),
            SubtitleFormat::Ass => build_ass(&entries),
        })
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Format: {}", self.format)?;
        writeln!(f, "Entries: {}", self.entries.len())
    }
}

/// Text of one output entry
pub fn compose_text(
    original: &str,
    translation: &str,
    mode: OutputMode,
    position: TranslationPosition,
) -> String {
    match (mode, position) {
        (OutputMode::TranslationOnly, _) => translation.to_string(),
        (OutputMode::OriginalAndTranslation, TranslationPosition::Below) => {
            format!("{}\n{}", original, translation)
        }
        (OutputMode::OriginalAndTranslation, TranslationPosition::Above) => {
            format!("{}\n{}", translation, original)
        }
    }
}

/// File name of the translated output for `input`
///
/// `movie.srt` becomes `movie_fr.srt`, `movie_fr_bilingual.srt` or
/// `movie_fr_bilingual_above.srt`.
pub fn output_filename(
    input: &Path,
    target_language: &str,
    mode: OutputMode,
    position: TranslationPosition,
) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "subtitle".to_string());
    let extension = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let suffix = match (mode, position) {
        (OutputMode::TranslationOnly, _) => String::new(),
        (OutputMode::OriginalAndTranslation, TranslationPosition::Below) => "_bilingual".to_string(),
        (OutputMode::OriginalAndTranslation, TranslationPosition::Above) => "_bilingual_above".to_string(),
    };

    PathBuf::from(format!("{}_{}{}{}", stem, target_language, suffix, extension))
}

fn normalize_newlines(content: &str) -> String {
    content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

fn blocks(content: &str) -> impl Iterator<Item = Vec<&str>> {
    BLOCK_SEPARATOR
        .split(content.trim())
        .map(|block| block.lines().map(str::trim_end).collect::<Vec<_>>())
        .filter(|lines| !lines.is_empty())
}

/// Parse SRT blocks: index line, time range line, text lines
fn parse_srt(content: &str) -> Vec<SubtitleEntry> {
    let mut entries = Vec::new();

    for lines in blocks(content) {
        // The index line is sometimes missing
        let (index, rest) = match lines[0].trim().parse::<usize>() {
            Ok(index) => (Some(index), &lines[1..]),
            Err(_) => (None, &lines[..]),
        };

        let Some((time_range, text_lines)) = rest.split_first() else {
            continue;
        };
        if !SRT_TIME_RANGE.is_match(time_range.trim()) {
            warn!("Skipping SRT block without time range: {:?}", lines[0]);
            continue;
        }

        let text = text_lines.join("\n").trim().to_string();
        if text.is_empty() {
            warn!("Skipping empty SRT entry at {}", time_range.trim());
            continue;
        }

        entries.push(SubtitleEntry {
            index: index.unwrap_or(entries.len() + 1),
            time_range: time_range.trim().to_string(),
            text,
        });
    }

    entries
}

/// Parse WebVTT cues: optional cue id, time range line, text lines
fn parse_vtt(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
    if !content.trim_start().starts_with("WEBVTT") {
        return Err(SubtitleError::Parse {
            format: SubtitleFormat::Vtt.name().to_string(),
            message: "missing WEBVTT header".to_string(),
        });
    }

    let mut entries = Vec::new();
    for lines in blocks(content) {
        let Some(position) = lines.iter().take(2).position(|l| VTT_TIME_RANGE.is_match(l.trim())) else {
            continue;
        };

        let text = lines[position + 1..].join("\n").trim().to_string();
        if text.is_empty() {
            continue;
        }

        entries.push(SubtitleEntry {
            index: entries.len() + 1,
            time_range: lines[position].trim().to_string(),
            text,
        });
    }

    Ok(entries)
}

/// Parse `Dialogue:` lines of the `[Events]` section
fn parse_ass(content: &str) -> Vec<SubtitleEntry> {
    let mut entries = Vec::new();
    let mut in_events = false;

    for line in content.lines().map(str::trim) {
        if line.starts_with('[') {
            in_events = line.eq_ignore_ascii_case("[events]");
            continue;
        }
        if !in_events {
            continue;
        }

        let Some(prefix) = line.get(..9) else {
            continue;
        };
        if !prefix.eq_ignore_ascii_case("dialogue:") {
            continue;
        }

        // Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
        let fields: Vec<&str> = line[9..].splitn(10, ',').collect();
        if fields.len() < 10 {
            warn!("Skipping malformed ASS dialogue: {}", line);
            continue;
        }

        let (Some(start), Some(end)) = (parse_timestamp(fields[1]), parse_timestamp(fields[2])) else {
            warn!("Skipping ASS dialogue with invalid times: {}", line);
            continue;
        };

        let text = clean_ass_text(fields[9]);
        if text.is_empty() {
            continue;
        }

        entries.push(SubtitleEntry {
            index: entries.len() + 1,
            time_range: format!("{} --> {}", format_srt_time(start), format_srt_time(end)),
            text,
        });
    }

    entries
}

fn clean_ass_text(text: &str) -> String {
    ASS_OVERRIDE_TAG
        .replace_all(text, "")
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ")
        .trim()
        .to_string()
}

/// Milliseconds from `H:MM:SS.cc`, `HH:MM:SS,mmm` or `MM:SS.mmm`
fn parse_timestamp(value: &str) -> Option<u64> {
    let caps = TIMESTAMP_PARTS.captures(value.trim())?;
    let number = |i: usize| -> Option<u64> { caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok()) };

    let fraction = caps.get(4).map_or(0, |m| {
        // Scale centiseconds (ASS) and tenths to milliseconds
        let digits = m.as_str();
        let value: u64 = digits.parse().unwrap_or(0);
        value * 10u64.pow(3 - digits.len() as u32)
    });

    number(1)?
        .checked_mul(3_600_000)?
        .checked_add(number(2)?.checked_mul(60_000)?)?
        .checked_add(number(3)?.checked_mul(1_000)?)?
        .checked_add(fraction)
}

fn format_srt_time(ms: u64) -> String {
    format!(
        "{:02}:{:02}:{:02},{:03}",
        ms / 3_600_000,
        (ms % 3_600_000) / 60_000,
        (ms % 60_000) / 1_000,
        ms % 1_000
    )
}

fn format_ass_time(ms: u64) -> String {
    format!(
        "{}:{:02}:{:02}.{:02}",
        ms / 3_600_000,
        (ms % 3_600_000) / 60_000,
        (ms % 60_000) / 1_000,
        (ms % 1_000) / 10
    )
}

fn build_srt(entries: &[SubtitleEntry]) -> String {
    entries.iter().map(|e| e.to_string()).collect()
}

fn build_vtt(entries: &[SubtitleEntry]) -> String {
    let mut output = String::from("WEBVTT\n\n");
    for entry in entries {
        output.push_str(&entry.to_string());
    }
    output
}

fn build_ass(entries: &[SubtitleEntry]) -> String {
    let mut output = String::from(ASS_HEADER);
    for entry in entries {
        let Some((start, end)) = entry.time_range.split_once("-->") else {
            warn!("Skipping entry {} with invalid time range", entry.index);
            continue;
        };
        // Cue settings may follow the end time in WebVTT
        let end = end.split_whitespace().next().unwrap_or_default();
        let (Some(start), Some(end)) = (parse_timestamp(start), parse_timestamp(end)) else {
            warn!("Skipping entry {} with invalid time range", entry.index);
            continue;
        };
        output.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
            format_ass_time(start),
            format_ass_time(end),
            entry.text.replace('\n', "\\N")
        ));
    }
    output
}
