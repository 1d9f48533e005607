/*!
 * Tests for subtitle processing functionality
 */

use std::path::Path;
use subtrans::errors::SubtitleError;
use subtrans::subtitle_processor::{
    OutputMode, SubtitleCollection, SubtitleEntry, SubtitleFormat, TranslationPosition, output_filename,
};

use crate::common::SAMPLE_SRT;

fn translations(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_format_from_path_should_detect_extensions() {
    assert_eq!(SubtitleFormat::from_path(Path::new("a.SRT")).unwrap(), SubtitleFormat::Srt);
    assert_eq!(SubtitleFormat::from_path(Path::new("a.vtt")).unwrap(), SubtitleFormat::Vtt);
    assert_eq!(SubtitleFormat::from_path(Path::new("a.ssa")).unwrap(), SubtitleFormat::Ass);
    assert!(matches!(
        SubtitleFormat::from_path(Path::new("a.mkv")),
        Err(SubtitleError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_parse_srt_should_keep_index_time_and_text() {
    let collection = SubtitleCollection::parse(SubtitleFormat::Srt, SAMPLE_SRT).unwrap();
    assert_eq!(collection.entries.len(), 3);
    assert_eq!(
        collection.entries[1],
        SubtitleEntry::new(2, "00:00:05,000 --> 00:00:09,000", "It contains multiple entries.")
    );
}

#[test]
fn test_parse_srt_with_crlf_and_multiline_text_should_join_lines() {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nFirst line\r\nSecond line\r\n\r\n";
    let collection = SubtitleCollection::parse(SubtitleFormat::Srt, content).unwrap();
    assert_eq!(collection.texts(), translations(&["First line\nSecond line"]));
}

#[test]
fn test_parse_garbage_should_be_a_parse_error() {
    let result = SubtitleCollection::parse(SubtitleFormat::Srt, "just some words\nwithout timing");
    assert!(matches!(result, Err(SubtitleError::Parse { .. })));
}

#[test]
fn test_parse_blank_content_should_yield_no_entries() {
    let collection = SubtitleCollection::parse(SubtitleFormat::Srt, "  \n\n").unwrap();
    assert!(collection.entries.is_empty());
}

#[test]
fn test_parse_vtt_should_skip_header_and_cue_ids() {
    let content = "WEBVTT\n\nintro\n00:00:01.000 --> 00:00:02.000 align:start\nHello\n\n00:03.000 --> 00:04.500\nWorld\n";
    let collection = SubtitleCollection::parse(SubtitleFormat::Vtt, content).unwrap();
    assert_eq!(collection.texts(), translations(&["Hello", "World"]));
    assert_eq!(collection.entries[1].time_range, "00:03.000 --> 00:04.500");
}

#[test]
fn test_parse_vtt_without_header_should_fail() {
    let result = SubtitleCollection::parse(SubtitleFormat::Vtt, "00:00:01.000 --> 00:00:02.000\nHello\n");
    assert!(matches!(result, Err(SubtitleError::Parse { .. })));
}

#[test]
fn test_parse_ass_should_read_dialogue_from_events() {
    let content = "[Script Info]\nTitle: x\n\n[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\nDialogue: 0,0:00:01.50,0:00:03.00,Default,,0,0,0,,{\\b1}Hi,{\\b0} there\\Nfriend\nComment: 0,0:00:04.00,0:00:05.00,Default,,0,0,0,,ignored\n";
    let collection = SubtitleCollection::parse(SubtitleFormat::Ass, content).unwrap();
    assert_eq!(collection.entries.len(), 1);
    assert_eq!(collection.entries[0].time_range, "00:00:01,500 --> 00:00:03,000");
    assert_eq!(collection.entries[0].text, "Hi, there\nfriend");
}

#[test]
fn test_parse_ass_should_skip_dialogue_with_overflowing_hours() {
    let content = "[Events]\nDialogue: 0,9999999999999:00:00.00,9999999999999:00:01.00,Default,,0,0,0,,Broken\nDialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Kept\n";
    let collection = SubtitleCollection::parse(SubtitleFormat::Ass, content).unwrap();
    assert_eq!(collection.entries.len(), 1);
    assert_eq!(collection.entries[0].text, "Kept");
    assert_eq!(collection.entries[0].index, 1);
}

#[test]
fn test_build_translation_only_should_replace_text() {
    let collection = SubtitleCollection::parse(SubtitleFormat::Srt, SAMPLE_SRT).unwrap();
    let output = collection
        .build(&translations(&["Un", "Deux", "Trois"]), OutputMode::TranslationOnly, TranslationPosition::Below)
        .unwrap();
    assert!(output.starts_with("1\n00:00:01,000 --> 00:00:04,000\nUn\n\n"));
    assert!(!output.contains("This is a test subtitle."));
}

#[test]
fn test_build_bilingual_should_respect_position() {
    let collection = SubtitleCollection::parse(SubtitleFormat::Srt, SAMPLE_SRT).unwrap();
    let items = translations(&["Un", "Deux", "Trois"]);

    let below = collection
        .build(&items, OutputMode::OriginalAndTranslation, TranslationPosition::Below)
        .unwrap();
    assert!(below.contains("This is a test subtitle.\nUn\n"));

    let above = collection
        .build(&items, OutputMode::OriginalAndTranslation, TranslationPosition::Above)
        .unwrap();
    assert!(above.contains("Un\nThis is a test subtitle.\n"));
}

#[test]
fn test_build_ass_should_write_header_and_dialogue_lines() {
    let content = "[Events]\nDialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello\n";
    let collection = SubtitleCollection::parse(SubtitleFormat::Ass, content).unwrap();
    let output = collection
        .build(&translations(&["Bonjour\nà tous"]), OutputMode::TranslationOnly, TranslationPosition::Below)
        .unwrap();
    assert!(output.starts_with("[Script Info]"));
    assert!(output.contains("Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Bonjour\\Nà tous\n"));
}

#[test]
fn test_build_vtt_should_start_with_header() {
    let content = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHello\n";
    let collection = SubtitleCollection::parse(SubtitleFormat::Vtt, content).unwrap();
    let output = collection
        .build(&translations(&["Salut"]), OutputMode::TranslationOnly, TranslationPosition::Below)
        .unwrap();
    assert!(output.starts_with("WEBVTT\n\n"));
    assert!(output.contains("00:00:01.000 --> 00:00:02.000\nSalut\n"));
}

#[test]
fn test_build_with_wrong_translation_count_should_fail() {
    let collection = SubtitleCollection::parse(SubtitleFormat::Srt, SAMPLE_SRT).unwrap();
    let result = collection.build(&translations(&["Un"]), OutputMode::TranslationOnly, TranslationPosition::Below);
    assert!(matches!(
        result,
        Err(SubtitleError::TranslationCount { expected: 3, actual: 1 })
    ));
}

#[test]
fn test_output_filename_should_encode_language_and_layout() {
    let input = Path::new("/films/movie.en.srt");
    assert_eq!(
        output_filename(input, "fr", OutputMode::TranslationOnly, TranslationPosition::Below),
        Path::new("movie.en_fr.srt")
    );
    assert_eq!(
        output_filename(input, "fr", OutputMode::OriginalAndTranslation, TranslationPosition::Below),
        Path::new("movie.en_fr_bilingual.srt")
    );
    assert_eq!(
        output_filename(input, "fr", OutputMode::OriginalAndTranslation, TranslationPosition::Above),
        Path::new("movie.en_fr_bilingual_above.srt")
    );
}
