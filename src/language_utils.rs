use anyhow::{Result, anyhow};
use isolang::Language;

use crate::app_config::ProviderKind;

/// Language utilities for the codes accepted by translation providers
///
/// Callers pass short BCP-47 style codes (`en`, `zh-CN`, `zh-TW`, `pt`).
/// The primary subtag is validated against ISO 639-1, and each provider
/// gets the code spelled the way its API expects.
/// Marker for automatic source language detection
pub const AUTO_DETECT: &str = "auto";

/// Primary language subtag of a code (`zh-TW` -> `zh`)
pub fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Validate a target language code
pub fn validate_language_code(code: &str) -> Result<()> {
    let primary = primary_subtag(code);
    if primary.len() == 2 && Language::from_639_1(&primary).is_some() {
        return Ok(());
    }
    if primary.len() == 3 && Language::from_639_3(&primary).is_some() {
        return Ok(());
    }
    Err(anyhow!("Invalid language code: {}", code))
}

/// Validate a source language code, which may also request detection
pub fn validate_source_language(code: &str) -> Result<()> {
    if is_auto(code) {
        return Ok(());
    }
    validate_language_code(code)
}

/// Whether the code asks the provider to detect the language
pub fn is_auto(code: &str) -> bool {
    let trimmed = code.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(AUTO_DETECT)
}

/// Normalise an optional source language: empty means detection
pub fn normalize_source_language(code: &str) -> String {
    if is_auto(code) {
        AUTO_DETECT.to_string()
    } else {
        code.trim().to_string()
    }
}

/// Get the English language name for a code
pub fn get_language_name(code: &str) -> Result<String> {
    let primary = primary_subtag(code);
    let lang = match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}

/// Spell a generic language code the way a provider expects it
pub fn map_language_code(provider: ProviderKind, code: &str) -> String {
    let code = code.trim();
    if is_auto(code) {
        return AUTO_DETECT.to_string();
    }

    match (provider, code) {
        (ProviderKind::Google, _) => code.to_string(),
        (ProviderKind::Volcengine, "zh-CN") => "zh".to_string(),
        (ProviderKind::Volcengine, "zh-TW" | "zh-HK") => "zh-Hant".to_string(),
        (ProviderKind::Aliyun, "zh-CN") => "zh".to_string(),
        (ProviderKind::Aliyun, "zh-TW" | "zh-HK") => "zh-tw".to_string(),
        (ProviderKind::Tencent, "zh-CN") => "zh".to_string(),
        (ProviderKind::Tencent, "zh-HK") => "zh-TW".to_string(),
        _ => code.to_string(),
    }
}
