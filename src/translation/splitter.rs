/*!
 * Oversized segment handling.
 *
 * A segment longer than the provider's single-request limit is cut into
 * character-aligned chunks, each chunk is translated on its own (one after
 * the other), and the translations are concatenated back in order.
 */

use log::debug;

use crate::errors::TranslationError;

use super::retry::Gateway;

/// Whether `text` exceeds `max_chars` characters
pub fn is_oversized(text: &str, max_chars: usize) -> bool {
    text.chars().count() > max_chars
}

/// Cut `text` into chunks of at most `chunk_chars` characters
///
/// Cuts always fall on `char` boundaries, so multi-byte text is never
/// corrupted. Concatenating the chunks reproduces `text`.
pub fn split_into_chunks(text: &str, chunk_chars: usize) -> Vec<String> {
    let chunk_chars = chunk_chars.max(1);
    let mut chunks = Vec::with_capacity(text.len() / chunk_chars + 1);
    let mut current = String::new();
    let mut count = 0;

    for c in text.chars() {
        current.push(c);
        count += 1;
        if count == chunk_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Translate one oversized segment chunk by chunk
///
/// Any chunk failure aborts the segment and discards partial output.
pub async fn translate_oversized(
    gateway: Gateway<'_>,
    text: &str,
    chunk_chars: usize,
) -> Result<String, TranslationError> {
    let chunks = split_into_chunks(text, chunk_chars);
    debug!(
        "Splitting {}-character segment into {} chunks",
        text.chars().count(),
        chunks.len()
    );

    let mut translated = String::with_capacity(text.len());
    for chunk in chunks {
        translated.push_str(&gateway.translate_one(&chunk).await?);
    }
    Ok(translated)
}
