/*!
 * Request merging for single-text providers.
 *
 * Consecutive segments are joined with newlines into one request while the
 * joined text stays under the merge budget. The reply is split back on
 * newlines. Providers are not obliged to keep line counts intact, so a
 * reply with the wrong number of lines (or a count mismatch from the
 * adapter) sends the group back through per-segment translation.
 *
 * Segments that already span several lines would make the reply ambiguous.
 * They always travel alone.
 */

use log::warn;

use crate::errors::{ErrorKind, TranslationError};

use super::batch::Segment;
use super::retry::Gateway;

/// Delimiter between merged segments
pub const MERGE_DELIMITER: char = '\n';

/// Segments joined into one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedBatch {
    /// Input indices of the merged segments, in order
    pub indices: Vec<usize>,
    /// Original texts, kept for the per-segment fallback
    pub texts: Vec<String>,
    /// Texts joined with the delimiter
    pub merged_text: String,
}

impl MergedBatch {
    fn start(segment: &Segment) -> Self {
        Self {
            indices: vec![segment.index],
            texts: vec![segment.text.clone()],
            merged_text: segment.text.clone(),
        }
    }

    fn char_len(&self) -> usize {
        self.merged_text.chars().count()
    }

    /// Number of segments in the batch
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Whether a segment must not share a request with others
fn is_multiline(segment: &Segment) -> bool {
    segment.text.contains(MERGE_DELIMITER)
}

/// Greedily group consecutive segments under `budget_chars`
///
/// A segment joins the open group only if the joined length (delimiter
/// included) stays strictly below the budget. An empty group always
/// accepts a segment, so every segment lands in exactly one group.
/// A segment containing the delimiter closes the open group and gets a
/// group of its own.
pub fn plan_merged_batches(segments: &[Segment], budget_chars: usize) -> Vec<MergedBatch> {
    let mut batches = Vec::new();
    let mut current: Option<MergedBatch> = None;

    for segment in segments {
        if is_multiline(segment) {
            batches.extend(current.take());
            batches.push(MergedBatch::start(segment));
            continue;
        }

        current = match current.take() {
            None => Some(MergedBatch::start(segment)),
            Some(mut open) => {
                let joined = open.char_len() + 1 + segment.text.chars().count();
                if joined < budget_chars {
                    open.indices.push(segment.index);
                    open.texts.push(segment.text.clone());
                    open.merged_text.push(MERGE_DELIMITER);
                    open.merged_text.push_str(&segment.text);
                    Some(open)
                } else {
                    batches.push(open);
                    Some(MergedBatch::start(segment))
                }
            }
        };
    }

    batches.extend(current);
    batches
}

/// Split a merged reply into trimmed lines, if the count is right
pub fn split_merged_reply(reply: &str, expected: usize) -> Option<Vec<String>> {
    let lines: Vec<String> = reply
        .split(MERGE_DELIMITER)
        .map(|line| line.trim().to_string())
        .collect();
    (lines.len() == expected).then_some(lines)
}

/// Translate a merged batch, falling back to one request per segment
pub async fn translate_merged(
    gateway: Gateway<'_>,
    batch: &MergedBatch,
) -> Result<Vec<String>, TranslationError> {
    // Nothing to split back apart
    if let [text] = batch.texts.as_slice() {
        return Ok(vec![gateway.translate_one(text).await?]);
    }

    match gateway.translate_one(&batch.merged_text).await {
        Ok(reply) => {
            if let Some(lines) = split_merged_reply(&reply, batch.len()) {
                return Ok(lines);
            }
            warn!(
                "Merged reply for segments {:?} has {} lines, expected {}; translating individually",
                batch.indices,
                reply.split(MERGE_DELIMITER).count(),
                batch.len()
            );
        }
        Err(error) if error.kind() == ErrorKind::Mismatch => {
            warn!(
                "Merged request for segments {:?} failed: {}; translating individually",
                batch.indices, error
            );
        }
        Err(error) => return Err(error),
    }

    let mut translated = Vec::with_capacity(batch.len());
    for text in &batch.texts {
        translated.push(gateway.translate_one(text).await?);
    }
    Ok(translated)
}
