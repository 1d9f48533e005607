/*!
 * Batch translation processing.
 *
 * This module turns an ordered list of segments into units of work (split
 * segments, merged groups, plain batches), runs the units concurrently under
 * a bounded worker pool, and assembles the results by input index.
 *
 * A failing unit never stops its siblings: every unit runs to completion and
 * the first failure in submission order is reported afterwards.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::Instant;

use crate::errors::TranslationError;

use super::merge::{MergedBatch, plan_merged_batches, translate_merged};
use super::profile::ProviderProfile;
use super::retry::Gateway;
use super::splitter::{is_oversized, translate_oversized};

/// Progress callback invoked with `(completed_units, total_units)`
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// One text to translate, addressed by its input position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub text: String,
}

impl Segment {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Segments sent together in one request, one result per text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Input indices, parallel to `texts`
    pub indices: Vec<usize>,
    pub texts: Vec<String>,
}

/// A unit of work scheduled by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkUnit {
    /// One oversized segment, translated chunk by chunk
    Split(Segment),
    /// Several segments joined into one text
    Merged(MergedBatch),
    /// Several segments sent as a list
    Batch(Batch),
}

impl WorkUnit {
    /// Input indices owned by this unit
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Self::Split(segment) => vec![segment.index],
            Self::Merged(batch) => batch.indices.clone(),
            Self::Batch(batch) => batch.indices.clone(),
        }
    }

    /// Lowest input index owned by this unit
    pub fn first_index(&self) -> usize {
        match self {
            Self::Split(segment) => segment.index,
            Self::Merged(batch) => batch.indices.first().copied().unwrap_or_default(),
            Self::Batch(batch) => batch.indices.first().copied().unwrap_or_default(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Split(_) => "split",
            Self::Merged(_) => "merged",
            Self::Batch(_) => "batch",
        }
    }
}

/// Partition `texts` into units of work
///
/// Oversized segments become `Split` units. The rest are merged under the
/// profile's budget when merging is enabled, otherwise cut into batches of
/// `batch_size` (never more than the adapter accepts per request).
/// Every input index ends up in exactly one unit.
pub fn plan_units(
    texts: &[String],
    profile: &ProviderProfile,
    max_texts_per_request: usize,
) -> Vec<WorkUnit> {
    let (oversized, normal): (Vec<Segment>, Vec<Segment>) = texts
        .iter()
        .enumerate()
        .map(|(index, text)| Segment::new(index, text.as_str()))
        .partition(|segment| is_oversized(&segment.text, profile.max_single_request_chars));

    let mut units: Vec<WorkUnit> = oversized.into_iter().map(WorkUnit::Split).collect();

    if profile.merges() {
        units.extend(
            plan_merged_batches(&normal, profile.merge_budget_chars)
                .into_iter()
                .map(WorkUnit::Merged),
        );
    } else {
        let batch_size = profile.batch_size.min(max_texts_per_request).max(1);
        units.extend(normal.chunks(batch_size).map(|chunk| {
            WorkUnit::Batch(Batch {
                indices: chunk.iter().map(|s| s.index).collect(),
                texts: chunk.iter().map(|s| s.text.clone()).collect(),
            })
        }));
    }

    units
}

/// Concurrent executor for planned units
pub struct BatchDispatcher<'a> {
    gateway: Gateway<'a>,
    profile: ProviderProfile,
    progress: Option<&'a ProgressCallback>,
}

impl<'a> BatchDispatcher<'a> {
    /// Create a new dispatcher
    pub fn new(gateway: Gateway<'a>, profile: ProviderProfile) -> Self {
        Self {
            gateway,
            profile,
            progress: None,
        }
    }

    /// Report progress after every unit
    pub fn with_progress(mut self, progress: Option<&'a ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Run every unit and assemble `len` results in input order
    pub async fn dispatch(
        &self,
        units: Vec<WorkUnit>,
        len: usize,
    ) -> Result<Vec<String>, TranslationError> {
        let total_units = units.len();
        let completed_units = AtomicUsize::new(0);
        let max_concurrent = self.profile.max_concurrent_batches.max(1);

        let mut outcomes = stream::iter(units.iter().enumerate())
            .map(|(position, unit)| {
                let completed_units = &completed_units;
                async move {
                    if self.gateway.cancel.is_cancelled() {
                        return (position, Err(TranslationError::Cancelled));
                    }

                    let start_time = Instant::now();
                    let result = self.run_unit(unit).await;

                    let current = completed_units.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(progress) = self.progress {
                        progress(current, total_units);
                    }

                    match &result {
                        Ok(_) => debug!(
                            "Unit {} of {} ({}, {} segments) completed in {:?}",
                            position + 1,
                            total_units,
                            unit.label(),
                            unit.indices().len(),
                            start_time.elapsed()
                        ),
                        Err(e) => error!(
                            "Unit {} of {} ({}) failed: {}",
                            position + 1,
                            total_units,
                            unit.label(),
                            e
                        ),
                    }

                    (position, result)
                }
            })
            .buffer_unordered(max_concurrent)
            .collect::<Vec<_>>()
            .await;

        // Completion order is irrelevant, failures are ranked by submission
        outcomes.sort_by_key(|(position, _)| *position);

        let mut results: Vec<Option<String>> = vec![None; len];
        let mut first_error = None;

        for (position, outcome) in outcomes {
            match outcome {
                Ok(translated) => {
                    for (index, text) in translated {
                        if let Some(slot) = results.get_mut(index) {
                            *slot = Some(text);
                        }
                    }
                }
                Err(e) if first_error.is_none() => {
                    first_error = Some(TranslationError::UnitFailed {
                        unit: position,
                        first_segment: units[position].first_index(),
                        source: Box::new(e),
                    });
                }
                Err(_) => {}
            }
        }

        if let Some(e) = first_error {
            if self.gateway.cancel.is_cancelled() {
                info!("Translation cancelled after {} of {} units", completed_units.into_inner(), total_units);
                return Err(TranslationError::Cancelled);
            }
            return Err(e);
        }

        results
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or(TranslationError::Incomplete { index }))
            .collect()
    }

    /// Translate one unit, returning `(index, translation)` pairs
    async fn run_unit(&self, unit: &WorkUnit) -> Result<Vec<(usize, String)>, TranslationError> {
        match unit {
            WorkUnit::Split(segment) => {
                let translated =
                    translate_oversized(self.gateway, &segment.text, self.profile.split_chunk_chars).await?;
                Ok(vec![(segment.index, translated)])
            }
            WorkUnit::Merged(batch) => {
                let translated = translate_merged(self.gateway, batch).await?;
                Ok(batch.indices.iter().copied().zip(translated).collect())
            }
            WorkUnit::Batch(batch) => {
                let translated = self.gateway.translate(&batch.texts).await?;
                Ok(batch.indices.iter().copied().zip(translated).collect())
            }
        }
    }
}
