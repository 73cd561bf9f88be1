//! Nearest-label matching over a gallery of labeled descriptors.

use crate::types::{BestMatch, Descriptor, LabeledDescriptors};
use thiserror::Error;

/// Maximum mean Euclidean distance at which a probe is accepted as a label.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.45;

/// Label answered when no gallery entry is within the threshold.
pub const UNKNOWN_LABEL: &str = "unknown";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("gallery is empty")]
    EmptyGallery,
    #[error("label {0:?} has no descriptors")]
    NoDescriptors(String),
    #[error("blank label in gallery")]
    BlankLabel,
    #[error("descriptor dimension mismatch for {label:?}: expected {expected}, got {actual}")]
    DimensionMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },
    #[error("invalid threshold: {0}")]
    InvalidThreshold(f32),
}

/// Index answering "which label is closest to this descriptor".
///
/// The acceptance threshold is baked into the index at build time.
pub trait MatchIndex: Send + Sync {
    fn best_match(&self, probe: &Descriptor) -> BestMatch;

    /// Labels known to the index, in build order.
    fn labels(&self) -> Vec<String>;

    fn threshold(&self) -> f32;
}

/// Euclidean-distance index with per-label mean distance.
///
/// Always visits every label for a query, so response time does not depend
/// on where the best label sits in the gallery.
#[derive(Debug, Clone)]
pub struct EuclideanMatchIndex {
    entries: Vec<LabeledDescriptors>,
    dimension: usize,
    threshold: f32,
}

impl EuclideanMatchIndex {
    /// Build an index. Entries that share a label are merged into one.
    pub fn build(gallery: Vec<LabeledDescriptors>, threshold: f32) -> Result<Self, MatchError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(MatchError::InvalidThreshold(threshold));
        }

        let mut entries: Vec<LabeledDescriptors> = Vec::with_capacity(gallery.len());
        let mut dimension: Option<usize> = None;

        for entry in gallery {
            if entry.label.trim().is_empty() {
                return Err(MatchError::BlankLabel);
            }
            if entry.descriptors.is_empty() {
                return Err(MatchError::NoDescriptors(entry.label));
            }
            for d in &entry.descriptors {
                let expected = *dimension.get_or_insert(d.len());
                if d.len() != expected || d.is_empty() {
                    return Err(MatchError::DimensionMismatch {
                        label: entry.label.clone(),
                        expected,
                        actual: d.len(),
                    });
                }
            }

            match entries.iter_mut().find(|e| e.label == entry.label) {
                Some(existing) => existing.descriptors.extend(entry.descriptors),
                None => entries.push(entry),
            }
        }

        let dimension = dimension.ok_or(MatchError::EmptyGallery)?;

        tracing::debug!(
            labels = entries.len(),
            dimension,
            threshold,
            "built euclidean match index"
        );

        Ok(Self {
            entries,
            dimension,
            threshold,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl MatchIndex for EuclideanMatchIndex {
    fn best_match(&self, probe: &Descriptor) -> BestMatch {
        if probe.len() != self.dimension {
            return BestMatch {
                label: UNKNOWN_LABEL.to_string(),
                distance: f32::INFINITY,
                matched: false,
            };
        }

        let mut best_distance = f32::INFINITY;
        let mut best_idx: Option<usize> = None;

        for (i, entry) in self.entries.iter().enumerate() {
            let total: f32 = entry
                .descriptors
                .iter()
                .map(|d| probe.euclidean_distance(d))
                .sum();
            let mean = total / entry.descriptors.len() as f32;
            if mean < best_distance {
                best_distance = mean;
                best_idx = Some(i);
            }
        }

        match best_idx {
            Some(idx) if best_distance < self.threshold => BestMatch {
                label: self.entries[idx].label.clone(),
                distance: best_distance,
                matched: true,
            },
            _ => BestMatch {
                label: UNKNOWN_LABEL.to_string(),
                distance: best_distance,
                matched: false,
            },
        }
    }

    fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }

    fn threshold(&self) -> f32 {
        self.threshold
    }
}
