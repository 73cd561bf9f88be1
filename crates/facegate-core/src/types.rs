use serde::{Deserialize, Serialize};

/// Region of a detected face in frame coordinates, with optional facial landmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

/// Fixed-length face descriptor produced by the recognition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor {
    pub values: Vec<f32>,
}

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Euclidean distance between two descriptors.
    ///
    /// Descriptors of different length are never comparable and yield
    /// `f32::INFINITY`.
    pub fn euclidean_distance(&self, other: &Descriptor) -> f32 {
        if self.values.len() != other.values.len() {
            return f32::INFINITY;
        }
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

impl From<Vec<f32>> for Descriptor {
    fn from(values: Vec<f32>) -> Self {
        Self { values }
    }
}

/// A single detected face together with its extracted descriptor.
#[derive(Debug, Clone)]
pub struct FaceDescription {
    pub region: FaceRegion,
    pub descriptor: Descriptor,
}

/// An identity registered in the directory.
///
/// Immutable once loaded; consumers only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredIdentity {
    /// 12-digit identity number, compared by exact string match.
    pub identity_number: String,
    pub display_name: String,
    pub descriptor: Descriptor,
    /// Opaque reference to the enrollment photo (path, URL, blob key).
    #[serde(default)]
    pub photo_ref: Option<String>,
}

/// A label with every descriptor that belongs to it.
#[derive(Debug, Clone)]
pub struct LabeledDescriptors {
    pub label: String,
    pub descriptors: Vec<Descriptor>,
}

/// Answer of a match index for one probe descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    /// Closest label, or [`UNKNOWN_LABEL`](crate::matcher::UNKNOWN_LABEL)
    /// when nothing is within the index threshold.
    pub label: String,
    pub distance: f32,
    /// Whether `label` names a gallery entry within the threshold. A gallery
    /// label may itself read "unknown", so only this flag is authoritative.
    pub matched: bool,
}

impl BestMatch {
    /// The gallery label, only when the probe was within the threshold.
    pub fn matched_label(&self) -> Option<&str> {
        self.matched.then_some(self.label.as_str())
    }
}
