// Dataset trait — unified interface for any labeled image source

use vole_core::{Error, Result};

/// A single sample: decoded pixel data plus its class label.
///
/// Pixels are stored flattened in planar `[C, H, W]` order together with
/// their shape, so samples can be stacked into batch tensors later.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Flattened pixel values.
    pub pixels: Vec<f32>,
    /// Shape of the pixel tensor, e.g. `[1, 28, 28]`.
    pub shape: Vec<usize>,
    /// Class index in `[0, num_classes)`.
    pub label: usize,
}

/// A dataset is an indexed, immutable-after-construction collection of
/// samples.
///
/// Implementations must be `Send + Sync` so the loader can read from
/// multiple threads when parallel fetching is enabled.
pub trait Dataset: Send + Sync {
    /// Total number of samples. Fixed once the dataset is constructed.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve the sample at position `index`.
    ///
    /// Fails with [`Error::OutOfRange`] when `index >= len()`, and with
    /// [`Error::Decode`] when the backing file cannot be read or decoded.
    /// Every returned sample's shape equals [`Dataset::sample_shape`] and
    /// its label lies in `[0, num_classes)`.
    fn get(&self, index: usize) -> Result<Sample>;

    /// The shape of a single sample's pixel tensor (without batch dim).
    fn sample_shape(&self) -> &[usize];

    /// Number of distinct classes.
    fn num_classes(&self) -> usize;

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}

/// An in-memory dataset over a `Vec` of samples.
///
/// Mostly useful for tests and toy problems, but also the cheapest way to
/// wrap already-decoded data.
#[derive(Debug, Clone)]
pub struct MemoryDataset {
    samples: Vec<Sample>,
    shape: Vec<usize>,
    num_classes: usize,
}

impl MemoryDataset {
    /// Build from samples, validating that every sample shares one shape
    /// and that every label is in range.
    pub fn new(samples: Vec<Sample>, num_classes: usize) -> Result<Self> {
        let shape = match samples.first() {
            Some(s) => s.shape.clone(),
            None => return Err(Error::config("MemoryDataset: no samples")),
        };
        for (i, s) in samples.iter().enumerate() {
            if s.shape != shape {
                return Err(Error::ShapeMismatch {
                    expected: shape,
                    got: s.shape.clone(),
                });
            }
            if s.label >= num_classes {
                return Err(Error::config(format!(
                    "MemoryDataset: sample {} has label {} but only {} classes",
                    i, s.label, num_classes
                )));
            }
        }
        Ok(MemoryDataset {
            samples,
            shape,
            num_classes,
        })
    }
}

impl Dataset for MemoryDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        self.samples
            .get(index)
            .cloned()
            .ok_or(Error::OutOfRange {
                index,
                len: self.samples.len(),
            })
    }

    fn sample_shape(&self) -> &[usize] {
        &self.shape
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn name(&self) -> &str {
        "memory"
    }
}
