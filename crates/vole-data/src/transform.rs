// Transform — preprocessing pipeline applied by a dataset before a sample
// is returned

use crate::dataset::Sample;

/// A transform applied to each decoded sample.
///
/// Transforms are pure: they take a sample and return a new one, with no
/// side effects. Order matters, so pipelines are explicit lists.
pub trait Transform: Send + Sync {
    /// Apply the transform to a sample, returning the modified sample.
    fn apply(&self, sample: Sample) -> Sample;
}

/// Shift and scale pixel values: `(x - mean) / std`.
///
/// Decoded pixels arrive in `[0, 1]`; `Normalize::new(0.0, 0.5)` maps them
/// to `[0, 2]`. The mean/std pair is per-dataset configuration, so two
/// datasets can normalize differently.
#[derive(Debug, Clone)]
pub struct Normalize {
    mean: f32,
    std: f32,
}

impl Normalize {
    pub fn new(mean: f32, std: f32) -> Self {
        Self { mean, std }
    }
}

impl Transform for Normalize {
    fn apply(&self, mut sample: Sample) -> Sample {
        for v in &mut sample.pixels {
            *v = (*v - self.mean) / self.std;
        }
        sample
    }
}

/// Chain multiple transforms, applied in order.
pub struct Compose {
    transforms: Vec<Box<dyn Transform>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }
}

impl Transform for Compose {
    fn apply(&self, mut sample: Sample) -> Sample {
        for t in &self.transforms {
            sample = t.apply(sample);
        }
        sample
    }
}
