// DataLoader — batching, shuffling, and parallel sample fetch
//
// The loader borrows a dataset and hands out one pass at a time via
// `epoch()`. Each pass draws a fresh permutation when shuffling, so two
// consecutive epochs visit the data in different orders, while a fixed
// seed still makes the whole sequence of passes reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use vole_core::{Error, Result};

use crate::dataset::Dataset;

/// Loader configuration with builder-style setters.
#[derive(Debug, Clone, Copy)]
pub struct DataLoaderConfig {
    /// Samples per batch.
    pub batch_size: usize,
    /// Reshuffle the index order on every pass.
    pub shuffle: bool,
    /// Drop the final short batch instead of yielding it.
    pub drop_last: bool,
    /// Fetch samples of a batch in parallel when nonzero.
    pub num_workers: usize,
    /// Base seed for shuffling; `None` means nondeterministic.
    pub seed: Option<u64>,
}

impl Default for DataLoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            shuffle: true,
            drop_last: false,
            num_workers: 0,
            seed: None,
        }
    }
}

impl DataLoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    pub fn shuffle(mut self, yes: bool) -> Self {
        self.shuffle = yes;
        self
    }

    pub fn drop_last(mut self, yes: bool) -> Self {
        self.drop_last = yes;
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// A stack of samples ready for a training or evaluation step.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// All sample pixels concatenated in index order.
    pub pixels: Vec<f32>,
    /// Batch shape, sample shape prefixed by the batch dimension,
    /// e.g. `[4, 1, 28, 28]`.
    pub shape: Vec<usize>,
    /// One label per sample.
    pub labels: Vec<usize>,
}

impl Batch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Elements per sample.
    pub fn sample_len(&self) -> usize {
        self.shape[1..].iter().product()
    }
}

/// Iterates a dataset in batches, one pass per call to [`DataLoader::epoch`].
pub struct DataLoader<'d> {
    dataset: &'d dyn Dataset,
    config: DataLoaderConfig,
    // Completed passes; feeds into the per-pass shuffle seed.
    pass: u64,
}

impl<'d> DataLoader<'d> {
    /// Wrap a dataset. Fails when `batch_size` is zero.
    pub fn new(dataset: &'d dyn Dataset, config: DataLoaderConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(Error::config("loader batch_size must be at least 1"));
        }
        Ok(Self {
            dataset,
            config,
            pass: 0,
        })
    }

    /// Number of batches a single pass yields.
    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        let b = self.config.batch_size;
        if self.config.drop_last {
            n / b
        } else {
            n.div_ceil(b)
        }
    }

    /// Samples visited per pass (excludes a dropped final short batch).
    pub fn num_samples(&self) -> usize {
        if self.config.drop_last {
            self.num_batches() * self.config.batch_size
        } else {
            self.dataset.len()
        }
    }

    /// Begin a new pass over the dataset.
    ///
    /// With `shuffle` on, each call draws a fresh permutation; a seeded
    /// loader derives pass `k`'s permutation from `seed + k`, so the same
    /// seed replays the same sequence of epochs.
    pub fn epoch(&mut self) -> EpochIter<'d> {
        let mut indices: Vec<usize> = (0..self.dataset.len()).collect();
        if self.config.shuffle {
            match self.config.seed {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(self.pass));
                    indices.shuffle(&mut rng);
                }
                None => indices.shuffle(&mut rand::thread_rng()),
            }
        }
        self.pass += 1;
        EpochIter {
            dataset: self.dataset,
            indices,
            batch_size: self.config.batch_size,
            drop_last: self.config.drop_last,
            parallel: self.config.num_workers > 0,
            cursor: 0,
        }
    }
}

/// One pass over the dataset, yielding batches in permutation order.
pub struct EpochIter<'d> {
    dataset: &'d dyn Dataset,
    indices: Vec<usize>,
    batch_size: usize,
    drop_last: bool,
    parallel: bool,
    cursor: usize,
}

impl<'d> EpochIter<'d> {
    fn collate(&self, indices: &[usize]) -> Result<Batch> {
        let samples = if self.parallel {
            indices
                .par_iter()
                .map(|&i| self.dataset.get(i))
                .collect::<Result<Vec<_>>>()?
        } else {
            indices
                .iter()
                .map(|&i| self.dataset.get(i))
                .collect::<Result<Vec<_>>>()?
        };

        let sample_shape = samples[0].shape.clone();
        let mut pixels = Vec::with_capacity(samples.len() * samples[0].pixels.len());
        let mut labels = Vec::with_capacity(samples.len());
        for s in samples {
            if s.shape != sample_shape {
                return Err(Error::ShapeMismatch {
                    expected: sample_shape,
                    got: s.shape,
                });
            }
            pixels.extend_from_slice(&s.pixels);
            labels.push(s.label);
        }

        let mut shape = Vec::with_capacity(sample_shape.len() + 1);
        shape.push(labels.len());
        shape.extend_from_slice(&sample_shape);
        Ok(Batch {
            pixels,
            shape,
            labels,
        })
    }
}

impl<'d> Iterator for EpochIter<'d> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.indices.len() - self.cursor;
        if remaining == 0 || (self.drop_last && remaining < self.batch_size) {
            return None;
        }
        let take = remaining.min(self.batch_size);
        let slice = &self.indices[self.cursor..self.cursor + take];
        let batch = self.collate(slice);
        self.cursor += take;
        Some(batch)
    }
}
