// Learner — the thing a Trainer drives
//
// The trainer only knows how to run epochs and aggregate losses; what a
// "step" means lives behind this trait. `Classifier` is the standard
// implementation: an MLP plus an optimizer.

use nalgebra::DMatrix;
use vole_core::{Error, Result};
use vole_data::Batch;
use vole_nn::{softmax_cross_entropy, Mlp, Optimizer};

/// A model-plus-update-rule that can learn from one batch at a time.
pub trait Learner {
    /// Consume one batch, update parameters, and return the batch loss.
    fn train_step(&mut self, batch: &Batch) -> Result<f64>;
}

/// View a batch as a `(batch x features)` matrix, flattening each sample.
pub fn batch_matrix(batch: &Batch, in_features: usize) -> Result<DMatrix<f32>> {
    let per_sample = batch.sample_len();
    if per_sample != in_features {
        return Err(Error::ShapeMismatch {
            expected: vec![batch.len(), in_features],
            got: vec![batch.len(), per_sample],
        });
    }
    if batch.pixels.len() != batch.len() * per_sample {
        return Err(Error::msg(format!(
            "batch has {} pixels, shape {:?} requires {}",
            batch.pixels.len(),
            batch.shape,
            batch.len() * per_sample
        )));
    }
    Ok(DMatrix::from_row_slice(batch.len(), per_sample, &batch.pixels))
}

/// An [`Mlp`] trained with softmax cross-entropy under some optimizer.
pub struct Classifier<O: Optimizer> {
    model: Mlp,
    optimizer: O,
}

impl<O: Optimizer> Classifier<O> {
    pub fn new(model: Mlp, optimizer: O) -> Self {
        Self { model, optimizer }
    }

    pub fn model(&self) -> &Mlp {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Mlp {
        &mut self.model
    }

    /// Give the trained model back, dropping the optimizer state.
    pub fn into_model(self) -> Mlp {
        self.model
    }
}

impl<O: Optimizer> Learner for Classifier<O> {
    fn train_step(&mut self, batch: &Batch) -> Result<f64> {
        let x = batch_matrix(batch, self.model.in_features())?;
        let (logits, cache) = self.model.forward_cached(&x)?;
        let (loss, dlogits) = softmax_cross_entropy(&logits, &batch.labels)?;
        let grads = self.model.backward(&cache, &dlogits)?;
        self.optimizer.step(&mut self.model, &grads)?;
        Ok(loss)
    }
}
