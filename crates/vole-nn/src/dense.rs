// Dense layer: y = x W^T + b
//
// Weights are stored (out_features x in_features) so a row of the weight
// matrix is one output neuron, matching the usual checkpoint layout.

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use vole_core::{Error, Result};

pub struct Dense {
    weight: DMatrix<f32>,
    bias: DVector<f32>,
}

impl Dense {
    /// Kaiming-uniform initialization: weights and biases drawn from
    /// `U(-k, k)` with `k = sqrt(1 / in_features)`.
    pub fn new<R: Rng>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        let k = (1.0 / in_features as f32).sqrt();
        let weight =
            DMatrix::from_fn(out_features, in_features, |_, _| rng.gen_range(-k..k));
        let bias = DVector::from_fn(out_features, |_, _| rng.gen_range(-k..k));
        Dense { weight, bias }
    }

    pub fn in_features(&self) -> usize {
        self.weight.ncols()
    }

    pub fn out_features(&self) -> usize {
        self.weight.nrows()
    }

    pub fn weight(&self) -> &DMatrix<f32> {
        &self.weight
    }

    pub fn bias(&self) -> &DVector<f32> {
        &self.bias
    }

    pub fn weight_mut(&mut self) -> &mut DMatrix<f32> {
        &mut self.weight
    }

    pub fn bias_mut(&mut self) -> &mut DVector<f32> {
        &mut self.bias
    }

    /// Forward pass over a `(batch x in_features)` input.
    pub fn forward(&self, x: &DMatrix<f32>) -> Result<DMatrix<f32>> {
        if x.ncols() != self.in_features() {
            return Err(Error::ShapeMismatch {
                expected: vec![x.nrows(), self.in_features()],
                got: vec![x.nrows(), x.ncols()],
            });
        }
        let mut y = x * self.weight.transpose();
        for r in 0..y.nrows() {
            for c in 0..y.ncols() {
                y[(r, c)] += self.bias[c];
            }
        }
        Ok(y)
    }

    /// Gradients for one layer given its input `x` and the upstream
    /// gradient `dy`, both `(batch x features)` shaped.
    ///
    /// Returns `(dW, db, dx)`.
    pub fn backward(
        &self,
        x: &DMatrix<f32>,
        dy: &DMatrix<f32>,
    ) -> (DMatrix<f32>, DVector<f32>, DMatrix<f32>) {
        let dw = dy.transpose() * x;
        let db = dy.row_sum().transpose();
        let dx = dy * &self.weight;
        (dw, db, dx)
    }
}
