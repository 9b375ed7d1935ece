// Parameter update rules

use nalgebra::{DMatrix, DVector};
use vole_core::{Error, Result};

use crate::mlp::{Gradients, Mlp};

/// An update rule applied after each backward pass.
pub trait Optimizer {
    /// Apply one step of updates to `model` from `grads`.
    fn step(&mut self, model: &mut Mlp, grads: &Gradients) -> Result<()>;
}

/// Stochastic gradient descent, with optional classical momentum.
pub struct Sgd {
    lr: f32,
    momentum: f32,
    velocity: Option<(Vec<DMatrix<f32>>, Vec<DVector<f32>>)>,
}

impl Sgd {
    pub fn new(lr: f32) -> Self {
        Self {
            lr,
            momentum: 0.0,
            velocity: None,
        }
    }

    pub fn with_momentum(lr: f32, momentum: f32) -> Self {
        Self {
            lr,
            momentum,
            velocity: None,
        }
    }

    pub fn learning_rate(&self) -> f32 {
        self.lr
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, model: &mut Mlp, grads: &Gradients) -> Result<()> {
        let layers = model.layers_mut();
        if grads.weights.len() != layers.len() || grads.biases.len() != layers.len() {
            return Err(Error::msg("gradient count does not match model layers"));
        }

        if self.momentum == 0.0 {
            for (layer, (dw, db)) in layers
                .iter_mut()
                .zip(grads.weights.iter().zip(grads.biases.iter()))
            {
                *layer.weight_mut() -= dw * self.lr;
                *layer.bias_mut() -= db * self.lr;
            }
            return Ok(());
        }

        // v <- momentum * v + grad;  param <- param - lr * v
        let (vw, vb) = self.velocity.get_or_insert_with(|| {
            (
                grads.weights.iter().map(|w| DMatrix::zeros(w.nrows(), w.ncols())).collect(),
                grads.biases.iter().map(|b| DVector::zeros(b.nrows())).collect(),
            )
        });
        if vw.len() != layers.len() {
            return Err(Error::msg("optimizer state does not match model layers"));
        }
        for (i, layer) in layers.iter_mut().enumerate() {
            vw[i] = &vw[i] * self.momentum + &grads.weights[i];
            vb[i] = &vb[i] * self.momentum + &grads.biases[i];
            *layer.weight_mut() -= &vw[i] * self.lr;
            *layer.bias_mut() -= &vb[i] * self.lr;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgd_moves_against_gradient() {
        let mut model = Mlp::seeded(&[2, 3], 0).unwrap();
        let before = model.layers()[0].weight().clone();

        let grads = Gradients {
            weights: vec![DMatrix::from_element(3, 2, 1.0)],
            biases: vec![DVector::from_element(3, 1.0)],
        };
        let mut opt = Sgd::new(0.1);
        opt.step(&mut model, &grads).unwrap();

        let after = model.layers()[0].weight();
        for r in 0..3 {
            for c in 0..2 {
                assert!((after[(r, c)] - (before[(r, c)] - 0.1)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn momentum_accumulates_velocity() {
        let mut model = Mlp::seeded(&[1, 1], 0).unwrap();
        let w0 = model.layers()[0].weight()[(0, 0)];

        let grads = Gradients {
            weights: vec![DMatrix::from_element(1, 1, 1.0)],
            biases: vec![DVector::from_element(1, 0.0)],
        };
        let mut opt = Sgd::with_momentum(1.0, 0.5);
        opt.step(&mut model, &grads).unwrap();
        opt.step(&mut model, &grads).unwrap();

        // Steps of 1.0 then 1.5 with lr 1.0.
        let w = model.layers()[0].weight()[(0, 0)];
        assert!((w - (w0 - 2.5)).abs() < 1e-6);
    }

    #[test]
    fn mismatched_gradients_rejected() {
        let mut model = Mlp::seeded(&[2, 3, 2], 0).unwrap();
        let grads = Gradients {
            weights: vec![DMatrix::zeros(3, 2)],
            biases: vec![DVector::zeros(3)],
        };
        assert!(Sgd::new(0.1).step(&mut model, &grads).is_err());
    }
}
