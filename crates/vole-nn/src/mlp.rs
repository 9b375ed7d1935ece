// Multi-layer perceptron with ReLU between hidden layers
//
// The backward pass is written out per layer rather than driven by a
// general autodiff graph. For a stack of dense layers that is shorter,
// faster, and easier to verify against finite differences.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use vole_core::{find_param, Error, Param, Result, StateDict};

use crate::activation::{relu, relu_mask};
use crate::dense::Dense;

/// A fully-connected classifier, e.g. `Mlp::new(&[784, 400, 120, 84, 10])`.
pub struct Mlp {
    layers: Vec<Dense>,
    sizes: Vec<usize>,
}

/// Intermediate activations recorded by [`Mlp::forward_cached`], consumed
/// by [`Mlp::backward`].
pub struct ForwardCache {
    // Input to each dense layer, post-activation of the previous one.
    inputs: Vec<DMatrix<f32>>,
    // Pre-activation output of each dense layer.
    preacts: Vec<DMatrix<f32>>,
}

/// Per-layer parameter gradients, in layer order.
pub struct Gradients {
    pub weights: Vec<DMatrix<f32>>,
    pub biases: Vec<DVector<f32>>,
}

impl Mlp {
    /// Build with randomly initialized layers from `thread_rng`.
    pub fn new(sizes: &[usize]) -> Result<Self> {
        Self::with_rng(sizes, &mut rand::thread_rng())
    }

    /// Build with a fixed seed for reproducible initialization.
    pub fn seeded(sizes: &[usize], seed: u64) -> Result<Self> {
        Self::with_rng(sizes, &mut StdRng::seed_from_u64(seed))
    }

    fn with_rng<R: rand::Rng>(sizes: &[usize], rng: &mut R) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(Error::config(
                "network needs at least an input and an output size",
            ));
        }
        if sizes.iter().any(|&s| s == 0) {
            return Err(Error::config("layer sizes must be nonzero"));
        }
        let layers = sizes
            .windows(2)
            .map(|w| Dense::new(w[0], w[1], rng))
            .collect();
        Ok(Mlp {
            layers,
            sizes: sizes.to_vec(),
        })
    }

    pub fn in_features(&self) -> usize {
        self.sizes[0]
    }

    pub fn num_classes(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Dense] {
        &mut self.layers
    }

    /// Total scalar parameter count across all layers.
    pub fn num_parameters(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.in_features() * l.out_features() + l.out_features())
            .sum()
    }

    /// Logits for a `(batch x in_features)` input.
    pub fn forward(&self, x: &DMatrix<f32>) -> Result<DMatrix<f32>> {
        let mut h = self.layers[0].forward(x)?;
        for layer in &self.layers[1..] {
            h = layer.forward(&relu(&h))?;
        }
        Ok(h)
    }

    /// Forward pass that records the activations the backward pass needs.
    pub fn forward_cached(&self, x: &DMatrix<f32>) -> Result<(DMatrix<f32>, ForwardCache)> {
        let mut inputs = Vec::with_capacity(self.layers.len());
        let mut preacts = Vec::with_capacity(self.layers.len());
        let mut h = x.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            if i > 0 {
                h = relu(&h);
            }
            let y = layer.forward(&h)?;
            inputs.push(h);
            preacts.push(y.clone());
            h = y;
        }
        let logits = h;
        Ok((logits, ForwardCache { inputs, preacts }))
    }

    /// Backpropagate `dlogits` through the recorded activations.
    pub fn backward(&self, cache: &ForwardCache, dlogits: &DMatrix<f32>) -> Result<Gradients> {
        if cache.inputs.len() != self.layers.len() {
            return Err(Error::msg("forward cache does not match this network"));
        }
        let n = self.layers.len();
        let mut weights = vec![DMatrix::zeros(0, 0); n];
        let mut biases = vec![DVector::zeros(0); n];

        let mut dy = dlogits.clone();
        for i in (0..n).rev() {
            let (dw, db, dx) = self.layers[i].backward(&cache.inputs[i], &dy);
            weights[i] = dw;
            biases[i] = db;
            if i > 0 {
                dy = dx.component_mul(&relu_mask(&cache.preacts[i - 1]));
            }
        }
        Ok(Gradients { weights, biases })
    }

    /// Snapshot all parameters as `fc1.weight`, `fc1.bias`, `fc2.weight`,
    /// ... with row-major weight data.
    pub fn state_dict(&self) -> StateDict {
        let mut state = StateDict::new();
        for (i, layer) in self.layers.iter().enumerate() {
            let (out, inp) = (layer.out_features(), layer.in_features());
            let mut wdata = Vec::with_capacity(out * inp);
            for r in 0..out {
                for c in 0..inp {
                    wdata.push(layer.weight()[(r, c)]);
                }
            }
            let bdata: Vec<f32> = layer.bias().iter().copied().collect();
            // Shapes are consistent with the layer by construction.
            state.push((
                format!("fc{}.weight", i + 1),
                Param {
                    shape: vec![out, inp],
                    data: wdata,
                },
            ));
            state.push((
                format!("fc{}.bias", i + 1),
                Param {
                    shape: vec![out],
                    data: bdata,
                },
            ));
        }
        state
    }

    /// Restore parameters from a snapshot produced by [`Mlp::state_dict`]
    /// for a network of the same architecture.
    pub fn load_state_dict(&mut self, state: &StateDict) -> Result<()> {
        if state.len() != self.layers.len() * 2 {
            return Err(Error::msg(format!(
                "state has {} entries, network expects {}",
                state.len(),
                self.layers.len() * 2
            )));
        }
        for (i, layer) in self.layers.iter_mut().enumerate() {
            let (out, inp) = (layer.out_features(), layer.in_features());

            let wname = format!("fc{}.weight", i + 1);
            let w = find_param(state, &wname)
                .ok_or_else(|| Error::msg(format!("state is missing {}", wname)))?;
            if w.shape != [out, inp] {
                return Err(Error::ShapeMismatch {
                    expected: vec![out, inp],
                    got: w.shape.clone(),
                });
            }
            *layer.weight_mut() = DMatrix::from_row_slice(out, inp, &w.data);

            let bname = format!("fc{}.bias", i + 1);
            let b = find_param(state, &bname)
                .ok_or_else(|| Error::msg(format!("state is missing {}", bname)))?;
            if b.shape != [out] {
                return Err(Error::ShapeMismatch {
                    expected: vec![out],
                    got: b.shape.clone(),
                });
            }
            *layer.bias_mut() = DVector::from_column_slice(&b.data);
        }
        Ok(())
    }
}
