//! # vole-nn
//!
//! Dense networks and training math for the Vole workspace:
//! - [`Mlp`] — a ReLU multi-layer perceptron with an explicit backward pass
//! - [`softmax_cross_entropy`] — loss fused with its logit gradient
//! - [`Optimizer`] / [`Sgd`] — parameter update rules
//! - [`argmax_classes`] / [`accuracy`] — classification metrics

pub mod activation;
pub mod dense;
pub mod loss;
pub mod metrics;
pub mod mlp;
pub mod optim;

pub use dense::Dense;
pub use loss::softmax_cross_entropy;
pub use metrics::{accuracy, argmax_classes};
pub use mlp::{ForwardCache, Gradients, Mlp};
pub use optim::{Optimizer, Sgd};
