// ReLU and its derivative mask

use nalgebra::DMatrix;

/// Elementwise `max(0, x)`.
pub fn relu(x: &DMatrix<f32>) -> DMatrix<f32> {
    x.map(|v| v.max(0.0))
}

/// 1 where the pre-activation was positive, 0 elsewhere.
pub fn relu_mask(preact: &DMatrix<f32>) -> DMatrix<f32> {
    preact.map(|v| if v > 0.0 { 1.0 } else { 0.0 })
}
