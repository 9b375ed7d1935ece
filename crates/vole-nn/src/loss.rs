// Softmax cross-entropy, fused with its gradient
//
// Computing loss and dlogits together avoids materializing the softmax
// twice and keeps the max-subtraction stabilization in one place.

use nalgebra::DMatrix;
use vole_core::{bail, Result};

/// Mean cross-entropy of `logits` against integer `labels`, plus the
/// gradient of that mean with respect to the logits.
///
/// `logits` is `(batch x classes)`; `labels[r]` is the true class of row
/// `r`. The returned gradient is `(softmax - onehot) / batch`.
pub fn softmax_cross_entropy(
    logits: &DMatrix<f32>,
    labels: &[usize],
) -> Result<(f64, DMatrix<f32>)> {
    let (batch, classes) = (logits.nrows(), logits.ncols());
    if labels.len() != batch {
        bail!("{} labels for a batch of {}", labels.len(), batch);
    }
    if batch == 0 {
        bail!("cross-entropy over an empty batch");
    }

    let mut dlogits = DMatrix::zeros(batch, classes);
    let mut loss_sum = 0.0f64;
    for r in 0..batch {
        let label = labels[r];
        if label >= classes {
            bail!("label {} out of range for {} classes", label, classes);
        }

        let mut max = f32::NEG_INFINITY;
        for c in 0..classes {
            max = max.max(logits[(r, c)]);
        }
        let mut sum_exp = 0.0f32;
        for c in 0..classes {
            sum_exp += (logits[(r, c)] - max).exp();
        }

        // loss_r = log(sum exp(z - max)) - (z_label - max)
        loss_sum += (sum_exp.ln() - (logits[(r, label)] - max)) as f64;

        let scale = 1.0 / batch as f32;
        for c in 0..classes {
            let p = (logits[(r, c)] - max).exp() / sum_exp;
            let target = if c == label { 1.0 } else { 0.0 };
            dlogits[(r, c)] = (p - target) * scale;
        }
    }

    Ok((loss_sum / batch as f64, dlogits))
}
