// Evaluation — accuracy and loss over a held-out loader

use vole_core::Result;
use vole_data::{Batch, DataLoader};
use vole_nn::{argmax_classes, softmax_cross_entropy, Mlp};

use crate::learner::batch_matrix;

/// Aggregated evaluation counters.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub correct: usize,
    pub total: usize,
    pub loss_sum: f64,
    pub batches: usize,
}

impl Evaluation {
    /// Fraction of correctly classified samples, in `[0, 1]`.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Mean per-batch loss.
    pub fn avg_loss(&self) -> f64 {
        if self.batches == 0 {
            0.0
        } else {
            self.loss_sum / self.batches as f64
        }
    }
}

/// Run one pass over the loader without updating the model.
pub fn evaluate(model: &Mlp, loader: &mut DataLoader) -> Result<Evaluation> {
    let mut eval = Evaluation::default();
    for batch in loader.epoch() {
        let batch = batch?;
        let x = batch_matrix(&batch, model.in_features())?;
        let logits = model.forward(&x)?;
        let (loss, _) = softmax_cross_entropy(&logits, &batch.labels)?;
        let preds = argmax_classes(&logits);
        eval.correct += preds
            .iter()
            .zip(&batch.labels)
            .filter(|(p, l)| p == l)
            .count();
        eval.total += batch.len();
        eval.loss_sum += loss;
        eval.batches += 1;
    }
    log::info!(
        "eval: accuracy {:.4} ({}/{}), avg loss {:.4}",
        eval.accuracy(),
        eval.correct,
        eval.total,
        eval.avg_loss()
    );
    Ok(eval)
}

/// Predicted class indices for one batch.
pub fn predict(model: &Mlp, batch: &Batch) -> Result<Vec<usize>> {
    let x = batch_matrix(batch, model.in_features())?;
    Ok(argmax_classes(&model.forward(&x)?))
}
