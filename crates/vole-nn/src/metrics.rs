// Classification metrics

use nalgebra::DMatrix;

/// Predicted class per row: the column index of the largest logit.
///
/// Ties go to the lowest index, which keeps predictions deterministic.
pub fn argmax_classes(logits: &DMatrix<f32>) -> Vec<usize> {
    (0..logits.nrows())
        .map(|r| {
            let mut best = 0;
            for c in 1..logits.ncols() {
                if logits[(r, c)] > logits[(r, best)] {
                    best = c;
                }
            }
            best
        })
        .collect()
}

/// Fraction of predictions matching the labels, in `[0, 1]`.
pub fn accuracy(predictions: &[usize], labels: &[usize]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|(p, l)| p == l)
        .count();
    correct as f64 / predictions.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_largest_with_low_index_ties() {
        let logits = DMatrix::from_row_slice(3, 3, &[
            0.1, 0.9, 0.0, //
            2.0, 2.0, 1.0, //
            -1.0, -2.0, -0.5,
        ]);
        assert_eq!(argmax_classes(&logits), vec![1, 0, 2]);
    }

    #[test]
    fn accuracy_counts_matches() {
        assert_eq!(accuracy(&[1, 2, 3, 4], &[1, 0, 3, 0]), 0.5);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }
}
