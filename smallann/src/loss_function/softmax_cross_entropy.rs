//
// This file is part of smallann.
//
// smallann is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// smallann is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with smallann. If not, see <http://www.gnu.org/licenses/>.
//
// Copyright 2017 Chris Foster
//

use smallmath::Matrix;

use crate::loss_function::LossFunction;

/// Softmax of `logits` into `probabilities`, shifted by the maximum logit for stability.
pub fn softmax(logits: &[f32], probabilities: &mut [f32]) {
    debug_assert!(logits.len() == probabilities.len(), "Logit and probability lengths differ!");

    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let mut total = 0.0;
    for (probability, &logit) in probabilities.iter_mut().zip(logits) {
        *probability = (logit - max).exp();
        total += *probability;
    }
    for probability in probabilities.iter_mut() {
        *probability /= total;
    }
}

/// Cross entropy between target distributions and the softmax of logits, averaged over the batch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftmaxCrossEntropyLossFunction;

impl LossFunction for SoftmaxCrossEntropyLossFunction {
    fn loss(&self, targets: &Matrix, outputs: &Matrix) -> f32 {
        debug_assert!(targets.rows() == outputs.rows() && targets.columns() == outputs.columns(), "Matrix dimensions don't match!");
        if outputs.rows() == 0 {
            return 0.0;
        }

        let mut total = 0.0;
        for row in 0..outputs.rows() {
            let logits = &outputs[row];
            let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let log_sum = logits.iter().map(|l| (l - max).exp()).sum::<f32>().ln() + max;

            // -sum(target * log_softmax)
            total += targets[row].iter().zip(logits).map(|(t, l)| t * (log_sum - l)).sum::<f32>();
        }
        total / outputs.rows() as f32
    }

    fn gradient(&self, targets: &Matrix, outputs: &Matrix, gradients: &mut Matrix) {
        debug_assert!(targets.rows() == outputs.rows() && targets.columns() == outputs.columns(), "Matrix dimensions don't match!");
        gradients.resize(outputs.rows(), outputs.columns());

        let batch = outputs.rows() as f32;
        for row in 0..outputs.rows() {
            softmax(&outputs[row], &mut gradients[row]);

            // (softmax - targets) / batch
            let target_sum = targets[row].iter().sum::<f32>();
            for (gradient, &target) in gradients[row].iter_mut().zip(&targets[row]) {
                *gradient = (*gradient * target_sum - target) / batch;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_logits() {
        let targets = Matrix::from_vec(2, 4, vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let outputs = Matrix::zeros(2, 4);

        let loss = SoftmaxCrossEntropyLossFunction.loss(&targets, &outputs);

        assert!((loss - (4.0f32).ln()).abs() < 1e-6);
    }

    #[test]
    fn test_large_logits_are_stable() {
        let targets = Matrix::from_vec(1, 2, vec![0.0, 1.0]);
        let outputs = Matrix::from_vec(1, 2, vec![1000.0, 0.0]);

        let loss = SoftmaxCrossEntropyLossFunction.loss(&targets, &outputs);

        assert!((loss - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let targets = Matrix::from_vec(2, 3, vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
        let outputs = Matrix::from_vec(2, 3, vec![0.5, -1.0, 2.0, 0.0, 0.25, -0.5]);
        let mut gradients = Matrix::zeros(2, 3);
        SoftmaxCrossEntropyLossFunction.gradient(&targets, &outputs, &mut gradients);

        let h = 1e-2;
        for i in 0..outputs.len() {
            let mut plus = outputs.clone();
            plus.as_vector_mut()[i] += h;
            let mut minus = outputs.clone();
            minus.as_vector_mut()[i] -= h;
            let numeric = (SoftmaxCrossEntropyLossFunction.loss(&targets, &plus) - SoftmaxCrossEntropyLossFunction.loss(&targets, &minus)) / (2.0 * h);
            assert!((numeric - gradients.as_vector()[i]).abs() < 1e-3, "{}: {} != {}", i, numeric, gradients.as_vector()[i]);
        }

        // Each row's gradient sums to zero for one-hot targets.
        for row in 0..2 {
            assert!(gradients[row].iter().sum::<f32>().abs() < 1e-6);
        }
    }

    #[test]
    fn test_softmax() {
        let mut probabilities = [0.0; 3];
        softmax(&[1.0, 1.0, 1.0], &mut probabilities);
        for probability in &probabilities {
            assert!((probability - 1.0 / 3.0).abs() < 1e-6);
        }
    }
}
