//
// This file is part of protopnet.
//
// protopnet is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// protopnet is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with protopnet. If not, see <http://www.gnu.org/licenses/>.
//
// Copyright 2017 Chris Foster
//

//! The composite training loss: softmax cross entropy on the logits plus the prototype cluster and separation
//! costs on the minimum distances.

use smallann::loss_function::{LossFunction, SoftmaxCrossEntropyLossFunction};
use smallann::Matrix;
use tracing::debug;

use crate::config::{LossWeights, PPNetConfig};
use crate::error::{Error, Result};

/// Builds the prototype loss for a configuration and its prototype class identity.
pub fn prototype_loss(config: &PPNetConfig, class_identity: Matrix) -> Result<PrototypeLoss> {
    if class_identity.rows() != config.num_prototypes() || class_identity.columns() != config.num_classes {
        return Err(Error::config(
            "prototype_shape",
            format!(
                "class identity is {}x{}, expected {}x{}",
                class_identity.rows(), class_identity.columns(), config.num_prototypes(), config.num_classes,
            ),
        ));
    }

    let [_, height, width, depth] = config.prototype_shape;

    Ok(PrototypeLoss {
        max_distance: (height * width * depth) as f32,
        class_identity: class_identity,
        cluster_weight: config.loss_weights.cluster,
        separation_weight: config.loss_weights.separation,
    })
}

/// Cluster and separation costs of minimum distances against one-hot targets.
///
/// For each sample the correct mask selects the prototypes of its class (the first maximum of its target row) and
/// the wrong mask selects every other prototype.  A cost is `max_distance - max_p((max_distance - M[p]) * mask[p])`,
/// averaged over the batch, so only the closest masked prototype matters.  A sample whose mask selects nothing
/// adds zero to that cost.
#[derive(Clone, Debug)]
pub struct PrototypeLoss {
    max_distance: f32,
    class_identity: Matrix,
    cluster_weight: f32,
    separation_weight: f32,
}

impl PrototypeLoss {
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// `(cluster cost, separation cost)`
    pub fn costs(&self, targets: &Matrix, min_distances: &Matrix) -> (f32, f32) {
        self.check_dimensions(targets, min_distances);
        if min_distances.rows() == 0 {
            return (0.0, 0.0);
        }

        let mut cluster = 0.0;
        let mut separation = 0.0;
        for sample in 0..min_distances.rows() {
            let label = label_index(&targets[sample]);
            cluster += self.masked_cost(&min_distances[sample], |p| self.correct(p, label)).0;
            separation += self.masked_cost(&min_distances[sample], |p| 1.0 - self.correct(p, label)).0;
        }

        let batch = min_distances.rows() as f32;
        (cluster / batch, separation / batch)
    }

    fn correct(&self, prototype: usize, label: usize) -> f32 {
        self.class_identity[(prototype, label)]
    }

    // Cost of one sample and the prototype it was taken from, if the mask selects anything.
    fn masked_cost<M>(&self, distances: &[f32], mask: M) -> (f32, Option<usize>) where M: Fn(usize) -> f32 {
        if (0..distances.len()).all(|p| mask(p) == 0.0) {
            return (0.0, None);
        }

        let mut best = f32::NEG_INFINITY;
        let mut best_index = 0;
        for (p, &distance) in distances.iter().enumerate() {
            let inverted = (self.max_distance - distance) * mask(p);
            if inverted > best {
                best = inverted;
                best_index = p;
            }
        }

        (self.max_distance - best, Some(best_index))
    }

    fn check_dimensions(&self, targets: &Matrix, min_distances: &Matrix) {
        debug_assert!(targets.rows() == min_distances.rows(), "Target and distance batch sizes differ!");
        debug_assert!(targets.columns() == self.class_identity.columns(), "Target columns don't match the class count!");
        debug_assert!(min_distances.columns() == self.class_identity.rows(), "Distance columns don't match the prototype count!");
    }
}

impl LossFunction for PrototypeLoss {
    fn loss(&self, targets: &Matrix, outputs: &Matrix) -> f32 {
        let (cluster, separation) = self.costs(targets, outputs);
        self.cluster_weight * cluster + self.separation_weight * separation
    }

    fn gradient(&self, targets: &Matrix, outputs: &Matrix, gradients: &mut Matrix) {
        self.check_dimensions(targets, outputs);
        gradients.resize(outputs.rows(), outputs.columns());
        gradients.zero();

        let batch = outputs.rows() as f32;
        for sample in 0..outputs.rows() {
            let label = label_index(&targets[sample]);

            // Each cost moves only with the distance of its first maximizing prototype.
            if let (_, Some(p)) = self.masked_cost(&outputs[sample], |p| self.correct(p, label)) {
                gradients[(sample, p)] += self.cluster_weight * self.correct(p, label) / batch;
            }
            if let (_, Some(p)) = self.masked_cost(&outputs[sample], |p| 1.0 - self.correct(p, label)) {
                gradients[(sample, p)] += self.separation_weight * (1.0 - self.correct(p, label)) / batch;
            }
        }
    }
}

/// Index of the first maximum of a target row.
fn label_index(target: &[f32]) -> usize {
    let mut best = 0;
    for (i, &value) in target.iter().enumerate() {
        if value > target[best] {
            best = i;
        }
    }
    best
}

/// Every term of the composite loss for one batch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LossComponents {
    pub classification: f32,
    pub cluster: f32,
    pub separation: f32,
    /// Weighted sum of the cluster and separation costs.
    pub prototype: f32,
    pub total: f32,
}

/// Classification loss on logits plus the prototype loss on minimum distances.
#[derive(Clone, Debug)]
pub struct CompositeLoss {
    classification: SoftmaxCrossEntropyLossFunction,
    prototype: PrototypeLoss,
    weights: LossWeights,
}

impl CompositeLoss {
    pub fn new(config: &PPNetConfig, class_identity: Matrix) -> Result<CompositeLoss> {
        Ok(CompositeLoss {
            classification: SoftmaxCrossEntropyLossFunction,
            prototype: prototype_loss(config, class_identity)?,
            weights: config.loss_weights,
        })
    }

    pub fn prototype_loss(&self) -> &PrototypeLoss {
        &self.prototype
    }

    pub fn components(&self, targets: &Matrix, logits: &Matrix, min_distances: &Matrix) -> LossComponents {
        let classification = self.classification.loss(targets, logits);
        let (cluster, separation) = self.prototype.costs(targets, min_distances);
        let prototype = self.weights.cluster * cluster + self.weights.separation * separation;

        let components = LossComponents {
            classification: classification,
            cluster: cluster,
            separation: separation,
            prototype: prototype,
            total: self.weights.classification * classification + self.weights.prototype * prototype,
        };

        debug!(
            classification = components.classification,
            cluster = components.cluster,
            separation = components.separation,
            prototype = components.prototype,
            total = components.total,
            "loss components",
        );

        components
    }

    /// Gradient of the total loss with respect to the logits.
    pub fn logit_gradient(&self, targets: &Matrix, logits: &Matrix, gradients: &mut Matrix) {
        self.classification.gradient(targets, logits, gradients);
        for gradient in gradients.iter_mut() {
            *gradient *= self.weights.classification;
        }
    }

    /// Gradient of the total loss with respect to the minimum distances, through the prototype loss only.
    pub fn distance_gradient(&self, targets: &Matrix, min_distances: &Matrix, gradients: &mut Matrix) {
        self.prototype.gradient(targets, min_distances, gradients);
        for gradient in gradients.iter_mut() {
            *gradient *= self.weights.prototype;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_identity::prototype_class_identity;

    fn config(prototypes: usize, classes: usize) -> PPNetConfig {
        PPNetConfig {
            prototype_shape: [prototypes, 1, 1, 2],
            feature_shape: Some([2, 2, 2]),
            num_classes: classes,
            ..PPNetConfig::default()
        }
    }

    fn loss(prototypes: usize, classes: usize) -> CompositeLoss {
        let config = config(prototypes, classes);
        CompositeLoss::new(&config, prototype_class_identity(prototypes, classes).unwrap()).unwrap()
    }

    #[test]
    fn test_costs() {
        // Prototypes 0-1 are class 0, 2-3 class 1; max distance is 2.
        let loss = loss(4, 2);
        let targets = Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0]);
        let distances = Matrix::from_vec(2, 4, vec![
            0.5, 0.25, 1.5, 1.0,
            0.0, 2.0, 1.75, 0.75,
        ]);

        let (cluster, separation) = loss.prototype_loss().costs(&targets, &distances);

        // cluster: 0.25 and 0.75; separation: 1.0 and 0.0
        assert!((cluster - 0.5).abs() < 1e-6, "{}", cluster);
        assert!((separation - 0.5).abs() < 1e-6, "{}", separation);

        let components = loss.components(&targets, &Matrix::zeros(2, 2), &distances);
        assert!((components.prototype - (0.8 * 0.5 - 0.08 * 0.5)).abs() < 1e-6);
        assert!((components.classification - 2.0f32.ln()).abs() < 1e-6);
        assert!((components.total - components.classification - components.prototype).abs() < 1e-6);
    }

    #[test]
    fn test_single_class_has_no_separation() {
        let loss = loss(3, 1);
        let targets = Matrix::from_vec(2, 1, vec![1.0, 1.0]);
        let distances = Matrix::from_vec(2, 3, vec![0.5, 1.0, 1.5, 2.0, 0.25, 0.0]);

        let (cluster, separation) = loss.prototype_loss().costs(&targets, &distances);

        assert_eq!(separation, 0.0);
        assert!((cluster - 0.25).abs() < 1e-6, "{}", cluster);

        let mut gradients = Matrix::zeros(0, 0);
        loss.distance_gradient(&targets, &distances, &mut gradients);
        assert_eq!(&gradients.as_vector()[..], &[0.4, 0.0, 0.0, 0.0, 0.0, 0.4]);
    }

    #[test]
    fn test_first_maximum_wins() {
        let loss = loss(4, 2);
        // Ties between prototypes 0 and 1, and between 2 and 3; a malformed label picks its first maximum.
        let targets = Matrix::from_vec(1, 2, vec![0.5, 0.5]);
        let distances = Matrix::from_vec(1, 4, vec![1.0, 1.0, 0.5, 0.5]);

        let mut gradients = Matrix::zeros(1, 4);
        loss.prototype_loss().gradient(&targets, &distances, &mut gradients);

        assert_eq!(&gradients.as_vector()[..], &[0.8, 0.0, -0.08, 0.0]);
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let loss = loss(6, 3);
        let targets = Matrix::from_vec(2, 3, vec![0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let distances = Matrix::from_vec(2, 6, vec![
            0.3, 1.1, 0.9, 0.4, 1.7, 0.2,
            1.2, 0.1, 0.6, 1.9, 0.8, 0.5,
        ]);

        let mut gradients = Matrix::zeros(2, 6);
        loss.prototype_loss().gradient(&targets, &distances, &mut gradients);

        let h = 1e-3;
        for i in 0..distances.as_vector().len() {
            let mut plus = distances.clone();
            plus.as_vector_mut()[i] += h;
            let mut minus = distances.clone();
            minus.as_vector_mut()[i] -= h;

            let numeric = (loss.prototype_loss().loss(&targets, &plus) - loss.prototype_loss().loss(&targets, &minus)) / (2.0 * h);
            assert!((numeric - gradients.as_vector()[i]).abs() < 1e-3, "{}: {} != {}", i, numeric, gradients.as_vector()[i]);
        }
    }

    #[test]
    fn test_weighted_gradients() {
        let mut config = config(2, 2);
        config.loss_weights = LossWeights { cluster: 0.8, separation: -0.08, classification: 0.5, prototype: 2.0 };
        let loss = CompositeLoss::new(&config, prototype_class_identity(2, 2).unwrap()).unwrap();

        let targets = Matrix::from_vec(1, 2, vec![0.0, 1.0]);
        let mut logit_gradients = Matrix::zeros(1, 2);
        loss.logit_gradient(&targets, &Matrix::zeros(1, 2), &mut logit_gradients);
        assert_eq!(&logit_gradients.as_vector()[..], &[0.25, -0.25]);

        let mut distance_gradients = Matrix::zeros(1, 2);
        loss.distance_gradient(&targets, &Matrix::from_vec(1, 2, vec![1.0, 0.5]), &mut distance_gradients);
        assert!((distance_gradients[(0, 0)] + 0.16).abs() < 1e-6);
        assert!((distance_gradients[(0, 1)] - 1.6).abs() < 1e-6);
    }

    #[test]
    fn test_identity_must_match_config() {
        let config = config(4, 2);
        assert!(prototype_loss(&config, prototype_class_identity(4, 4).unwrap()).is_err());
    }
}
