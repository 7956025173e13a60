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

use rand::Rng;

use smallmath::tensor::{self, FilterShape, Shape};
use smallmath::vector::{self, Vector};
use smallmath::Matrix;

use crate::activation_function::{ActivationFunction, ReLuActivationFunction};
use crate::error::Result;
use crate::gradient_descent::GradientDescent;
use crate::layer::{check_equal, check_filters, Layer};
use crate::serialization::Serializable;

/// Squared Euclidean distances between a bank of prototypes and every patch of a feature map.
///
/// For a sample `X` laid out `[height][width][depth]` and prototypes `P` laid out `[prototype][height][width][depth]`,
/// the output laid out `[height'][width'][prototype]` is
///
/// ```text
/// D[i, j, p] = relu(sum(X[i.., j.., ..]^2) - 2 * conv(X, P)[i, j, p] + sum(P[p]^2))
/// ```
///
/// The first term is a convolution of `X^2` against a constant ones kernel with the footprint of one prototype.
/// Distances are never negative, even where rounding in the expansion would make them so.
#[derive(Clone, Debug)]
pub struct L2ConvolutionLayer<G> {
    pub(crate) input_shape: Shape,
    pub(crate) prototype_shape: FilterShape,
    pub(crate) prototypes: Matrix,
    pub(crate) ones: Matrix,

    pub(crate) gradient_descent: G,
    prototype_gradients: Matrix,
}

impl<G> L2ConvolutionLayer<G> where G: GradientDescent {
    /// Prototypes drawn uniformly from `[0, 1)`.
    pub fn new<R>(
        input_height: usize,
        input_width: usize,
        input_depth: usize,
        prototype_shape: FilterShape,
        gradient_descent: G,
        rng: &mut R,
    ) -> Result<L2ConvolutionLayer<G>> where R: Rng {
        let input_shape = Shape::new(1, input_height, input_width, input_depth);
        check_filters("L2ConvolutionLayer", input_shape, prototype_shape)?;

        let prototypes = Matrix::from_vec(
            prototype_shape.filters,
            prototype_shape.filter_len(),
            (0..prototype_shape.len()).map(|_| rng.gen::<f32>()).collect(),
        );

        Ok(L2ConvolutionLayer::construct(input_shape, prototype_shape, prototypes, ones(prototype_shape), gradient_descent))
    }

    /// A layer with the given prototypes, one per row, each laid out `[height][width][depth]`.
    pub fn from_prototypes(
        input_height: usize,
        input_width: usize,
        input_depth: usize,
        prototype_shape: FilterShape,
        prototypes: Matrix,
        gradient_descent: G,
    ) -> Result<L2ConvolutionLayer<G>> {
        let input_shape = Shape::new(1, input_height, input_width, input_depth);
        check_filters("L2ConvolutionLayer", input_shape, prototype_shape)?;
        check_equal("L2ConvolutionLayer", "prototype rows", prototype_shape.filters, prototypes.rows())?;
        check_equal("L2ConvolutionLayer", "prototype columns", prototype_shape.filter_len(), prototypes.columns())?;

        Ok(L2ConvolutionLayer::construct(input_shape, prototype_shape, prototypes, ones(prototype_shape), gradient_descent))
    }

    pub(crate) fn construct(
        input_shape: Shape,
        prototype_shape: FilterShape,
        prototypes: Matrix,
        ones: Matrix,
        gradient_descent: G,
    ) -> L2ConvolutionLayer<G> {
        L2ConvolutionLayer {
            input_shape: input_shape,
            prototype_shape: prototype_shape,
            prototype_gradients: Matrix::zeros(prototypes.rows(), prototypes.columns()),
            prototypes: prototypes,
            ones: ones,
            gradient_descent: gradient_descent,
        }
    }

    pub fn prototype_shape(&self) -> FilterShape {
        self.prototype_shape
    }

    pub fn prototypes(&self) -> &Matrix {
        &self.prototypes
    }

    /// The constant kernel summing one prototype-sized patch.
    pub fn ones(&self) -> &Matrix {
        &self.ones
    }

    /// The largest squared distance between a prototype and a patch when both lie in the unit cube.
    pub fn max_distance(&self) -> f32 {
        self.prototype_shape.filter_len() as f32
    }

    fn ones_shape(&self) -> FilterShape {
        FilterShape::new(1, self.prototype_shape.height, self.prototype_shape.width, self.prototype_shape.depth)
    }

    fn prototype_squared_norms(&self) -> Vec<f32> {
        (0..self.prototypes.rows()).map(|p| self.prototypes[p].iter().map(|v| v * v).sum()).collect()
    }
}

fn ones(prototype_shape: FilterShape) -> Matrix {
    Matrix::filled(1, prototype_shape.filter_len(), 1.0)
}

impl<G> Layer for L2ConvolutionLayer<G> where G: 'static + GradientDescent + Serializable {
    fn inputs(&self) -> usize {
        self.input_shape.sample_len()
    }

    fn outputs(&self) -> usize {
        self.prototype_shape.output_shape(self.input_shape).sample_len()
    }

    fn output_shape(&self) -> Vec<usize> {
        let shape = self.prototype_shape.output_shape(self.input_shape);
        vec![shape.height, shape.width, shape.depth]
    }

    fn feed_forward(&self, inputs: &Matrix, outputs: &mut Matrix) {
        let input_shape = self.input_shape.with_batch(inputs.rows());
        let ones_shape = self.ones_shape();

        // x2_patch_sums = conv(inputs ^ 2, ones)
        let mut squared = inputs.as_vector().clone();
        vector::ops::square_assign(&mut squared);
        let mut x2_patch_sums = Vector::zeros(ones_shape.output_shape(input_shape).len());
        tensor::ops::convolve(&squared, input_shape, &self.ones, ones_shape, &mut x2_patch_sums);

        let p2 = self.prototype_squared_norms();

        // outputs = conv(inputs, prototypes)
        outputs.zero();
        tensor::ops::convolve(inputs, input_shape, &self.prototypes, self.prototype_shape, outputs);

        // outputs = relu(x2_patch_sums - 2 * outputs + p2)
        for (location, &x2) in outputs.chunks_mut(self.prototype_shape.filters).zip(x2_patch_sums.iter()) {
            for (distance, &norm) in location.iter_mut().zip(&p2) {
                *distance = ReLuActivationFunction::f(x2 - 2.0 * *distance + norm);
            }
        }
    }

    fn propagate_backward(&mut self, gradients: &Matrix, previous_inputs: &Matrix, previous_gradients: &mut Matrix, rate: f32) {
        let prototype_count = self.prototype_shape.filters;
        let input_shape = self.input_shape.with_batch(previous_inputs.rows());
        let output_shape = self.prototype_shape.output_shape(input_shape);
        let ones_shape = self.ones_shape();

        // Clamped distances pass no gradient.
        let mut distances = Matrix::zeros(previous_inputs.rows(), self.outputs());
        self.feed_forward(previous_inputs, &mut distances);
        let mut masked = gradients.as_vector().clone();
        for (gradient, &distance) in masked.iter_mut().zip(distances.iter()) {
            if distance <= 0.0 {
                *gradient = 0.0;
            }
        }

        let location_sums = Vector::from_vec(masked.chunks(prototype_count).map(|location| location.iter().sum::<f32>()).collect());
        let mut prototype_sums = Vector::zeros(prototype_count);
        for location in masked.chunks(prototype_count) {
            prototype_sums += location;
        }

        // previous_gradients = 2 * previous_inputs .* convT(location_sums, ones) - 2 * convT(masked, prototypes)
        previous_gradients.zero();
        tensor::ops::convolve_input_gradients(&location_sums, ones_shape.output_shape(input_shape), &self.ones, ones_shape, previous_gradients);
        vector::ops::multiply_assign(previous_gradients, previous_inputs);
        let mut cross_gradients = Vector::zeros(input_shape.len());
        tensor::ops::convolve_input_gradients(&masked, output_shape, &self.prototypes, self.prototype_shape, &mut cross_gradients);
        vector::ops::subtract_assign(previous_gradients, &cross_gradients);
        vector::ops::scale_assign(previous_gradients, 2.0);

        // prototype_gradients = 2 * prototypes .* prototype_sums - 2 * filter_gradients(previous_inputs, masked)
        self.prototype_gradients.zero();
        tensor::ops::convolve_filter_gradients(previous_inputs, input_shape, &masked, self.prototype_shape, &mut self.prototype_gradients);
        for p in 0..prototype_count {
            for (gradient, &prototype) in self.prototype_gradients[p].iter_mut().zip(&self.prototypes[p]) {
                *gradient = 2.0 * (prototype * prototype_sums[p] - *gradient);
            }
        }

        self.gradient_descent.descend(&mut self.prototypes, &self.prototype_gradients, rate);
    }

    fn boxed_clone(&self) -> Box<dyn Layer> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::error::Error;
    use crate::gradient_descent::SimpleGradientDescent;

    fn ramp(len: usize, scale: f32) -> Vec<f32> {
        (0..len).map(|i| ((i * 7 % 13) as f32 - 6.0) * scale).collect()
    }

    fn direct_distances(inputs: &Matrix, input_shape: Shape, prototypes: &Matrix, prototype_shape: FilterShape) -> Vec<f32> {
        let input_shape = input_shape.with_batch(inputs.rows());
        let output_shape = prototype_shape.output_shape(input_shape);
        let mut distances = vec![0.0; output_shape.len()];
        for b in 0..output_shape.batch {
            for i in 0..output_shape.height {
                for j in 0..output_shape.width {
                    for p in 0..prototype_shape.filters {
                        let mut sum = 0.0;
                        for di in 0..prototype_shape.height {
                            for dj in 0..prototype_shape.width {
                                for c in 0..prototype_shape.depth {
                                    let difference = inputs.as_vector()[input_shape.index(b, i + di, j + dj, c)]
                                        - prototypes.as_vector()[prototype_shape.index(p, di, dj, c)];
                                    sum += difference * difference;
                                }
                            }
                        }
                        distances[output_shape.index(b, i, j, p)] = sum;
                    }
                }
            }
        }
        distances
    }

    #[test]
    fn test_pointwise_distances_match_direct() {
        let prototype_shape = FilterShape::new(5, 1, 1, 4);
        let layer = L2ConvolutionLayer::new(3, 2, 4, prototype_shape, SimpleGradientDescent::new(), &mut StdRng::seed_from_u64(11)).unwrap();
        let inputs = Matrix::from_vec(2, 24, ramp(48, 0.3));

        assert_eq!(layer.output_shape(), vec![3, 2, 5]);
        let mut outputs = Matrix::zeros(2, layer.outputs());
        layer.feed_forward(&inputs, &mut outputs);

        let expected = direct_distances(&inputs, layer.input_shape, layer.prototypes(), prototype_shape);
        for (output, expected) in outputs.iter().zip(&expected) {
            assert!((output - expected).abs() <= 1e-4 * expected.abs().max(1.0), "{} != {}", output, expected);
        }
    }

    #[test]
    fn test_larger_kernel_distances_match_direct() {
        let prototype_shape = FilterShape::new(3, 2, 2, 2);
        let prototypes = Matrix::from_vec(3, 8, ramp(24, 0.2));
        let layer = L2ConvolutionLayer::from_prototypes(3, 3, 2, prototype_shape, prototypes, SimpleGradientDescent::new()).unwrap();
        let inputs = Matrix::from_vec(1, 18, ramp(18, 0.25));

        assert_eq!(layer.output_shape(), vec![2, 2, 3]);
        assert_eq!(layer.max_distance(), 8.0);
        let mut outputs = Matrix::zeros(1, layer.outputs());
        layer.feed_forward(&inputs, &mut outputs);

        let expected = direct_distances(&inputs, layer.input_shape, layer.prototypes(), prototype_shape);
        for (output, expected) in outputs.iter().zip(&expected) {
            assert!((output - expected).abs() <= 1e-4 * expected.abs().max(1.0), "{} != {}", output, expected);
        }
    }

    #[test]
    fn test_identical_patch_is_zero_distance() {
        let prototype_shape = FilterShape::new(2, 1, 1, 3);
        let prototypes = Matrix::from_vec(2, 3, vec![0.1, 0.7, 0.3, 0.9, 0.2, 0.4]);
        let layer = L2ConvolutionLayer::from_prototypes(1, 1, 3, prototype_shape, prototypes, SimpleGradientDescent::new()).unwrap();

        let inputs = Matrix::from_vec(1, 3, vec![0.1, 0.7, 0.3]);
        let mut outputs = Matrix::zeros(1, 2);
        layer.feed_forward(&inputs, &mut outputs);

        assert!(outputs[(0, 0)] >= 0.0 && outputs[(0, 0)] < 1e-6);
        assert!((outputs[(0, 1)] - (0.64 + 0.25 + 0.01)).abs() < 1e-5);
    }

    #[test]
    fn test_backward_matches_finite_differences() {
        let prototype_shape = FilterShape::new(2, 2, 1, 2);
        let prototypes = Matrix::from_vec(2, 4, vec![0.5, -0.25, 0.75, 0.125, -0.5, 0.25, 1.0, -0.75]);
        let layer = L2ConvolutionLayer::from_prototypes(3, 2, 2, prototype_shape, prototypes, SimpleGradientDescent::new()).unwrap();
        let inputs = Matrix::from_vec(2, 12, ramp(24, 0.2));

        let weights = Matrix::from_vec(2, layer.outputs(), (0..2 * layer.outputs()).map(|i| ((i % 5) as f32 - 2.0) * 0.5).collect());
        let loss = |layer: &L2ConvolutionLayer<SimpleGradientDescent>, inputs: &Matrix| -> f32 {
            let mut outputs = Matrix::zeros(inputs.rows(), layer.outputs());
            layer.feed_forward(inputs, &mut outputs);
            outputs.iter().zip(weights.iter()).map(|(o, w)| o * w).sum()
        };

        // A zero rate leaves the prototypes alone while still reporting input gradients.
        let mut probe = layer.clone();
        let mut previous_gradients = Matrix::zeros(2, 12);
        probe.propagate_backward(&weights, &inputs, &mut previous_gradients, 0.0);
        assert_eq!(probe.prototypes(), layer.prototypes());

        let h = 1e-2;
        for i in 0..inputs.len() {
            let mut plus = inputs.clone();
            plus.as_vector_mut()[i] += h;
            let mut minus = inputs.clone();
            minus.as_vector_mut()[i] -= h;
            let numeric = (loss(&layer, &plus) - loss(&layer, &minus)) / (2.0 * h);
            let analytic = previous_gradients.as_vector()[i];
            assert!((numeric - analytic).abs() < 1e-2 * analytic.abs().max(1.0), "input {}: {} != {}", i, numeric, analytic);
        }

        for i in 0..layer.prototypes().len() {
            let mut plus = layer.clone();
            plus.prototypes.as_vector_mut()[i] += h;
            let mut minus = layer.clone();
            minus.prototypes.as_vector_mut()[i] -= h;
            let numeric = (loss(&plus, &inputs) - loss(&minus, &inputs)) / (2.0 * h);
            let analytic = probe.prototype_gradients.as_vector()[i];
            assert!((numeric - analytic).abs() < 1e-2 * analytic.abs().max(1.0), "prototype {}: {} != {}", i, numeric, analytic);
        }
    }

    #[test]
    fn test_training_pulls_prototype_toward_patch() {
        let prototype_shape = FilterShape::new(1, 1, 1, 2);
        let prototypes = Matrix::from_vec(1, 2, vec![1.0, 1.0]);
        let mut layer = L2ConvolutionLayer::from_prototypes(1, 1, 2, prototype_shape, prototypes, SimpleGradientDescent::new()).unwrap();
        let inputs = Matrix::from_vec(1, 2, vec![0.0, 0.5]);
        let mut previous_gradients = Matrix::zeros(1, 2);

        for _ in 0..100 {
            layer.propagate_backward(&Matrix::filled(1, 1, 1.0), &inputs, &mut previous_gradients, 0.1);
        }

        assert!(layer.prototypes()[(0, 0)].abs() < 1e-3);
        assert!((layer.prototypes()[(0, 1)] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_shape_errors() {
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            L2ConvolutionLayer::new(7, 7, 64, FilterShape::new(10, 1, 1, 128), SimpleGradientDescent::new(), &mut rng).unwrap_err(),
            Error::ShapeMismatch { layer: "L2ConvolutionLayer", field: "channels", expected: 64, found: 128 },
        );
        assert_eq!(
            L2ConvolutionLayer::new(2, 7, 4, FilterShape::new(10, 3, 1, 4), SimpleGradientDescent::new(), &mut rng).unwrap_err(),
            Error::KernelTooLarge { layer: "L2ConvolutionLayer", kernel_height: 3, kernel_width: 1, input_height: 2, input_width: 7 },
        );
        assert_eq!(
            L2ConvolutionLayer::from_prototypes(2, 2, 4, FilterShape::new(3, 1, 1, 4), Matrix::zeros(2, 4), SimpleGradientDescent::new()).unwrap_err(),
            Error::ShapeMismatch { layer: "L2ConvolutionLayer", field: "prototype rows", expected: 3, found: 2 },
        );
    }
}
