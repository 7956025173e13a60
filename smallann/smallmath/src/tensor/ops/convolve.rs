//
// This file is part of smallmath.
//
// smallmath is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// smallmath is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with smallmath. If not, see <http://www.gnu.org/licenses/>.
//
// Copyright 2017 Chris Foster
//

use crate::tensor::{FilterShape, Shape};

/// Valid, stride 1 convolution of `inputs` against every filter in `filters`, accumulating into `outputs`.
///
/// `outputs` has the shape `filter_shape.output_shape(input_shape)`; output channel `o` is filter `o`.
pub fn convolve(inputs: &[f32], input_shape: Shape, filters: &[f32], filter_shape: FilterShape, outputs: &mut [f32]) {
    let output_shape = filter_shape.output_shape(input_shape);

    debug_assert!(inputs.len() == input_shape.len(), "Input length doesn't match its shape!");
    debug_assert!(filters.len() == filter_shape.len(), "Filter length doesn't match its shape!");
    debug_assert!(outputs.len() == output_shape.len(), "Output length doesn't match the convolution shape!");

    let depth = input_shape.depth;

    for sample in 0..output_shape.batch {
        for row in 0..output_shape.height {
            for column in 0..output_shape.width {
                let output_start = output_shape.index(sample, row, column, 0);
                let output = &mut outputs[output_start..output_start + output_shape.depth];

                for filter_row in 0..filter_shape.height {
                    for filter_column in 0..filter_shape.width {
                        let input_start = input_shape.index(sample, row + filter_row, column + filter_column, 0);
                        let patch = &inputs[input_start..input_start + depth];

                        for (filter, output) in output.iter_mut().enumerate() {
                            let filter_start = filter_shape.index(filter, filter_row, filter_column, 0);
                            *output += dot(patch, &filters[filter_start..filter_start + depth]);
                        }
                    }
                }
            }
        }
    }
}

/// Gradient of [`convolve`](fn.convolve.html) with respect to its inputs, accumulating into `input_gradients`.
///
/// `gradients` has the convolution's output shape, `output_shape`.
pub fn convolve_input_gradients(
    gradients: &[f32],
    output_shape: Shape,
    filters: &[f32],
    filter_shape: FilterShape,
    input_gradients: &mut [f32],
) {
    let input_shape = Shape::new(
        output_shape.batch,
        output_shape.height + filter_shape.height - 1,
        output_shape.width + filter_shape.width - 1,
        filter_shape.depth,
    );

    debug_assert!(output_shape.depth == filter_shape.filters, "Gradient depth doesn't match the filter count!");
    debug_assert!(gradients.len() == output_shape.len(), "Gradient length doesn't match its shape!");
    debug_assert!(filters.len() == filter_shape.len(), "Filter length doesn't match its shape!");
    debug_assert!(input_gradients.len() == input_shape.len(), "Input gradient length doesn't match the convolution shape!");

    let depth = input_shape.depth;

    for sample in 0..output_shape.batch {
        for row in 0..output_shape.height {
            for column in 0..output_shape.width {
                let gradient_start = output_shape.index(sample, row, column, 0);
                let gradient = &gradients[gradient_start..gradient_start + output_shape.depth];

                for filter_row in 0..filter_shape.height {
                    for filter_column in 0..filter_shape.width {
                        let input_start = input_shape.index(sample, row + filter_row, column + filter_column, 0);
                        let input_gradient = &mut input_gradients[input_start..input_start + depth];

                        for (filter, &g) in gradient.iter().enumerate() {
                            let filter_start = filter_shape.index(filter, filter_row, filter_column, 0);
                            for (input_gradient, weight) in input_gradient.iter_mut().zip(&filters[filter_start..filter_start + depth]) {
                                *input_gradient += g * weight;
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Gradient of [`convolve`](fn.convolve.html) with respect to its filters, accumulating into `filter_gradients`.
pub fn convolve_filter_gradients(
    inputs: &[f32],
    input_shape: Shape,
    gradients: &[f32],
    filter_shape: FilterShape,
    filter_gradients: &mut [f32],
) {
    let output_shape = filter_shape.output_shape(input_shape);

    debug_assert!(inputs.len() == input_shape.len(), "Input length doesn't match its shape!");
    debug_assert!(gradients.len() == output_shape.len(), "Gradient length doesn't match the convolution shape!");
    debug_assert!(filter_gradients.len() == filter_shape.len(), "Filter gradient length doesn't match its shape!");

    let depth = input_shape.depth;

    for sample in 0..output_shape.batch {
        for row in 0..output_shape.height {
            for column in 0..output_shape.width {
                let gradient_start = output_shape.index(sample, row, column, 0);
                let gradient = &gradients[gradient_start..gradient_start + output_shape.depth];

                for filter_row in 0..filter_shape.height {
                    for filter_column in 0..filter_shape.width {
                        let input_start = input_shape.index(sample, row + filter_row, column + filter_column, 0);
                        let patch = &inputs[input_start..input_start + depth];

                        for (filter, &g) in gradient.iter().enumerate() {
                            let filter_start = filter_shape.index(filter, filter_row, filter_column, 0);
                            for (filter_gradient, input) in filter_gradients[filter_start..filter_start + depth].iter_mut().zip(patch) {
                                *filter_gradient += g * input;
                            }
                        }
                    }
                }
            }
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(a, b)| a * b).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_convolution(inputs: &[f32], input_shape: Shape, filters: &[f32], filter_shape: FilterShape) -> Vec<f32> {
        let output_shape = filter_shape.output_shape(input_shape);
        let mut outputs = vec![0.0; output_shape.len()];
        for b in 0..output_shape.batch {
            for i in 0..output_shape.height {
                for j in 0..output_shape.width {
                    for o in 0..filter_shape.filters {
                        let mut sum = 0.0;
                        for di in 0..filter_shape.height {
                            for dj in 0..filter_shape.width {
                                for c in 0..filter_shape.depth {
                                    sum += inputs[input_shape.index(b, i + di, j + dj, c)] * filters[filter_shape.index(o, di, dj, c)];
                                }
                            }
                        }
                        outputs[output_shape.index(b, i, j, o)] = sum;
                    }
                }
            }
        }
        outputs
    }

    fn ramp(len: usize, scale: f32) -> Vec<f32> {
        (0..len).map(|i| ((i * 7 % 11) as f32 - 5.0) * scale).collect()
    }

    #[test]
    fn test_convolve_matches_direct() {
        let input_shape = Shape::new(2, 4, 3, 2);
        let filter_shape = FilterShape::new(3, 2, 2, 2);
        let inputs = ramp(input_shape.len(), 0.5);
        let filters = ramp(filter_shape.len(), 0.25);

        let mut outputs = vec![0.0; filter_shape.output_shape(input_shape).len()];
        convolve(&inputs, input_shape, &filters, filter_shape, &mut outputs);

        let expected = direct_convolution(&inputs, input_shape, &filters, filter_shape);
        for (output, expected) in outputs.iter().zip(&expected) {
            assert!((output - expected).abs() < 1e-5, "{} != {}", output, expected);
        }
    }

    #[test]
    fn test_convolve_ones_sums_patches() {
        let input_shape = Shape::new(1, 2, 2, 2);
        let inputs = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let filter_shape = FilterShape::new(1, 2, 2, 2);
        let ones = vec![1.0; filter_shape.len()];

        let mut outputs = vec![0.0; 1];
        convolve(&inputs, input_shape, &ones, filter_shape, &mut outputs);

        assert_eq!(outputs, vec![36.0]);
    }

    #[test]
    fn test_gradients_match_finite_differences() {
        let input_shape = Shape::new(1, 3, 3, 2);
        let filter_shape = FilterShape::new(2, 2, 2, 2);
        let inputs = ramp(input_shape.len(), 0.3);
        let filters = ramp(filter_shape.len(), 0.2);
        let output_shape = filter_shape.output_shape(input_shape);

        // Loss is the sum of outputs weighted by a fixed ramp.
        let weights = ramp(output_shape.len(), 0.1);
        let loss = |inputs: &[f32], filters: &[f32]| -> f32 {
            let mut outputs = vec![0.0; output_shape.len()];
            convolve(inputs, input_shape, filters, filter_shape, &mut outputs);
            outputs.iter().zip(&weights).map(|(o, w)| o * w).sum()
        };

        let mut input_gradients = vec![0.0; input_shape.len()];
        convolve_input_gradients(&weights, output_shape, &filters, filter_shape, &mut input_gradients);

        let mut filter_gradients = vec![0.0; filter_shape.len()];
        convolve_filter_gradients(&inputs, input_shape, &weights, filter_shape, &mut filter_gradients);

        let h = 1e-2;
        for i in 0..inputs.len() {
            let mut plus = inputs.clone();
            plus[i] += h;
            let mut minus = inputs.clone();
            minus[i] -= h;
            let numeric = (loss(&plus, &filters) - loss(&minus, &filters)) / (2.0 * h);
            assert!((numeric - input_gradients[i]).abs() < 1e-3, "input {}: {} != {}", i, numeric, input_gradients[i]);
        }

        for i in 0..filters.len() {
            let mut plus = filters.clone();
            plus[i] += h;
            let mut minus = filters.clone();
            minus[i] -= h;
            let numeric = (loss(&inputs, &plus) - loss(&inputs, &minus)) / (2.0 * h);
            assert!((numeric - filter_gradients[i]).abs() < 1e-3, "filter {}: {} != {}", i, numeric, filter_gradients[i]);
        }
    }
}
