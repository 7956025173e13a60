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

use crate::tensor::Shape;

/// Shape of a valid max pool of `input` with a `pool_height` x `pool_width` window and an equal stride.
pub fn pool_output_shape(input: Shape, pool_height: usize, pool_width: usize) -> Shape {
    debug_assert!(pool_height > 0 && pool_width > 0, "Empty pooling window!");
    debug_assert!(pool_height <= input.height && pool_width <= input.width, "Pooling window doesn't fit the input shape!");

    Shape::new(input.batch, input.height / pool_height, input.width / pool_width, input.depth)
}

/// Valid max pool with the stride equal to the window, writing into `outputs`.
///
/// Ties keep the first maximum in row-major window order.  A NaN anywhere in a window propagates to that
/// window's output.  If `indices` is given, it receives the flat input index each output was taken from.
pub fn max_pool(
    inputs: &[f32],
    input_shape: Shape,
    pool_height: usize,
    pool_width: usize,
    outputs: &mut [f32],
    mut indices: Option<&mut [usize]>,
) {
    let output_shape = pool_output_shape(input_shape, pool_height, pool_width);

    debug_assert!(inputs.len() == input_shape.len(), "Input length doesn't match its shape!");
    debug_assert!(outputs.len() == output_shape.len(), "Output length doesn't match the pooled shape!");
    debug_assert!(indices.as_ref().map_or(true, |i| i.len() == outputs.len()), "Index length doesn't match the pooled shape!");

    for sample in 0..output_shape.batch {
        for row in 0..output_shape.height {
            for column in 0..output_shape.width {
                for channel in 0..output_shape.depth {
                    let first = input_shape.index(sample, row * pool_height, column * pool_width, channel);
                    let mut best_index = first;
                    let mut best = inputs[first];

                    for pool_row in 0..pool_height {
                        for pool_column in 0..pool_width {
                            let index = input_shape.index(sample, row * pool_height + pool_row, column * pool_width + pool_column, channel);
                            let value = inputs[index];
                            if value > best || (value.is_nan() && !best.is_nan()) {
                                best = value;
                                best_index = index;
                            }
                        }
                    }

                    let output = output_shape.index(sample, row, column, channel);
                    outputs[output] = best;
                    if let Some(indices) = indices.as_deref_mut() {
                        indices[output] = best_index;
                    }
                }
            }
        }
    }
}
