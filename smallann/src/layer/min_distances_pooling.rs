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

use smallmath::tensor::{self, Shape};
use smallmath::vector::{self, Vector};
use smallmath::Matrix;

use crate::error::Result;
use crate::layer::{check_nonzero, Layer};

/// Reduces a `[height][width][prototype]` distance map to each prototype's smallest distance.
///
/// Computed as a max pool over the whole map of the negated distances.  Ties resolve to the first location in
/// row-major order, which is also where the backward pass routes each gradient.  A NaN distance makes that
/// prototype's minimum NaN.
#[derive(Clone, Debug)]
pub struct MinDistancesPoolingLayer {
    pub(crate) input_shape: Shape,
}

impl MinDistancesPoolingLayer {
    pub fn new(height: usize, width: usize, prototypes: usize) -> Result<MinDistancesPoolingLayer> {
        check_nonzero("MinDistancesPoolingLayer", "height", height)?;
        check_nonzero("MinDistancesPoolingLayer", "width", width)?;
        check_nonzero("MinDistancesPoolingLayer", "prototypes", prototypes)?;

        Ok(MinDistancesPoolingLayer {
            input_shape: Shape::new(1, height, width, prototypes),
        })
    }

    /// Writes the minimum distances into `outputs` and, for each, the flat input index it came from into `indices`.
    fn pool(&self, inputs: &Matrix, outputs: &mut Matrix, indices: Option<&mut [usize]>) {
        let input_shape = self.input_shape.with_batch(inputs.rows());

        let mut negated = inputs.as_vector().clone();
        vector::ops::scale_assign(&mut negated, -1.0);
        tensor::ops::max_pool(&negated, input_shape, input_shape.height, input_shape.width, outputs, indices);
        vector::ops::scale_assign(outputs, -1.0);
    }
}

impl Layer for MinDistancesPoolingLayer {
    fn inputs(&self) -> usize {
        self.input_shape.sample_len()
    }

    fn outputs(&self) -> usize {
        self.input_shape.depth
    }

    fn feed_forward(&self, inputs: &Matrix, outputs: &mut Matrix) {
        self.pool(inputs, outputs, None);
    }

    fn propagate_backward(&mut self, gradients: &Matrix, previous_inputs: &Matrix, previous_gradients: &mut Matrix, _: f32) {
        let mut minimums = Matrix::zeros(previous_inputs.rows(), self.outputs());
        let mut indices = vec![0; minimums.len()];
        self.pool(previous_inputs, &mut minimums, Some(&mut indices));

        previous_gradients.zero();
        let previous_gradients: &mut Vector = previous_gradients.as_vector_mut();
        for (&index, &gradient) in indices.iter().zip(gradients.iter()) {
            previous_gradients[index] += gradient;
        }
    }

    fn boxed_clone(&self) -> Box<dyn Layer> {
        Box::new(self.clone())
    }
}
