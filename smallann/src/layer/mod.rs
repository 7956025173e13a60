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

use smallmath::{FilterShape, Matrix, Shape};

use crate::error::{Error, Result};
use crate::serialization::Serializable;

pub use self::activation::ActivationLayer;
pub use self::convolutional::ConvolutionalLayer;
pub use self::fully_connected::FullyConnectedLayer;
pub use self::l2_convolution::L2ConvolutionLayer;
pub use self::min_distances_pooling::MinDistancesPoolingLayer;

/// One stage of a network.  Each row of an input or output matrix is one sample.
pub trait Layer: Serializable + Send {
    fn inputs(&self) -> usize;
    fn outputs(&self) -> usize;

    /// Per-sample shape of the outputs, outermost dimension first.
    fn output_shape(&self) -> Vec<usize> {
        vec![self.outputs()]
    }

    fn feed_forward(&self, inputs: &Matrix, outputs: &mut Matrix);

    /// Given the loss gradients with respect to this layer's outputs for `previous_inputs`, writes the gradients
    /// with respect to those inputs into `previous_gradients` and updates any parameters.
    fn propagate_backward(&mut self, gradients: &Matrix, previous_inputs: &Matrix, previous_gradients: &mut Matrix, rate: f32);

    fn boxed_clone(&self) -> Box<dyn Layer>;
}

impl Clone for Box<dyn Layer> {
    fn clone(&self) -> Box<dyn Layer> {
        self.boxed_clone()
    }
}

pub(crate) fn check_nonzero(layer: &'static str, field: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        Err(Error::ZeroDimension { layer: layer, field: field })
    } else {
        Ok(())
    }
}

pub(crate) fn check_equal(layer: &'static str, field: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        Err(Error::ShapeMismatch { layer: layer, field: field, expected: expected, found: found })
    } else {
        Ok(())
    }
}

/// Checks that a valid convolution of samples shaped `input_shape` against `filter_shape` is defined.
pub(crate) fn check_filters(layer: &'static str, input_shape: Shape, filter_shape: FilterShape) -> Result<()> {
    check_nonzero(layer, "input height", input_shape.height)?;
    check_nonzero(layer, "input width", input_shape.width)?;
    check_nonzero(layer, "input depth", input_shape.depth)?;
    check_nonzero(layer, "filters", filter_shape.filters)?;
    check_nonzero(layer, "filter height", filter_shape.height)?;
    check_nonzero(layer, "filter width", filter_shape.width)?;
    check_equal(layer, "channels", input_shape.depth, filter_shape.depth)?;

    if filter_shape.height > input_shape.height || filter_shape.width > input_shape.width {
        return Err(Error::KernelTooLarge {
            layer: layer,
            kernel_height: filter_shape.height,
            kernel_width: filter_shape.width,
            input_height: input_shape.height,
            input_width: input_shape.width,
        });
    }

    Ok(())
}

/// Glorot uniform initialization: `count` values drawn from `[-limit, limit)` with `limit = sqrt(6 / (fan_in + fan_out))`.
pub(crate) fn glorot_uniform<R>(fan_in: usize, fan_out: usize, count: usize, rng: &mut R) -> Vec<f32> where R: Rng {
    let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
    (0..count).map(|_| rng.gen_range(-limit..limit)).collect()
}

mod activation;
mod convolutional;
mod fully_connected;
mod l2_convolution;
mod min_distances_pooling;
