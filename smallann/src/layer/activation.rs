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

use std::marker::PhantomData;

use smallmath::{vector, Matrix};

use crate::activation_function::ActivationFunction;
use crate::error::Result;
use crate::layer::{check_nonzero, Layer};
use crate::serialization::{Identifiable, Serializable};

/// Applies `F` element-wise.
#[derive(Clone, Debug)]
pub struct ActivationLayer<F> {
    pub(crate) shape: Vec<usize>,
    size: usize,
    activation_function: PhantomData<F>,
}

impl<F> ActivationLayer<F> {
    pub fn new(size: usize) -> Result<ActivationLayer<F>> {
        ActivationLayer::with_shape(&[size])
    }

    /// An activation layer over samples of the given shape, which it reports as its output shape.
    pub fn with_shape(shape: &[usize]) -> Result<ActivationLayer<F>> {
        check_nonzero("ActivationLayer", "shape", shape.len())?;
        for &dimension in shape {
            check_nonzero("ActivationLayer", "size", dimension)?;
        }

        Ok(ActivationLayer {
            shape: shape.to_vec(),
            size: shape.iter().product(),
            activation_function: PhantomData,
        })
    }
}

impl<F> Layer for ActivationLayer<F> where F: 'static + ActivationFunction + Identifiable {
    fn inputs(&self) -> usize {
        self.size
    }

    fn outputs(&self) -> usize {
        self.size
    }

    fn output_shape(&self) -> Vec<usize> {
        self.shape.clone()
    }

    fn feed_forward(&self, inputs: &Matrix, outputs: &mut Matrix) {
        F::f_vector(inputs, outputs);
    }

    fn propagate_backward(&mut self, gradients: &Matrix, previous_inputs: &Matrix, previous_gradients: &mut Matrix, _: f32) {
        // previous_gradients = f'(previous_inputs) .* gradients
        F::f_prime_vector(previous_inputs, previous_gradients);
        vector::ops::multiply_assign(previous_gradients, gradients);
    }

    fn boxed_clone(&self) -> Box<dyn Layer> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation_function::{LogSimilarityActivationFunction, ReLuActivationFunction};
    use crate::error::Error;

    #[test]
    fn test_relu_layer() {
        let mut layer = ActivationLayer::<ReLuActivationFunction>::with_shape(&[1, 2, 2]).unwrap();
        assert_eq!(layer.inputs(), 4);
        assert_eq!(layer.output_shape(), vec![1, 2, 2]);

        let inputs = Matrix::from_vec(1, 4, vec![-1.0, 2.0, 0.0, 3.0]);
        let mut outputs = Matrix::zeros(1, 4);
        layer.feed_forward(&inputs, &mut outputs);
        assert_eq!(&outputs.as_vector()[..], &[0.0, 2.0, 0.0, 3.0]);

        let gradients = Matrix::from_vec(1, 4, vec![5.0, 5.0, 5.0, 5.0]);
        let mut previous_gradients = Matrix::zeros(1, 4);
        layer.propagate_backward(&gradients, &inputs, &mut previous_gradients, 0.1);
        assert_eq!(&previous_gradients.as_vector()[..], &[0.0, 5.0, 0.0, 5.0]);
    }

    #[test]
    fn test_similarity_layer_shape() {
        let layer = ActivationLayer::<LogSimilarityActivationFunction>::new(200).unwrap();
        assert_eq!(layer.outputs(), 200);
        assert_eq!(layer.output_shape(), vec![200]);
        assert_eq!(layer.get_identifier(), "ActivationLayer<LogSimilarityActivationFunction>");
    }

    #[test]
    fn test_zero_size() {
        assert_eq!(
            ActivationLayer::<ReLuActivationFunction>::new(0).unwrap_err(),
            Error::ZeroDimension { layer: "ActivationLayer", field: "size" },
        );
    }
}
