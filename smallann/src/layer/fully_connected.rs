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

use smallmath::matrix::{self, Matrix};
use smallmath::Vector;

use crate::error::Result;
use crate::gradient_descent::GradientDescent;
use crate::layer::{check_equal, check_nonzero, glorot_uniform, Layer};
use crate::serialization::Serializable;

/// A dense layer: `outputs = inputs * weights + biases`.
#[derive(Clone, Debug)]
pub struct FullyConnectedLayer<G> {
    pub(crate) weights: Matrix,
    pub(crate) biases: Vector,

    pub(crate) weights_descent: G,
    pub(crate) biases_descent: G,
    weight_gradients: Matrix,
    bias_gradients: Vector,

    transpose_buffer: Matrix,
}

impl<G> FullyConnectedLayer<G> where G: GradientDescent {
    /// Glorot uniform weights and zero biases.
    pub fn new<R>(inputs: usize, outputs: usize, gradient_descent: G, rng: &mut R) -> Result<FullyConnectedLayer<G>> where R: Rng {
        check_nonzero("FullyConnectedLayer", "inputs", inputs)?;
        check_nonzero("FullyConnectedLayer", "outputs", outputs)?;

        let weights = Matrix::from_vec(inputs, outputs, glorot_uniform(inputs, outputs, inputs * outputs, rng));
        FullyConnectedLayer::from_weights(weights, Vector::zeros(outputs), gradient_descent)
    }

    /// A layer with the given `inputs` x `outputs` weights and `outputs` biases.
    pub fn from_weights(weights: Matrix, biases: Vector, gradient_descent: G) -> Result<FullyConnectedLayer<G>> {
        check_nonzero("FullyConnectedLayer", "inputs", weights.rows())?;
        check_nonzero("FullyConnectedLayer", "outputs", weights.columns())?;
        check_equal("FullyConnectedLayer", "biases", weights.columns(), biases.len())?;

        Ok(FullyConnectedLayer::construct(weights, biases, gradient_descent.clone(), gradient_descent))
    }

    pub(crate) fn construct(weights: Matrix, biases: Vector, weights_descent: G, biases_descent: G) -> FullyConnectedLayer<G> {
        let (inputs, outputs) = (weights.rows(), weights.columns());

        FullyConnectedLayer {
            weights: weights,
            biases: biases,
            weights_descent: weights_descent,
            biases_descent: biases_descent,
            weight_gradients: Matrix::zeros(inputs, outputs),
            bias_gradients: Vector::zeros(outputs),
            transpose_buffer: Matrix::zeros(outputs, inputs),
        }
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &Vector {
        &self.biases
    }
}

impl<G> Layer for FullyConnectedLayer<G> where G: 'static + GradientDescent + Serializable {
    fn inputs(&self) -> usize {
        self.weights.rows()
    }

    fn outputs(&self) -> usize {
        self.weights.columns()
    }

    fn feed_forward(&self, inputs: &Matrix, outputs: &mut Matrix) {
        for i in 0..inputs.rows() {
            outputs[i].clone_from_slice(&self.biases);
        }

        matrix::ops::multiply(inputs, &self.weights, outputs);
    }

    fn propagate_backward(&mut self, gradients: &Matrix, previous_inputs: &Matrix, previous_gradients: &mut Matrix, rate: f32) {
        // bias_gradients = gradients, all inputs summed
        self.bias_gradients.zero();
        for i in 0..gradients.rows() {
            self.bias_gradients += &gradients[i];
        }

        // weight_gradients = previous_inputs.transpose() * gradients
        self.transpose_buffer.resize(previous_inputs.columns(), previous_inputs.rows());
        matrix::ops::transpose(previous_inputs, &mut self.transpose_buffer);
        self.weight_gradients.zero();
        matrix::ops::multiply(&self.transpose_buffer, gradients, &mut self.weight_gradients);

        // previous_gradients = gradients * weights.transpose()
        self.transpose_buffer.resize(self.weights.columns(), self.weights.rows());
        matrix::ops::transpose(&self.weights, &mut self.transpose_buffer);
        previous_gradients.zero();
        matrix::ops::multiply(gradients, &self.transpose_buffer, previous_gradients);

        self.weights_descent.descend(&mut self.weights, &self.weight_gradients, rate);
        self.biases_descent.descend(&mut self.biases, &self.bias_gradients, rate);
    }

    fn boxed_clone(&self) -> Box<dyn Layer> {
        Box::new(self.clone())
    }
}
