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
use smallmath::{Matrix, Vector};

use crate::error::Result;
use crate::gradient_descent::GradientDescent;
use crate::layer::{check_filters, glorot_uniform, Layer};
use crate::serialization::Serializable;

/// A valid, stride 1 convolution with one bias per output channel.
///
/// Samples are feature maps laid out `[height][width][depth]`.
#[derive(Clone, Debug)]
pub struct ConvolutionalLayer<G> {
    pub(crate) input_shape: Shape,
    pub(crate) filter_shape: FilterShape,
    pub(crate) filters: Matrix,
    pub(crate) biases: Vector,

    pub(crate) filters_descent: G,
    pub(crate) biases_descent: G,
    filter_gradients: Matrix,
    bias_gradients: Vector,
}

impl<G> ConvolutionalLayer<G> where G: GradientDescent {
    /// Glorot uniform filters and zero biases.
    pub fn new<R>(
        input_height: usize,
        input_width: usize,
        input_depth: usize,
        filter_height: usize,
        filter_width: usize,
        output_depth: usize,
        gradient_descent: G,
        rng: &mut R,
    ) -> Result<ConvolutionalLayer<G>> where R: Rng {
        let input_shape = Shape::new(1, input_height, input_width, input_depth);
        let filter_shape = FilterShape::new(output_depth, filter_height, filter_width, input_depth);
        check_filters("ConvolutionalLayer", input_shape, filter_shape)?;

        let receptive_field = filter_height * filter_width;
        let filters = Matrix::from_vec(
            output_depth,
            filter_shape.filter_len(),
            glorot_uniform(receptive_field * input_depth, receptive_field * output_depth, filter_shape.len(), rng),
        );

        Ok(ConvolutionalLayer::construct(input_shape, filter_shape, filters, Vector::zeros(output_depth), gradient_descent.clone(), gradient_descent))
    }

    pub(crate) fn construct(
        input_shape: Shape,
        filter_shape: FilterShape,
        filters: Matrix,
        biases: Vector,
        filters_descent: G,
        biases_descent: G,
    ) -> ConvolutionalLayer<G> {
        ConvolutionalLayer {
            input_shape: input_shape,
            filter_shape: filter_shape,
            filter_gradients: Matrix::zeros(filters.rows(), filters.columns()),
            bias_gradients: Vector::zeros(biases.len()),
            filters: filters,
            biases: biases,
            filters_descent: filters_descent,
            biases_descent: biases_descent,
        }
    }

    pub fn filter_shape(&self) -> FilterShape {
        self.filter_shape
    }

    /// One filter per row, each laid out `[height][width][depth]`.
    pub fn filters(&self) -> &Matrix {
        &self.filters
    }

    pub fn biases(&self) -> &Vector {
        &self.biases
    }

    fn per_sample_output_shape(&self) -> Shape {
        self.filter_shape.output_shape(self.input_shape)
    }
}

impl<G> Layer for ConvolutionalLayer<G> where G: 'static + GradientDescent + Serializable {
    fn inputs(&self) -> usize {
        self.input_shape.sample_len()
    }

    fn outputs(&self) -> usize {
        self.per_sample_output_shape().sample_len()
    }

    fn output_shape(&self) -> Vec<usize> {
        let shape = self.per_sample_output_shape();
        vec![shape.height, shape.width, shape.depth]
    }

    fn feed_forward(&self, inputs: &Matrix, outputs: &mut Matrix) {
        let input_shape = self.input_shape.with_batch(inputs.rows());

        for location in outputs.chunks_mut(self.filter_shape.filters) {
            location.clone_from_slice(&self.biases);
        }

        tensor::ops::convolve(inputs, input_shape, &self.filters, self.filter_shape, outputs);
    }

    fn propagate_backward(&mut self, gradients: &Matrix, previous_inputs: &Matrix, previous_gradients: &mut Matrix, rate: f32) {
        let input_shape = self.input_shape.with_batch(previous_inputs.rows());
        let output_shape = self.filter_shape.output_shape(input_shape);

        // bias_gradients = gradients, all samples and locations summed
        self.bias_gradients.zero();
        for location in gradients.chunks(self.filter_shape.filters) {
            self.bias_gradients += location;
        }

        self.filter_gradients.zero();
        tensor::ops::convolve_filter_gradients(previous_inputs, input_shape, gradients, self.filter_shape, &mut self.filter_gradients);

        previous_gradients.zero();
        tensor::ops::convolve_input_gradients(gradients, output_shape, &self.filters, self.filter_shape, previous_gradients);

        self.filters_descent.descend(&mut self.filters, &self.filter_gradients, rate);
        self.biases_descent.descend(&mut self.biases, &self.bias_gradients, rate);
    }

    fn boxed_clone(&self) -> Box<dyn Layer> {
        Box::new(self.clone())
    }
}
