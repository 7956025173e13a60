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

use std::cell::RefCell;
use std::io::{BufReader, Result as IoResult, Write};

use smallmath::Matrix;

use crate::error::{Error, Result};
use crate::layer::Layer;
use crate::loss_function::LossFunction;
use crate::serialization::{read_dimensions, read_error, read_line, File, LayerRegistry};

/// A sequence of layers, each feeding the next.
pub struct Ann {
    layers: Vec<Box<dyn Layer>>,
    layer_buffers: RefCell<Vec<Matrix>>,
    loss_derivatives: Matrix,
}

impl Ann {
    pub fn new(layers: Vec<Box<dyn Layer>>) -> Result<Ann> {
        if layers.is_empty() {
            return Err(Error::EmptyNetwork);
        }

        for pair in layers.windows(2) {
            if pair[0].outputs() != pair[1].inputs() {
                return Err(Error::ShapeMismatch {
                    layer: "Ann",
                    field: "layer inputs",
                    expected: pair[0].outputs(),
                    found: pair[1].inputs(),
                });
            }
        }

        let layer_buffers = layers.iter().map(|l| Matrix::zeros(1, l.outputs())).collect::<Vec<_>>();

        Ok(Ann {
            layers: layers,
            layer_buffers: RefCell::new(layer_buffers),
            loss_derivatives: Matrix::zeros(0, 0),
        })
    }

    /// Reads a network written by [`to_file`](#method.to_file), resolving layer types through `registry`.
    pub fn from_file(filename: &str, registry: &LayerRegistry) -> IoResult<Ann> {
        let mut file = BufReader::new(File::open(filename)?);

        let strings = read_line(&mut file)?;

        if strings.len() != 1 || strings[0] != "Ann" {
            return read_error(&file, "Cannot read network!");
        }

        Ann::read_from_file(&mut file, registry)
    }

    pub fn to_file(&self, filename: &str) -> IoResult<()> {
        let mut file = File::create(filename)?;

        write!(file, "Ann\n")?;
        file.indent();
        self.write_to_file(&mut file)?;
        file.flush()
    }

    /// Reads a layer count followed by that many layers.
    pub fn read_from_file(file: &mut BufReader<File>, registry: &LayerRegistry) -> IoResult<Ann> {
        let layer_count = read_dimensions(file, 1, "layer count")?[0];

        let mut layers = Vec::with_capacity(layer_count);
        for _ in 0..layer_count {
            layers.push(registry.read_layer(file)?);
        }

        match Ann::new(layers) {
            Ok(ann) => Ok(ann),
            Err(error) => read_error(file, &error.to_string()),
        }
    }

    pub fn write_to_file(&self, file: &mut File) -> IoResult<()> {
        let indentation = file.indentation();
        write!(file, "{}{}\n", indentation, self.layers.len())?;
        for layer in &self.layers {
            write!(file, "{}{}\n", indentation, layer.get_identifier())?;
            file.indent();
            layer.write_to_file(file)?;
            file.unindent();
        }
        Ok(())
    }

    pub fn inputs(&self) -> usize {
        self.layers[0].inputs()
    }

    pub fn outputs(&self) -> usize {
        self.layers[self.layers.len() - 1].outputs()
    }

    pub fn output_shape(&self) -> Vec<usize> {
        self.layers[self.layers.len() - 1].output_shape()
    }

    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    /// Feeds a batch through every layer, writing the last layer's outputs into `outputs`.
    pub fn classify(&self, inputs: &Matrix, outputs: &mut Matrix) -> Result<()> {
        self.check_columns("inputs", self.inputs(), inputs.columns())?;

        let mut layer_buffers = self.layer_buffers.borrow_mut();
        self.feed_forward(inputs, &mut layer_buffers);

        outputs.clone_from(&layer_buffers[layer_buffers.len() - 1]);
        Ok(())
    }

    /// Backpropagates `output_gradients`, the loss gradients with respect to the outputs of the last call to
    /// [`classify`](#method.classify) on `inputs`, updating every layer and writing the gradients with respect to
    /// `inputs` into `input_gradients`.
    pub fn propagate_backward(&mut self, inputs: &Matrix, output_gradients: &Matrix, input_gradients: &mut Matrix, rate: f32) -> Result<()> {
        self.check_columns("inputs", self.inputs(), inputs.columns())?;
        self.check_columns("output gradients", self.outputs(), output_gradients.columns())?;

        let layer_buffers = self.layer_buffers.borrow();
        if layer_buffers[0].rows() != inputs.rows() {
            return Err(Error::ShapeMismatch {
                layer: "Ann",
                field: "batch size",
                expected: layer_buffers[0].rows(),
                found: inputs.rows(),
            });
        }

        let mut gradients = output_gradients.clone();
        for i in (0..self.layers.len()).rev() {
            let previous_inputs = if i > 0 { &layer_buffers[i - 1] } else { inputs };
            let mut previous_gradients = Matrix::zeros(inputs.rows(), self.layers[i].inputs());

            self.layers[i].propagate_backward(&gradients, previous_inputs, &mut previous_gradients, rate);
            gradients = previous_gradients;
        }

        *input_gradients = gradients;
        Ok(())
    }

    /// One gradient descent step on a batch against `loss`, returning the loss before the step.
    pub fn train<L>(&mut self, inputs: &Matrix, targets: &Matrix, loss: &L, rate: f32) -> Result<f32> where L: LossFunction {
        self.check_columns("targets", self.outputs(), targets.columns())?;
        if targets.rows() != inputs.rows() {
            return Err(Error::ShapeMismatch { layer: "Ann", field: "target rows", expected: inputs.rows(), found: targets.rows() });
        }

        let mut outputs = Matrix::zeros(inputs.rows(), self.outputs());
        self.classify(inputs, &mut outputs)?;

        let value = loss.loss(targets, &outputs);
        let mut loss_derivatives = std::mem::take(&mut self.loss_derivatives);
        loss_derivatives.resize(targets.rows(), targets.columns());
        loss.gradient(targets, &outputs, &mut loss_derivatives);

        let mut input_gradients = Matrix::zeros(inputs.rows(), inputs.columns());
        let result = self.propagate_backward(inputs, &loss_derivatives, &mut input_gradients, rate);
        self.loss_derivatives = loss_derivatives;
        result.map(|_| value)
    }

    fn feed_forward(&self, inputs: &Matrix, layer_buffers: &mut [Matrix]) {
        for i in 0..self.layers.len() {
            let (previous_buffers, next_buffers) = layer_buffers.split_at_mut(i);

            next_buffers[0].resize(inputs.rows(), self.layers[i].outputs());

            self.layers[i].feed_forward(
                if i > 0 {
                    &previous_buffers[i - 1]
                } else {
                    inputs
                },
                &mut next_buffers[0],
            );
        }
    }

    fn check_columns(&self, field: &'static str, expected: usize, found: usize) -> Result<()> {
        if expected != found {
            Err(Error::ShapeMismatch { layer: "Ann", field: field, expected: expected, found: found })
        } else {
            Ok(())
        }
    }
}

impl Clone for Ann {
    fn clone(&self) -> Ann {
        Ann {
            layers: self.layers.clone(),
            layer_buffers: RefCell::new(self.layer_buffers.borrow().clone()),
            loss_derivatives: self.loss_derivatives.clone(),
        }
    }
}
