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

use std::io::{BufReader, Result};

use fnv::FnvHashMap;

use crate::activation_function::*;
use crate::gradient_descent::*;
use crate::layer::*;
use crate::serialization::{read_error, read_line, File, Identifiable, Serializable};

/// Reads one layer's contents, the identifier line having been consumed.
pub type LayerReader = fn(&mut BufReader<File>) -> Result<Box<dyn Layer>>;

/// Maps layer identifiers to the functions that read them.
///
/// A registry is an ordinary value: callers build one with the layer types their networks use and pass it to
/// [`Ann::from_file`](../struct.Ann.html#method.from_file).
#[derive(Clone, Default)]
pub struct LayerRegistry {
    readers: FnvHashMap<String, LayerReader>,
}

impl LayerRegistry {
    pub fn new() -> LayerRegistry {
        LayerRegistry::default()
    }

    /// A registry of every layer type in this crate, trained with any of its gradient descent algorithms.
    pub fn with_standard_layers() -> LayerRegistry {
        let mut registry = LayerRegistry::new();
        registry
            .register::<ActivationLayer<LogSimilarityActivationFunction>>()
            .register::<ActivationLayer<ReLuActivationFunction>>()
            .register::<ActivationLayer<SigmoidActivationFunction>>()
            .register::<MinDistancesPoolingLayer>();
        registry.register_trainable::<AdadeltaGradientDescent>();
        registry.register_trainable::<MomentumGradientDescent>();
        registry.register_trainable::<SimpleGradientDescent>();
        registry
    }

    pub fn register<L>(&mut self) -> &mut LayerRegistry where L: 'static + Layer {
        self.readers.insert(L::identifier(), read_boxed::<L>);
        self
    }

    /// Registers every trainable layer type for the gradient descent algorithm `G`.
    pub fn register_trainable<G>(&mut self) -> &mut LayerRegistry where G: 'static + GradientDescent + Serializable {
        self.register::<ConvolutionalLayer<G>>()
            .register::<FullyConnectedLayer<G>>()
            .register::<L2ConvolutionLayer<G>>()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.readers.contains_key(identifier)
    }

    /// Reads an identifier line followed by that layer's contents.
    pub fn read_layer(&self, file: &mut BufReader<File>) -> Result<Box<dyn Layer>> {
        let strings = read_line(file)?;

        if strings.len() != 1 {
            return read_error(file, "Cannot read layer type!");
        }

        match self.readers.get(&strings[0]) {
            Some(reader) => reader(file),
            None => read_error(file, &format!("Unknown layer type {}!", strings[0])),
        }
    }
}

fn read_boxed<L>(file: &mut BufReader<File>) -> Result<Box<dyn Layer>> where L: 'static + Layer {
    L::read_from_file(file).map(|l| Box::new(l) as Box<dyn Layer>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layers() {
        let registry = LayerRegistry::with_standard_layers();

        assert!(registry.contains("L2ConvolutionLayer<AdadeltaGradientDescent>"));
        assert!(registry.contains("FullyConnectedLayer<SimpleGradientDescent>"));
        assert!(registry.contains("ActivationLayer<LogSimilarityActivationFunction>"));
        assert!(registry.contains("MinDistancesPoolingLayer"));
        assert!(!registry.contains("PassThroughLayer"));
    }

    #[test]
    fn test_registries_are_independent() {
        let mut registry = LayerRegistry::new();
        registry.register::<MinDistancesPoolingLayer>();

        assert!(registry.contains("MinDistancesPoolingLayer"));
        assert!(!LayerRegistry::new().contains("MinDistancesPoolingLayer"));
    }
}
