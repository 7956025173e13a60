//
// This file is part of protopnet.
//
// protopnet is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// protopnet is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with protopnet. If not, see <http://www.gnu.org/licenses/>.
//
// Copyright 2017 Chris Foster
//

use std::io::{BufReader, Write};

use rand::Rng;
use smallann::activation_function::{LogSimilarityActivationFunction, ReLuActivationFunction, SigmoidActivationFunction};
use smallann::gradient_descent::GradientDescent;
use smallann::layer::{ActivationLayer, ConvolutionalLayer, FullyConnectedLayer, L2ConvolutionLayer, Layer, MinDistancesPoolingLayer};
use smallann::serialization::{expect_label, read_line};
use smallann::{vector, Ann, File, FilterShape, LayerRegistry, Matrix, Serializable, Vector};
use tracing::{debug, info};

use crate::class_identity::prototype_class_identity;
use crate::config::{PPNetConfig, PrototypeActivationFunction};
use crate::error::{Error, Result};
use crate::loss::{CompositeLoss, LossComponents};

/// A prototype network over backbone feature maps.
///
/// Feature maps pass through the add-on layers (1x1 convolution and ReLU, then 1x1 convolution and sigmoid) into
/// prototype space.  The prototype layer measures every patch against every prototype, min pooling keeps each
/// prototype's closest patch, and the head turns those distances into similarities and then into class logits.
#[derive(Clone)]
pub struct PPNet<G> {
    config: PPNetConfig,
    add_on: Ann,
    prototype_layer: L2ConvolutionLayer<G>,
    min_pooling: MinDistancesPoolingLayer,
    head: Ann,
    class_identity: Matrix,
    loss: CompositeLoss,
}

/// Loss and accuracy of a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Evaluation {
    pub components: LossComponents,
    pub accuracy: f32,
}

struct Activations {
    prototype_features: Matrix,
    distances: Matrix,
    min_distances: Matrix,
    logits: Matrix,
}

impl<G> PPNet<G> where G: 'static + GradientDescent + Serializable {
    pub fn new<R>(config: PPNetConfig, gradient_descent: G, rng: &mut R) -> Result<PPNet<G>> where R: Rng {
        config.validate()?;

        let [height, width, channels] = config.feature_shape()?;
        let [prototypes, prototype_height, prototype_width, depth] = config.prototype_shape;

        let add_on = Ann::new(vec![
            Box::new(ConvolutionalLayer::new(height, width, channels, 1, 1, depth, gradient_descent.clone(), rng)?) as Box<dyn Layer>,
            Box::new(ActivationLayer::<ReLuActivationFunction>::with_shape(&[height, width, depth])?),
            Box::new(ConvolutionalLayer::new(height, width, depth, 1, 1, depth, gradient_descent.clone(), rng)?),
            Box::new(ActivationLayer::<SigmoidActivationFunction>::with_shape(&[height, width, depth])?),
        ])?;

        let prototype_layer = L2ConvolutionLayer::new(
            height,
            width,
            depth,
            FilterShape::new(prototypes, prototype_height, prototype_width, depth),
            gradient_descent.clone(),
            rng,
        )?;

        let class_identity = prototype_class_identity(prototypes, config.num_classes)?;

        let logits = match config.incorrect_class_connection {
            Some(incorrect) => FullyConnectedLayer::from_weights(
                class_connections(&class_identity, incorrect),
                Vector::zeros(config.num_classes),
                gradient_descent,
            )?,
            None => FullyConnectedLayer::new(prototypes, config.num_classes, gradient_descent, rng)?,
        };

        let head = Ann::new(vec![similarity_layer(config.prototype_activation_function, prototypes)?, Box::new(logits)])?;

        let ppnet = PPNet::assemble(config, add_on, prototype_layer, head, class_identity)?;

        info!(
            feature_shape = ?[height, width, channels],
            prototype_shape = ?ppnet.config.prototype_shape,
            num_classes = ppnet.config.num_classes,
            "built prototype network",
        );

        Ok(ppnet)
    }

    /// Checks that the parts chain and match `config`.
    fn assemble(
        config: PPNetConfig,
        add_on: Ann,
        prototype_layer: L2ConvolutionLayer<G>,
        head: Ann,
        class_identity: Matrix,
    ) -> Result<PPNet<G>> {
        let [height, width, channels] = config.feature_shape()?;
        let [prototypes, prototype_height, prototype_width, depth] = config.prototype_shape;

        check_chain("add-on inputs", height * width * channels, add_on.inputs())?;
        check_chain("prototype layer inputs", add_on.outputs(), prototype_layer.inputs())?;

        let expected = FilterShape::new(prototypes, prototype_height, prototype_width, depth);
        if prototype_layer.prototype_shape() != expected {
            return Err(Error::config(
                "prototype_shape",
                format!("prototype layer has {:?}, expected {:?}", prototype_layer.prototype_shape(), expected),
            ));
        }

        let distance_shape = prototype_layer.output_shape();
        let min_pooling = MinDistancesPoolingLayer::new(distance_shape[0], distance_shape[1], distance_shape[2])?;

        check_chain("head inputs", min_pooling.outputs(), head.inputs())?;
        check_chain("head outputs", config.num_classes, head.outputs())?;

        let loss = CompositeLoss::new(&config, class_identity.clone())?;

        Ok(PPNet {
            config: config,
            add_on: add_on,
            prototype_layer: prototype_layer,
            min_pooling: min_pooling,
            head: head,
            class_identity: class_identity,
            loss: loss,
        })
    }

    /// Reads a network written by [`to_file`](#method.to_file), resolving add-on and head layers through
    /// `registry`.
    pub fn from_file(filename: &str, registry: &LayerRegistry) -> Result<PPNet<G>> {
        let mut file = BufReader::new(File::open(filename)?);

        expect_label(&mut file, "PPNet")?;
        expect_label(&mut file, "Config")?;
        let config = PPNetConfig::from_json(&read_line(&mut file)?.join(" "))?;

        expect_label(&mut file, "AddOn")?;
        let add_on = Ann::read_from_file(&mut file, registry)?;

        expect_label(&mut file, "PrototypeLayer")?;
        let prototype_layer = L2ConvolutionLayer::<G>::read_from_file(&mut file)?;

        expect_label(&mut file, "Head")?;
        let head = Ann::read_from_file(&mut file, registry)?;

        let class_identity = prototype_class_identity(config.num_prototypes(), config.num_classes)?;
        let ppnet = PPNet::assemble(config, add_on, prototype_layer, head, class_identity)?;

        info!(filename, "read prototype network");
        Ok(ppnet)
    }

    pub fn to_file(&self, filename: &str) -> Result<()> {
        let mut file = File::create(filename)?;

        write!(file, "PPNet\n")?;
        file.indent();
        self.write_to_file(&mut file)?;
        file.flush()?;

        info!(filename, "wrote prototype network");
        Ok(())
    }

    fn write_to_file(&self, file: &mut File) -> Result<()> {
        let indentation = file.indentation();

        write!(file, "{}Config\n", indentation)?;
        file.indent();
        let config_indentation = file.indentation();
        write!(file, "{}{}\n", config_indentation, serde_json::to_string(&self.config)?)?;
        file.unindent();

        write!(file, "{}AddOn\n", indentation)?;
        file.indent();
        self.add_on.write_to_file(file)?;
        file.unindent();

        write!(file, "{}PrototypeLayer\n", indentation)?;
        file.indent();
        self.prototype_layer.write_to_file(file)?;
        file.unindent();

        write!(file, "{}Head\n", indentation)?;
        file.indent();
        self.head.write_to_file(file)?;
        file.unindent();

        Ok(())
    }

    pub fn config(&self) -> &PPNetConfig {
        &self.config
    }

    pub fn add_on(&self) -> &Ann {
        &self.add_on
    }

    pub fn prototype_layer(&self) -> &L2ConvolutionLayer<G> {
        &self.prototype_layer
    }

    pub fn head(&self) -> &Ann {
        &self.head
    }

    /// Prototype to class assignment, `num_prototypes x num_classes`.
    pub fn class_identity(&self) -> &Matrix {
        &self.class_identity
    }

    pub fn loss(&self) -> &CompositeLoss {
        &self.loss
    }

    /// Feeds a batch of feature maps forward, returning `(logits, min_distances)`.
    pub fn forward(&self, features: &Matrix) -> Result<(Matrix, Matrix)> {
        let activations = self.activations(features)?;
        Ok((activations.logits, activations.min_distances))
    }

    /// The most likely class of each sample.
    pub fn predict(&self, features: &Matrix) -> Result<Vec<usize>> {
        let (logits, _) = self.forward(features)?;
        Ok((0..logits.rows()).map(|row| argmax(&logits[row])).collect())
    }

    pub fn evaluate(&self, features: &Matrix, targets: &Matrix) -> Result<Evaluation> {
        self.check_targets(features, targets)?;

        let activations = self.activations(features)?;
        let components = self.loss.components(targets, &activations.logits, &activations.min_distances);

        let correct = (0..targets.rows()).filter(|&row| argmax(&activations.logits[row]) == argmax(&targets[row])).count();
        let accuracy = if targets.rows() > 0 { correct as f32 / targets.rows() as f32 } else { 0.0 };

        Ok(Evaluation { components: components, accuracy: accuracy })
    }

    /// One gradient descent step of every layer against the composite loss, returning the loss before the step.
    pub fn train_batch(&mut self, features: &Matrix, targets: &Matrix, rate: f32) -> Result<LossComponents> {
        self.check_targets(features, targets)?;

        let batch = features.rows();
        let activations = self.activations(features)?;
        let components = self.loss.components(targets, &activations.logits, &activations.min_distances);

        let mut logit_gradients = Matrix::zeros(batch, self.head.outputs());
        self.loss.logit_gradient(targets, &activations.logits, &mut logit_gradients);

        // min_distance_gradients = head gradients + prototype loss gradients
        let mut min_distance_gradients = Matrix::zeros(batch, self.head.inputs());
        self.head.propagate_backward(&activations.min_distances, &logit_gradients, &mut min_distance_gradients, rate)?;
        let mut prototype_loss_gradients = Matrix::zeros(batch, self.head.inputs());
        self.loss.distance_gradient(targets, &activations.min_distances, &mut prototype_loss_gradients);
        vector::ops::add_assign(&mut min_distance_gradients, &prototype_loss_gradients);

        let mut distance_gradients = Matrix::zeros(batch, self.min_pooling.inputs());
        self.min_pooling.propagate_backward(&min_distance_gradients, &activations.distances, &mut distance_gradients, rate);

        let mut feature_gradients = Matrix::zeros(batch, self.prototype_layer.inputs());
        self.prototype_layer.propagate_backward(&distance_gradients, &activations.prototype_features, &mut feature_gradients, rate);

        let mut input_gradients = Matrix::zeros(batch, features.columns());
        self.add_on.propagate_backward(features, &feature_gradients, &mut input_gradients, rate)?;

        debug!(batch, total = components.total, "trained batch");
        Ok(components)
    }

    fn activations(&self, features: &Matrix) -> Result<Activations> {
        let batch = features.rows();

        let mut prototype_features = Matrix::zeros(batch, self.add_on.outputs());
        self.add_on.classify(features, &mut prototype_features)?;

        let mut distances = Matrix::zeros(batch, self.prototype_layer.outputs());
        self.prototype_layer.feed_forward(&prototype_features, &mut distances);

        let mut min_distances = Matrix::zeros(batch, self.min_pooling.outputs());
        self.min_pooling.feed_forward(&distances, &mut min_distances);

        let mut logits = Matrix::zeros(batch, self.head.outputs());
        self.head.classify(&min_distances, &mut logits)?;

        Ok(Activations {
            prototype_features: prototype_features,
            distances: distances,
            min_distances: min_distances,
            logits: logits,
        })
    }

    fn check_targets(&self, features: &Matrix, targets: &Matrix) -> Result<()> {
        check_shape("target columns", self.config.num_classes, targets.columns())?;
        check_shape("target rows", features.rows(), targets.rows())
    }
}

fn similarity_layer(function: PrototypeActivationFunction, prototypes: usize) -> Result<Box<dyn Layer>> {
    match function {
        PrototypeActivationFunction::Log => Ok(Box::new(ActivationLayer::<LogSimilarityActivationFunction>::new(prototypes)?)),
    }
}

/// Logit weights connecting each prototype to its own class with 1 and to every other class with `incorrect`.
/// Leftover prototypes connect to every class with `incorrect`.
pub fn class_connections(class_identity: &Matrix, incorrect: f32) -> Matrix {
    let mut weights = class_identity.clone();
    for weight in weights.iter_mut() {
        *weight = *weight + (1.0 - *weight) * incorrect;
    }
    weights
}

fn check_chain(field: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        Err(Error::config("layers", format!("{} is {}, expected {}", field, found, expected)))
    } else {
        Ok(())
    }
}

fn check_shape(field: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        Err(smallann::Error::ShapeMismatch { layer: "PPNet", field: field, expected: expected, found: found }.into())
    } else {
        Ok(())
    }
}

fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate() {
        if value > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use smallann::gradient_descent::{AdadeltaGradientDescent, SimpleGradientDescent};

    use super::*;
    use crate::data::{synthetic_clusters, Dataset};
    use crate::util::JKiss32Rng;

    fn small_config() -> PPNetConfig {
        PPNetConfig {
            prototype_shape: [6, 1, 1, 3],
            feature_shape: Some([3, 3, 4]),
            num_classes: 3,
            ..PPNetConfig::default()
        }
    }

    fn scratch_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("protopnet_{}_{}.txt", name, std::process::id()))
            .to_string_lossy()
            .into_owned()
    }

    fn ramp(rows: usize, columns: usize) -> Matrix {
        Matrix::from_vec(rows, columns, (0..rows * columns).map(|i| ((i * 7 % 13) as f32) / 13.0).collect())
    }

    #[test]
    fn test_output_shapes() {
        let ppnet = PPNet::new(small_config(), SimpleGradientDescent::new(), &mut JKiss32Rng::seed_from_u64(1)).unwrap();
        let (logits, min_distances) = ppnet.forward(&ramp(2, 36)).unwrap();

        assert_eq!((logits.rows(), logits.columns()), (2, 3));
        assert_eq!((min_distances.rows(), min_distances.columns()), (2, 6));

        // Sigmoid features and prototypes both lie in the unit cube.
        let max_distance = ppnet.prototype_layer().max_distance();
        assert!(min_distances.iter().all(|&d| d >= 0.0 && d <= max_distance));
    }

    #[test]
    fn test_min_distances_match_direct() {
        let config = PPNetConfig { prototype_shape: [4, 2, 2, 3], ..small_config() };
        let ppnet = PPNet::new(config, SimpleGradientDescent::new(), &mut JKiss32Rng::seed_from_u64(2)).unwrap();
        let features = ramp(2, 36);

        let mut prototype_features = Matrix::zeros(2, 27);
        ppnet.add_on().classify(&features, &mut prototype_features).unwrap();
        let (_, min_distances) = ppnet.forward(&features).unwrap();

        let prototypes = ppnet.prototype_layer().prototypes();
        for b in 0..2 {
            for p in 0..4 {
                let mut expected = f32::INFINITY;
                for i in 0..2 {
                    for j in 0..2 {
                        let mut distance = 0.0;
                        for di in 0..2 {
                            for dj in 0..2 {
                                for c in 0..3 {
                                    let x = prototype_features[(b, ((i + di) * 3 + j + dj) * 3 + c)];
                                    let q = prototypes[(p, (di * 2 + dj) * 3 + c)];
                                    distance += (x - q) * (x - q);
                                }
                            }
                        }
                        expected = expected.min(distance);
                    }
                }

                let actual = min_distances[(b, p)];
                assert!((actual - expected).abs() <= 1e-4 * expected.max(1.0), "{} != {}", actual, expected);
            }
        }
    }

    #[test]
    fn test_training_reduces_loss() {
        let mut rng = JKiss32Rng::seed_from_u64(3);
        let source = synthetic_clusters(3, 4, [3, 3, 4], 0.1, 0.05, &mut rng).unwrap();
        let dataset = Dataset::shuffled(&source, 3);
        let batch = dataset.batches(12).unwrap().next().unwrap();

        let mut ppnet = PPNet::new(small_config(), AdadeltaGradientDescent::new(0.9, 0.0), &mut rng).unwrap();

        let first = ppnet.train_batch(&batch.inputs, &batch.targets, 1.0).unwrap();
        let mut last = first;
        for _ in 0..300 {
            last = ppnet.train_batch(&batch.inputs, &batch.targets, 1.0).unwrap();
        }

        assert!(last.total < first.total, "{:?} >= {:?}", last, first);
        assert!(last.cluster <= first.cluster, "{:?} > {:?}", last, first);
    }

    #[test]
    fn test_file_round_trip() {
        let config = PPNetConfig { incorrect_class_connection: Some(-0.5), ..small_config() };
        let mut ppnet = PPNet::new(config, AdadeltaGradientDescent::new(0.9, 0.0), &mut JKiss32Rng::seed_from_u64(4)).unwrap();
        let features = ramp(3, 36);
        let targets = Matrix::from_vec(3, 3, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        ppnet.train_batch(&features, &targets, 1.0).unwrap();

        let filename = scratch_path("ppnet");
        ppnet.to_file(&filename).unwrap();
        let read = PPNet::<AdadeltaGradientDescent>::from_file(&filename, &LayerRegistry::with_standard_layers());
        let unknown = PPNet::<AdadeltaGradientDescent>::from_file(&filename, &LayerRegistry::new());
        std::fs::remove_file(&filename).unwrap();

        let read = read.unwrap();
        assert!(unknown.is_err());
        assert_eq!(read.config(), ppnet.config());

        for (a, b) in ppnet.prototype_layer().prototypes().iter().zip(read.prototype_layer().prototypes().iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }

        assert_eq!(read.forward(&features).unwrap(), ppnet.forward(&features).unwrap());
    }

    #[test]
    fn test_class_connections() {
        let identity = prototype_class_identity(5, 2).unwrap();
        let weights = class_connections(&identity, -0.5);

        assert_eq!(&weights.as_vector()[..], &[1.0, -0.5, 1.0, -0.5, -0.5, 1.0, -0.5, 1.0, -0.5, -0.5]);
    }

    #[test]
    fn test_shape_errors() {
        let mut ppnet = PPNet::new(small_config(), SimpleGradientDescent::new(), &mut JKiss32Rng::seed_from_u64(6)).unwrap();

        assert!(matches!(
            ppnet.forward(&Matrix::zeros(1, 35)),
            Err(Error::Layer(smallann::Error::ShapeMismatch { layer: "Ann", field: "inputs", expected: 36, found: 35 })),
        ));
        assert!(matches!(
            ppnet.train_batch(&Matrix::zeros(2, 36), &Matrix::zeros(2, 4), 0.1),
            Err(Error::Layer(smallann::Error::ShapeMismatch { layer: "PPNet", field: "target columns", .. })),
        ));
        assert!(matches!(
            ppnet.evaluate(&Matrix::zeros(2, 36), &Matrix::zeros(3, 3)),
            Err(Error::Layer(smallann::Error::ShapeMismatch { layer: "PPNet", field: "target rows", .. })),
        ));
    }

    #[test]
    fn test_invalid_config() {
        let config = PPNetConfig { backbone: Some(String::from("vgg19")), feature_shape: None, ..small_config() };

        assert!(matches!(
            PPNet::new(config, SimpleGradientDescent::new(), &mut JKiss32Rng::seed_from_u64(7)),
            Err(Error::Config { field: "backbone", .. }),
        ));
    }
}
