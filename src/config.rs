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

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::receptive_field::{compute_layer_rf_info, compute_proto_layer_rf_info, Padding, RfInfo};

/// Transform from minimum distances to prototype similarities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrototypeActivationFunction {
    /// `ln((d + 1) / (d + 1e-4))`
    Log,
}

/// Weights of the composite loss terms.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossWeights {
    pub cluster: f32,
    pub separation: f32,
    pub classification: f32,
    pub prototype: f32,
}

impl Default for LossWeights {
    fn default() -> LossWeights {
        LossWeights {
            cluster: 0.8,
            separation: -0.08,
            classification: 1.0,
            prototype: 1.0,
        }
    }
}

/// Everything needed to build a [`PPNet`](../ppnet/struct.PPNet.html).
///
/// Missing JSON fields take their defaults: a 224 pixel image, 200 prototypes of shape 1x1x128, the log
/// similarity and the standard loss weights.  `feature_shape` comes from the backbone unless given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PPNetConfig {
    pub img_size: usize,
    /// `[prototypes, height, width, channels]`
    pub prototype_shape: [usize; 4],
    /// `[height, width, channels]` of the backbone's feature maps.
    pub feature_shape: Option<[usize; 3]>,
    pub prototype_activation_function: PrototypeActivationFunction,
    pub num_classes: usize,
    pub backbone: Option<String>,
    pub loss_weights: LossWeights,
    /// If set, the logits layer starts as the class identity with this weight on every other class's prototypes.
    /// Otherwise it starts Glorot uniform.
    pub incorrect_class_connection: Option<f32>,
}

impl Default for PPNetConfig {
    fn default() -> PPNetConfig {
        PPNetConfig {
            img_size: 224,
            prototype_shape: [200, 1, 1, 128],
            feature_shape: None,
            prototype_activation_function: PrototypeActivationFunction::Log,
            num_classes: 200,
            backbone: None,
            loss_weights: LossWeights::default(),
            incorrect_class_connection: None,
        }
    }
}

impl PPNetConfig {
    pub fn from_json(json: &str) -> Result<PPNetConfig> {
        let config: PPNetConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P>(path: P) -> Result<PPNetConfig> where P: AsRef<Path> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading configuration");
        PPNetConfig::from_json(&fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn num_prototypes(&self) -> usize {
        self.prototype_shape[0]
    }

    /// The configured backbone, if any.
    pub fn backbone(&self) -> Result<Option<Backbone>> {
        self.backbone.as_deref().map(Backbone::from_name).transpose()
    }

    /// The explicit feature shape, or else the backbone's.
    pub fn feature_shape(&self) -> Result<[usize; 3]> {
        if let Some(feature_shape) = self.feature_shape {
            return Ok(feature_shape);
        }

        match self.backbone()? {
            Some(backbone) => backbone.feature_shape(self.img_size),
            None => Err(Error::config("feature_shape", "required when no backbone is given")),
        }
    }

    /// Receptive field of the prototype layer in image pixels, if the backbone's geometry is known.
    pub fn prototype_rf_info(&self) -> Result<Option<RfInfo>> {
        match self.backbone()? {
            Some(backbone) => {
                let (filter_sizes, strides, paddings) = backbone.layer_geometry();
                compute_proto_layer_rf_info(self.img_size, &filter_sizes, &strides, &paddings, self.prototype_shape[1]).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Checks every field, naming the first one that cannot describe a model.
    pub fn validate(&self) -> Result<()> {
        if self.img_size == 0 {
            return Err(Error::config("img_size", "must be positive"));
        }

        if self.prototype_shape.iter().any(|&d| d == 0) {
            return Err(Error::config("prototype_shape", format!("{:?} has a zero dimension", self.prototype_shape)));
        }

        if self.num_classes == 0 {
            return Err(Error::config("num_classes", "must be positive"));
        }

        if self.num_prototypes() < self.num_classes {
            return Err(Error::config(
                "num_classes",
                format!("{} classes cannot each have a prototype out of {}", self.num_classes, self.num_prototypes()),
            ));
        }

        let feature_shape = self.feature_shape()?;
        if feature_shape.iter().any(|&d| d == 0) {
            return Err(Error::config("feature_shape", format!("{:?} has a zero dimension", feature_shape)));
        }

        if self.prototype_shape[1] > feature_shape[0] || self.prototype_shape[2] > feature_shape[1] {
            return Err(Error::config(
                "prototype_shape",
                format!(
                    "{}x{} prototypes don't fit {}x{} feature maps",
                    self.prototype_shape[1], self.prototype_shape[2], feature_shape[0], feature_shape[1],
                ),
            ));
        }

        let weights = &self.loss_weights;
        if ![weights.cluster, weights.separation, weights.classification, weights.prototype].iter().all(|w| w.is_finite()) {
            return Err(Error::config("loss_weights", "must be finite"));
        }

        if self.incorrect_class_connection.map_or(false, |w| !w.is_finite()) {
            return Err(Error::config("incorrect_class_connection", "must be finite"));
        }

        Ok(())
    }
}

/// Feature extractors whose output geometry is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backbone {
    ResNet50,
}

impl Backbone {
    pub fn from_name(name: &str) -> Result<Backbone> {
        match name {
            "resnet50" => Ok(Backbone::ResNet50),
            _ => Err(Error::config("backbone", format!("unknown backbone {:?}", name))),
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Backbone::ResNet50 => "resnet50",
        }
    }

    pub fn channels(&self) -> usize {
        match *self {
            Backbone::ResNet50 => 2048,
        }
    }

    /// `[height, width, channels]` of the features of an `img_size` pixel square image.
    pub fn feature_shape(&self, img_size: usize) -> Result<[usize; 3]> {
        let (filter_sizes, strides, paddings) = self.layer_geometry();

        let mut rf_info = RfInfo::image(img_size);
        for ((&filter_size, &stride), &padding) in filter_sizes.iter().zip(&strides).zip(&paddings) {
            rf_info = compute_layer_rf_info(filter_size, stride, padding, rf_info)
                .map_err(|_| Error::config("img_size", format!("{} pixels is too small for {}", img_size, self.name())))?;
        }

        Ok([rf_info.size, rf_info.size, self.channels()])
    }

    /// Filter sizes, strides and paddings of every spatial layer, in order.
    pub fn layer_geometry(&self) -> (Vec<usize>, Vec<usize>, Vec<Padding>) {
        match *self {
            Backbone::ResNet50 => bottleneck_geometry(&[3, 4, 6, 3]),
        }
    }
}

// 7x7 stem convolution and 3x3 max pool, then stages of 1x3x1 bottleneck blocks.  Every stage after the first
// halves the resolution in its first block's 3x3 convolution.
fn bottleneck_geometry(stage_blocks: &[usize]) -> (Vec<usize>, Vec<usize>, Vec<Padding>) {
    let mut filter_sizes = vec![7, 3];
    let mut strides = vec![2, 2];
    let mut paddings = vec![Padding::Explicit(3), Padding::Explicit(1)];

    for (stage, &blocks) in stage_blocks.iter().enumerate() {
        for block in 0..blocks {
            let stride = if stage > 0 && block == 0 { 2 } else { 1 };

            filter_sizes.extend_from_slice(&[1, 3, 1]);
            strides.extend_from_slice(&[1, stride, 1]);
            paddings.extend_from_slice(&[Padding::Explicit(0), Padding::Explicit(1), Padding::Explicit(0)]);
        }
    }

    (filter_sizes, strides, paddings)
}
