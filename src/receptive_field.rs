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

//! Receptive field bookkeeping in input image coordinates.
//!
//! Each layer of a convolutional stack is summarized by an [`RfInfo`](struct.RfInfo.html): how many units lie
//! along one spatial side, how far apart their centers are in image pixels, how many image pixels each one sees,
//! and where the first one is centered.

use crate::error::{Error, Result};

/// How a convolution or pooling layer pads its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Padding {
    /// Pads so the output has `ceil(n / stride)` units.
    Same,
    /// No padding.
    Valid,
    /// Pads by the given amount on each side.
    Explicit(usize),
}

/// Receptive field of one layer's units along one spatial side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RfInfo {
    /// Units along the side.
    pub size: usize,
    /// Distance between neighboring units' centers, in image pixels.
    pub jump: usize,
    /// Image pixels seen by one unit.
    pub receptive_size: usize,
    /// Center of the first unit's receptive field.
    pub start: f32,
}

impl RfInfo {
    pub fn new(size: usize, jump: usize, receptive_size: usize, start: f32) -> RfInfo {
        RfInfo {
            size: size,
            jump: jump,
            receptive_size: receptive_size,
            start: start,
        }
    }

    /// The image itself: every pixel sees only itself.
    pub fn image(image_size: usize) -> RfInfo {
        RfInfo::new(image_size, 1, 1, 0.5)
    }
}

/// Receptive field of a layer with the given filter, stride and padding, applied after `previous`.
pub fn compute_layer_rf_info(filter_size: usize, stride: usize, padding: Padding, previous: RfInfo) -> Result<RfInfo> {
    if filter_size == 0 {
        return Err(Error::config("layer_filter_sizes", "filter size must be positive"));
    }
    if stride == 0 {
        return Err(Error::config("layer_strides", "stride must be positive"));
    }

    let n = previous.size;
    let (size, pad) = match padding {
        Padding::Same => {
            let pad = if n % stride == 0 {
                filter_size.saturating_sub(stride)
            } else {
                filter_size.saturating_sub(n % stride)
            };
            ((n + stride - 1) / stride, pad)
        }
        Padding::Valid => {
            if filter_size > n {
                return Err(Error::config("layer_filter_sizes", format!("filter size {} exceeds input size {}", filter_size, n)));
            }
            ((n - filter_size + stride) / stride, 0)
        }
        Padding::Explicit(padding) => {
            let pad = padding * 2;
            if filter_size > n + pad {
                return Err(Error::config("layer_filter_sizes", format!("filter size {} exceeds padded input size {}", filter_size, n + pad)));
            }
            ((n + pad - filter_size) / stride + 1, pad)
        }
    };

    let pad_left = pad / 2;

    Ok(RfInfo {
        size: size,
        jump: previous.jump * stride,
        receptive_size: previous.receptive_size + (filter_size - 1) * previous.jump,
        start: previous.start + ((filter_size - 1) as f32 / 2.0 - pad_left as f32) * previous.jump as f32,
    })
}

/// Receptive field of the prototype layer: the image folded through every layer, then a valid, stride 1
/// convolution with the prototype kernel.
pub fn compute_proto_layer_rf_info(
    image_size: usize,
    layer_filter_sizes: &[usize],
    layer_strides: &[usize],
    layer_paddings: &[Padding],
    prototype_kernel_size: usize,
) -> Result<RfInfo> {
    if layer_strides.len() != layer_filter_sizes.len() {
        return Err(Error::config(
            "layer_strides",
            format!("{} strides for {} filter sizes", layer_strides.len(), layer_filter_sizes.len()),
        ));
    }
    if layer_paddings.len() != layer_filter_sizes.len() {
        return Err(Error::config(
            "layer_paddings",
            format!("{} paddings for {} filter sizes", layer_paddings.len(), layer_filter_sizes.len()),
        ));
    }

    let mut rf_info = RfInfo::image(image_size);
    for ((&filter_size, &stride), &padding) in layer_filter_sizes.iter().zip(layer_strides).zip(layer_paddings) {
        rf_info = compute_layer_rf_info(filter_size, stride, padding, rf_info)?;
    }

    compute_layer_rf_info(prototype_kernel_size, 1, Padding::Valid, rf_info)
}

/// Image region `[height_start, height_end, width_start, width_end)` seen by the prototype layer unit at
/// `(height_index, width_index)`, clipped to the image.
pub fn patch_bounds(image_size: usize, rf_info: RfInfo, height_index: usize, width_index: usize) -> [usize; 4] {
    let (height_start, height_end) = axis_bounds(image_size, rf_info, height_index);
    let (width_start, width_end) = axis_bounds(image_size, rf_info, width_index);
    [height_start, height_end, width_start, width_end]
}

fn axis_bounds(image_size: usize, rf_info: RfInfo, index: usize) -> (usize, usize) {
    let center = rf_info.start + (index * rf_info.jump) as f32;
    let half = rf_info.receptive_size as f32 / 2.0;

    let start = (center - half).trunc().max(0.0) as usize;
    let end = ((center + half).trunc().max(0.0) as usize).min(image_size);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backbone;

    #[test]
    fn test_same_padding() {
        let rf = compute_layer_rf_info(7, 2, Padding::Same, RfInfo::image(224)).unwrap();
        assert_eq!(rf, RfInfo::new(112, 2, 7, 1.5));

        let rf = compute_layer_rf_info(2, 2, Padding::Same, RfInfo::new(7, 1, 1, 0.5)).unwrap();
        assert_eq!(rf, RfInfo::new(4, 2, 2, 1.0));
    }

    #[test]
    fn test_valid_and_explicit_padding() {
        let rf = compute_layer_rf_info(3, 2, Padding::Valid, RfInfo::image(224)).unwrap();
        assert_eq!(rf, RfInfo::new(111, 2, 3, 1.5));

        let rf = compute_layer_rf_info(3, 2, Padding::Explicit(1), RfInfo::image(224)).unwrap();
        assert_eq!(rf, RfInfo::new(112, 2, 3, 0.5));
    }

    #[test]
    fn test_invalid_layers() {
        assert!(compute_layer_rf_info(0, 1, Padding::Same, RfInfo::image(10)).is_err());
        assert!(compute_layer_rf_info(3, 0, Padding::Same, RfInfo::image(10)).is_err());
        assert!(compute_layer_rf_info(11, 1, Padding::Valid, RfInfo::image(10)).is_err());
    }

    #[test]
    fn test_proto_layer_without_layers() {
        let rf = compute_proto_layer_rf_info(224, &[], &[], &[], 1).unwrap();
        assert_eq!(rf, compute_layer_rf_info(1, 1, Padding::Valid, RfInfo::image(224)).unwrap());
        assert_eq!(rf, RfInfo::new(224, 1, 1, 0.5));

        let rf = compute_proto_layer_rf_info(7, &[], &[], &[], 3).unwrap();
        assert_eq!(rf, RfInfo::new(5, 1, 3, 1.5));
    }

    #[test]
    fn test_proto_layer_folds_layers() {
        let rf = compute_proto_layer_rf_info(224, &[3, 3], &[1, 2], &[Padding::Same, Padding::Valid], 1).unwrap();
        assert_eq!(rf, RfInfo::new(111, 2, 5, 1.5));
    }

    #[test]
    fn test_mismatched_arrays() {
        match compute_proto_layer_rf_info(224, &[3, 3], &[1], &[Padding::Same, Padding::Same], 1) {
            Err(Error::Config { field, .. }) => assert_eq!(field, "layer_strides"),
            other => panic!("Unexpected result: {:?}", other),
        }
        match compute_proto_layer_rf_info(224, &[3], &[1], &[], 1) {
            Err(Error::Config { field, .. }) => assert_eq!(field, "layer_paddings"),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_resnet50() {
        let backbone = Backbone::from_name("resnet50").unwrap();
        let (filter_sizes, strides, paddings) = backbone.layer_geometry();
        let rf = compute_proto_layer_rf_info(224, &filter_sizes, &strides, &paddings, 1).unwrap();

        assert_eq!(rf, RfInfo::new(7, 32, 427, 0.5));
        assert_eq!(rf.size, backbone.feature_shape(224).unwrap()[0]);
    }

    #[test]
    fn test_patch_bounds() {
        let rf = RfInfo::new(7, 32, 427, 0.5);
        assert_eq!(patch_bounds(224, rf, 0, 0), [0, 214, 0, 214]);
        assert_eq!(patch_bounds(224, rf, 6, 6), [0, 224, 0, 224]);

        let rf = RfInfo::new(5, 1, 3, 1.5);
        assert_eq!(patch_bounds(7, rf, 2, 1), [2, 5, 1, 4]);
    }
}
