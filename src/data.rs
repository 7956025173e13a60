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

//! Labeled feature maps and their batching.
//!
//! A [`Dataset`](struct.Dataset.html) is an ordering of a source's samples.  Shuffling and splitting only permute
//! and partition indices; the features stay where the source keeps them.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use smallann::Matrix;
use tracing::debug;

use crate::error::{Error, Result};
use crate::util::JKiss32Rng;

/// A finite, indexable collection of labeled samples of equal length.
pub trait SampleSource {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values per sample.
    fn feature_len(&self) -> usize;

    fn num_classes(&self) -> usize;

    fn features(&self, index: usize) -> &[f32];

    fn label(&self, index: usize) -> usize;
}

/// Samples held in memory, one per row.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    features: Matrix,
    labels: Vec<usize>,
    num_classes: usize,
}

impl InMemorySource {
    pub fn new(features: Matrix, labels: Vec<usize>, num_classes: usize) -> Result<InMemorySource> {
        if labels.len() != features.rows() {
            return Err(Error::config("labels", format!("{} labels for {} samples", labels.len(), features.rows())));
        }
        if let Some(&label) = labels.iter().find(|&&l| l >= num_classes) {
            return Err(Error::config("labels", format!("label {} out of range for {} classes", label, num_classes)));
        }

        Ok(InMemorySource {
            features: features,
            labels: labels,
            num_classes: num_classes,
        })
    }
}

impl SampleSource for InMemorySource {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn feature_len(&self) -> usize {
        self.features.columns()
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn features(&self, index: usize) -> &[f32] {
        &self.features[index]
    }

    fn label(&self, index: usize) -> usize {
        self.labels[index]
    }
}

/// Clustered synthetic feature maps in `[0, 1]`, `samples_per_class` of each class.
///
/// Every class owns a random channel pattern.  Each sample is uniform background noise of amplitude
/// `background` with its class pattern, jittered by `noise`, placed at one random location.
pub fn synthetic_clusters<R>(
    num_classes: usize,
    samples_per_class: usize,
    feature_shape: [usize; 3],
    background: f32,
    noise: f32,
    rng: &mut R,
) -> Result<InMemorySource> where R: Rng {
    let [height, width, depth] = feature_shape;
    if height * width * depth == 0 {
        return Err(Error::config("feature_shape", format!("{:?} has a zero dimension", feature_shape)));
    }
    if !(background.is_finite() && background >= 0.0) {
        return Err(Error::config("background", format!("{} is not a non-negative amplitude", background)));
    }
    if !(noise.is_finite() && noise >= 0.0) {
        return Err(Error::config("noise", format!("{} is not a non-negative amplitude", noise)));
    }

    let patterns = (0..num_classes)
        .map(|_| (0..depth).map(|_| rng.gen::<f32>()).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let sample_len = height * width * depth;
    let mut features = Matrix::zeros(num_classes * samples_per_class, sample_len);
    let mut labels = Vec::with_capacity(num_classes * samples_per_class);

    for (class, pattern) in patterns.iter().enumerate() {
        for _ in 0..samples_per_class {
            let row = labels.len();
            for value in features[row].iter_mut() {
                *value = rng.gen::<f32>() * background;
            }

            let location = rng.gen_range(0..height * width) * depth;
            for (value, &p) in features[row][location..location + depth].iter_mut().zip(pattern) {
                *value = (p + rng.gen_range(-noise..=noise)).max(0.0).min(1.0);
            }

            labels.push(class);
        }
    }

    InMemorySource::new(features, labels, num_classes)
}

/// An ordering of some of a source's samples.
#[derive(Clone, Debug)]
pub struct Dataset<'a, S> {
    source: &'a S,
    indices: Vec<usize>,
}

impl<'a, S> Dataset<'a, S> where S: SampleSource {
    /// Every sample in source order.
    pub fn new(source: &'a S) -> Dataset<'a, S> {
        Dataset {
            source: source,
            indices: (0..source.len()).collect(),
        }
    }

    /// Every sample in an order fixed by `seed`.
    pub fn shuffled(source: &'a S, seed: u64) -> Dataset<'a, S> {
        let mut dataset = Dataset::new(source);
        dataset.shuffle(&mut JKiss32Rng::seed_from_u64(seed));
        dataset
    }

    pub fn shuffle<R>(&mut self, rng: &mut R) where R: Rng {
        self.indices.shuffle(rng);
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Splits off the last `validation_fraction` of the ordering, returning `(train, validation)`.  The training
    /// part keeps `floor(len * (1 - validation_fraction))` samples.
    pub fn split(self, validation_fraction: f32) -> Result<(Dataset<'a, S>, Dataset<'a, S>)> {
        if !(0.0..=1.0).contains(&validation_fraction) {
            return Err(Error::config("validation_split", format!("{} is not a fraction", validation_fraction)));
        }

        let train_len = (self.indices.len() as f32 * (1.0 - validation_fraction)).floor() as usize;
        let mut train = self.indices;
        let validation = train.split_off(train_len.min(train.len()));

        debug!(train = train.len(), validation = validation.len(), "split dataset");

        Ok((
            Dataset { source: self.source, indices: train },
            Dataset { source: self.source, indices: validation },
        ))
    }

    /// Consecutive batches of at most `batch_size` samples.  Each call starts again from the first sample.
    pub fn batches(&self, batch_size: usize) -> Result<Batches<'_, 'a, S>> {
        if batch_size == 0 {
            return Err(Error::config("batch_size", "must be positive"));
        }

        Ok(Batches {
            dataset: self,
            batch_size: batch_size,
            position: 0,
        })
    }
}

/// One batch: features one sample per row, and one-hot targets.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub inputs: Matrix,
    pub targets: Matrix,
}

pub struct Batches<'d, 'a, S> {
    dataset: &'d Dataset<'a, S>,
    batch_size: usize,
    position: usize,
}

impl<'d, 'a, S> Iterator for Batches<'d, 'a, S> where S: SampleSource {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let indices = &self.dataset.indices;
        if self.position >= indices.len() {
            return None;
        }

        let end = (self.position + self.batch_size).min(indices.len());
        let source = self.dataset.source;

        let mut inputs = Matrix::zeros(end - self.position, source.feature_len());
        let mut targets = Matrix::zeros(end - self.position, source.num_classes());
        for (row, &index) in indices[self.position..end].iter().enumerate() {
            inputs[row].clone_from_slice(source.features(index));
            targets[(row, source.label(index))] = 1.0;
        }

        self.position = end;
        Some(Batch { inputs: inputs, targets: targets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> InMemorySource {
        InMemorySource::new(
            Matrix::from_vec(5, 2, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5]),
            vec![0, 1, 2, 0, 1],
            3,
        ).unwrap()
    }

    #[test]
    fn test_batches_are_one_hot_and_restartable() {
        let source = source();
        let dataset = Dataset::new(&source);

        let batches = dataset.batches(2).unwrap().collect::<Vec<_>>();
        assert_eq!(batches.len(), 3);
        assert_eq!(&batches[0].inputs.as_vector()[..], &[0.0, 0.5, 1.0, 1.5]);
        assert_eq!(&batches[0].targets.as_vector()[..], &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(batches[2].inputs.rows(), 1);
        assert_eq!(&batches[2].targets.as_vector()[..], &[0.0, 1.0, 0.0]);

        assert_eq!(dataset.batches(2).unwrap().collect::<Vec<_>>(), batches);
    }

    #[test]
    fn test_shuffle_is_seeded_permutation() {
        let source = source();
        let a = Dataset::shuffled(&source, 1234);
        let b = Dataset::shuffled(&source, 1234);

        assert_eq!(a.indices(), b.indices());

        let mut sorted = a.indices().to_vec();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_split() {
        let source = source();
        let (train, validation) = Dataset::new(&source).split(0.2).unwrap();

        assert_eq!(train.indices(), &[0, 1, 2, 3]);
        assert_eq!(validation.indices(), &[4]);

        let (train, validation) = Dataset::new(&source).split(1.0).unwrap();
        assert!(train.is_empty());
        assert_eq!(validation.len(), 5);

        assert!(Dataset::new(&source).split(1.5).is_err());
    }

    #[test]
    fn test_invalid_sources() {
        assert!(InMemorySource::new(Matrix::zeros(2, 2), vec![0], 1).is_err());
        assert!(InMemorySource::new(Matrix::zeros(2, 2), vec![0, 3], 3).is_err());
    }

    #[test]
    fn test_synthetic_clusters() {
        let source = synthetic_clusters(3, 4, [2, 2, 3], 0.1, 0.05, &mut JKiss32Rng::seed_from_u64(5)).unwrap();

        assert_eq!(source.len(), 12);
        assert_eq!(source.feature_len(), 12);
        assert_eq!((0..12).filter(|&i| source.label(i) == 2).count(), 4);
        assert!((0..12).all(|i| source.features(i).iter().all(|&v| (0.0..=1.0).contains(&v))));
    }

    #[test]
    fn test_zero_batch_size() {
        let source = source();
        let dataset = Dataset::new(&source);

        match dataset.batches(0) {
            Err(Error::Config { field, .. }) => assert_eq!(field, "batch_size"),
            _ => panic!("zero batch size accepted"),
        }
    }

    #[test]
    fn test_synthetic_clusters_rejects_bad_amplitudes() {
        let mut rng = JKiss32Rng::seed_from_u64(5);

        for &(background, noise, expected) in &[
            (0.1, -0.05, "noise"),
            (0.1, f32::NAN, "noise"),
            (-0.1, 0.05, "background"),
            (f32::INFINITY, 0.05, "background"),
        ] {
            match synthetic_clusters(2, 2, [2, 2, 2], background, noise, &mut rng) {
                Err(Error::Config { field, .. }) => assert_eq!(field, expected),
                _ => panic!("accepted background {} and noise {}", background, noise),
            }
        }

        assert!(synthetic_clusters(2, 2, [2, 2, 2], 0.0, 0.0, &mut rng).is_ok());
    }
}
