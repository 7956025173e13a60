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

use std::path::PathBuf;
use std::process;

use clap::Parser;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use protopnet::data::{synthetic_clusters, Dataset};
use protopnet::smallann::gradient_descent::AdadeltaGradientDescent;
use protopnet::util::JKiss32Rng;
use protopnet::{PPNet, PPNetConfig, Result};

/// Trains a prototype network on synthetic clustered feature maps.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON model configuration.  Without one, a small network matching the synthetic data is used.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 3)]
    classes: usize,

    #[arg(long, default_value_t = 40)]
    samples_per_class: usize,

    /// Height and width of the synthetic feature maps.
    #[arg(long, default_value_t = 4)]
    feature_size: usize,

    #[arg(long, default_value_t = 8)]
    feature_depth: usize,

    #[arg(long, default_value_t = 2)]
    prototypes_per_class: usize,

    #[arg(long, default_value_t = 8)]
    prototype_depth: usize,

    #[arg(long, default_value_t = 10)]
    epochs: usize,

    #[arg(long, default_value_t = 16)]
    batch_size: usize,

    #[arg(long, default_value_t = 1.0)]
    rate: f32,

    #[arg(long, default_value_t = 0.2)]
    validation_split: f32,

    /// Seed for data generation, initialization and shuffling.  Random if not given.
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the trained network.
    #[arg(long)]
    output: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(error) = run(Args::parse()) {
        error!(%error, "training failed");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut rng = match args.seed {
        Some(seed) => JKiss32Rng::seed_from_u64(seed),
        None => JKiss32Rng::new(),
    };

    let config = match args.config {
        Some(ref path) => PPNetConfig::from_file(path)?,
        None => PPNetConfig {
            prototype_shape: [args.classes * args.prototypes_per_class, 1, 1, args.prototype_depth],
            feature_shape: Some([args.feature_size, args.feature_size, args.feature_depth]),
            num_classes: args.classes,
            ..PPNetConfig::default()
        },
    };
    config.validate()?;

    let feature_shape = config.feature_shape()?;
    let source = synthetic_clusters(config.num_classes, args.samples_per_class, feature_shape, 0.2, 0.05, &mut rng)?;
    let (mut train, validation) = Dataset::shuffled(&source, args.seed.unwrap_or(0)).split(args.validation_split)?;

    info!(train = train.len(), validation = validation.len(), classes = config.num_classes, "generated synthetic data");

    let mut ppnet = PPNet::new(config, AdadeltaGradientDescent::new(0.95, 0.0), &mut rng)?;

    for epoch in 0..args.epochs {
        train.shuffle(&mut rng);

        let mut total = 0.0;
        let mut batches = 0;
        for batch in train.batches(args.batch_size)? {
            total += ppnet.train_batch(&batch.inputs, &batch.targets, args.rate)?.total;
            batches += 1;
        }

        let mut accuracy = 0.0;
        let mut validation_loss = 0.0;
        if !validation.is_empty() {
            for batch in validation.batches(validation.len())? {
                let evaluation = ppnet.evaluate(&batch.inputs, &batch.targets)?;
                accuracy = evaluation.accuracy;
                validation_loss = evaluation.components.total;
            }
        }

        info!(
            epoch,
            train_loss = total / batches.max(1) as f32,
            validation_loss,
            accuracy,
            "finished epoch",
        );
    }

    if let Some(ref output) = args.output {
        ppnet.to_file(output)?;
    }

    Ok(())
}
