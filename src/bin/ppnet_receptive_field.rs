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
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use protopnet::receptive_field::patch_bounds;
use protopnet::{Error, PPNetConfig, Result};

/// Prints the image-space receptive field of a prototype layer.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON model configuration.  Overrides the other options.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "resnet50")]
    backbone: String,

    /// Side of the square input image.  The backbone's feature map size follows from it.
    #[arg(long, default_value_t = 224)]
    img_size: usize,

    /// Height and width of each prototype.
    #[arg(long, default_value_t = 1)]
    prototype_kernel: usize,

    /// Also print the image patch seen at every prototype layer location.
    #[arg(long)]
    patches: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(error) = run(Args::parse()) {
        error!(%error, "cannot compute receptive field");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = match args.config {
        Some(ref path) => PPNetConfig::from_file(path)?,
        None => {
            let mut config = PPNetConfig {
                img_size: args.img_size,
                backbone: Some(args.backbone.clone()),
                ..PPNetConfig::default()
            };
            config.prototype_shape[1] = args.prototype_kernel;
            config.prototype_shape[2] = args.prototype_kernel;
            config.num_classes = 1;
            config
        }
    };
    config.validate()?;

    let rf_info = match config.prototype_rf_info()? {
        Some(rf_info) => rf_info,
        None => return Err(Error::Config { field: "backbone", message: String::from("required for receptive fields") }),
    };

    info!(backbone = ?config.backbone, img_size = config.img_size, feature_shape = ?config.feature_shape()?, "computed prototype receptive field");

    println!("size {}", rf_info.size);
    println!("jump {}", rf_info.jump);
    println!("receptive_size {}", rf_info.receptive_size);
    println!("start {}", rf_info.start);

    if args.patches {
        for row in 0..rf_info.size {
            for column in 0..rf_info.size {
                let [height_start, height_end, width_start, width_end] = patch_bounds(config.img_size, rf_info, row, column);
                println!("{} {}: [{}, {}) x [{}, {})", row, column, height_start, height_end, width_start, width_end);
            }
        }
    }

    Ok(())
}
