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

//! A prototype-based interpretable image classifier.
//!
//! A [`PPNet`](ppnet/struct.PPNet.html) consumes the feature maps of a convolutional backbone.  It compares a bank
//! of learned prototypes against every patch of those maps, keeps each prototype's smallest squared distance,
//! turns the distances into similarities and combines them linearly into class logits.  Each prototype belongs
//! to one class, and training pulls prototypes toward patches of their own class and away from the others.
//!
//! # Usage
//!
//! ```rust,no_run
//! use protopnet::smallann::gradient_descent::AdadeltaGradientDescent;
//! use protopnet::{PPNet, PPNetConfig};
//!
//! # fn main() -> protopnet::Result<()> {
//! let config = PPNetConfig::from_json(r#"{ "num_classes": 20, "backbone": "resnet50" }"#)?;
//! let ppnet = PPNet::new(config, AdadeltaGradientDescent::new(0.95, 0.0), &mut rand::thread_rng())?;
//! # Ok(())
//! # }
//! ```
//!
//! The numeric layers themselves live in the bundled `smallann` crate, re-exported here.

pub use smallann;

pub use self::config::{Backbone, LossWeights, PPNetConfig, PrototypeActivationFunction};
pub use self::error::{Error, Result};
pub use self::loss::{CompositeLoss, LossComponents, PrototypeLoss};
pub use self::ppnet::{Evaluation, PPNet};

pub mod class_identity;
pub mod config;
pub mod data;
mod error;
pub mod loss;
pub mod ppnet;
pub mod receptive_field;
pub mod util;
