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

pub use smallmath::{matrix, tensor, vector, FilterShape, Matrix, Shape, Vector};

pub use ann::Ann;
pub use error::{Error, Result};
pub use serialization::{File, Identifiable, LayerRegistry, Serializable};

pub mod activation_function;
mod ann;
mod error;
pub mod gradient_descent;
pub mod layer;
pub mod loss_function;
pub mod serialization;
