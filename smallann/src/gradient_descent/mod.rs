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

pub use self::adadelta::AdadeltaGradientDescent;
pub use self::momentum::MomentumGradientDescent;
pub use self::simple::SimpleGradientDescent;

/// An update rule for one parameter tensor.
///
/// Layers clone a configured instance once per tensor they train, so any per-parameter state is sized lazily on the
/// first call to `descend`.
pub trait GradientDescent: Clone + Send {
    fn descend(&mut self, parameters: &mut [f32], gradients: &[f32], rate: f32);
}

mod adadelta;
mod momentum;
mod simple;
