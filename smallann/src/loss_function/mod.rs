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

use smallmath::Matrix;

pub use self::softmax_cross_entropy::{softmax, SoftmaxCrossEntropyLossFunction};

/// A scalar loss over a batch, one sample per row.
pub trait LossFunction {
    /// Loss of `outputs` against `targets`, averaged over the batch.
    fn loss(&self, targets: &Matrix, outputs: &Matrix) -> f32;

    /// Gradient of [`loss`](#tymethod.loss) with respect to `outputs`.
    fn gradient(&self, targets: &Matrix, outputs: &Matrix, gradients: &mut Matrix);
}

mod softmax_cross_entropy;
