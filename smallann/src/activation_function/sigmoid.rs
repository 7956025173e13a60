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

use crate::activation_function::ActivationFunction;

#[derive(Clone, Debug)]
pub struct SigmoidActivationFunction;

impl ActivationFunction for SigmoidActivationFunction {
    fn f(x: f32) -> f32 {
        1.0 / (1.0 + (-x).exp())
    }

    fn f_prime(x: f32) -> f32 {
        let y = Self::f(x);
        y * (1.0 - y)
    }
}
