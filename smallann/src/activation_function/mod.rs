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

use smallmath::Vector;

pub use self::log_similarity::LogSimilarityActivationFunction;
pub use self::relu::ReLuActivationFunction;
pub use self::sigmoid::SigmoidActivationFunction;

pub trait ActivationFunction: Clone + Send {
    fn f(x: f32) -> f32;
    fn f_prime(x: f32) -> f32;

    fn f_vector(inputs: &Vector, outputs: &mut Vector) {
        debug_assert!(inputs.len() == outputs.len(), "inputs.len() doesn't match outputs.len()!");
        for (output, &input) in outputs.iter_mut().zip(inputs.iter()) {
            *output = Self::f(input);
        }
    }

    fn f_prime_vector(inputs: &Vector, outputs: &mut Vector) {
        debug_assert!(inputs.len() == outputs.len(), "inputs.len() doesn't match outputs.len()!");
        for (output, &input) in outputs.iter_mut().zip(inputs.iter()) {
            *output = Self::f_prime(input);
        }
    }
}

mod log_similarity;
mod relu;
mod sigmoid;
